use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_API_KEY_ENV, DEFAULT_API_PREFIX, DEFAULT_ENDPOINT_URL, DEFAULT_GREETING,
    DEFAULT_USER_ID, DUPLICATE_WINDOW_MS, FALLBACK_REPLY, HTTP_REQUEST_TIMEOUT_SECS,
    SNIPPET_MAX_CHARS, TITLE_MAX_CHARS,
};
use crate::transport::ChatModule;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Remote service configuration
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Conversation behaviour
    #[serde(default)]
    pub chat: ChatConfig,

    /// UI configuration
    #[serde(default)]
    pub ui: UIConfig,
}

/// Remote service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Scheme, host and port of the service
    pub base_url: String,
    /// Path prefix all routes live under
    pub api_prefix: String,
    /// Request timeout enforced by the HTTP client
    pub timeout_secs: u64,
    /// Environment variable containing the bearer credential
    pub api_key_env: String,
    /// Bearer credential (prefer the environment variable)
    pub api_key: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ENDPOINT_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout_secs: HTTP_REQUEST_TIMEOUT_SECS,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
        }
    }
}

/// Conversation behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Caller identity sent with every request
    pub user_id: String,
    /// Module new conversations start in
    pub default_module: ChatModule,
    /// Optional greeting seeded into new conversations
    pub greeting: Option<String>,
    /// Identical user messages inside this window are recorded once
    pub duplicate_window_ms: i64,
    /// Reply recorded when the service can't be reached
    pub fallback_reply: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            default_module: ChatModule::default(),
            greeting: Some(DEFAULT_GREETING.to_string()),
            duplicate_window_ms: DUPLICATE_WINDOW_MS,
            fallback_reply: FALLBACK_REPLY.to_string(),
        }
    }
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UIConfig {
    /// Derived conversation titles are cut to this many characters
    pub title_max_chars: usize,
    /// Last-message previews are cut to this many characters
    pub snippet_max_chars: usize,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            title_max_chars: TITLE_MAX_CHARS,
            snippet_max_chars: SNIPPET_MAX_CHARS,
        }
    }
}

/// Load configuration from multiple sources
pub fn load_config() -> Result<Config> {
    let global_config = get_config_dir()?.join("config.toml");
    let local_config = PathBuf::from(".nativeai/config.toml");
    load_config_from(&[global_config, local_config])
}

/// Layer defaults, then each existing file in order, then `NATIVEAI_` env vars
pub fn load_config_from(paths: &[PathBuf]) -> Result<Config> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    for path in paths {
        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }
    }

    // NATIVEAI_CHAT__USER_ID -> chat.user_id
    figment = figment.merge(Env::prefixed("NATIVEAI_").split("__"));

    figment
        .extract()
        .context("Failed to load configuration")
}

/// Load a single explicit config file (no env or global layering)
pub fn load_config_file(path: &Path) -> Result<Config> {
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&toml_str).with_context(|| format!("Invalid config {}", path.display()))
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "nativeai") {
        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;
        Ok(config_dir.to_path_buf())
    } else {
        // Fallback to home directory
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        let config_dir = PathBuf::from(home).join(".config").join("nativeai");
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = if let Some(p) = path {
        p
    } else {
        get_config_dir()?.join("config.toml")
    };

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist
pub fn init_config() -> Result<PathBuf> {
    let config_file = get_config_dir()?.join("config.toml");

    if !config_file.exists() {
        save_config(&Config::default(), Some(config_file.clone()))?;
    }

    Ok(config_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.endpoint.base_url, "http://localhost:8000");
        assert_eq!(config.endpoint.api_prefix, "/nativeai");
        assert_eq!(config.chat.duplicate_window_ms, 5000);
        assert_eq!(config.chat.default_module, ChatModule::ShippingFee);
        assert_eq!(config.ui.title_max_chars, 20);
    }

    #[test]
    fn test_save_then_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.chat.user_id = "user-42".to_string();
        config.chat.default_module = ChatModule::Assistant;
        config.chat.greeting = Some("你好".to_string());
        save_config(&config, Some(path.clone())).unwrap();

        assert_eq!(load_config_file(&path).unwrap(), config);
    }

    #[test]
    fn test_later_files_override_earlier_ones() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        let local = temp_dir.path().join("local.toml");
        std::fs::write(
            &global,
            "[endpoint]\nbase_url = \"http://global:8000\"\n\n[chat]\nuser_id = \"global-user\"\n",
        )
        .unwrap();
        std::fs::write(&local, "[chat]\ndefault_module = \"assistant\"\n").unwrap();

        let config = load_config_from(&[global, local, temp_dir.path().join("missing.toml")]).unwrap();
        assert_eq!(config.endpoint.base_url, "http://global:8000");
        assert_eq!(config.endpoint.api_prefix, "/nativeai");
        assert_eq!(config.chat.user_id, "global-user");
        assert_eq!(config.chat.default_module, ChatModule::Assistant);
    }

    #[test]
    fn test_invalid_module_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[chat]\ndefault_module = \"order-analysis\"\n").unwrap();
        assert!(load_config_from(&[path]).is_err());
    }
}
