/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_PREFIX: &str = "/nativeai";
pub const DEFAULT_API_KEY_ENV: &str = "NATIVEAI_API_KEY";
pub const TRACE_ID_HEADER: &str = "X-Trace-Id";

// Timeouts
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const HEALTH_CHECK_TIMEOUT_MS: u64 = 3000;

// Conversation behaviour
pub const DUPLICATE_WINDOW_MS: i64 = 5000;
pub const DEFAULT_USER_ID: &str = "anonymous";
pub const FALLBACK_REPLY: &str = "抱歉，我暂时无法连接到服务器，请稍后再试。";
pub const DEFAULT_GREETING: &str = "您好！我是 NativeAI 智能助手，请问有什么可以帮您？";
pub const UNTITLED_PREFIX: &str = "新对话";
pub const UNTITLED_KEY_CHARS: usize = 8;

// UI Configuration
pub const TITLE_MAX_CHARS: usize = 20;
pub const SNIPPET_MAX_CHARS: usize = 40;
pub const ERROR_BODY_MAX_CHARS: usize = 200;
