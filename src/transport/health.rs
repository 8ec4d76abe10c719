use serde::Deserialize;

use super::error::TransportError;

/// Result of `GET {prefix}/health`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub version: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub redis_connected: bool,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok") || self.status.eq_ignore_ascii_case("healthy")
    }
}

pub(crate) fn decode_health(status: u16, body: &str) -> Result<HealthReport, TransportError> {
    if !(200..300).contains(&status) {
        return Err(TransportError::status(status, body));
    }
    serde_json::from_str(body).map_err(|e| TransportError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_health() {
        let body = r#"{"status":"ok","version":"0.1.0","timestamp":"2024-01-01T00:00:00","redis_connected":true}"#;
        let report = decode_health(200, body).unwrap();
        assert!(report.is_healthy());
        assert!(report.redis_connected);
        assert_eq!(report.version, "0.1.0");
    }

    #[test]
    fn test_decode_health_degraded() {
        let report = decode_health(200, r#"{"status":"degraded","version":"0.1.0"}"#).unwrap();
        assert!(!report.is_healthy());
        assert!(!report.redis_connected);
        assert!(decode_health(503, "down").is_err());
    }
}
