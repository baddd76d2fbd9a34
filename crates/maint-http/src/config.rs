//! Endpoint configuration shared by every client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Payments, messaging and audit calls.
pub const DEFAULT_COLLABORATOR_TIMEOUT_SECS: u64 = 5;

/// Generation is slower than CRUD; local models routinely need tens of seconds.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

fn default_collaborator_timeout() -> u64 {
    DEFAULT_COLLABORATOR_TIMEOUT_SECS
}

/// Where a service lives and how long to wait for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL, e.g. `http://payments-service:8001`
    pub base_url: String,
    /// Per-call timeout in seconds
    #[serde(default = "default_collaborator_timeout")]
    pub timeout_secs: u64,
}

impl EndpointConfig {
    pub fn new(base_url: &str) -> Self {
        EndpointConfig {
            base_url: base_url.to_string(),
            timeout_secs: DEFAULT_COLLABORATOR_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_config_defaults_timeout() {
        let config: EndpointConfig =
            serde_json::from_str(r#"{"base_url":"http://audit-service:8003"}"#).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_endpoint_config_with_timeout() {
        let config = EndpointConfig::new("http://llm:11434").with_timeout_secs(60);
        assert_eq!(config.base_url, "http://llm:11434");
        assert_eq!(config.timeout_secs, 60);
    }
}
