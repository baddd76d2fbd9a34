//! Agent configuration: service endpoints, model and timeouts.
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file, the
//! environment. The CLI applies its own flags on top.
//!
//! ```toml
//! [payments]
//! base_url = "http://localhost:8001"
//!
//! [llm]
//! base_url = "http://localhost:11434"
//! model = "llama3"
//! timeout_secs = 90
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use maint_collab::{AuditSink, MessagingSender, PaymentStore, TextGenerator};
use maint_http::{
    AuditClient, ClientError, EndpointConfig, OllamaClient, PaymentsClient, WhatsAppClient,
    DEFAULT_LLM_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAYMENTS_URL: &str = "http://payments-service:8001";
pub const DEFAULT_WHATSAPP_URL: &str = "http://whatsapp-service:8002";
pub const DEFAULT_AUDIT_URL: &str = "http://audit-service:8003";
pub const DEFAULT_LLM_URL: &str = "http://llm:11434";
pub const DEFAULT_LLM_MODEL: &str = "llama3";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
}

fn default_llm_timeout() -> u64 {
    DEFAULT_LLM_TIMEOUT_SECS
}

fn default_llm_model() -> String {
    DEFAULT_LLM_MODEL.to_string()
}

/// Text-generation endpoint and model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn endpoint(&self) -> EndpointConfig {
        EndpointConfig::new(&self.base_url).with_timeout_secs(self.timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            base_url: DEFAULT_LLM_URL.to_string(),
            model: default_llm_model(),
            timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub payments: EndpointConfig,
    pub messaging: EndpointConfig,
    pub audit: EndpointConfig,
    pub llm: LlmConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            payments: EndpointConfig::new(DEFAULT_PAYMENTS_URL),
            messaging: EndpointConfig::new(DEFAULT_WHATSAPP_URL),
            audit: EndpointConfig::new(DEFAULT_AUDIT_URL),
            llm: LlmConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Defaults overridden by `PAYMENTS_URL`, `WHATSAPP_URL`, `AUDIT_URL`,
    /// `LLM_URL`, `LLM_MODEL`, `COLLAB_TIMEOUT_SECS` and `LLM_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Load a TOML file; sections that are absent keep their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment-style overrides read through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup("PAYMENTS_URL") {
            self.payments.base_url = url;
        }
        if let Some(url) = lookup("WHATSAPP_URL") {
            self.messaging.base_url = url;
        }
        if let Some(url) = lookup("AUDIT_URL") {
            self.audit.base_url = url;
        }
        if let Some(url) = lookup("LLM_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(value) = lookup("COLLAB_TIMEOUT_SECS") {
            let secs = parse_secs("COLLAB_TIMEOUT_SECS", &value)?;
            self.payments.timeout_secs = secs;
            self.messaging.timeout_secs = secs;
            self.audit.timeout_secs = secs;
        }
        if let Some(value) = lookup("LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_secs("LLM_TIMEOUT_SECS", &value)?;
        }
        Ok(self)
    }
}

fn parse_secs(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidTimeout {
            var,
            value: value.to_string(),
        }),
    }
}

/// The three backend collaborators, ready to hand to an `Orchestrator`.
#[derive(Clone)]
pub struct Collaborators {
    pub payments: Arc<dyn PaymentStore>,
    pub messenger: Arc<dyn MessagingSender>,
    pub audit: Arc<dyn AuditSink>,
}

impl Collaborators {
    /// HTTP clients for every configured service.
    pub fn from_config(config: &AgentConfig) -> Result<Self, ClientError> {
        Ok(Collaborators {
            payments: Arc::new(PaymentsClient::new(&config.payments)?),
            messenger: Arc::new(WhatsAppClient::new(&config.messaging)?),
            audit: Arc::new(AuditClient::new(&config.audit)?),
        })
    }
}

/// The configured Ollama-compatible generator.
pub fn remote_generator(config: &LlmConfig) -> Result<Arc<dyn TextGenerator>, ClientError> {
    Ok(Arc::new(OllamaClient::new(&config.endpoint(), &config.model)?))
}
