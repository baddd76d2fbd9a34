//! Maint-HTTP: reqwest Clients for the Maintenance Services
//!
//! Implements the `maint-collab` traits over HTTP/JSON against the payments,
//! WhatsApp and audit services and an Ollama-compatible chat endpoint.
//!
//! ## Layer 1 - Transport
//!
//! Focus: bounded timeouts, and mapping every transport outcome onto the
//! typed collaborator errors. No business logic lives here.

mod audit;
mod config;
mod error;
mod llm;
mod messaging;
mod payments;
mod transport;

pub use audit::AuditClient;
pub use config::{EndpointConfig, DEFAULT_COLLABORATOR_TIMEOUT_SECS, DEFAULT_LLM_TIMEOUT_SECS};
pub use error::ClientError;
pub use llm::OllamaClient;
pub use messaging::WhatsAppClient;
pub use payments::PaymentsClient;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("maint-agent/", env!("CARGO_PKG_VERSION"));
