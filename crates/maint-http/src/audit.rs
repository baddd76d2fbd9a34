//! Audit log service client

use async_trait::async_trait;
use maint_collab::{AuditEvent, AuditRecord, AuditSink, CollabResult, Service};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::EndpointConfig;
use crate::error::ClientError;
use crate::transport::{collaborator_error, read_json, Endpoint};

const SERVICE: Service = Service::Audit;

#[derive(Debug, Deserialize)]
struct LogEventResponse {
    log_id: i64,
}

/// HTTP client for the audit log service
#[derive(Debug, Clone)]
pub struct AuditClient {
    endpoint: Endpoint,
}

impl AuditClient {
    pub fn new(config: &EndpointConfig) -> Result<Self, ClientError> {
        Ok(AuditClient {
            endpoint: Endpoint::new(&config.base_url, config.timeout())?,
        })
    }
}

#[async_trait]
impl AuditSink for AuditClient {
    #[instrument(skip(self, event), fields(event_type = %event.event_type, flat_no = %event.flat_no))]
    async fn log_event(&self, event: AuditEvent) -> CollabResult<AuditRecord> {
        let response = self
            .endpoint
            .http
            .post(self.endpoint.url("log_event"))
            .json(&event)
            .send()
            .await
            .map_err(|e| collaborator_error(SERVICE, e))?;

        let logged: LogEventResponse = read_json(SERVICE, response).await?;
        debug!(log_id = logged.log_id, "Audit event appended");

        Ok(AuditRecord::from_event(logged.log_id, event))
    }
}
