//! WhatsApp reminder service client

use async_trait::async_trait;
use chrono::Utc;
use maint_collab::{
    CollabResult, DeliveryStatus, MessagingSender, ReminderRequest, ReminderResult, Service,
};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::config::EndpointConfig;
use crate::error::ClientError;
use crate::transport::{collaborator_error, read_json, Endpoint};

const SERVICE: Service = Service::Messaging;

#[derive(Debug, Deserialize)]
struct SendReminderResponse {
    status: DeliveryStatus,
    message_id: String,
}

/// HTTP client for the WhatsApp reminder service
#[derive(Debug, Clone)]
pub struct WhatsAppClient {
    endpoint: Endpoint,
}

impl WhatsAppClient {
    pub fn new(config: &EndpointConfig) -> Result<Self, ClientError> {
        Ok(WhatsAppClient {
            endpoint: Endpoint::new(&config.base_url, config.timeout())?,
        })
    }
}

#[async_trait]
impl MessagingSender for WhatsAppClient {
    #[instrument(skip(self, request), fields(flat_no = %request.flat_no, month_year = %request.month_year))]
    async fn send_reminder(&self, request: ReminderRequest) -> CollabResult<ReminderResult> {
        let response = self
            .endpoint
            .http
            .post(self.endpoint.url("send_reminder"))
            .json(&request)
            .send()
            .await
            .map_err(|e| collaborator_error(SERVICE, e))?;

        let ack: SendReminderResponse = read_json(SERVICE, response).await?;
        info!(message_id = %ack.message_id, status = ?ack.status, "Reminder dispatched");

        Ok(ReminderResult {
            status: ack.status,
            message_id: ack.message_id,
            flat_no: request.flat_no,
            month_year: request.month_year,
            sent_at: Utc::now(),
        })
    }
}
