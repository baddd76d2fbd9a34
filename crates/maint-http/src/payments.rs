//! Payments service client
//!
//! Wire contract:
//! - `GET  /get_payment_status?flat_no=&month_year=` → status row, 404 when absent
//! - `POST /add_flat` → `{status, flat_id, flat_no}` (upsert on `flat_no`)
//! - `GET  /list_flats` → array of flats ordered by `flat_no`

use async_trait::async_trait;
use maint_collab::{
    CollabResult, FlatRecord, FlatUpsert, PaymentLookup, PaymentStatus, PaymentStore, Service,
};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::EndpointConfig;
use crate::error::ClientError;
use crate::transport::{collaborator_error, read_json, Endpoint};

const SERVICE: Service = Service::Payments;

#[derive(Debug, Deserialize)]
struct AddFlatResponse {
    #[serde(default)]
    flat_id: Option<i64>,
    #[serde(default)]
    flat_no: Option<String>,
}

/// HTTP client for the payments service
#[derive(Debug, Clone)]
pub struct PaymentsClient {
    endpoint: Endpoint,
}

impl PaymentsClient {
    pub fn new(config: &EndpointConfig) -> Result<Self, ClientError> {
        Ok(PaymentsClient {
            endpoint: Endpoint::new(&config.base_url, config.timeout())?,
        })
    }
}

#[async_trait]
impl PaymentStore for PaymentsClient {
    #[instrument(skip(self), fields(base_url = %self.endpoint.base_url()))]
    async fn payment_status(&self, flat_no: &str, month_year: &str) -> CollabResult<PaymentLookup> {
        let response = self
            .endpoint
            .http
            .get(self.endpoint.url("get_payment_status"))
            .query(&[("flat_no", flat_no), ("month_year", month_year)])
            .send()
            .await
            .map_err(|e| collaborator_error(SERVICE, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("No payment record");
            return Ok(PaymentLookup::NotFound {
                flat_no: flat_no.to_string(),
                month_year: month_year.to_string(),
            });
        }

        let status: PaymentStatus = read_json(SERVICE, response).await?;
        Ok(PaymentLookup::Found(status))
    }

    #[instrument(skip(self, flat), fields(flat_no = %flat.flat_no))]
    async fn upsert_flat(&self, flat: FlatUpsert) -> CollabResult<FlatRecord> {
        let response = self
            .endpoint
            .http
            .post(self.endpoint.url("add_flat"))
            .json(&flat)
            .send()
            .await
            .map_err(|e| collaborator_error(SERVICE, e))?;

        let saved: AddFlatResponse = read_json(SERVICE, response).await?;
        debug!(flat_id = ?saved.flat_id, "Flat saved");

        // The service only echoes the key; the stored contact fields are
        // exactly what was sent.
        Ok(FlatRecord {
            flat_id: saved.flat_id,
            flat_no: saved.flat_no.unwrap_or(flat.flat_no),
            owner_name: flat.owner_name,
            phone_number: flat.phone_number,
            whatsapp_number: flat.whatsapp_number,
        })
    }

    #[instrument(skip(self))]
    async fn list_flats(&self) -> CollabResult<Vec<FlatRecord>> {
        let response = self
            .endpoint
            .http
            .get(self.endpoint.url("list_flats"))
            .send()
            .await
            .map_err(|e| collaborator_error(SERVICE, e))?;

        read_json(SERVICE, response).await
    }
}
