//! Shared request plumbing: client construction, URL joining and mapping
//! reqwest outcomes onto `CollaboratorError`.

use std::time::Duration;

use maint_collab::{CollabResult, CollaboratorError, Service};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::USER_AGENT;

/// A validated base URL plus a reqwest client bound to one timeout.
#[derive(Debug, Clone)]
pub(crate) struct Endpoint {
    base_url: String,
    pub(crate) http: reqwest::Client,
}

impl Endpoint {
    pub(crate) fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Endpoint {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Classify a reqwest failure for `service`.
pub(crate) fn collaborator_error(service: Service, err: reqwest::Error) -> CollaboratorError {
    if err.is_timeout() {
        CollaboratorError::Timeout { service }
    } else if err.is_decode() {
        CollaboratorError::Decode {
            service,
            message: err.to_string(),
        }
    } else {
        CollaboratorError::Transport {
            service,
            message: err.to_string(),
        }
    }
}

/// Fail on non-2xx, otherwise decode the JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    service: Service,
    response: Response,
) -> CollabResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CollaboratorError::Status {
            service,
            status: status.as_u16(),
            body,
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| collaborator_error(service, e))
}
