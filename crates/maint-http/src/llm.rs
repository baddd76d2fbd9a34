//! Ollama-compatible chat client
//!
//! Sends one system message and one user message to `POST /api/chat` with
//! streaming disabled and returns the assistant's content.

use async_trait::async_trait;
use maint_collab::{GenerationError, TextGenerator};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::EndpointConfig;
use crate::error::ClientError;
use crate::transport::Endpoint;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

/// Text generation over an Ollama-style `/api/chat` endpoint
#[derive(Debug, Clone)]
pub struct OllamaClient {
    endpoint: Endpoint,
    model: String,
}

impl OllamaClient {
    pub fn new(config: &EndpointConfig, model: &str) -> Result<Self, ClientError> {
        Ok(OllamaClient {
            endpoint: Endpoint::new(&config.base_url, config.timeout())?,
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn generation_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout
    } else if err.is_decode() {
        GenerationError::MalformedResponse(err.to_string())
    } else {
        GenerationError::Transport(err.to_string())
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn complete(
        &self,
        system_instruction: &str,
        user_message: &str,
    ) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.model,
            stream: false,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
        };

        let response = self
            .endpoint
            .http
            .post(self.endpoint.url("api/chat"))
            .json(&request)
            .send()
            .await
            .map_err(generation_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await.map_err(generation_error)?;
        debug!(chars = chat.message.content.len(), "Completion received");
        Ok(chat.message.content)
    }
}
