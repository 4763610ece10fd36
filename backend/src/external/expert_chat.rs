//! Expert chat client
//!
//! Forwards a farmer's question, an optional report context block and the
//! recent conversation to the expert chat service's `/get` endpoint.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::ServiceError;
use crate::config::ServicesConfig;

/// Who wrote a chat turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of conversation history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// Body sent upstream
#[derive(Debug, Serialize)]
pub struct ExpertChatRequest<'a> {
    pub msg: &'a str,
    pub context: &'a str,
    pub history: &'a [ChatTurn],
}

/// Expert chat client
#[derive(Clone)]
pub struct ExpertChatClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl ExpertChatClient {
    pub fn new(config: &ServicesConfig) -> Self {
        Self::with_base_url(&config.expert_chat_url, config.timeout())
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/get", base_url.trim_end_matches('/')),
            timeout,
        }
    }

    /// Ask the expert service and return its trimmed answer
    pub async fn ask(&self, request: &ExpertChatRequest<'_>) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::Timeout {
                        after_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    ServiceError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status,
                detail: Some(if text.is_empty() {
                    "No details".to_string()
                } else {
                    text
                }),
            });
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))?;

        Ok(extract_answer(&data))
    }
}

/// The service has answered under `answer`, `response` or `text` over time
fn extract_answer(data: &Value) -> String {
    ["answer", "response", "text"]
        .iter()
        .find_map(|key| data.get(*key).and_then(Value::as_str))
        .unwrap_or("")
        .trim()
        .to_string()
}
