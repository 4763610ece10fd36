//! External API integrations

pub mod advisory;
pub mod expert_chat;
pub mod geocoding;

pub use advisory::{AdvisoryClient, AdvisoryServices};
pub use expert_chat::ExpertChatClient;
pub use geocoding::GeocodingClient;

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Failure of a single upstream call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("failed ({status}){}", detail_suffix(.detail))]
    Status { status: u16, detail: Option<String> },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("returned an unreadable response: {0}")]
    Decode(String),

    #[error("returned empty stages")]
    EmptyStages,
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) if !d.is_empty() => format!(" - {}", d),
        _ => String::new(),
    }
}

/// Pull the `error` string out of a JSON error body, if there is one
fn upstream_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}

/// POST a JSON body and decode a JSON reply
pub(crate) async fn post_json<B, T>(client: &Client, url: &str, body: &B) -> Result<T, ServiceError>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| ServiceError::Transport(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(ServiceError::Status {
            status,
            detail: upstream_detail(&body),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ServiceError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_with_detail() {
        let err = ServiceError::Status {
            status: 500,
            detail: Some("model not loaded".to_string()),
        };
        assert_eq!(err.to_string(), "failed (500) - model not loaded");

        let bare = ServiceError::Status {
            status: 503,
            detail: None,
        };
        assert_eq!(bare.to_string(), "failed (503)");
    }

    #[test]
    fn test_upstream_detail_only_reads_error_strings() {
        assert_eq!(
            upstream_detail(r#"{"error": "City and date are required"}"#),
            Some("City and date are required".to_string())
        );
        assert_eq!(upstream_detail(r#"{"message": "nope"}"#), None);
        assert_eq!(upstream_detail("<html>Bad Gateway</html>"), None);
    }
}
