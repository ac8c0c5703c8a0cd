//! Unified error handling for the backend API.
//!
//! `ApiError` is the handler-facing taxonomy: four mutually exclusive
//! categories, each mapped to a fixed HTTP status and `error` string.
//! `UpstreamError` is the client-facing one: what went wrong talking to an
//! upstream service, kept typed so the boundary can translate variant to
//! category directly.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared_types::ErrorBody;
use thiserror::Error;

const UNKNOWN_ERROR: &str = "Unknown error";

/// Failure while talking to an upstream service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The request never produced a response.
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("{service} returned HTTP {status}")]
    Status {
        service: &'static str,
        status: u16,
        /// Response body, parsed as JSON when possible.
        body: Option<serde_json::Value>,
    },

    /// The response body did not match the expected shape.
    #[error("{service} returned an unreadable response: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl UpstreamError {
    /// Classify a non-success response, capturing its body for diagnostics.
    pub async fn from_response(service: &'static str, response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(text) if text.is_empty() => None,
            Ok(text) => Some(
                serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)),
            ),
            Err(_) => None,
        };

        UpstreamError::Status {
            service,
            status,
            body,
        }
    }

    /// Human-readable message for the response body: the upstream error's
    /// own message when it sent one, otherwise a fixed fallback.
    pub fn message(&self) -> String {
        match self {
            UpstreamError::Transport { source, .. } | UpstreamError::Decode { source, .. } => {
                source.to_string()
            }
            UpstreamError::Status { body, .. } => body
                .as_ref()
                .and_then(|b| b.pointer("/error/message").or_else(|| b.get("message")))
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
        }
    }

    /// Raw upstream payload, when one was captured.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            UpstreamError::Status { body, .. } => body.clone(),
            _ => None,
        }
    }
}

/// Unified error type for API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request carried no valid session credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller has no linked calendar-provider account.
    #[error("no linked calendar account")]
    NotConnected,

    /// The linked account yielded no access token.
    #[error("no access token for linked account")]
    NoToken,

    /// Any upstream failure while fetching events.
    #[error("{message}")]
    Fetch {
        message: String,
        details: Option<serde_json::Value>,
    },
}

impl ApiError {
    /// Wrap an upstream failure. The raw error is always logged; its
    /// diagnostic payload reaches the caller only when `expose_details` is
    /// set.
    pub fn fetch(err: UpstreamError, expose_details: bool) -> Self {
        tracing::error!(error = ?err, "failed to fetch calendar events");

        let details = if expose_details { err.details() } else { None };
        ApiError::Fetch {
            message: err.message(),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message, details) = match self {
            ApiError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, "Unauthorized", message, None)
            }
            ApiError::NotConnected => (
                StatusCode::FORBIDDEN,
                "Not Connected",
                "No Google account is linked. Connect your Google account to view calendar events."
                    .to_string(),
                None,
            ),
            ApiError::NoToken => (
                StatusCode::FORBIDDEN,
                "No Token",
                "The linked Google account has no usable access token. Reconnect your Google account."
                    .to_string(),
                None,
            ),
            ApiError::Fetch { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch calendar events",
                message,
                details,
            ),
        };

        let body = Json(ErrorBody {
            error: error.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
