use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event in the shape the API returns, independent of the
/// upstream provider's native schema.
///
/// Every field is always present; missing upstream fields are substituted
/// with fixed fallbacks when the backend normalizes the provider response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub name: String,
    /// ISO-8601 start of the event. Empty string when the upstream item
    /// carried no start information at all.
    pub date: String,
    pub description: String,
    pub location: String,
}

/// Error body returned by every failing API endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short error category, e.g. "Unauthorized" or "No Token".
    pub error: String,
    /// Human-readable explanation of what went wrong.
    pub message: String,
    /// Raw upstream diagnostic payload. Only populated when the server runs
    /// in a non-production mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Response body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}
