//! Calendar provider REST client and response normalization.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared_types::CalendarEvent;

use crate::error::UpstreamError;

const SERVICE: &str = "calendar provider";

/// Title substituted when the upstream item carries no summary.
const UNTITLED_EVENT: &str = "Untitled Event";

/// Cap on events fetched per request.
const MAX_RESULTS: u32 = 50;

/// Client for the calendar provider's events API. Authenticated per call
/// with the user's access token.
#[derive(Clone)]
pub struct CalendarClient {
    http: reqwest::Client,
    base_url: String,
}

/// Raw `events.list` response. Only the fields the normalizer reads are
/// modeled; everything else the provider sends is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct EventsListResponse {
    #[serde(default)]
    pub items: Vec<EventItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventItem {
    pub id: Option<String>,
    pub summary: Option<String>,
    pub start: Option<EventDateTime>,
    pub description: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: Option<String>,
    /// All-day events carry a date only.
    pub date: Option<String>,
}

impl CalendarClient {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    /// List events from the user's primary calendar within the window,
    /// recurring events expanded to single occurrences, ordered by start
    /// time ascending.
    pub async fn list_events(
        &self,
        access_token: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<EventsListResponse, UpstreamError> {
        let url = format!("{}/calendars/primary/events", self.base_url);
        let time_min = time_min.to_rfc3339();
        let time_max = time_max.to_rfc3339();
        let max_results = MAX_RESULTS.to_string();

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("maxResults", max_results.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await
            .map_err(|source| UpstreamError::Transport {
                service: SERVICE,
                source,
            })?;

        if !response.status().is_success() {
            return Err(UpstreamError::from_response(SERVICE, response).await);
        }

        response
            .json()
            .await
            .map_err(|source| UpstreamError::Decode {
                service: SERVICE,
                source,
            })
    }
}

/// Map one upstream item into the fixed response shape.
///
/// Every item produces exactly one event; absent fields are substituted, a
/// dated all-day start falls back to its date, and nothing is dropped.
pub fn normalize(item: EventItem) -> CalendarEvent {
    let date = item
        .start
        .map(|start| start.date_time.or(start.date).unwrap_or_default())
        .unwrap_or_default();

    CalendarEvent {
        id: item.id.unwrap_or_default(),
        name: item
            .summary
            .unwrap_or_else(|| UNTITLED_EVENT.to_string()),
        date,
        description: item.description.unwrap_or_default(),
        location: item.location.unwrap_or_default(),
    }
}
