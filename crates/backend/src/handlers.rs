//! HTTP handlers: the health probe and the calendar-fetch pipeline.

use axum::{extract::State, http::HeaderMap, Json};
use chrono::{DateTime, Months, Utc};
use shared_types::{CalendarEvent, HealthResponse};

use crate::auth;
use crate::calendar;
use crate::error::{ApiError, ApiResult};
use crate::identity::GOOGLE_PROVIDER;
use crate::AppState;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
    })
}

/// `GET /api/events`: the caller's calendar events for the past calendar
/// month.
///
/// Strictly sequential: authenticate, resolve the linked account, exchange
/// it for an access token, list and normalize events. Authentication runs
/// first, so an unauthenticated request makes no upstream call. Any upstream
/// failure surfaces as a single 500; there are no retries and no partial
/// results.
pub async fn list_events(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<CalendarEvent>>> {
    let user_id = auth::authenticated_user(&headers, &state.config)?;
    let expose = state.config.expose_error_details;

    let user = state
        .identity
        .get_user(&user_id)
        .await
        .map_err(|e| ApiError::fetch(e, expose))?;

    // First matching account wins; no dedup if the provider ever sends more.
    user.external_accounts
        .iter()
        .find(|account| account.provider == GOOGLE_PROVIDER)
        .ok_or(ApiError::NotConnected)?;

    let tokens = state
        .identity
        .get_access_token(&user_id, GOOGLE_PROVIDER)
        .await
        .map_err(|e| ApiError::fetch(e, expose))?;

    let access_token = tokens.data.into_iter().next().ok_or(ApiError::NoToken)?;

    let time_max = Utc::now();
    let time_min = one_month_before(time_max);

    let listing = state
        .calendar
        .list_events(&access_token.token, time_min, time_max)
        .await
        .map_err(|e| ApiError::fetch(e, expose))?;

    let events = listing.items.into_iter().map(calendar::normalize).collect();
    Ok(Json(events))
}

/// Lower bound of the fetch window: one calendar month before `now`, with
/// the day-of-month clamped to the target month's length (March 31 maps to
/// the last day of February).
fn one_month_before(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(1)).unwrap_or(now)
}
