//! Calview backend: a single authenticated endpoint returning the caller's
//! calendar events for the past month, plus a health probe.
//!
//! The router and application state live in the library so integration tests
//! can drive the app in-process; `main.rs` is a thin binary around them.

use axum::{routing::get, Router};

pub mod auth;
pub mod calendar;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;

use calendar::CalendarClient;
use config::AppConfig;
use identity::IdentityClient;

/// Shared application state: configuration plus the upstream clients.
///
/// Cheap to clone; nothing in it is mutated after startup, so concurrent
/// requests share it without locking.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub identity: IdentityClient,
    pub calendar: CalendarClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let http = reqwest::Client::new();
        let identity = IdentityClient::new(
            http.clone(),
            config.identity_api_url.clone(),
            config.identity_secret_key.clone(),
        );
        let calendar = CalendarClient::new(http, config.calendar_api_url.clone());

        Self {
            config,
            identity,
            calendar,
        }
    }
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/events", get(handlers::list_events))
        .with_state(state)
}
