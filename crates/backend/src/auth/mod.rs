//! Caller authentication.
//!
//! Session tokens are issued by the identity provider and validated locally
//! against the shared HMAC secret. A caller may present one as an
//! `Authorization: Bearer` header or as the auth cookie.

pub mod jwt;

use axum::http::{header, HeaderMap};

use crate::config::AppConfig;
use crate::error::ApiError;

/// Resolve the caller identity from request credentials.
///
/// Checks the auth cookie first, then the `Authorization` header. This runs
/// before any upstream call; a request without a valid credential never
/// reaches the identity or calendar providers.
pub fn authenticated_user(headers: &HeaderMap, config: &AppConfig) -> Result<String, ApiError> {
    let token = extract_token_from_cookie(headers, &config.cookie_name)
        .or_else(|| extract_token_from_header(headers))
        .ok_or_else(|| {
            ApiError::Unauthorized("You must be logged in to view calendar events.".to_string())
        })?;

    let claims = jwt::validate_token(&config.jwt_secret, &token).map_err(|_| {
        ApiError::Unauthorized("Your session is invalid or expired. Please log in again.".to_string())
    })?;

    Ok(claims.sub)
}

fn extract_token_from_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;

    for cookie_str in cookie_header.split(';') {
        if let Ok(cookie) = cookie::Cookie::parse(cookie_str.trim()) {
            if cookie.name() == cookie_name {
                return Some(cookie.value().to_string());
            }
        }
    }

    None
}

fn extract_token_from_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|s| s.to_string())
}
