//! Identity provider REST client.
//!
//! The identity provider owns user records, linked external accounts, and
//! the OAuth token exchange. This client only reads them; account linking
//! and token refresh happen entirely on the provider's side.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::UpstreamError;

const SERVICE: &str = "identity provider";

/// Provider kind of the external account this app reads calendars through.
pub const GOOGLE_PROVIDER: &str = "oauth_google";

/// Typed client for the identity provider API.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

/// User record as returned by the identity provider. Only the fields the
/// pipeline reads are modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    #[serde(default)]
    pub external_accounts: Vec<ExternalAccount>,
}

/// A linked third-party account on a user record.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalAccount {
    pub provider: String,
}

/// Token-exchange response: a collection of access tokens for one linked
/// account. Callers use `data[0]`; the provider sends at most one in
/// practice.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    #[serde(default)]
    pub data: Vec<OauthAccessToken>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OauthAccessToken {
    pub token: String,
}

impl IdentityClient {
    pub fn new(http: reqwest::Client, base_url: String, secret_key: String) -> Self {
        Self {
            http,
            base_url,
            secret_key,
        }
    }

    /// Fetch the full user record, including linked external accounts.
    pub async fn get_user(&self, user_id: &str) -> Result<IdentityUser, UpstreamError> {
        let url = format!("{}/users/{}", self.base_url, user_id);
        self.get_json(&url).await
    }

    /// Exchange a linked account for its current OAuth access tokens.
    pub async fn get_access_token(
        &self,
        user_id: &str,
        provider: &str,
    ) -> Result<AccessTokenResponse, UpstreamError> {
        let url = format!(
            "{}/users/{}/oauth_access_tokens/{}",
            self.base_url, user_id, provider
        );
        self.get_json(&url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, UpstreamError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.secret_key)
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
