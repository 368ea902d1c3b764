//! OAuth2 client-credentials exchange against the token endpoint.
//!
//! Tokens are not cached: every dispatch authenticates anew. That keeps the
//! pipeline stateless at the cost of one extra round trip per request, which
//! is acceptable for an operator CLI issuing a handful of calls per run.

use serde::Deserialize;
use tracing::debug;

use crate::core::config::Settings;
use crate::core::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchange the configured client credentials for a bearer token.
///
/// Sends the standard form-encoded `client_credentials` grant. A non-2xx
/// response maps to [`Error::Auth`] with the response status pair; transport
/// and parse failures use the same shape with status 500.
pub async fn authenticate(
    http: &reqwest::Client,
    auth_endpoint: &str,
    settings: &Settings,
) -> Result<String> {
    debug!(endpoint = %auth_endpoint, "requesting access token");

    let form = [
        ("client_id", settings.client_id.as_str()),
        ("client_secret", settings.client_secret.expose_secret()),
        ("grant_type", "client_credentials"),
    ];

    let response = http
        .post(auth_endpoint)
        .form(&form)
        .send()
        .await
        .map_err(|err| Error::auth(500, err.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::auth(
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown"),
        ));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|err| Error::auth(500, err.to_string()))?;

    Ok(token.access_token)
}
