//! CSP refresh-token authentication.
//!
//! The console API does not accept the long-lived refresh token directly;
//! it is exchanged for a short-lived access token at the CSP gateway.

use chrono::{Duration, Utc};
use log::debug;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{ConsoleError, ConsoleErrorKind, ConsoleResult};
use crate::types::{AccessToken, TokenResponse};

/// Token endpoint on the CSP gateway.
pub fn token_url(csp_url: &str) -> String {
    format!(
        "{}/csp/gateway/am/api/auth/api-tokens/authorize",
        csp_url.trim_end_matches('/')
    )
}

/// Exchange a refresh token for an access token.
pub async fn acquire_token(
    http: &reqwest::Client,
    csp_url: &str,
    refresh_token: &SecretString,
) -> ConsoleResult<AccessToken> {
    if refresh_token.expose_secret().trim().is_empty() {
        return Err(ConsoleError::validation("A refresh token is required"));
    }

    let url = token_url(csp_url);
    debug!("CSP token request → {}", url);

    let form = [("refresh_token", refresh_token.expose_secret().as_str())];
    let resp = http.post(&url).form(&form).send().await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let mut err = ConsoleError::from_status(status.as_u16(), &body);
        // CSP answers a bad refresh token with 400, not 401.
        if status.as_u16() == 400 || status.as_u16() == 401 {
            err.kind = ConsoleErrorKind::Auth;
            err.message = "Refresh token rejected".to_string();
        }
        return Err(err);
    }

    let body: TokenResponse = resp.json().await.map_err(|e| {
        ConsoleError::new(ConsoleErrorKind::Parse, format!("Token response: {e}"))
    })?;
    Ok(token_from_response(body))
}

fn token_from_response(resp: TokenResponse) -> AccessToken {
    let expires_at = resp
        .expires_in
        .map(|secs| Utc::now() + Duration::seconds(secs as i64));

    AccessToken {
        access_token: resp.access_token,
        expires_at,
    }
}
