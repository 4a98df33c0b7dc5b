//! HTTP client wrapper for the VMC console API.
//!
//! Handles `csp-auth-token` injection and VMC `ErrorResponse` extraction.
//! No retries: every call is attempted exactly once.

use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;

use crate::auth;
use crate::error::{ConsoleError, ConsoleErrorKind, ConsoleResult};
use crate::types::{AccessToken, ConsoleConfig};

const AUTH_HEADER: &str = "csp-auth-token";

/// Console client holding at most one access token.
pub struct ConsoleClient {
    http: Client,
    config: ConsoleConfig,
    token: Option<AccessToken>,
}

impl ConsoleClient {
    pub fn new(config: ConsoleConfig) -> ConsoleResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ConsoleError::new(ConsoleErrorKind::Network, format!("Failed to build HTTP client: {e}"))
            })?;
        Ok(Self { http, config, token: None })
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.as_ref().map(|t| !t.is_expired()).unwrap_or(false)
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Exchange the configured refresh token for an access token.
    pub async fn login(&mut self) -> ConsoleResult<()> {
        let token =
            auth::acquire_token(&self.http, &self.config.csp_url, &self.config.refresh_token).await?;
        self.token = Some(token);
        debug!("VMC console session established");
        Ok(())
    }

    /// Drop the access token. CSP access tokens cannot be revoked by the
    /// holder, so this is local only.
    pub fn logout(&mut self) {
        self.token = None;
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{vmc_url}/vmc/api{path}`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/vmc/api{}", self.config.vmc_url.trim_end_matches('/'), path)
    }

    // ── Core HTTP ────────────────────────────────────────────────────

    fn auth_headers(&self) -> ConsoleResult<HeaderMap> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(ConsoleError::not_authenticated)?;
        if token.is_expired() {
            return Err(ConsoleError::new(ConsoleErrorKind::Auth, "Access token expired"));
        }
        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(token.access_token.expose_secret()).map_err(|e| {
            ConsoleError::new(ConsoleErrorKind::Auth, format!("Header value error: {e}"))
        })?;
        value.set_sensitive(true);
        headers.insert(AUTH_HEADER, value);
        Ok(headers)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ConsoleResult<T> {
        self.get_json_with_query(path, &[]).await
    }

    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ConsoleResult<T> {
        let headers = self.auth_headers()?;
        let url = self.api_url(path);
        debug!("VMC GET {}", url);

        let resp = self.http.get(&url).headers(headers).query(query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ConsoleError::from_status(status.as_u16(), &body));
        }
        resp.json::<T>()
            .await
            .map_err(|e| ConsoleError::new(ConsoleErrorKind::Parse, format!("JSON parse: {e}")))
    }
}
