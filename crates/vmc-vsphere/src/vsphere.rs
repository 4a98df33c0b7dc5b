//! vSphere REST API HTTP client with session-based authentication.
//!
//! Communicates with vCenter via `https://{host}:{port}/api/...`.
//! Manages the session lifecycle (create / delete) and provides
//! typed JSON helpers plus raw byte transfer for library item files.

use crate::error::{VmwareError, VmwareErrorKind, VmwareResult};
use crate::types::{ApiErrorBody, VsphereConfig};

use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const SESSION_HEADER: &str = "vmware-api-session-id";
const CLIENT_TOKEN_HEADER: &str = "vmware-api-client-token";

/// vSphere REST API client.
pub struct VsphereClient {
    client: Client,
    base_url: String,
    session_id: Option<SecretString>,
    config: VsphereConfig,
}

impl VsphereClient {
    /// Build a new client from config (does NOT create a session yet).
    pub fn new(config: &VsphereConfig) -> VmwareResult<Self> {
        let base_url = format!("https://{}:{}", config.host, config.port);
        Self::with_base_url(config, base_url)
    }

    /// Build a client against an explicit base URL (e.g. a plain-HTTP lab proxy).
    pub fn with_base_url(config: &VsphereConfig, base_url: impl Into<String>) -> VmwareResult<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VmwareError::connection(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_id: None,
            config: config.clone(),
        })
    }

    /// Base URL for API calls.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether we have an active session.
    pub fn is_connected(&self) -> bool {
        self.session_id.is_some()
    }

    /// Current config.
    pub fn config(&self) -> &VsphereConfig {
        &self.config
    }

    // ── Session management ──────────────────────────────────────────

    /// Create a new API session (POST /api/session).
    pub async fn login(&mut self) -> VmwareResult<()> {
        let url = format!("{}/api/session", self.base_url);
        log::debug!("vSphere login → {} as {}", self.base_url, self.config.username);

        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.config.username, Some(self.config.password.expose_secret()))
            .send()
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(VmwareError::auth(format!(
                "Invalid credentials for {}",
                self.config.username
            )));
        }

        let resp = Self::check_status(resp).await?;

        // Session ID comes back as a quoted JSON string
        let session_id: String = resp.json().await.map_err(|e| {
            VmwareError::parse(format!("Failed to parse session response: {e}"))
        })?;
        if session_id.is_empty() {
            return Err(VmwareError::auth("Server returned an empty session id"));
        }

        self.session_id = Some(SecretString::new(session_id));
        Ok(())
    }

    /// Delete the current session (DELETE /api/session).
    pub async fn logout(&mut self) -> VmwareResult<()> {
        let Some(sid) = self.session_id.take() else {
            return Ok(());
        };
        let url = format!("{}/api/session", self.base_url);
        let resp = self
            .client
            .delete(&url)
            .header(SESSION_HEADER, sid.expose_secret().as_str())
            .send()
            .await?;
        Self::check_status(resp).await?;
        log::debug!("vSphere session on {} closed", self.base_url);
        Ok(())
    }

    // ── HTTP helpers ────────────────────────────────────────────────

    fn authed(&self, req: RequestBuilder) -> VmwareResult<RequestBuilder> {
        let sid = self
            .session_id
            .as_ref()
            .ok_or_else(|| VmwareError::auth("Not logged in: no active session"))?;
        Ok(req.header(SESSION_HEADER, sid.expose_secret().as_str()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> VmwareResult<T> {
        let resp = self.authed(self.client.get(self.url(path)))?.send().await?;
        let resp = Self::check_status(resp).await?;
        Self::parse_response(resp).await
    }

    /// GET a JSON response with repeated query params.
    pub async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> VmwareResult<T> {
        let borrowed: Vec<(&str, &str)> =
            params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let resp = self
            .authed(self.client.get(self.url(path)).query(&borrowed))?
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        Self::parse_response(resp).await
    }

    /// POST with JSON body, return parsed response.
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> VmwareResult<T> {
        let resp = self
            .authed(self.client.post(self.url(path)).json(body))?
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        Self::parse_response(resp).await
    }

    /// POST with JSON body and an idempotency client token.
    pub async fn post_with_token<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        client_token: &str,
    ) -> VmwareResult<T> {
        let resp = self
            .authed(
                self.client
                    .post(self.url(path))
                    .header(CLIENT_TOKEN_HEADER, client_token)
                    .json(body),
            )?
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        Self::parse_response(resp).await
    }

    /// POST with no body, discarding the response.
    pub async fn post_empty(&self, path: &str) -> VmwareResult<()> {
        let resp = self.authed(self.client.post(self.url(path)))?.send().await?;
        Self::check_status(resp).await?;
        Ok(())
    }

    /// POST with JSON body, discarding the response.
    pub async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> VmwareResult<()> {
        let resp = self
            .authed(self.client.post(self.url(path)).json(body))?
            .send()
            .await?;
        Self::check_status(resp).await?;
        Ok(())
    }

    /// DELETE, ignoring response body.
    pub async fn delete(&self, path: &str) -> VmwareResult<()> {
        let resp = self.authed(self.client.delete(self.url(path)))?.send().await?;
        Self::check_status(resp).await?;
        Ok(())
    }

    /// PUT raw bytes to an absolute transfer URI (upload endpoint).
    pub async fn put_bytes(&self, uri: &str, body: Bytes) -> VmwareResult<()> {
        let resp = self
            .authed(
                self.client
                    .put(uri)
                    .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                    .body(body),
            )?
            .send()
            .await?;
        Self::check_status(resp).await?;
        Ok(())
    }

    /// GET raw bytes from an absolute transfer URI (download endpoint).
    pub async fn get_bytes(&self, uri: &str) -> VmwareResult<Bytes> {
        let resp = self.authed(self.client.get(uri))?.send().await?;
        let resp = Self::check_status(resp).await?;
        resp.bytes()
            .await
            .map_err(|e| VmwareError::transfer(format!("Failed to read download body: {e}")))
    }

    // ── Internal helpers ────────────────────────────────────────────

    async fn check_status(resp: Response) -> VmwareResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let code = status.as_u16();
        let body = resp.text().await.unwrap_or_default();
        let details = error_details(&body);

        let err = match status {
            StatusCode::UNAUTHORIZED => VmwareError::auth("Session expired or invalid"),
            StatusCode::FORBIDDEN => {
                VmwareError::new(VmwareErrorKind::AccessDenied, "Access denied")
            }
            StatusCode::NOT_FOUND => VmwareError::not_found("Resource not found"),
            _ => VmwareError::api(code, format!("API error {code}")),
        };
        Err(err.with_details(details))
    }

    async fn parse_response<T: DeserializeOwned>(resp: Response) -> VmwareResult<T> {
        let text = resp.text().await.map_err(|e| {
            VmwareError::parse(format!("Failed to read response body: {e}"))
        })?;

        if text.is_empty() {
            // Some vSphere endpoints return empty body for success
            return serde_json::from_str("null").map_err(|e| {
                VmwareError::parse(format!("Cannot deserialise empty response: {e}"))
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            VmwareError::parse(format!("JSON parse error: {e}; body: {}", truncate(&text, 500)))
        })
    }
}

/// Extract the server message list from an error body; falls back to the
/// raw body when it is not a vAPI error document.
fn error_details(body: &str) -> Vec<String> {
    if body.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) if !parsed.messages.is_empty() => parsed.message_list(),
        _ => vec![truncate(body, 500).to_string()],
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
