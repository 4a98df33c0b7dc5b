//! Error types for the VMware Cloud console client.

use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleErrorKind {
    /// Refresh token rejected, access token missing or expired
    Auth,
    BadRequest,
    Forbidden,
    NotFound,
    ServerError,
    Network,
    Timeout,
    Parse,
    Validation,
}

impl fmt::Display for ConsoleErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Auth => "Auth",
            Self::BadRequest => "BadRequest",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "NotFound",
            Self::ServerError => "ServerError",
            Self::Network => "Network",
            Self::Timeout => "Timeout",
            Self::Parse => "Parse",
            Self::Validation => "Validation",
        };
        f.write_str(s)
    }
}

/// Console error with the server's `error_messages` kept verbatim.
#[derive(Debug, Clone)]
pub struct ConsoleError {
    pub kind: ConsoleErrorKind,
    pub message: String,
    pub status_code: Option<u16>,
    pub error_messages: Vec<String>,
}

/// VMC `ErrorResponse` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_messages: Vec<String>,
    #[serde(default)]
    pub status: Option<u16>,
}

impl ConsoleError {
    pub fn new(kind: ConsoleErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            error_messages: Vec::new(),
        }
    }

    pub fn not_authenticated() -> Self {
        Self::new(ConsoleErrorKind::Auth, "No access token; call login first")
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ConsoleErrorKind::Validation, message)
    }

    /// Build from an HTTP status and the raw response body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            400 => ConsoleErrorKind::BadRequest,
            401 => ConsoleErrorKind::Auth,
            403 => ConsoleErrorKind::Forbidden,
            404 => ConsoleErrorKind::NotFound,
            500..=599 => ConsoleErrorKind::ServerError,
            _ => ConsoleErrorKind::Network,
        };
        let parsed: ErrorResponse = serde_json::from_str(body).unwrap_or_default();
        let error_messages = if parsed.error_messages.is_empty() && !body.trim().is_empty() {
            vec![body.trim().to_string()]
        } else {
            parsed.error_messages
        };
        Self {
            kind,
            message: format!("HTTP {status}"),
            status_code: Some(status),
            error_messages,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ConsoleErrorKind::NotFound
    }
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if !self.error_messages.is_empty() {
            write!(f, ": {}", self.error_messages.join("; "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ConsoleError {}

impl From<reqwest::Error> for ConsoleError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::new(ConsoleErrorKind::Timeout, format!("HTTP timeout: {e}"))
        } else {
            Self::new(ConsoleErrorKind::Network, format!("{e}"))
        }
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;
