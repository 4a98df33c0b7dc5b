//! Error types for the vSphere client crate.

use std::fmt;

/// Categorised error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmwareErrorKind {
    /// vCenter unreachable or the HTTP client could not be built
    ConnectionError,
    /// Authentication failed (401) or no active session
    AuthenticationError,
    /// Resource not found (404)
    NotFound,
    /// Permission denied (403)
    AccessDenied,
    /// HTTP / API error with status code
    ApiError(u16),
    /// Timeout
    Timeout,
    /// JSON parse / deserialization error
    ParseError,
    /// File upload / download through a transfer session failed
    TransferError,
    /// Local I/O while reading or writing transferred files
    IoError,
    /// Generic
    Other,
}

/// Crate error type carrying a kind, a human-readable message and the
/// message list returned by the server (if any), kept verbatim.
#[derive(Debug, Clone)]
pub struct VmwareError {
    pub kind: VmwareErrorKind,
    pub message: String,
    pub details: Vec<String>,
}

impl VmwareError {
    pub fn new(kind: VmwareErrorKind, msg: impl Into<String>) -> Self {
        Self { kind, message: msg.into(), details: Vec::new() }
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::ConnectionError, msg)
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::AuthenticationError, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::NotFound, msg)
    }

    pub fn api(status: u16, msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::ApiError(status), msg)
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::ParseError, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::Timeout, msg)
    }

    pub fn transfer(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::TransferError, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::IoError, msg)
    }

    /// Attach the server-provided message list.
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == VmwareErrorKind::NotFound
    }
}

impl fmt::Display for VmwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)?;
        if !self.details.is_empty() {
            write!(f, " ({})", self.details.join("; "))?;
        }
        Ok(())
    }
}

impl std::error::Error for VmwareError {}

impl From<reqwest::Error> for VmwareError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout(format!("HTTP timeout: {e}"))
        } else if e.is_connect() {
            Self::connection(format!("Connection failed: {e}"))
        } else {
            Self::new(VmwareErrorKind::Other, format!("HTTP error: {e}"))
        }
    }
}

impl From<serde_json::Error> for VmwareError {
    fn from(e: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {e}"))
    }
}

impl From<std::io::Error> for VmwareError {
    fn from(e: std::io::Error) -> Self {
        Self::io(format!("I/O error: {e}"))
    }
}

/// Convenience alias.
pub type VmwareResult<T> = Result<T, VmwareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_server_messages() {
        let err = VmwareError::api(400, "Library create failed")
            .with_details(vec!["Name is taken".into(), "Try another".into()]);
        assert_eq!(
            err.to_string(),
            "[ApiError(400)] Library create failed (Name is taken; Try another)"
        );
    }

    #[test]
    fn display_without_details() {
        let err = VmwareError::not_found("Resource not found");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "[NotFound] Resource not found");
    }

    #[test]
    fn io_error_maps_to_io_kind() {
        let err: VmwareError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing.ovf").into();
        assert_eq!(err.kind, VmwareErrorKind::IoError);
    }
}
