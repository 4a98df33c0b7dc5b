//! Workflow error taxonomy and its mapping to process exit codes.

use std::fmt;

use thiserror::Error;
use vmc_console::{ConsoleError, ConsoleErrorKind};
use vmc_vsphere::{VmwareError, VmwareErrorKind};

use crate::api::ResourceKind;
use crate::orchestrator::WorkflowState;

/// Every way a workflow step can fail. Each variant names the operation or
/// resource involved so the message is usable on its own.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("authentication against {target} failed: {message}")]
    Authentication { target: String, message: String },

    #[error("{kind} '{name}' not found")]
    ResourceNotFound { kind: ResourceKind, name: String },

    #[error("{kind} '{name}' is ambiguous: {} matches ({})", .ids.len(), .ids.join(", "))]
    AmbiguousResource {
        kind: ResourceKind,
        name: String,
        ids: Vec<String>,
    },

    #[error("{kind} '{name}' already exists (id {id})")]
    AlreadyExists {
        kind: ResourceKind,
        name: String,
        id: String,
    },

    #[error("{operation} failed for '{resource}'{}", render_messages(.messages))]
    RemoteCallFailure {
        operation: String,
        resource: String,
        messages: Vec<String>,
    },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("{operation} for '{resource}' timed out")]
    Timeout { operation: String, resource: String },

    #[error("workflow cannot move from {from} to {to}")]
    InvalidState {
        from: WorkflowState,
        to: WorkflowState,
    },
}

fn render_messages(messages: &[String]) -> String {
    if messages.is_empty() {
        String::new()
    } else {
        format!(": {}", messages.join("; "))
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Coarse classification, one per process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Authentication,
    ResourceNotFound,
    AmbiguousResource,
    AlreadyExists,
    RemoteCallFailure,
    Validation,
    Timeout,
    InvalidState,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            Self::RemoteCallFailure => 1,
            Self::Validation => 2,
            Self::Authentication => 3,
            Self::ResourceNotFound => 4,
            Self::AmbiguousResource => 5,
            Self::AlreadyExists => 6,
            Self::Timeout => 7,
            Self::InvalidState => 70,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::ResourceNotFound { .. } => ErrorKind::ResourceNotFound,
            Self::AmbiguousResource { .. } => ErrorKind::AmbiguousResource,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::RemoteCallFailure { .. } => ErrorKind::RemoteCallFailure,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
        }
    }

    pub fn not_found(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self::ResourceNotFound { kind, name: name.into() }
    }

    pub fn remote(
        operation: impl Into<String>,
        resource: impl Into<String>,
        messages: Vec<String>,
    ) -> Self {
        Self::RemoteCallFailure {
            operation: operation.into(),
            resource: resource.into(),
            messages,
        }
    }

    /// Server-provided messages, if this is a remote failure.
    pub fn messages(&self) -> &[String] {
        match self {
            Self::RemoteCallFailure { messages, .. } => messages,
            _ => &[],
        }
    }

    /// Classify a vSphere client error raised while doing `operation` on `resource`.
    pub fn from_vmware(operation: &str, resource: &str, err: VmwareError) -> Self {
        match err.kind {
            VmwareErrorKind::AuthenticationError => Self::Authentication {
                target: resource.to_string(),
                message: err.to_string(),
            },
            VmwareErrorKind::Timeout => Self::Timeout {
                operation: operation.to_string(),
                resource: resource.to_string(),
            },
            _ => Self::remote(operation, resource, message_list(err.message, err.details)),
        }
    }

    /// Classify a console client error raised while doing `operation` on `resource`.
    pub fn from_console(operation: &str, resource: &str, err: ConsoleError) -> Self {
        match err.kind {
            ConsoleErrorKind::Auth => Self::Authentication {
                target: resource.to_string(),
                message: err.to_string(),
            },
            ConsoleErrorKind::Timeout => Self::Timeout {
                operation: operation.to_string(),
                resource: resource.to_string(),
            },
            ConsoleErrorKind::Validation => Self::Validation(err.message),
            _ => Self::remote(operation, resource, message_list(err.message, err.error_messages)),
        }
    }
}

fn message_list(message: String, details: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(details.len() + 1);
    out.push(message);
    out.extend(details);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_kind_and_name() {
        let e = WorkflowError::not_found(ResourceKind::Datastore, "WorkloadDatastore");
        assert_eq!(e.to_string(), "Datastore 'WorkloadDatastore' not found");
        assert_eq!(e.kind().exit_code(), 4);
    }

    #[test]
    fn remote_failure_lists_messages_verbatim() {
        let e = WorkflowError::remote(
            "deploy OVF template",
            "simpleVmTemplate",
            vec!["Insufficient disk space".into(), "Host in maintenance".into()],
        );
        assert_eq!(
            e.to_string(),
            "deploy OVF template failed for 'simpleVmTemplate': Insufficient disk space; Host in maintenance"
        );
        assert_eq!(e.messages().len(), 2);
    }

    #[test]
    fn ambiguous_lists_candidates() {
        let e = WorkflowError::AmbiguousResource {
            kind: ResourceKind::Folder,
            name: "Workloads".into(),
            ids: vec!["group-v1".into(), "group-v2".into()],
        };
        assert_eq!(e.to_string(), "Folder 'Workloads' is ambiguous: 2 matches (group-v1, group-v2)");
    }

    #[test]
    fn vmware_errors_are_classified() {
        let auth = WorkflowError::from_vmware("login", "vc", VmwareError::auth("bad password"));
        assert_eq!(auth.kind(), ErrorKind::Authentication);

        let slow = WorkflowError::from_vmware("list datastores", "ds", VmwareError::timeout("slow"));
        assert_eq!(slow.kind(), ErrorKind::Timeout);

        let api = WorkflowError::from_vmware(
            "create library",
            "demo-lib",
            VmwareError::api(400, "API error 400").with_details(vec!["Name in use".into()]),
        );
        assert_eq!(api.messages(), ["API error 400".to_string(), "Name in use".to_string()]);
    }

    #[test]
    fn console_validation_stays_validation() {
        let e = WorkflowError::from_console(
            "get SDDC",
            "sddc-1",
            ConsoleError::validation("org id must not be empty"),
        );
        assert_eq!(e.kind(), ErrorKind::Validation);
    }

    #[test]
    fn exit_codes_are_distinct() {
        use std::collections::HashSet;
        let kinds = [
            ErrorKind::Authentication,
            ErrorKind::ResourceNotFound,
            ErrorKind::AmbiguousResource,
            ErrorKind::AlreadyExists,
            ErrorKind::RemoteCallFailure,
            ErrorKind::Validation,
            ErrorKind::Timeout,
            ErrorKind::InvalidState,
        ];
        let codes: HashSet<u8> = kinds.iter().map(|k| k.exit_code()).collect();
        assert_eq!(codes.len(), kinds.len());
        assert!(!codes.contains(&0));
    }
}
