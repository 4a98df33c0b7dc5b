//! End-of-run removal of created artifacts.

use std::time::Duration;

use crate::api::{ArtifactRemover, ContentLibrary, OvfDeployer};
use crate::artifacts::{ArtifactKind, ArtifactLedger, CreatedArtifact};
use crate::error::{WorkflowError, WorkflowResult};

/// Delete one artifact with the matching call of `api`.
pub async fn remove_artifact<A>(api: &A, artifact: &CreatedArtifact) -> WorkflowResult<()>
where
    A: ContentLibrary + OvfDeployer + ?Sized,
{
    match artifact.kind {
        ArtifactKind::Library => api.delete_library(&artifact.id).await,
        ArtifactKind::LibraryItem => api.delete_item(&artifact.id).await,
        ArtifactKind::VirtualMachine => api.delete_vm(&artifact.id).await,
    }
}

#[derive(Debug, Default)]
pub struct CleanupReport {
    /// False when the clear-data flag was unset.
    pub ran: bool,
    pub removed: Vec<CreatedArtifact>,
    pub failed: Vec<(CreatedArtifact, WorkflowError)>,
}

impl CleanupReport {
    pub fn skipped() -> Self {
        Self::default()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.removed.len() + self.failed.len()
    }
}

/// Deletes every recorded artifact, newest first, when enabled.
///
/// One delete call per artifact. A failed delete is reported and the guard
/// moves on to the next artifact; nothing is retried or rolled back.
pub struct CleanupGuard {
    enabled: bool,
    call_timeout: Option<Duration>,
}

impl CleanupGuard {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, call_timeout: None }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub async fn run(&self, remover: &dyn ArtifactRemover, ledger: &ArtifactLedger) -> CleanupReport {
        if !self.enabled {
            return CleanupReport::skipped();
        }

        let mut report = CleanupReport { ran: true, ..Default::default() };
        for artifact in ledger.iter_rev() {
            match self.remove_one(remover, artifact).await {
                Ok(()) => {
                    log::info!("Deleted {}", artifact);
                    report.removed.push(artifact.clone());
                }
                Err(e) => {
                    log::error!("Failed to delete {}: {}", artifact, e);
                    report.failed.push((artifact.clone(), e));
                }
            }
        }
        report
    }

    async fn remove_one(&self, remover: &dyn ArtifactRemover, artifact: &CreatedArtifact) -> WorkflowResult<()> {
        let Some(limit) = self.call_timeout else {
            return remover.remove(artifact).await;
        };
        tokio::time::timeout(limit, remover.remove(artifact))
            .await
            .unwrap_or_else(|_| {
                Err(WorkflowError::Timeout {
                    operation: format!("delete {}", artifact.kind),
                    resource: artifact.name.clone(),
                })
            })
    }
}
