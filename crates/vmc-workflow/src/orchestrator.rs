//! Run state machine, per-call timeouts, artifact bookkeeping and the
//! deferred cleanup scope shared by every workflow.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::api::{ArtifactRemover, Inventory, ResourceKind, ResourceReference, Scope};
use crate::artifacts::{ArtifactKind, ArtifactLedger, CreatedArtifact};
use crate::cleanup::{CleanupGuard, CleanupReport};
use crate::error::{WorkflowError, WorkflowResult};
use crate::resolver::{MatchPolicy, ResourceResolver};

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(600);

// ── State ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Initialized,
    SessionEstablished,
    ResourcesResolved,
    ArtifactCreated,
    ActionPerformed,
    CleanedUp,
    Done,
}

impl WorkflowState {
    /// Position in the run. `CleanedUp` and `Done` are both terminal.
    pub fn rank(self) -> u8 {
        match self {
            Self::Initialized => 0,
            Self::SessionEstablished => 1,
            Self::ResourcesResolved => 2,
            Self::ArtifactCreated => 3,
            Self::ActionPerformed => 4,
            Self::CleanedUp | Self::Done => 5,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.rank() == 5
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ── Config ───────────────────────────────────────────────────────────

/// What to do when a resource the run would create already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExistingPolicy {
    #[default]
    Fail,
    Reuse,
}

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Delete created artifacts at the end of the run.
    pub clear_data: bool,
    pub match_policy: MatchPolicy,
    pub existing: ExistingPolicy,
    /// Upper bound for any single remote call.
    pub call_timeout: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            clear_data: false,
            match_policy: MatchPolicy::default(),
            existing: ExistingPolicy::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// Result of a complete run, cleanup included.
#[derive(Debug)]
pub struct WorkflowRun<T> {
    pub outcome: WorkflowResult<T>,
    pub cleanup: CleanupReport,
    pub final_state: WorkflowState,
    /// Created artifacts left on the server because cleanup did not run.
    pub orphans: Vec<CreatedArtifact>,
}

impl<T> WorkflowRun<T> {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn into_result(self) -> WorkflowResult<T> {
        self.outcome
    }
}

// ── Orchestrator ─────────────────────────────────────────────────────

pub struct Orchestrator {
    state: WorkflowState,
    config: WorkflowConfig,
    ledger: ArtifactLedger,
    resolver: ResourceResolver,
}

impl Orchestrator {
    pub fn new(config: WorkflowConfig) -> Self {
        let resolver = ResourceResolver::new(config.match_policy);
        Self {
            state: WorkflowState::Initialized,
            config,
            ledger: ArtifactLedger::new(),
            resolver,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn ledger(&self) -> &ArtifactLedger {
        &self.ledger
    }

    /// Move forward to `to`. Intermediate states may be skipped; staying put
    /// or going back is `InvalidState`.
    pub fn advance(&mut self, to: WorkflowState) -> WorkflowResult<()> {
        if to.rank() <= self.state.rank() {
            return Err(WorkflowError::InvalidState { from: self.state, to });
        }
        log::debug!("Workflow {} -> {}", self.state, to);
        self.state = to;
        Ok(())
    }

    /// Await one remote call, bounded by the configured timeout.
    pub async fn call<T, F>(&self, operation: &str, resource: &str, fut: F) -> WorkflowResult<T>
    where
        F: Future<Output = WorkflowResult<T>>,
    {
        log::debug!("{} '{}'", operation, resource);
        match tokio::time::timeout(self.config.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                log::error!(
                    "{} '{}' did not answer within {:?}",
                    operation,
                    resource,
                    self.config.call_timeout
                );
                Err(WorkflowError::Timeout {
                    operation: operation.to_string(),
                    resource: resource.to_string(),
                })
            }
        }
    }

    /// Resolve a name with the configured match policy and call timeout.
    pub async fn resolve(
        &self,
        inventory: &dyn Inventory,
        kind: ResourceKind,
        name: &str,
        scope: Scope,
    ) -> WorkflowResult<ResourceReference> {
        let op = format!("resolve {kind}");
        self.call(&op, name, self.resolver.resolve(inventory, kind, name, scope))
            .await
    }

    pub async fn find_existing(
        &self,
        inventory: &dyn Inventory,
        kind: ResourceKind,
        name: &str,
        scope: Scope,
    ) -> WorkflowResult<Option<ResourceReference>> {
        let op = format!("look up {kind}");
        self.call(&op, name, self.resolver.find_existing(inventory, kind, name, scope))
            .await
    }

    /// Any resource already named `name`, regardless of the match policy.
    pub async fn find_any(
        &self,
        inventory: &dyn Inventory,
        kind: ResourceKind,
        name: &str,
        scope: Scope,
    ) -> WorkflowResult<Option<ResourceReference>> {
        let op = format!("look up {kind}");
        self.call(&op, name, self.resolver.find_any(inventory, kind, name, scope))
            .await
    }

    /// Record a fresh artifact, then confirm it exists on the server.
    ///
    /// The artifact is recorded before the check so that cleanup still sees
    /// it if the check itself fails.
    pub async fn confirm_created<F>(
        &mut self,
        kind: ArtifactKind,
        name: &str,
        id: &str,
        exists: F,
    ) -> WorkflowResult<()>
    where
        F: Future<Output = WorkflowResult<bool>>,
    {
        if id.trim().is_empty() {
            return Err(WorkflowError::remote(
                format!("create {kind}"),
                name,
                vec!["server returned an empty identifier".into()],
            ));
        }
        self.ledger.record(CreatedArtifact {
            kind,
            name: name.to_string(),
            id: id.to_string(),
        });

        let op = format!("verify {kind}");
        if !self.call(&op, name, exists).await? {
            return Err(WorkflowError::remote(
                format!("create {kind}"),
                name,
                vec![format!("{id} was not found after creation")],
            ));
        }
        log::info!("Created {} '{}' ({})", kind, name, id);
        Ok(())
    }

    /// Deferred cleanup scope. Runs the guard whenever clear-data is set,
    /// whatever `outcome` is. Without the flag, a failed run logs every
    /// artifact it leaves behind.
    pub async fn finish<T>(
        mut self,
        remover: Option<&dyn ArtifactRemover>,
        outcome: WorkflowResult<T>,
    ) -> WorkflowRun<T> {
        if let Err(e) = &outcome {
            log::error!("Workflow failed in state {}: {}", self.state, e);
        }

        let mut orphans = Vec::new();
        let cleanup = match (self.config.clear_data, remover) {
            (true, Some(remover)) => {
                CleanupGuard::new(true)
                    .with_call_timeout(self.config.call_timeout)
                    .run(remover, &self.ledger)
                    .await
            }
            (true, None) => {
                orphans = self.log_orphans("no session to delete it with");
                CleanupReport::skipped()
            }
            (false, _) => {
                if outcome.is_err() {
                    orphans = self.log_orphans("cleanup not requested");
                }
                CleanupReport::skipped()
            }
        };

        let terminal = if cleanup.ran {
            Some(WorkflowState::CleanedUp)
        } else if outcome.is_ok() {
            Some(WorkflowState::Done)
        } else {
            None
        };
        if let Some(to) = terminal {
            if let Err(e) = self.advance(to) {
                log::warn!("{}", e);
            }
        }

        WorkflowRun {
            outcome,
            cleanup,
            final_state: self.state,
            orphans,
        }
    }

    fn log_orphans(&self, reason: &str) -> Vec<CreatedArtifact> {
        self.ledger
            .iter()
            .inspect(|artifact| log::warn!("Orphaned {} left on the server ({})", artifact, reason))
            .cloned()
            .collect()
    }
}
