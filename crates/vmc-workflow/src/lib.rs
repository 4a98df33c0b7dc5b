//! # VMC Samples – workflows
//!
//! The pattern every sample follows: open a session, resolve names to
//! identifiers, create or reuse what the run needs, perform the action and
//! clean up what the run created when asked to.
//!
//! ## Modules
//!
//! - **api** — Collaborator traits (inventory, content library, OVF, console, sessions)
//! - **error** — `WorkflowError` and exit codes
//! - **resolver** — Name → identifier resolution with an ambiguity policy
//! - **artifacts** — Ledger of resources a run created
//! - **cleanup** — Reverse-order removal of created artifacts
//! - **orchestrator** — State machine, call timeouts, deferred cleanup
//! - **backend** — Trait adapters over the vSphere and console clients
//! - **library_import** — Library-backed OVF import / export
//! - **deploy_vm** — OVF deployment into an SDDC
//! - **subnets** — Account-link compatible subnets

pub mod api;
pub mod error;
pub mod resolver;
pub mod artifacts;
pub mod cleanup;
pub mod orchestrator;
pub mod backend;
pub mod library_import;
pub mod deploy_vm;
pub mod subnets;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ErrorKind, WorkflowError, WorkflowResult};
pub use orchestrator::{ExistingPolicy, WorkflowConfig, WorkflowRun, WorkflowState};
pub use resolver::MatchPolicy;
