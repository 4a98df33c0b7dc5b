//! # VMC Samples – vSphere REST client
//!
//! Thin, typed access to the vCenter `/api` surface used by the sample
//! workflows. Everything is session-authenticated and sequential.
//!
//! ## Modules
//!
//! - **types** — Wire structures (inventory summaries, libraries, OVF specs)
//! - **error** — Crate-specific error types
//! - **vsphere** — HTTP client with session-based auth
//! - **inventory** — Datacenters, datastores, VM folders, resource pools
//! - **content** — Local libraries and library items
//! - **transfer** — Update / download sessions for library item files
//! - **ovf** — OVF library-item filter and deploy
//! - **vm** — VM lookup and removal

pub mod types;
pub mod error;
pub mod vsphere;
pub mod inventory;
pub mod content;
pub mod transfer;
pub mod ovf;
pub mod vm;

pub use error::{VmwareError, VmwareErrorKind, VmwareResult};
pub use types::VsphereConfig;
pub use vsphere::VsphereClient;
