//! # VMC Samples – VMware Cloud console client
//!
//! Talks to the cloud control plane: exchanges a CSP refresh token for an
//! access token, lists organizations, reads SDDC metadata (including the
//! vCenter URL and cloud admin credentials) and probes account linking.
//!
//! ## Modules
//!
//! - **types** — Config, token and wire structures
//! - **error** — Crate-specific error types
//! - **auth** — Refresh-token → access-token exchange
//! - **client** — HTTP client with `csp-auth-token` injection
//! - **orgs** — Orgs, SDDCs, compatible subnets

pub mod types;
pub mod error;
pub mod auth;
pub mod client;
pub mod orgs;

pub use client::ConsoleClient;
pub use error::{ConsoleError, ConsoleErrorKind, ConsoleResult};
pub use types::ConsoleConfig;
