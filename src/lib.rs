//! # VMC Samples
//!
//! Command-line front end for the sample workflows in `vmc-workflow`.
//!
//! - **cli** — clap argument definitions
//! - **config** — Arguments → typed configuration, with validation
//! - **logging** — tracing subscriber setup
//! - **commands** — Subcommand execution and output

pub mod cli;
pub mod config;
pub mod logging;
pub mod commands;
