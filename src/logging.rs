//! stderr logging for the binary.
//!
//! The workflow crates log through the `log` facade; the subscriber installed
//! here also captures those records.

use std::str::FromStr;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use vmc_workflow::{WorkflowError, WorkflowResult};

use crate::cli::LogArgs;

/// HTTP stack crates that are too chatty below `warn`.
const QUIET: &[&str] = &["hyper=warn", "hyper_util=warn", "reqwest=warn", "rustls=warn", "h2=warn"];

/// Builds the filter: `RUST_LOG` wins, `level` is the fallback.
pub fn env_filter(level: &str) -> WorkflowResult<EnvFilter> {
    let default = LevelFilter::from_str(level)
        .map_err(|_| WorkflowError::Validation(format!("unknown log level '{level}'")))?;
    let mut filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();
    for directive in QUIET {
        if let Ok(d) = directive.parse() {
            filter = filter.add_directive(d);
        }
    }
    Ok(filter)
}

pub fn init(args: &LogArgs) -> WorkflowResult<()> {
    let filter = env_filter(&args.log_level)?;
    let json = args.log_json || cfg!(feature = "logs-json");

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| WorkflowError::Validation(format!("cannot install logger: {e}")))
}
