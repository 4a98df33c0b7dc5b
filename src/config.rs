//! Parsed arguments → typed configuration.
//!
//! Every check here fails with `WorkflowError::Validation` (exit code 2)
//! before any remote call is made.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use url::Url;
use vmc_console::ConsoleConfig;
use vmc_workflow::api::VcenterEndpoint;
use vmc_workflow::deploy_vm::{default_vm_name, DeployOptions};
use vmc_workflow::library_import::{ExportTarget, LibraryImportOptions};
use vmc_workflow::subnets::SubnetQuery;
use vmc_workflow::{ExistingPolicy, MatchPolicy, WorkflowConfig, WorkflowError, WorkflowResult};

use crate::cli::{
    CompatibleSubnetsArgs, ConsoleArgs, DeployVmArgs, OvfImportExportArgs, RunArgs,
};

fn invalid(msg: impl Into<String>) -> WorkflowError {
    WorkflowError::Validation(msg.into())
}

fn non_empty(what: &str, value: &str) -> WorkflowResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid(format!("{what} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn secret(what: &str, value: &SecretString) -> WorkflowResult<()> {
    if value.expose_secret().trim().is_empty() {
        return Err(invalid(format!("{what} must not be empty")));
    }
    Ok(())
}

fn base_url(what: &str, value: &str) -> WorkflowResult<String> {
    let url = Url::parse(value).map_err(|e| invalid(format!("{what} '{value}' is not a URL: {e}")))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(invalid(format!("{what} '{value}' must be an http(s) URL")));
    }
    Ok(value.trim_end_matches('/').to_string())
}

// ── Workflow ─────────────────────────────────────────────────────────

pub fn workflow_config(run: &RunArgs, existing: ExistingPolicy) -> WorkflowResult<WorkflowConfig> {
    if run.timeout_secs == 0 {
        return Err(invalid("--timeout-secs must be greater than zero"));
    }
    Ok(WorkflowConfig {
        clear_data: run.cleardata,
        match_policy: if run.first_match {
            MatchPolicy::FirstMatch
        } else {
            MatchPolicy::FailOnAmbiguous
        },
        existing,
        call_timeout: Duration::from_secs(run.timeout_secs),
    })
}

// ── vCenter ──────────────────────────────────────────────────────────

/// Accepts `host`, `host:port` or an `https://host[:port]` URL.
pub fn vcenter_endpoint(args: &OvfImportExportArgs) -> WorkflowResult<VcenterEndpoint> {
    let server = non_empty("--server", &args.server)?;
    let username = non_empty("--username", &args.username)?;
    secret("--password", &args.password)?;

    let with_scheme = if server.contains("://") {
        server.clone()
    } else {
        format!("https://{server}")
    };
    let url = Url::parse(&with_scheme).map_err(|e| invalid(format!("--server '{server}' is invalid: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| invalid(format!("--server '{server}' has no host")))?;

    let mut endpoint = VcenterEndpoint::new(host, username, args.password.clone());
    if let Some(port) = url.port_or_known_default() {
        endpoint.port = port;
    }
    endpoint.insecure = args.skip_verification;
    Ok(endpoint)
}

pub fn import_options(args: &OvfImportExportArgs) -> WorkflowResult<LibraryImportOptions> {
    if let Some(dir) = &args.ovf_dir {
        if !dir.is_dir() {
            return Err(invalid(format!("--ovf-dir {} is not a directory", dir.display())));
        }
    }
    let export = match (&args.export_dir, args.export) {
        (Some(dir), _) => Some(ExportTarget::Directory(dir.clone())),
        (None, true) => Some(ExportTarget::TempDir),
        (None, false) => None,
    };
    Ok(LibraryImportOptions {
        datastore_name: non_empty("--datastorename", &args.datastore_name)?,
        library_name: non_empty("--library-name", &args.library_name)?,
        item_name: non_empty("--item-name", &args.item_name)?,
        ovf_dir: args.ovf_dir.clone(),
        export,
    })
}

pub fn import_existing_policy(args: &OvfImportExportArgs) -> ExistingPolicy {
    if args.reuse_existing {
        ExistingPolicy::Reuse
    } else {
        ExistingPolicy::Fail
    }
}

// ── Console ──────────────────────────────────────────────────────────

pub fn console_config(
    refresh_token: &SecretString,
    console: &ConsoleArgs,
    timeout_secs: u64,
) -> WorkflowResult<ConsoleConfig> {
    secret("--refresh-token", refresh_token)?;
    let mut config = ConsoleConfig::new(refresh_token.clone());
    config.vmc_url = base_url("--console-url", &console.console_url)?;
    config.csp_url = base_url("--csp-url", &console.csp_url)?;
    config.timeout_secs = timeout_secs;
    Ok(config)
}

pub fn deploy_options(args: &DeployVmArgs) -> WorkflowResult<DeployOptions> {
    let vm_name = match &args.vm_name {
        Some(name) => non_empty("--vm-name", name)?,
        None => default_vm_name(),
    };
    Ok(DeployOptions {
        org_id: non_empty("--org-id", &args.org_id)?,
        sddc_id: non_empty("--sddc-id", &args.sddc_id)?,
        libitem_name: non_empty("--libitem-name", &args.libitem_name)?,
        datacenter_name: non_empty("--datacenter-name", &args.datacenter_name)?,
        resourcepool_name: non_empty("--resourcepool-name", &args.resourcepool_name)?,
        folder_name: non_empty("--folder-name", &args.folder_name)?,
        vm_name,
    })
}

pub fn subnet_query(args: &CompatibleSubnetsArgs) -> WorkflowResult<SubnetQuery> {
    Ok(SubnetQuery {
        org_id: non_empty("--org-id", &args.org_id)?,
        linked_account_id: args.linked_account_id.clone(),
        region: args.region.clone(),
    })
}
