//! Subcommand execution and user-facing output.
//!
//! Results go to stdout. Logs, cleanup failures and OVF errors go to stderr.

use vmc_workflow::backend::{ConsoleSession, VsphereConnector};
use vmc_workflow::cleanup::CleanupReport;
use vmc_workflow::deploy_vm::{deploy_vm, DeployReport};
use vmc_workflow::library_import::{import_library, LibraryImportReport};
use vmc_workflow::subnets::{compatible_subnets, CompatibleSubnet};
use vmc_workflow::{ExistingPolicy, WorkflowError, WorkflowResult};

use crate::cli::{Command, CompatibleSubnetsArgs, DeployVmArgs, OvfImportExportArgs};
use crate::config;

pub async fn run(command: Command) -> WorkflowResult<()> {
    match command {
        Command::OvfImportExport(args) => ovf_import_export(&args).await,
        Command::DeployVm(args) => deploy(&args).await,
        Command::CompatibleSubnets(args) => subnets(&args).await,
    }
}

// ── ovf-import-export ────────────────────────────────────────────────

async fn ovf_import_export(args: &OvfImportExportArgs) -> WorkflowResult<()> {
    let endpoint = config::vcenter_endpoint(args)?;
    let options = config::import_options(args)?;
    let workflow = config::workflow_config(&args.run, config::import_existing_policy(args))?;
    let connector = VsphereConnector::new(args.run.timeout_secs);

    tracing::info!(server = %endpoint.host, library = %options.library_name, "starting OVF import/export");
    let run = import_library(&connector, &endpoint, &options, workflow).await;
    report_cleanup(&run.cleanup);
    let report = run.outcome?;

    for line in import_summary(&report).into_iter().chain(cleanup_summary(&run.cleanup)) {
        println!("{line}");
    }
    Ok(())
}

pub fn import_summary(report: &LibraryImportReport) -> Vec<String> {
    let reuse = |reused: bool| if reused { "reused" } else { "created" };
    let mut lines = vec![
        format!("Datastore '{}' resolved to {}", report.datastore.name, report.datastore.id),
        format!("Library {}: {}", reuse(report.library_reused), report.library_id),
        format!("Library item {}: {}", reuse(report.item_reused), report.item_id),
    ];
    if !report.uploaded.is_empty() {
        lines.push(format!("Uploaded {} file(s): {}", report.uploaded.len(), report.uploaded.join(", ")));
    }
    if let Some(dir) = &report.export_dir {
        lines.push(format!("Exported {} file(s) to {}", report.downloaded.len(), dir.display()));
    }
    lines
}

// ── deploy-vm ────────────────────────────────────────────────────────

async fn deploy(args: &DeployVmArgs) -> WorkflowResult<()> {
    let console_config = config::console_config(&args.refresh_token, &args.console, args.run.timeout_secs)?;
    let options = config::deploy_options(args)?;
    let workflow = config::workflow_config(&args.run, ExistingPolicy::Fail)?;
    let connector = VsphereConnector::new(args.run.timeout_secs);

    let mut console = ConsoleSession::open(console_config).await?;
    tracing::info!(org = %options.org_id, sddc = %options.sddc_id, vm = %options.vm_name, "starting VM deployment");
    let run = deploy_vm(&console, &connector, &options, workflow).await;
    console.close();

    report_cleanup(&run.cleanup);
    if let Err(e) = &run.outcome {
        for line in deploy_failure(e) {
            eprintln!("{line}");
        }
    }
    let report = run.outcome?;

    for line in deploy_summary(&report).into_iter().chain(cleanup_summary(&run.cleanup)) {
        println!("{line}");
    }
    Ok(())
}

pub fn deploy_summary(report: &DeployReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Deployment successful. Result resource: {}, ID: {}, Name: '{}'",
        report.resource_type, report.vm_id, report.vm_name
    )];
    lines.extend(report.warnings.iter().map(|w| format!("OVF warning: {w}")));
    lines
}

pub fn deploy_failure(err: &WorkflowError) -> Vec<String> {
    match err {
        WorkflowError::RemoteCallFailure { operation, messages, .. } if operation == "deploy OVF template" => {
            messages.iter().map(|m| format!("OVF error: {m}")).collect()
        }
        _ => Vec::new(),
    }
}

// ── compatible-subnets ───────────────────────────────────────────────

async fn subnets(args: &CompatibleSubnetsArgs) -> WorkflowResult<()> {
    let console_config = config::console_config(&args.refresh_token, &args.console, args.timeout_secs)?;
    let query = config::subnet_query(args)?;
    let workflow = vmc_workflow::WorkflowConfig {
        call_timeout: std::time::Duration::from_secs(args.timeout_secs),
        ..Default::default()
    };

    let mut console = ConsoleSession::open(console_config).await?;
    let rows = compatible_subnets(&console, &query, workflow).await;
    console.close();

    for line in subnet_table(&rows?) {
        println!("{line}");
    }
    Ok(())
}

pub fn subnet_table(rows: &[CompatibleSubnet]) -> Vec<String> {
    if rows.is_empty() {
        return vec!["No subnets reported.".to_string()];
    }
    let dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    let mut lines = vec![format!(
        "{:<24} {:<26} {:<12} {:<18} {}",
        "VPC", "SUBNET", "AZ", "CIDR", "COMPATIBLE"
    )];
    for r in rows {
        lines.push(format!(
            "{:<24} {:<26} {:<12} {:<18} {}",
            r.vpc_id,
            r.subnet_id,
            dash(&r.availability_zone),
            dash(&r.cidr),
            if r.compatible { "yes" } else { "no" }
        ));
    }
    lines
}

// ── shared ───────────────────────────────────────────────────────────

/// One stdout line per artifact the cleanup guard deleted.
pub fn cleanup_summary(report: &CleanupReport) -> Vec<String> {
    report.removed.iter().map(|a| format!("Deleted {a}")).collect()
}

fn report_cleanup(report: &CleanupReport) {
    if !report.ran {
        return;
    }
    tracing::info!(removed = report.removed.len(), failed = report.failed.len(), "cleanup finished");
    for (artifact, err) in &report.failed {
        eprintln!("Cleanup failed for {artifact}: {err}");
    }
}
