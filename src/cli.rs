//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use secrecy::SecretString;
use vmc_console::types::{DEFAULT_CSP_URL, DEFAULT_VMC_URL};
use vmc_workflow::deploy_vm::{DEFAULT_DATACENTER, DEFAULT_FOLDER, DEFAULT_RESOURCE_POOL};
use vmc_workflow::library_import::{DEFAULT_DATASTORE, DEFAULT_ITEM_NAME, DEFAULT_LIBRARY_NAME};

pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Parser)]
#[command(name = "vmc-samples", version)]
#[command(about = "vSphere and VMware Cloud sample workflows", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub logging: LogArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Write log lines as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a datastore-backed content library and item, then optionally
    /// upload an OVF package into it and export it back
    OvfImportExport(OvfImportExportArgs),

    /// Deploy a VM from a content library OVF template into an SDDC
    DeployVm(DeployVmArgs),

    /// List subnets of the linked AWS account that an SDDC can use
    CompatibleSubnets(CompatibleSubnetsArgs),
}

/// Options shared by every workflow that talks to a vCenter.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Delete what this run created before exiting
    #[arg(short = 'c', long = "cleardata")]
    pub cleardata: bool,

    /// Take the first match when a name matches several resources
    #[arg(long)]
    pub first_match: bool,

    /// Upper bound for any single remote call, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Args)]
pub struct ConsoleArgs {
    /// VMware Cloud API base URL
    #[arg(long = "console-url", default_value = DEFAULT_VMC_URL)]
    pub console_url: String,

    /// CSP base URL used for the refresh-token exchange
    #[arg(long, default_value = DEFAULT_CSP_URL)]
    pub csp_url: String,
}

#[derive(Debug, Args)]
pub struct OvfImportExportArgs {
    /// vCenter host name or URL
    #[arg(long, env = "VSPHERE_SERVER")]
    pub server: String,

    #[arg(long, env = "VSPHERE_USERNAME")]
    pub username: String,

    #[arg(long, env = "VSPHERE_PASSWORD", hide_env_values = true)]
    pub password: SecretString,

    /// Do not verify the vCenter TLS certificate
    #[arg(long)]
    pub skip_verification: bool,

    /// Datastore backing the new library
    #[arg(long = "datastorename", default_value = DEFAULT_DATASTORE)]
    pub datastore_name: String,

    #[arg(long, default_value = DEFAULT_LIBRARY_NAME)]
    pub library_name: String,

    #[arg(long, default_value = DEFAULT_ITEM_NAME)]
    pub item_name: String,

    /// Directory holding the OVF package (.ovf, .vmdk, .mf, ...) to upload
    #[arg(long)]
    pub ovf_dir: Option<PathBuf>,

    /// Download the item's files after the upload
    #[arg(long)]
    pub export: bool,

    /// Where to download to; implies --export. Defaults to a fresh temporary directory
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Reuse a library (and item) that already has the requested name
    #[arg(long)]
    pub reuse_existing: bool,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Debug, Args)]
pub struct DeployVmArgs {
    /// VMware Cloud refresh token
    #[arg(short = 'r', long, env = "VMC_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: SecretString,

    #[arg(short = 'o', long, env = "VMC_ORG_ID")]
    pub org_id: String,

    #[arg(short = 's', long, env = "VMC_SDDC_ID")]
    pub sddc_id: String,

    /// Name of the library item holding the OVF template
    #[arg(long)]
    pub libitem_name: String,

    #[arg(long, default_value = DEFAULT_DATACENTER)]
    pub datacenter_name: String,

    #[arg(long, default_value = DEFAULT_RESOURCE_POOL)]
    pub resourcepool_name: String,

    #[arg(long, default_value = DEFAULT_FOLDER)]
    pub folder_name: String,

    /// Name of the new VM. Defaults to "Deploy VM Sample - <uuid>"
    #[arg(long)]
    pub vm_name: Option<String>,

    #[command(flatten)]
    pub console: ConsoleArgs,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Debug, Args)]
pub struct CompatibleSubnetsArgs {
    #[arg(short = 'r', long, env = "VMC_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: SecretString,

    #[arg(short = 'o', long, env = "VMC_ORG_ID")]
    pub org_id: String,

    #[arg(long)]
    pub linked_account_id: Option<String>,

    /// AWS region, e.g. US_WEST_2
    #[arg(long)]
    pub region: Option<String>,

    #[command(flatten)]
    pub console: ConsoleArgs,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}
