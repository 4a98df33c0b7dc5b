//! Shared types for the vSphere REST client.
//!
//! Field names follow the `/api` wire format (snake_case), so most structs
//! need no serde renames.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Connection / Config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Configuration for connecting to a vCenter endpoint.
///
/// The password is a [`SecretString`]; its `Debug` output is redacted.
#[derive(Debug, Clone)]
pub struct VsphereConfig {
    /// vCenter hostname / IP (e.g. "vcenter.sddc-1-2-3-4.vmwarevmc.com")
    pub host: String,
    /// Port (default 443)
    pub port: u16,
    /// Username (e.g. "cloudadmin@vmc.local")
    pub username: String,
    pub password: SecretString,
    /// Skip TLS certificate verification (self-signed labs)
    pub insecure: bool,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

pub const DEFAULT_PORT: u16 = 443;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl VsphereConfig {
    pub fn new(host: impl Into<String>, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: username.into(),
            password,
            insecure: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Error body
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Localizable message as returned by vAPI endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalizableMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub default_message: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Standard `/api` error body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub messages: Vec<LocalizableMessage>,
}

impl ApiErrorBody {
    pub fn message_list(&self) -> Vec<String> {
        self.messages
            .iter()
            .map(|m| m.default_message.clone())
            .filter(|m| !m.is_empty())
            .collect()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Inventory
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatacenterSummary {
    pub datacenter: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatastoreSummary {
    pub datastore: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub ds_type: Option<String>,
    #[serde(default)]
    pub free_space: Option<u64>,
    #[serde(default)]
    pub capacity: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderSummary {
    pub folder: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub folder_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcePoolSummary {
    pub resource_pool: String,
    pub name: String,
}

/// Name / datacenter filter shared by the inventory list endpoints.
#[derive(Debug, Clone, Default)]
pub struct InventoryQuery {
    pub names: Vec<String>,
    pub datacenters: Vec<String>,
}

impl InventoryQuery {
    pub fn named(name: impl Into<String>) -> Self {
        Self { names: vec![name.into()], datacenters: Vec::new() }
    }

    pub fn in_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.datacenters.push(datacenter.into());
        self
    }

    /// Repeated query parameters, as the list endpoints expect them.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        for n in &self.names {
            params.push(("names".to_string(), n.clone()));
        }
        for d in &self.datacenters {
            params.push(("datacenters".to_string(), d.clone()));
        }
        params
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Content Library
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageBackingType {
    Datastore,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageBacking {
    #[serde(rename = "type")]
    pub backing_type: StorageBackingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datastore_id: Option<String>,
}

impl StorageBacking {
    pub fn datastore(datastore_id: impl Into<String>) -> Self {
        Self {
            backing_type: StorageBackingType::Datastore,
            datastore_id: Some(datastore_id.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LibraryType {
    Local,
    Subscribed,
}

/// Create spec for `POST /api/content/local-library`.
#[derive(Debug, Clone, Serialize)]
pub struct LibraryCreateSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub library_type: LibraryType,
    pub storage_backings: Vec<StorageBacking>,
}

/// Library model returned by `GET /api/content/local-library/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentLibrary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub library_type: Option<LibraryType>,
    #[serde(default)]
    pub creation_time: Option<String>,
    #[serde(default)]
    pub storage_backings: Vec<StorageBacking>,
}

/// Body for `POST /api/content/library?action=find`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LibraryFindSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub library_type: Option<LibraryType>,
}

/// Create spec for `POST /api/content/library/item`.
#[derive(Debug, Clone, Serialize)]
pub struct ItemCreateSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub library_id: String,
    #[serde(rename = "type")]
    pub item_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub library_id: Option<String>,
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Body for `POST /api/content/library/item?action=find`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ItemFindSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_id: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Transfer sessions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize)]
pub struct TransferSessionCreateSpec {
    pub library_item_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    Push,
    Pull,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateFileAddSpec {
    pub name: String,
    pub source_type: SourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferEndpoint {
    pub uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateFileInfo {
    pub name: String,
    #[serde(default)]
    pub upload_endpoint: Option<TransferEndpoint>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrepareStatus {
    Unprepared,
    PrepareRequested,
    Preparing,
    Prepared,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadFileInfo {
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    pub status: PrepareStatus,
    #[serde(default)]
    pub download_endpoint: Option<TransferEndpoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrepareFileSpec {
    pub file_name: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  OVF
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where an OVF template becomes a VM.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentTarget {
    pub resource_pool_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterRequest<'a> {
    pub target: &'a DeploymentTarget,
}

/// Result of `?action=filter` on an OVF library item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OvfSummary {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub annotation: Option<String>,
    #[serde(default)]
    pub eulas: Vec<String>,
    #[serde(default)]
    pub networks: Vec<String>,
    #[serde(default)]
    pub storage_groups: Vec<String>,
}

/// `ResourcePoolDeploymentSpec`. Network / storage remapping and the
/// advanced knobs are left unset so the server applies the defaults.
#[derive(Debug, Clone, Serialize)]
pub struct ResourcePoolDeploymentSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    pub accept_all_eula: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_datastore_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_profile_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeployRequest<'a> {
    pub target: &'a DeploymentTarget,
    pub deployment_spec: &'a ResourcePoolDeploymentSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeployableIdentity {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
}

/// Error / warning entry of an OVF result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OvfMessage {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub message: Option<LocalizableMessage>,
}

impl OvfMessage {
    pub fn text(&self) -> String {
        self.message
            .as_ref()
            .map(|m| m.default_message.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OvfResultInfo {
    #[serde(default)]
    pub errors: Vec<OvfMessage>,
    #[serde(default)]
    pub warnings: Vec<OvfMessage>,
    #[serde(default)]
    pub information: Vec<OvfMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OvfDeployResult {
    pub succeeded: bool,
    #[serde(default)]
    pub resource_id: Option<DeployableIdentity>,
    #[serde(default)]
    pub error: Option<OvfResultInfo>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  VM
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VmPowerState {
    PoweredOn,
    PoweredOff,
    Suspended,
    #[serde(other)]
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmSummary {
    pub vm: String,
    pub name: String,
    #[serde(default)]
    pub power_state: VmPowerState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmInfo {
    pub name: String,
    #[serde(default)]
    pub power_state: VmPowerState,
    #[serde(default)]
    pub guest_os: Option<String>,
}
