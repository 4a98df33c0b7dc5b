//! Collaborator contracts consumed by the workflows.
//!
//! Each remote surface is an `#[async_trait]` trait so the workflows can run
//! against the real REST adapters in [`crate::backend`] or against in-memory
//! fakes in tests.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use secrecy::SecretString;
use url::Url;
use vmc_console::types::{AwsCompatibleSubnets, Organization, Sddc};
use vmc_vsphere::transfer::LocalFile;
use vmc_vsphere::types::{
    DeploymentTarget, ItemCreateSpec, LibraryCreateSpec, OvfDeployResult, OvfSummary,
    ResourcePoolDeploymentSpec,
};

use crate::artifacts::CreatedArtifact;
use crate::error::{WorkflowError, WorkflowResult};

// ── Resource model ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Org,
    Sddc,
    Datacenter,
    Datastore,
    Folder,
    ResourcePool,
    Library,
    LibraryItem,
    VirtualMachine,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Org => "Org",
            Self::Sddc => "SDDC",
            Self::Datacenter => "Datacenter",
            Self::Datastore => "Datastore",
            Self::Folder => "Folder",
            Self::ResourcePool => "ResourcePool",
            Self::Library => "Library",
            Self::LibraryItem => "LibraryItem",
            Self::VirtualMachine => "VirtualMachine",
        };
        f.write_str(s)
    }
}

/// A human name paired with the identifier the server returned for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReference {
    pub kind: ResourceKind,
    pub name: String,
    pub id: String,
}

/// Optional containers a lookup is restricted to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub datacenter: Option<String>,
    pub library: Option<String>,
}

impl Scope {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn datacenter(id: impl Into<String>) -> Self {
        Self { datacenter: Some(id.into()), library: None }
    }

    pub fn library(id: impl Into<String>) -> Self {
        Self { datacenter: None, library: Some(id.into()) }
    }
}

/// Filter handed to [`Inventory::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryFilter {
    pub names: Vec<String>,
    pub datacenter: Option<String>,
    pub library: Option<String>,
}

impl InventoryFilter {
    pub fn named(name: impl Into<String>, scope: Scope) -> Self {
        Self {
            names: vec![name.into()],
            datacenter: scope.datacenter,
            library: scope.library,
        }
    }
}

/// Where to open a vSphere session.
#[derive(Debug, Clone)]
pub struct VcenterEndpoint {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub insecure: bool,
}

impl VcenterEndpoint {
    pub fn new(host: impl Into<String>, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            host: host.into(),
            port: vmc_vsphere::types::DEFAULT_PORT,
            username: username.into(),
            password,
            insecure: false,
        }
    }

    /// Derive the vCenter endpoint of an SDDC from its resource config.
    pub fn from_sddc(sddc: &Sddc) -> WorkflowResult<Self> {
        let rc = sddc.resource_config.as_ref().ok_or_else(|| {
            WorkflowError::Validation(format!("SDDC {} has no resource config", sddc.id))
        })?;
        let raw = rc.vc_url.as_deref().filter(|u| !u.trim().is_empty()).ok_or_else(|| {
            WorkflowError::Validation(format!("SDDC {} has no vCenter URL", sddc.id))
        })?;
        let url = Url::parse(raw).map_err(|e| {
            WorkflowError::Validation(format!("SDDC {} vCenter URL '{raw}' is invalid: {e}", sddc.id))
        })?;
        let host = url.host_str().ok_or_else(|| {
            WorkflowError::Validation(format!("SDDC {} vCenter URL '{raw}' has no host", sddc.id))
        })?;
        let username = rc.cloud_username.clone().ok_or_else(|| {
            WorkflowError::Validation(format!("SDDC {} has no cloud admin username", sddc.id))
        })?;
        let password = rc.cloud_password.clone().ok_or_else(|| {
            WorkflowError::Validation(format!("SDDC {} has no cloud admin password", sddc.id))
        })?;

        let mut endpoint = Self::new(host, username, password);
        if let Some(port) = url.port_or_known_default() {
            endpoint.port = port;
        }
        Ok(endpoint)
    }
}

/// Identity of the resource an OVF deployment produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedResource {
    pub resource_type: String,
    pub id: String,
}

/// Outcome of an OVF deployment. `resource` only means something when
/// `succeeded` is true.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentResult {
    pub succeeded: bool,
    pub resource: Option<DeployedResource>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl DeploymentResult {
    /// The VM id to keep, if the deployment succeeded and returned one.
    pub fn retained_vm_id(&self) -> Option<&str> {
        if !self.succeeded {
            return None;
        }
        self.resource
            .as_ref()
            .map(|r| r.id.as_str())
            .filter(|id| !id.is_empty())
    }
}

impl From<OvfDeployResult> for DeploymentResult {
    fn from(raw: OvfDeployResult) -> Self {
        let info = raw.error.unwrap_or_default();
        let texts = |msgs: &[vmc_vsphere::types::OvfMessage]| {
            msgs.iter().map(|m| m.text()).filter(|t| !t.is_empty()).collect::<Vec<_>>()
        };
        Self {
            succeeded: raw.succeeded,
            resource: raw.resource_id.map(|r| DeployedResource {
                resource_type: r.resource_type,
                id: r.id,
            }),
            warnings: texts(&info.warnings),
            errors: texts(&info.errors),
        }
    }
}

// ── Contracts ────────────────────────────────────────────────────────

/// Filtered inventory queries. Returns identifiers only.
#[async_trait]
pub trait Inventory: Send + Sync {
    async fn list(&self, kind: ResourceKind, filter: &InventoryFilter) -> WorkflowResult<Vec<String>>;
}

#[async_trait]
pub trait ContentLibrary: Send + Sync {
    async fn create_library(&self, spec: &LibraryCreateSpec, client_token: &str) -> WorkflowResult<String>;
    async fn library_exists(&self, library_id: &str) -> WorkflowResult<bool>;
    async fn delete_library(&self, library_id: &str) -> WorkflowResult<()>;

    async fn create_item(&self, spec: &ItemCreateSpec, client_token: &str) -> WorkflowResult<String>;
    async fn item_exists(&self, item_id: &str) -> WorkflowResult<bool>;
    async fn delete_item(&self, item_id: &str) -> WorkflowResult<()>;

    async fn upload_files(&self, item_id: &str, files: &[LocalFile]) -> WorkflowResult<()>;
    async fn download_files(&self, item_id: &str, directory: &Path) -> WorkflowResult<Vec<PathBuf>>;
}

#[async_trait]
pub trait OvfDeployer: Send + Sync {
    async fn filter(&self, item_id: &str, target: &DeploymentTarget) -> WorkflowResult<OvfSummary>;
    async fn deploy(
        &self,
        item_id: &str,
        target: &DeploymentTarget,
        spec: &ResourcePoolDeploymentSpec,
        client_token: &str,
    ) -> WorkflowResult<DeploymentResult>;
    async fn vm_exists(&self, vm_id: &str) -> WorkflowResult<bool>;
    async fn delete_vm(&self, vm_id: &str) -> WorkflowResult<()>;
}

/// Deletes one artifact a workflow created.
#[async_trait]
pub trait ArtifactRemover: Send + Sync {
    async fn remove(&self, artifact: &CreatedArtifact) -> WorkflowResult<()>;
}

/// An authenticated vSphere session that must be closed explicitly.
#[async_trait]
pub trait Session: Send + Sync {
    /// Host the session is bound to.
    fn endpoint(&self) -> &str;
    async fn close(&mut self) -> WorkflowResult<()>;
}

/// Everything a workflow needs from one vCenter.
pub trait VsphereApi: Inventory + ContentLibrary + OvfDeployer + ArtifactRemover + Session {}

impl<T> VsphereApi for T where T: Inventory + ContentLibrary + OvfDeployer + ArtifactRemover + Session {}

/// Opens vSphere sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    type Api: VsphereApi;

    async fn connect(&self, endpoint: &VcenterEndpoint) -> WorkflowResult<Self::Api>;
}

/// The cloud control plane.
#[async_trait]
pub trait CloudConsole: Send + Sync {
    async fn list_orgs(&self) -> WorkflowResult<Vec<Organization>>;
    async fn get_sddc(&self, org_id: &str, sddc_id: &str) -> WorkflowResult<Sddc>;
    async fn compatible_subnets(
        &self,
        org_id: &str,
        linked_account_id: Option<&str>,
        region: Option<&str>,
    ) -> WorkflowResult<AwsCompatibleSubnets>;
}
