//! Adapters from the collaborator traits to the REST clients.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use vmc_console::orgs::OrgManager;
use vmc_console::types::{AwsCompatibleSubnets, Organization, Sddc};
use vmc_console::{ConsoleClient, ConsoleConfig};
use vmc_vsphere::content::ContentLibraryManager;
use vmc_vsphere::inventory::InventoryManager;
use vmc_vsphere::ovf::OvfManager;
use vmc_vsphere::transfer::{LocalFile, TransferManager};
use vmc_vsphere::types::{
    DeploymentTarget, InventoryQuery, ItemCreateSpec, LibraryCreateSpec, OvfSummary,
    ResourcePoolDeploymentSpec,
};
use vmc_vsphere::vm::VmManager;
use vmc_vsphere::{VmwareError, VmwareResult, VsphereClient, VsphereConfig};

use crate::api::{
    ArtifactRemover, CloudConsole, ContentLibrary, Connector, DeploymentResult, Inventory,
    InventoryFilter, OvfDeployer, ResourceKind, Session, VcenterEndpoint,
};
use crate::artifacts::CreatedArtifact;
use crate::cleanup::remove_artifact;
use crate::error::{WorkflowError, WorkflowResult};

fn client_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ── vSphere ──────────────────────────────────────────────────────────

/// Opens [`VsphereSession`]s.
#[derive(Debug, Clone)]
pub struct VsphereConnector {
    timeout_secs: u64,
}

impl VsphereConnector {
    /// `timeout_secs` bounds each HTTP request of the sessions it opens.
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }
}

impl Default for VsphereConnector {
    fn default() -> Self {
        Self::new(vmc_vsphere::types::DEFAULT_TIMEOUT_SECS)
    }
}

#[async_trait]
impl Connector for VsphereConnector {
    type Api = VsphereSession;

    async fn connect(&self, endpoint: &VcenterEndpoint) -> WorkflowResult<VsphereSession> {
        let mut config = VsphereConfig::new(
            endpoint.host.clone(),
            endpoint.username.clone(),
            endpoint.password.clone(),
        );
        config.port = endpoint.port;
        config.insecure = endpoint.insecure;
        config.timeout_secs = self.timeout_secs;

        let mut client = VsphereClient::new(&config)
            .map_err(|e| WorkflowError::from_vmware("connect", &endpoint.host, e))?;
        client
            .login()
            .await
            .map_err(|e| WorkflowError::from_vmware("login", &endpoint.host, e))?;
        log::info!("vSphere session established with {}", endpoint.host);
        Ok(VsphereSession { client })
    }
}

/// One authenticated vCenter session.
pub struct VsphereSession {
    client: VsphereClient,
}

impl VsphereSession {
    pub fn client(&self) -> &VsphereClient {
        &self.client
    }

    fn host(&self) -> &str {
        &self.client.config().host
    }
}

/// Treat a 404 as "does not exist" rather than a failure.
fn exists<T>(result: VmwareResult<T>, op: &str, id: &str) -> WorkflowResult<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(WorkflowError::from_vmware(op, id, e)),
    }
}

#[async_trait]
impl Inventory for VsphereSession {
    async fn list(&self, kind: ResourceKind, filter: &InventoryFilter) -> WorkflowResult<Vec<String>> {
        let mut query = InventoryQuery { names: filter.names.clone(), datacenters: Vec::new() };
        if let Some(dc) = &filter.datacenter {
            query = query.in_datacenter(dc.clone());
        }
        let label = filter.names.join(",");
        let op = format!("list {kind}");
        let wrap = |e: VmwareError| WorkflowError::from_vmware(&op, &label, e);

        let inventory = InventoryManager::new(&self.client);
        let content = ContentLibraryManager::new(&self.client);
        let ids = match kind {
            ResourceKind::Datacenter => inventory
                .list_datacenters(&query)
                .await
                .map_err(wrap)?
                .into_iter()
                .map(|d| d.datacenter)
                .collect(),
            ResourceKind::Datastore => inventory
                .list_datastores(&query)
                .await
                .map_err(wrap)?
                .into_iter()
                .map(|d| d.datastore)
                .collect(),
            ResourceKind::Folder => inventory
                .list_vm_folders(&query)
                .await
                .map_err(wrap)?
                .into_iter()
                .map(|f| f.folder)
                .collect(),
            ResourceKind::ResourcePool => inventory
                .list_resource_pools(&query)
                .await
                .map_err(wrap)?
                .into_iter()
                .map(|p| p.resource_pool)
                .collect(),
            ResourceKind::Library => {
                let mut ids = Vec::new();
                for name in &filter.names {
                    ids.extend(content.find_libraries(name).await.map_err(wrap)?);
                }
                ids
            }
            ResourceKind::LibraryItem => {
                let mut ids = Vec::new();
                for name in &filter.names {
                    ids.extend(
                        content
                            .find_items(name, filter.library.as_deref())
                            .await
                            .map_err(wrap)?,
                    );
                }
                ids
            }
            ResourceKind::VirtualMachine => {
                let vms = VmManager::new(&self.client);
                let mut ids = Vec::new();
                for name in &filter.names {
                    ids.extend(vms.find_vms_by_name(name).await.map_err(wrap)?.into_iter().map(|v| v.vm));
                }
                ids
            }
            ResourceKind::Org | ResourceKind::Sddc => {
                return Err(WorkflowError::Validation(format!(
                    "{kind} is not part of the vCenter inventory"
                )));
            }
        };
        Ok(ids)
    }
}

#[async_trait]
impl ContentLibrary for VsphereSession {
    async fn create_library(&self, spec: &LibraryCreateSpec, client_token: &str) -> WorkflowResult<String> {
        ContentLibraryManager::new(&self.client)
            .create_local_library(spec, client_token)
            .await
            .map_err(|e| WorkflowError::from_vmware("create Library", &spec.name, e))
    }

    async fn library_exists(&self, library_id: &str) -> WorkflowResult<bool> {
        let r = ContentLibraryManager::new(&self.client).get_local_library(library_id).await;
        exists(r, "get Library", library_id)
    }

    async fn delete_library(&self, library_id: &str) -> WorkflowResult<()> {
        ContentLibraryManager::new(&self.client)
            .delete_local_library(library_id)
            .await
            .map_err(|e| WorkflowError::from_vmware("delete Library", library_id, e))
    }

    async fn create_item(&self, spec: &ItemCreateSpec, client_token: &str) -> WorkflowResult<String> {
        ContentLibraryManager::new(&self.client)
            .create_item(spec, client_token)
            .await
            .map_err(|e| WorkflowError::from_vmware("create LibraryItem", &spec.name, e))
    }

    async fn item_exists(&self, item_id: &str) -> WorkflowResult<bool> {
        let r = ContentLibraryManager::new(&self.client).get_item(item_id).await;
        exists(r, "get LibraryItem", item_id)
    }

    async fn delete_item(&self, item_id: &str) -> WorkflowResult<()> {
        ContentLibraryManager::new(&self.client)
            .delete_item(item_id)
            .await
            .map_err(|e| WorkflowError::from_vmware("delete LibraryItem", item_id, e))
    }

    async fn upload_files(&self, item_id: &str, files: &[LocalFile]) -> WorkflowResult<()> {
        TransferManager::new(&self.client)
            .upload_files(item_id, files, &client_token())
            .await
            .map_err(|e| WorkflowError::from_vmware("upload files", item_id, e))
    }

    async fn download_files(&self, item_id: &str, directory: &Path) -> WorkflowResult<Vec<PathBuf>> {
        TransferManager::new(&self.client)
            .download_files(item_id, directory, &client_token())
            .await
            .map_err(|e| WorkflowError::from_vmware("download files", item_id, e))
    }
}

#[async_trait]
impl OvfDeployer for VsphereSession {
    async fn filter(&self, item_id: &str, target: &DeploymentTarget) -> WorkflowResult<OvfSummary> {
        OvfManager::new(&self.client)
            .filter(item_id, target)
            .await
            .map_err(|e| WorkflowError::from_vmware("filter OVF", item_id, e))
    }

    async fn deploy(
        &self,
        item_id: &str,
        target: &DeploymentTarget,
        spec: &ResourcePoolDeploymentSpec,
        client_token: &str,
    ) -> WorkflowResult<DeploymentResult> {
        OvfManager::new(&self.client)
            .deploy(item_id, target, spec, client_token)
            .await
            .map(DeploymentResult::from)
            .map_err(|e| WorkflowError::from_vmware("deploy OVF template", &spec.name, e))
    }

    async fn vm_exists(&self, vm_id: &str) -> WorkflowResult<bool> {
        let r = VmManager::new(&self.client).get_vm(vm_id).await;
        exists(r, "get VirtualMachine", vm_id)
    }

    async fn delete_vm(&self, vm_id: &str) -> WorkflowResult<()> {
        VmManager::new(&self.client)
            .delete_vm(vm_id)
            .await
            .map_err(|e| WorkflowError::from_vmware("delete VirtualMachine", vm_id, e))
    }
}

#[async_trait]
impl ArtifactRemover for VsphereSession {
    async fn remove(&self, artifact: &CreatedArtifact) -> WorkflowResult<()> {
        remove_artifact(self, artifact).await
    }
}

#[async_trait]
impl Session for VsphereSession {
    fn endpoint(&self) -> &str {
        self.host()
    }

    async fn close(&mut self) -> WorkflowResult<()> {
        if !self.client.is_connected() {
            return Ok(());
        }
        let host = self.host().to_string();
        self.client
            .logout()
            .await
            .map_err(|e| WorkflowError::from_vmware("logout", &host, e))?;
        log::info!("vSphere session with {} closed", host);
        Ok(())
    }
}

// ── Console ──────────────────────────────────────────────────────────

/// An authenticated console client.
pub struct ConsoleSession {
    client: ConsoleClient,
}

impl ConsoleSession {
    /// Exchange the refresh token and return a ready session.
    pub async fn open(config: ConsoleConfig) -> WorkflowResult<Self> {
        let target = config.csp_url.clone();
        let mut client = ConsoleClient::new(config)
            .map_err(|e| WorkflowError::from_console("connect", &target, e))?;
        client
            .login()
            .await
            .map_err(|e| WorkflowError::from_console("exchange refresh token", &target, e))?;
        Ok(Self { client })
    }

    pub fn close(&mut self) {
        self.client.logout();
        log::debug!("Console session closed");
    }
}

#[async_trait]
impl CloudConsole for ConsoleSession {
    async fn list_orgs(&self) -> WorkflowResult<Vec<Organization>> {
        OrgManager::new(&self.client)
            .list_orgs()
            .await
            .map_err(|e| WorkflowError::from_console("list orgs", "orgs", e))
    }

    async fn get_sddc(&self, org_id: &str, sddc_id: &str) -> WorkflowResult<Sddc> {
        OrgManager::new(&self.client)
            .get_sddc(org_id, sddc_id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    WorkflowError::not_found(ResourceKind::Sddc, sddc_id)
                } else {
                    WorkflowError::from_console("get SDDC", sddc_id, e)
                }
            })
    }

    async fn compatible_subnets(
        &self,
        org_id: &str,
        linked_account_id: Option<&str>,
        region: Option<&str>,
    ) -> WorkflowResult<AwsCompatibleSubnets> {
        OrgManager::new(&self.client)
            .compatible_subnets(org_id, linked_account_id, region)
            .await
            .map_err(|e| WorkflowError::from_console("list compatible subnets", org_id, e))
    }
}
