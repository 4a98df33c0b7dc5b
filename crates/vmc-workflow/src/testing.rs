//! In-memory vCenter and console used by the workflow tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use vmc_console::types::{
    AwsCompatibleSubnets, Organization, Sddc, SddcResourceConfig, Subnet, VpcInfoSubnets,
};
use vmc_vsphere::transfer::LocalFile;
use vmc_vsphere::types::{
    DeploymentTarget, ItemCreateSpec, LibraryCreateSpec, OvfSummary, ResourcePoolDeploymentSpec,
};

use crate::api::{
    ArtifactRemover, CloudConsole, Connector, ContentLibrary, DeployedResource, DeploymentResult,
    Inventory, InventoryFilter, OvfDeployer, ResourceKind, Session, VcenterEndpoint,
};
use crate::artifacts::CreatedArtifact;
use crate::cleanup::remove_artifact;
use crate::error::{WorkflowError, WorkflowResult};

#[derive(Debug, Clone)]
struct Entity {
    id: String,
    name: String,
    /// Datacenter or library the entity lives in.
    parent: Option<String>,
}

#[derive(Default)]
struct Inner {
    next_id: u32,
    datacenters: Vec<Entity>,
    datastores: Vec<Entity>,
    folders: Vec<Entity>,
    pools: Vec<Entity>,
    /// `parent` is the backing datastore.
    libraries: Vec<Entity>,
    items: Vec<Entity>,
    vms: Vec<Entity>,
    item_files: HashMap<String, Vec<(String, Vec<u8>)>>,
    warnings: Vec<String>,
    deploy_result: Option<DeploymentResult>,
    last_deploy_spec: Option<ResourcePoolDeploymentSpec>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    dropped_downloads: usize,
    calls: Vec<String>,
    connected_host: Option<String>,
    closed: bool,
}

impl Inner {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// Shared state behind every fake handle.
#[derive(Clone, Default)]
pub struct FakeState(Arc<Mutex<Inner>>);

fn entity(id: &str, name: &str, parent: Option<&str>) -> Entity {
    Entity { id: id.into(), name: name.into(), parent: parent.map(str::to_string) }
}

impl FakeState {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.0.lock().unwrap()
    }

    pub fn add_datacenter(&self, id: &str, name: &str) {
        self.lock().datacenters.push(entity(id, name, None));
    }

    pub fn add_datastore(&self, id: &str, name: &str, datacenter: Option<&str>) {
        self.lock().datastores.push(entity(id, name, datacenter));
    }

    pub fn add_folder(&self, id: &str, name: &str, datacenter: Option<&str>) {
        self.lock().folders.push(entity(id, name, datacenter));
    }

    pub fn add_resource_pool(&self, id: &str, name: &str, datacenter: Option<&str>) {
        self.lock().pools.push(entity(id, name, datacenter));
    }

    pub fn add_library(&self, id: &str, name: &str, datastore: &str) {
        self.lock().libraries.push(entity(id, name, Some(datastore)));
    }

    pub fn add_item(&self, id: &str, name: &str, library: &str) {
        self.lock().items.push(entity(id, name, Some(library)));
    }

    pub fn add_vm(&self, id: &str, name: &str) {
        self.lock().vms.push(entity(id, name, None));
    }

    pub fn add_warning(&self, text: &str) {
        self.lock().warnings.push(text.into());
    }

    pub fn set_deploy_result(&self, result: DeploymentResult) {
        self.lock().deploy_result = Some(result);
    }

    /// Make every call of `op` fail with a remote error.
    pub fn fail(&self, op: &str) {
        self.lock().failing.insert(op.into());
    }

    /// Make every call of `op` take `by` before answering.
    pub fn delay(&self, op: &str, by: Duration) {
        self.lock().delays.insert(op.into(), by);
    }

    /// Make downloads return `n` fewer files than the item holds.
    pub fn drop_files_on_download(&self, n: usize) {
        self.lock().dropped_downloads = n;
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn library_count(&self, name: &str) -> usize {
        self.lock().libraries.iter().filter(|l| l.name == name).count()
    }

    pub fn library_backing(&self, id: &str) -> Option<String> {
        self.lock().libraries.iter().find(|l| l.id == id).and_then(|l| l.parent.clone())
    }

    pub fn vm_count(&self) -> usize {
        self.lock().vms.len()
    }

    pub fn last_deploy_spec(&self) -> Option<ResourcePoolDeploymentSpec> {
        self.lock().last_deploy_spec.clone()
    }

    pub fn connected_host(&self) -> Option<String> {
        self.lock().connected_host.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Log the call, then apply any injected delay or failure.
    async fn enter(&self, op: &str, subject: &str) -> WorkflowResult<()> {
        let (delay, fails) = {
            let mut inner = self.lock();
            inner.calls.push(format!("{op} {subject}"));
            (inner.delays.get(op).copied(), inner.failing.contains(op))
        };
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        if fails {
            return Err(WorkflowError::remote(op, subject, vec!["injected failure".into()]));
        }
        Ok(())
    }
}

fn matching(entities: &[Entity], filter: &InventoryFilter, scope: Option<&String>) -> Vec<String> {
    entities
        .iter()
        .filter(|e| filter.names.is_empty() || filter.names.contains(&e.name))
        .filter(|e| scope.map_or(true, |s| e.parent.as_ref() == Some(s)))
        .map(|e| e.id.clone())
        .collect()
}

// ── vSphere ──────────────────────────────────────────────────────────

pub struct FakeVsphere {
    state: FakeState,
    host: String,
}

pub struct FakeConnector {
    state: FakeState,
    reject: bool,
}

impl FakeConnector {
    pub fn new(state: FakeState) -> Self {
        Self { state, reject: false }
    }

    /// A connector whose logins are always refused.
    pub fn rejecting(state: FakeState) -> Self {
        Self { state, reject: true }
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Api = FakeVsphere;

    async fn connect(&self, endpoint: &VcenterEndpoint) -> WorkflowResult<FakeVsphere> {
        self.state.enter("connect", &endpoint.host).await?;
        if self.reject {
            return Err(WorkflowError::Authentication {
                target: endpoint.host.clone(),
                message: "invalid credentials".into(),
            });
        }
        {
            let mut inner = self.state.lock();
            inner.connected_host = Some(endpoint.host.clone());
            inner.closed = false;
        }
        Ok(FakeVsphere { state: self.state.clone(), host: endpoint.host.clone() })
    }
}

#[async_trait]
impl Inventory for FakeVsphere {
    async fn list(&self, kind: ResourceKind, filter: &InventoryFilter) -> WorkflowResult<Vec<String>> {
        self.state.enter("list", &kind.to_string()).await?;
        let inner = self.state.lock();
        let ids = match kind {
            ResourceKind::Datacenter => matching(&inner.datacenters, filter, None),
            ResourceKind::Datastore => matching(&inner.datastores, filter, filter.datacenter.as_ref()),
            ResourceKind::Folder => matching(&inner.folders, filter, filter.datacenter.as_ref()),
            ResourceKind::ResourcePool => matching(&inner.pools, filter, filter.datacenter.as_ref()),
            ResourceKind::Library => matching(&inner.libraries, filter, None),
            ResourceKind::LibraryItem => matching(&inner.items, filter, filter.library.as_ref()),
            ResourceKind::VirtualMachine => matching(&inner.vms, filter, None),
            ResourceKind::Org | ResourceKind::Sddc => Vec::new(),
        };
        Ok(ids)
    }
}

#[async_trait]
impl ContentLibrary for FakeVsphere {
    async fn create_library(&self, spec: &LibraryCreateSpec, _client_token: &str) -> WorkflowResult<String> {
        self.state.enter("create_library", &spec.name).await?;
        let mut inner = self.state.lock();
        let id = inner.id("lib");
        let backing = spec.storage_backings.first().and_then(|b| b.datastore_id.clone());
        inner.libraries.push(Entity { id: id.clone(), name: spec.name.clone(), parent: backing });
        Ok(id)
    }

    async fn library_exists(&self, library_id: &str) -> WorkflowResult<bool> {
        self.state.enter("library_exists", library_id).await?;
        Ok(self.state.lock().libraries.iter().any(|l| l.id == library_id))
    }

    async fn delete_library(&self, library_id: &str) -> WorkflowResult<()> {
        self.state.enter("delete_library", library_id).await?;
        let mut inner = self.state.lock();
        inner.libraries.retain(|l| l.id != library_id);
        inner.items.retain(|i| i.parent.as_deref() != Some(library_id));
        Ok(())
    }

    async fn create_item(&self, spec: &ItemCreateSpec, _client_token: &str) -> WorkflowResult<String> {
        self.state.enter("create_item", &spec.name).await?;
        let mut inner = self.state.lock();
        let id = inner.id("item");
        inner.items.push(Entity {
            id: id.clone(),
            name: spec.name.clone(),
            parent: Some(spec.library_id.clone()),
        });
        Ok(id)
    }

    async fn item_exists(&self, item_id: &str) -> WorkflowResult<bool> {
        self.state.enter("item_exists", item_id).await?;
        Ok(self.state.lock().items.iter().any(|i| i.id == item_id))
    }

    async fn delete_item(&self, item_id: &str) -> WorkflowResult<()> {
        self.state.enter("delete_item", item_id).await?;
        let mut inner = self.state.lock();
        inner.items.retain(|i| i.id != item_id);
        inner.item_files.remove(item_id);
        Ok(())
    }

    async fn upload_files(&self, item_id: &str, files: &[LocalFile]) -> WorkflowResult<()> {
        self.state.enter("upload_files", item_id).await?;
        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            let data = std::fs::read(&file.path)
                .map_err(|e| WorkflowError::remote("upload files", &file.name, vec![e.to_string()]))?;
            stored.push((file.name.clone(), data));
        }
        self.state.lock().item_files.insert(item_id.to_string(), stored);
        Ok(())
    }

    async fn download_files(&self, item_id: &str, directory: &Path) -> WorkflowResult<Vec<PathBuf>> {
        self.state.enter("download_files", item_id).await?;
        let (files, dropped) = {
            let inner = self.state.lock();
            (inner.item_files.get(item_id).cloned().unwrap_or_default(), inner.dropped_downloads)
        };
        let keep = files.len().saturating_sub(dropped);
        std::fs::create_dir_all(directory)
            .map_err(|e| WorkflowError::remote("download files", item_id, vec![e.to_string()]))?;
        let mut written = Vec::new();
        for (name, data) in files.into_iter().take(keep) {
            let path = directory.join(&name);
            std::fs::write(&path, data)
                .map_err(|e| WorkflowError::remote("download files", &name, vec![e.to_string()]))?;
            written.push(path);
        }
        Ok(written)
    }
}

#[async_trait]
impl OvfDeployer for FakeVsphere {
    async fn filter(&self, item_id: &str, _target: &DeploymentTarget) -> WorkflowResult<OvfSummary> {
        self.state.enter("filter", item_id).await?;
        Ok(OvfSummary {
            name: Some(item_id.to_string()),
            annotation: Some("template annotation".into()),
            eulas: vec!["EULA".into()],
            ..Default::default()
        })
    }

    async fn deploy(
        &self,
        item_id: &str,
        _target: &DeploymentTarget,
        spec: &ResourcePoolDeploymentSpec,
        _client_token: &str,
    ) -> WorkflowResult<DeploymentResult> {
        self.state.enter("deploy", item_id).await?;
        let mut inner = self.state.lock();
        inner.last_deploy_spec = Some(spec.clone());
        if let Some(result) = inner.deploy_result.clone() {
            return Ok(result);
        }
        let id = inner.id("vm");
        inner.vms.push(Entity { id: id.clone(), name: spec.name.clone(), parent: None });
        Ok(DeploymentResult {
            succeeded: true,
            resource: Some(DeployedResource { resource_type: "VirtualMachine".into(), id }),
            warnings: inner.warnings.clone(),
            errors: Vec::new(),
        })
    }

    async fn vm_exists(&self, vm_id: &str) -> WorkflowResult<bool> {
        self.state.enter("vm_exists", vm_id).await?;
        Ok(self.state.lock().vms.iter().any(|v| v.id == vm_id))
    }

    async fn delete_vm(&self, vm_id: &str) -> WorkflowResult<()> {
        self.state.enter("delete_vm", vm_id).await?;
        self.state.lock().vms.retain(|v| v.id != vm_id);
        Ok(())
    }
}

#[async_trait]
impl ArtifactRemover for FakeVsphere {
    async fn remove(&self, artifact: &CreatedArtifact) -> WorkflowResult<()> {
        remove_artifact(self, artifact).await
    }
}

#[async_trait]
impl Session for FakeVsphere {
    fn endpoint(&self) -> &str {
        &self.host
    }

    async fn close(&mut self) -> WorkflowResult<()> {
        self.state.enter("close", &self.host).await?;
        self.state.lock().closed = true;
        Ok(())
    }
}

// ── Console ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeConsole {
    orgs: Vec<Organization>,
    sddcs: Vec<(String, Sddc)>,
    subnets: AwsCompatibleSubnets,
}

impl FakeConsole {
    /// One org holding one SDDC whose vCenter lives at `vc_url`.
    pub fn with_sddc(org_id: &str, sddc_id: &str, vc_url: &str) -> Self {
        let sddc = Sddc {
            id: sddc_id.into(),
            name: Some("Lab".into()),
            sddc_state: Some("READY".into()),
            resource_config: Some(SddcResourceConfig {
                vc_url: Some(vc_url.into()),
                cloud_username: Some("cloudadmin@vmc.local".into()),
                cloud_password: Some(SecretString::new("cloud-pw".into())),
                region: Some("US_WEST_2".into()),
            }),
        };
        Self {
            orgs: vec![Organization { id: org_id.into(), display_name: None, name: None }],
            sddcs: vec![(org_id.into(), sddc)],
            subnets: AwsCompatibleSubnets::default(),
        }
    }

    /// `(vpc id, subnet id, compatible)` rows.
    pub fn with_subnets(rows: &[(&str, &str, bool)]) -> Self {
        let mut subnets = AwsCompatibleSubnets::default();
        for (vpc, subnet, compatible) in rows {
            subnets
                .vpc_map
                .entry(vpc.to_string())
                .or_insert_with(|| VpcInfoSubnets { cidr_block: None, description: None, subnets: Vec::new() })
                .subnets
                .push(Subnet {
                    subnet_id: Some(subnet.to_string()),
                    name: None,
                    availability_zone: None,
                    subnet_cidr_block: None,
                    compatible: Some(*compatible),
                    note: None,
                });
        }
        Self { subnets, ..Default::default() }
    }
}

#[async_trait]
impl CloudConsole for FakeConsole {
    async fn list_orgs(&self) -> WorkflowResult<Vec<Organization>> {
        Ok(self.orgs.clone())
    }

    async fn get_sddc(&self, org_id: &str, sddc_id: &str) -> WorkflowResult<Sddc> {
        self.sddcs
            .iter()
            .find(|(org, s)| org == org_id && s.id == sddc_id)
            .map(|(_, s)| s.clone())
            .ok_or_else(|| WorkflowError::not_found(ResourceKind::Sddc, sddc_id))
    }

    async fn compatible_subnets(
        &self,
        _org_id: &str,
        _linked_account_id: Option<&str>,
        _region: Option<&str>,
    ) -> WorkflowResult<AwsCompatibleSubnets> {
        Ok(self.subnets.clone())
    }
}
