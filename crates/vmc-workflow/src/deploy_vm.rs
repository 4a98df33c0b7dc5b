//! Deploy a VM from a content library OVF template into an SDDC.

use vmc_console::types::Sddc;
use vmc_vsphere::types::{DeploymentTarget, ResourcePoolDeploymentSpec};

use crate::api::{
    CloudConsole, Connector, ResourceKind, ResourceReference, Scope, Session, VcenterEndpoint,
    VsphereApi,
};
use crate::artifacts::ArtifactKind;
use crate::error::{WorkflowError, WorkflowResult};
use crate::orchestrator::{Orchestrator, WorkflowConfig, WorkflowRun, WorkflowState};

pub const DEFAULT_DATACENTER: &str = "SDDC-Datacenter";
pub const DEFAULT_RESOURCE_POOL: &str = "Compute-ResourcePool";
pub const DEFAULT_FOLDER: &str = "Workloads";

/// `Deploy VM Sample - <uuid>`
pub fn default_vm_name() -> String {
    format!("Deploy VM Sample - {}", uuid::Uuid::new_v4())
}

#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub org_id: String,
    pub sddc_id: String,
    pub libitem_name: String,
    pub datacenter_name: String,
    pub resourcepool_name: String,
    pub folder_name: String,
    pub vm_name: String,
}

impl DeployOptions {
    pub fn new(
        org_id: impl Into<String>,
        sddc_id: impl Into<String>,
        libitem_name: impl Into<String>,
    ) -> Self {
        Self {
            org_id: org_id.into(),
            sddc_id: sddc_id.into(),
            libitem_name: libitem_name.into(),
            datacenter_name: DEFAULT_DATACENTER.to_string(),
            resourcepool_name: DEFAULT_RESOURCE_POOL.to_string(),
            folder_name: DEFAULT_FOLDER.to_string(),
            vm_name: default_vm_name(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeployReport {
    pub sddc_name: Option<String>,
    pub vcenter: String,
    pub item: ResourceReference,
    pub target: DeploymentTarget,
    pub resource_type: String,
    pub vm_id: String,
    pub vm_name: String,
    pub warnings: Vec<String>,
}

/// Locate the SDDC's vCenter through `console`, open a session there with
/// `connector` and deploy the library item.
pub async fn deploy_vm<C, K>(
    console: &C,
    connector: &K,
    options: &DeployOptions,
    config: WorkflowConfig,
) -> WorkflowRun<DeployReport>
where
    C: CloudConsole + ?Sized,
    K: Connector,
{
    let mut orch = Orchestrator::new(config);

    let (endpoint, sddc) = match locate_vcenter(&orch, console, options).await {
        Ok(found) => found,
        Err(e) => return orch.finish(None, Err(e)).await,
    };
    let connected = orch
        .call("connect", &endpoint.host, connector.connect(&endpoint))
        .await;
    let mut session = match connected {
        Ok(s) => s,
        Err(e) => return orch.finish(None, Err(e)).await,
    };

    let outcome = run(&mut orch, &session, options, &endpoint, &sddc).await;
    let result = orch.finish(Some(&session), outcome).await;

    if let Err(e) = session.close().await {
        log::warn!("Could not close session with {}: {}", session.endpoint(), e);
    }
    result
}

async fn locate_vcenter<C: CloudConsole + ?Sized>(
    orch: &Orchestrator,
    console: &C,
    options: &DeployOptions,
) -> WorkflowResult<(VcenterEndpoint, Sddc)> {
    let orgs = orch
        .call("list orgs", &options.org_id, console.list_orgs())
        .await?;
    if !orgs.iter().any(|o| o.id == options.org_id) {
        return Err(WorkflowError::not_found(ResourceKind::Org, &options.org_id));
    }

    let sddc = orch
        .call(
            "get SDDC",
            &options.sddc_id,
            console.get_sddc(&options.org_id, &options.sddc_id),
        )
        .await?;
    let endpoint = VcenterEndpoint::from_sddc(&sddc)?;
    log::info!(
        "SDDC '{}' ({}) is served by vCenter {}",
        sddc.name.as_deref().unwrap_or("-"),
        sddc.id,
        endpoint.host
    );
    Ok((endpoint, sddc))
}

async fn run<A: VsphereApi>(
    orch: &mut Orchestrator,
    api: &A,
    options: &DeployOptions,
    endpoint: &VcenterEndpoint,
    sddc: &Sddc,
) -> WorkflowResult<DeployReport> {
    orch.advance(WorkflowState::SessionEstablished)?;

    let datacenter = orch
        .resolve(api, ResourceKind::Datacenter, &options.datacenter_name, Scope::none())
        .await?;
    let pool = orch
        .resolve(
            api,
            ResourceKind::ResourcePool,
            &options.resourcepool_name,
            Scope::datacenter(&datacenter.id),
        )
        .await?;
    let folder = orch
        .resolve(api, ResourceKind::Folder, &options.folder_name, Scope::datacenter(&datacenter.id))
        .await?;

    if let Some(vm) = orch
        .find_any(api, ResourceKind::VirtualMachine, &options.vm_name, Scope::none())
        .await?
    {
        return Err(WorkflowError::AlreadyExists {
            kind: ResourceKind::VirtualMachine,
            name: options.vm_name.clone(),
            id: vm.id,
        });
    }

    let item = orch
        .resolve(api, ResourceKind::LibraryItem, &options.libitem_name, Scope::none())
        .await?;
    orch.advance(WorkflowState::ResourcesResolved)?;

    let target = DeploymentTarget {
        resource_pool_id: pool.id,
        folder_id: Some(folder.id),
        host_id: None,
    };
    let summary = orch
        .call("filter OVF", &item.name, api.filter(&item.id, &target))
        .await?;
    log::debug!(
        "OVF '{}': {} EULA(s), {} network(s), {} storage group(s)",
        summary.name.as_deref().unwrap_or(&item.name),
        summary.eulas.len(),
        summary.networks.len(),
        summary.storage_groups.len()
    );

    // No network or storage remapping: the template's own defaults apply.
    let spec = ResourcePoolDeploymentSpec {
        name: options.vm_name.clone(),
        annotation: summary.annotation,
        accept_all_eula: true,
        default_datastore_id: None,
        storage_profile_id: None,
        locale: None,
    };
    let token = uuid::Uuid::new_v4().to_string();
    let result = orch
        .call(
            "deploy OVF template",
            &options.vm_name,
            api.deploy(&item.id, &target, &spec, &token),
        )
        .await?;

    let Some(vm_id) = result.retained_vm_id().map(str::to_string) else {
        let messages = if result.succeeded {
            vec!["deployment reported success without a resource id".to_string()]
        } else {
            result.errors
        };
        return Err(WorkflowError::remote("deploy OVF template", &options.vm_name, messages));
    };
    log::debug!("Deploy of '{}' returned {} warning(s)", options.vm_name, result.warnings.len());

    orch.confirm_created(
        ArtifactKind::VirtualMachine,
        &options.vm_name,
        &vm_id,
        api.vm_exists(&vm_id),
    )
    .await?;
    orch.advance(WorkflowState::ActionPerformed)?;

    let resource_type = result
        .resource
        .map(|r| r.resource_type)
        .unwrap_or_else(|| "VirtualMachine".to_string());
    Ok(DeployReport {
        sddc_name: sddc.name.clone(),
        vcenter: endpoint.host.clone(),
        item,
        target,
        resource_type,
        vm_id,
        vm_name: options.vm_name.clone(),
        warnings: result.warnings,
    })
}
