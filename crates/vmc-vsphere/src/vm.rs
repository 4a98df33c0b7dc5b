//! VM lookup and removal via the vSphere REST API.

use crate::error::VmwareResult;
use crate::types::*;
use crate::vsphere::VsphereClient;

/// VM operations needed by the deploy workflow.
pub struct VmManager<'a> {
    client: &'a VsphereClient,
}

impl<'a> VmManager<'a> {
    pub fn new(client: &'a VsphereClient) -> Self {
        Self { client }
    }

    /// Get details for a single VM.
    pub async fn get_vm(&self, vm_id: &str) -> VmwareResult<VmInfo> {
        let path = format!("/api/vcenter/vm/{vm_id}");
        self.client.get::<VmInfo>(&path).await
    }

    /// Delete (unregister and remove) a VM. The VM must be powered off.
    pub async fn delete_vm(&self, vm_id: &str) -> VmwareResult<()> {
        let path = format!("/api/vcenter/vm/{vm_id}");
        self.client.delete(&path).await
    }

    /// Find VMs by exact name.
    pub async fn find_vms_by_name(&self, name: &str) -> VmwareResult<Vec<VmSummary>> {
        self.client
            .get_with_params::<Vec<VmSummary>>(
                "/api/vcenter/vm",
                &[("names".into(), name.to_string())],
            )
            .await
    }
}
