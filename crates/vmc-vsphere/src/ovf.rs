//! OVF library-item operations via the vSphere REST API.

use crate::error::VmwareResult;
use crate::types::*;
use crate::vsphere::VsphereClient;

/// OVF template inspection and deployment.
pub struct OvfManager<'a> {
    client: &'a VsphereClient,
}

impl<'a> OvfManager<'a> {
    pub fn new(client: &'a VsphereClient) -> Self {
        Self { client }
    }

    /// Deployment summary of an OVF item for a given target.
    pub async fn filter(
        &self,
        library_item_id: &str,
        target: &DeploymentTarget,
    ) -> VmwareResult<OvfSummary> {
        let path = format!("/api/vcenter/ovf/library-item/{library_item_id}?action=filter");
        self.client.post(&path, &FilterRequest { target }).await
    }

    /// Deploy an OVF item into a resource pool.
    ///
    /// A non-2xx status is an error; a 2xx body with `succeeded: false` is
    /// returned as-is so the caller can surface the OVF error list.
    pub async fn deploy(
        &self,
        library_item_id: &str,
        target: &DeploymentTarget,
        spec: &ResourcePoolDeploymentSpec,
        client_token: &str,
    ) -> VmwareResult<OvfDeployResult> {
        let path = format!("/api/vcenter/ovf/library-item/{library_item_id}?action=deploy");
        let body = DeployRequest { target, deployment_spec: spec };
        self.client.post_with_token(&path, &body, client_token).await
    }
}
