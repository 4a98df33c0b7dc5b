//! Inventory lookups via the vSphere REST API: datacenters, datastores,
//! VM folders and resource pools.

use crate::error::VmwareResult;
use crate::types::*;
use crate::vsphere::VsphereClient;

/// Inventory list operations.
pub struct InventoryManager<'a> {
    client: &'a VsphereClient,
}

impl<'a> InventoryManager<'a> {
    pub fn new(client: &'a VsphereClient) -> Self {
        Self { client }
    }

    // ── Datacenters ─────────────────────────────────────────────────

    pub async fn list_datacenters(
        &self,
        query: &InventoryQuery,
    ) -> VmwareResult<Vec<DatacenterSummary>> {
        self.client
            .get_with_params::<Vec<DatacenterSummary>>("/api/vcenter/datacenter", &query.to_params())
            .await
    }

    // ── Datastores ──────────────────────────────────────────────────

    pub async fn list_datastores(
        &self,
        query: &InventoryQuery,
    ) -> VmwareResult<Vec<DatastoreSummary>> {
        self.client
            .get_with_params::<Vec<DatastoreSummary>>("/api/vcenter/datastore", &query.to_params())
            .await
    }

    // ── Folders ─────────────────────────────────────────────────────

    /// List VM folders (type `VIRTUAL_MACHINE`) matching the query.
    pub async fn list_vm_folders(
        &self,
        query: &InventoryQuery,
    ) -> VmwareResult<Vec<FolderSummary>> {
        let mut params = query.to_params();
        params.push(("type".into(), "VIRTUAL_MACHINE".into()));
        self.client
            .get_with_params::<Vec<FolderSummary>>("/api/vcenter/folder", &params)
            .await
    }

    // ── Resource pools ──────────────────────────────────────────────

    pub async fn list_resource_pools(
        &self,
        query: &InventoryQuery,
    ) -> VmwareResult<Vec<ResourcePoolSummary>> {
        self.client
            .get_with_params::<Vec<ResourcePoolSummary>>(
                "/api/vcenter/resource-pool",
                &query.to_params(),
            )
            .await
    }
}
