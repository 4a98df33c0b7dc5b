//! Content library operations via the vSphere REST API.
//!
//! Local libraries are created with a datastore storage backing; items are
//! empty placeholders until files are pushed through an update session
//! (see [`crate::transfer`]).

use crate::error::VmwareResult;
use crate::types::*;
use crate::vsphere::VsphereClient;

/// Local library and library item CRUD.
pub struct ContentLibraryManager<'a> {
    client: &'a VsphereClient,
}

impl<'a> ContentLibraryManager<'a> {
    pub fn new(client: &'a VsphereClient) -> Self {
        Self { client }
    }

    // ── Libraries ───────────────────────────────────────────────────

    /// Create a local library. Returns the library identifier.
    pub async fn create_local_library(
        &self,
        spec: &LibraryCreateSpec,
        client_token: &str,
    ) -> VmwareResult<String> {
        self.client
            .post_with_token("/api/content/local-library", spec, client_token)
            .await
    }

    pub async fn get_local_library(&self, library_id: &str) -> VmwareResult<ContentLibrary> {
        let path = format!("/api/content/local-library/{library_id}");
        self.client.get::<ContentLibrary>(&path).await
    }

    /// Delete a local library and every item in it.
    pub async fn delete_local_library(&self, library_id: &str) -> VmwareResult<()> {
        let path = format!("/api/content/local-library/{library_id}");
        self.client.delete(&path).await
    }

    /// Find libraries by name. Returns identifiers.
    pub async fn find_libraries(&self, name: &str) -> VmwareResult<Vec<String>> {
        let spec = LibraryFindSpec {
            name: Some(name.to_string()),
            library_type: None,
        };
        self.client
            .post("/api/content/library?action=find", &spec)
            .await
    }

    // ── Items ───────────────────────────────────────────────────────

    /// Create a library item. Returns the item identifier.
    pub async fn create_item(
        &self,
        spec: &ItemCreateSpec,
        client_token: &str,
    ) -> VmwareResult<String> {
        self.client
            .post_with_token("/api/content/library/item", spec, client_token)
            .await
    }

    pub async fn get_item(&self, item_id: &str) -> VmwareResult<LibraryItem> {
        let path = format!("/api/content/library/item/{item_id}");
        self.client.get::<LibraryItem>(&path).await
    }

    pub async fn delete_item(&self, item_id: &str) -> VmwareResult<()> {
        let path = format!("/api/content/library/item/{item_id}");
        self.client.delete(&path).await
    }

    /// Find items by name, optionally within one library.
    pub async fn find_items(
        &self,
        name: &str,
        library_id: Option<&str>,
    ) -> VmwareResult<Vec<String>> {
        let spec = ItemFindSpec {
            name: Some(name.to_string()),
            library_id: library_id.map(str::to_string),
        };
        self.client
            .post("/api/content/library/item?action=find", &spec)
            .await
    }
}
