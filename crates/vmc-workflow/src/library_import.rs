//! Library-backed OVF import and export.
//!
//! Resolve a datastore, create (or reuse) a local content library backed by
//! it, create (or reuse) a library item, optionally push an OVF package into
//! the item and optionally pull it back out.

use std::path::PathBuf;

use vmc_vsphere::transfer::{collect_ovf_files, LocalFile};
use vmc_vsphere::types::{ItemCreateSpec, LibraryCreateSpec, LibraryType, StorageBacking};

use crate::api::{Connector, ResourceKind, ResourceReference, Scope, Session, VcenterEndpoint, VsphereApi};
use crate::artifacts::ArtifactKind;
use crate::error::{WorkflowError, WorkflowResult};
use crate::orchestrator::{ExistingPolicy, Orchestrator, WorkflowConfig, WorkflowRun, WorkflowState};

pub const DEFAULT_DATASTORE: &str = "WorkloadDatastore";
pub const DEFAULT_LIBRARY_NAME: &str = "demo-lib";
pub const DEFAULT_ITEM_NAME: &str = "simpleVmTemplate";

const LIBRARY_DESCRIPTION: &str = "Local library backed by VC datastore";
const ITEM_DESCRIPTION: &str = "Sample simple VM template";
const ITEM_TYPE: &str = "ovf";

/// Where to put exported files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    Directory(PathBuf),
    /// A fresh temporary directory named after the item. It is kept after
    /// the run so the files can be inspected.
    TempDir,
}

#[derive(Debug, Clone)]
pub struct LibraryImportOptions {
    pub datastore_name: String,
    pub library_name: String,
    pub item_name: String,
    /// Directory holding the OVF package to upload.
    pub ovf_dir: Option<PathBuf>,
    pub export: Option<ExportTarget>,
}

impl Default for LibraryImportOptions {
    fn default() -> Self {
        Self {
            datastore_name: DEFAULT_DATASTORE.to_string(),
            library_name: DEFAULT_LIBRARY_NAME.to_string(),
            item_name: DEFAULT_ITEM_NAME.to_string(),
            ovf_dir: None,
            export: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LibraryImportReport {
    pub datastore: ResourceReference,
    pub library_id: String,
    pub library_reused: bool,
    pub item_id: String,
    pub item_reused: bool,
    /// Names of the uploaded files.
    pub uploaded: Vec<String>,
    pub export_dir: Option<PathBuf>,
    pub downloaded: Vec<PathBuf>,
}

/// Run the import/export workflow against the vCenter at `endpoint`.
pub async fn import_library<K>(
    connector: &K,
    endpoint: &VcenterEndpoint,
    options: &LibraryImportOptions,
    config: WorkflowConfig,
) -> WorkflowRun<LibraryImportReport>
where
    K: Connector,
{
    let mut orch = Orchestrator::new(config);

    let connected = orch
        .call("connect", &endpoint.host, connector.connect(endpoint))
        .await;
    let mut session = match connected {
        Ok(s) => s,
        Err(e) => return orch.finish(None, Err(e)).await,
    };

    let outcome = run(&mut orch, &session, options).await;
    let result = orch.finish(Some(&session), outcome).await;

    if let Err(e) = session.close().await {
        log::warn!("Could not close session with {}: {}", session.endpoint(), e);
    }
    result
}

async fn run<A>(
    orch: &mut Orchestrator,
    api: &A,
    options: &LibraryImportOptions,
) -> WorkflowResult<LibraryImportReport>
where
    A: VsphereApi,
{
    orch.advance(WorkflowState::SessionEstablished)?;

    // Read the package before touching the server.
    let files = match &options.ovf_dir {
        Some(dir) => Some(local_package(dir)?),
        None => None,
    };

    let datastore = orch
        .resolve(api, ResourceKind::Datastore, &options.datastore_name, Scope::none())
        .await?;
    orch.advance(WorkflowState::ResourcesResolved)?;

    let (library_id, library_reused) = library(orch, api, options, &datastore).await?;
    let (item_id, item_reused) = item(orch, api, options, &library_id, library_reused).await?;
    orch.advance(WorkflowState::ArtifactCreated)?;

    let mut uploaded = Vec::new();
    if let Some(files) = files {
        orch.call("upload files", &options.item_name, api.upload_files(&item_id, &files))
            .await?;
        log::info!("Uploaded {} file(s) into '{}'", files.len(), options.item_name);
        uploaded = files.into_iter().map(|f| f.name).collect();
    }

    let mut export_dir = None;
    let mut downloaded = Vec::new();
    if let Some(target) = &options.export {
        let dir = export_directory(target, &options.item_name)?;
        downloaded = orch
            .call("download files", &options.item_name, api.download_files(&item_id, &dir))
            .await?;
        log::info!("Downloaded {} file(s) into {}", downloaded.len(), dir.display());

        if options.ovf_dir.is_some() && downloaded.len() != uploaded.len() {
            return Err(WorkflowError::remote(
                "download files",
                &options.item_name,
                vec![format!(
                    "downloaded {} file(s) but uploaded {}",
                    downloaded.len(),
                    uploaded.len()
                )],
            ));
        }
        export_dir = Some(dir);
    }
    orch.advance(WorkflowState::ActionPerformed)?;

    Ok(LibraryImportReport {
        datastore,
        library_id,
        library_reused,
        item_id,
        item_reused,
        uploaded,
        export_dir,
        downloaded,
    })
}

async fn library<A: VsphereApi>(
    orch: &mut Orchestrator,
    api: &A,
    options: &LibraryImportOptions,
    datastore: &ResourceReference,
) -> WorkflowResult<(String, bool)> {
    let name = &options.library_name;
    match orch.config().existing {
        ExistingPolicy::Fail => {
            if let Some(existing) = orch
                .find_any(api, ResourceKind::Library, name, Scope::none())
                .await?
            {
                return Err(WorkflowError::AlreadyExists {
                    kind: ResourceKind::Library,
                    name: name.clone(),
                    id: existing.id,
                });
            }
        }
        ExistingPolicy::Reuse => {
            if let Some(existing) = orch
                .find_existing(api, ResourceKind::Library, name, Scope::none())
                .await?
            {
                log::info!("Reusing library '{}' ({})", name, existing.id);
                return Ok((existing.id, true));
            }
        }
    }

    let spec = LibraryCreateSpec {
        name: name.clone(),
        description: Some(LIBRARY_DESCRIPTION.to_string()),
        library_type: LibraryType::Local,
        storage_backings: vec![StorageBacking::datastore(&datastore.id)],
    };
    let token = uuid::Uuid::new_v4().to_string();
    let id = orch
        .call("create Library", name, api.create_library(&spec, &token))
        .await?;
    orch.confirm_created(ArtifactKind::Library, name, &id, api.library_exists(&id))
        .await?;
    Ok((id, false))
}

async fn item<A: VsphereApi>(
    orch: &mut Orchestrator,
    api: &A,
    options: &LibraryImportOptions,
    library_id: &str,
    library_reused: bool,
) -> WorkflowResult<(String, bool)> {
    let name = &options.item_name;
    // A library this run created cannot hold the item yet.
    if library_reused {
        if let Some(existing) = orch
            .find_existing(api, ResourceKind::LibraryItem, name, Scope::library(library_id))
            .await?
        {
            log::info!("Reusing library item '{}' ({})", name, existing.id);
            return Ok((existing.id, true));
        }
    }

    let spec = ItemCreateSpec {
        name: name.clone(),
        description: Some(ITEM_DESCRIPTION.to_string()),
        library_id: library_id.to_string(),
        item_type: ITEM_TYPE.to_string(),
    };
    let token = uuid::Uuid::new_v4().to_string();
    let id = orch
        .call("create LibraryItem", name, api.create_item(&spec, &token))
        .await?;
    orch.confirm_created(ArtifactKind::LibraryItem, name, &id, api.item_exists(&id))
        .await?;
    Ok((id, false))
}

fn local_package(dir: &std::path::Path) -> WorkflowResult<Vec<LocalFile>> {
    let files = collect_ovf_files(dir).map_err(|e| {
        WorkflowError::Validation(format!("cannot read OVF directory {}: {}", dir.display(), e.message))
    })?;
    if files.is_empty() {
        return Err(WorkflowError::Validation(format!(
            "no OVF package files found in {}",
            dir.display()
        )));
    }
    Ok(files)
}

fn export_directory(target: &ExportTarget, item_name: &str) -> WorkflowResult<PathBuf> {
    match target {
        ExportTarget::Directory(dir) => Ok(dir.clone()),
        ExportTarget::TempDir => {
            let dir = tempfile::Builder::new()
                .prefix(&format!("{item_name}-"))
                .tempdir()
                .map_err(|e| WorkflowError::Validation(format!("cannot create export directory: {e}")))?;
            Ok(dir.into_path())
        }
    }
}
