//! Library item file transfer through update / download sessions.
//!
//! Upload: create update session → add each file as a PUSH source → PUT the
//! bytes to the returned endpoint → complete → delete the session.
//! Download: create download session → list files → prepare each file →
//! poll until PREPARED → GET the bytes → delete the session.

use crate::error::{VmwareError, VmwareResult};
use crate::types::*;
use crate::vsphere::VsphereClient;

use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::time::Duration;

const UPDATE_SESSION: &str = "/api/content/library/item/update-session";
const DOWNLOAD_SESSION: &str = "/api/content/library/item/download-session";

/// Extensions that make up an OVF package on disk.
pub const OVF_PACKAGE_EXTENSIONS: &[&str] = &["ovf", "vmdk", "mf", "cert", "iso", "nvram"];

const PREPARE_POLL_INTERVAL: Duration = Duration::from_secs(1);
const PREPARE_MAX_POLLS: u32 = 300;

/// A file to push into a library item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Name the file gets inside the library item.
    pub name: String,
    pub path: PathBuf,
}

/// Collect the OVF package files found directly in `dir`, sorted by name.
pub fn collect_ovf_files(dir: &Path) -> VmwareResult<Vec<LocalFile>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| OVF_PACKAGE_EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(e)))
            .unwrap_or(false);
        if !matches {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            files.push(LocalFile { name: name.to_string(), path: path.clone() });
        }
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// File transfer for library items.
pub struct TransferManager<'a> {
    client: &'a VsphereClient,
}

impl<'a> TransferManager<'a> {
    pub fn new(client: &'a VsphereClient) -> Self {
        Self { client }
    }

    // ── Upload ──────────────────────────────────────────────────────

    /// Push every file into the item within one update session.
    pub async fn upload_files(
        &self,
        library_item_id: &str,
        files: &[LocalFile],
        client_token: &str,
    ) -> VmwareResult<()> {
        let spec = TransferSessionCreateSpec { library_item_id: library_item_id.to_string() };
        let session_id: String = self
            .client
            .post_with_token(UPDATE_SESSION, &spec, client_token)
            .await?;
        log::debug!("Update session {} opened for item {}", session_id, library_item_id);

        let pushed = self.push_all(&session_id, files).await;
        let finished = match pushed {
            Ok(()) => {
                self.client
                    .post_empty(&format!("{UPDATE_SESSION}/{session_id}?action=complete"))
                    .await
            }
            Err(e) => {
                let fail = serde_json::json!({ "client_error_message": e.message });
                if let Err(fe) = self
                    .client
                    .post_unit(&format!("{UPDATE_SESSION}/{session_id}?action=fail"), &fail)
                    .await
                {
                    log::warn!("Could not mark update session {} failed: {}", session_id, fe);
                }
                Err(e)
            }
        };

        if let Err(e) = self.client.delete(&format!("{UPDATE_SESSION}/{session_id}")).await {
            log::warn!("Could not delete update session {}: {}", session_id, e);
        }
        finished
    }

    async fn push_all(&self, session_id: &str, files: &[LocalFile]) -> VmwareResult<()> {
        for file in files {
            let data = tokio::fs::read(&file.path).await.map_err(|e| {
                VmwareError::io(format!("Cannot read {}: {e}", file.path.display()))
            })?;
            let add = UpdateFileAddSpec {
                name: file.name.clone(),
                source_type: SourceType::Push,
                size: Some(data.len() as u64),
            };
            let info: UpdateFileInfo = self
                .client
                .post(&format!("{UPDATE_SESSION}/{session_id}/file"), &add)
                .await?;
            let endpoint = info.upload_endpoint.ok_or_else(|| {
                VmwareError::transfer(format!("No upload endpoint returned for {}", file.name))
            })?;
            self.client.put_bytes(&endpoint.uri, Bytes::from(data)).await?;
            log::debug!("Uploaded {} to update session {}", file.name, session_id);
        }
        Ok(())
    }

    // ── Download ────────────────────────────────────────────────────

    /// Download every file of the item into `directory`. Returns the written paths.
    pub async fn download_files(
        &self,
        library_item_id: &str,
        directory: &Path,
        client_token: &str,
    ) -> VmwareResult<Vec<PathBuf>> {
        let spec = TransferSessionCreateSpec { library_item_id: library_item_id.to_string() };
        let session_id: String = self
            .client
            .post_with_token(DOWNLOAD_SESSION, &spec, client_token)
            .await?;
        log::debug!("Download session {} opened for item {}", session_id, library_item_id);

        let fetched = self.fetch_all(&session_id, directory).await;

        if let Err(e) = self.client.delete(&format!("{DOWNLOAD_SESSION}/{session_id}")).await {
            log::warn!("Could not delete download session {}: {}", session_id, e);
        }
        fetched
    }

    async fn fetch_all(&self, session_id: &str, directory: &Path) -> VmwareResult<Vec<PathBuf>> {
        let files: Vec<DownloadFileInfo> = self
            .client
            .get(&format!("{DOWNLOAD_SESSION}/{session_id}/file"))
            .await?;

        tokio::fs::create_dir_all(directory).await?;
        let mut written = Vec::with_capacity(files.len());
        for file in files {
            let prepare = PrepareFileSpec { file_name: file.name.clone() };
            self.client
                .post_unit(&format!("{DOWNLOAD_SESSION}/{session_id}/file?action=prepare"), &prepare)
                .await?;

            let uri = self.wait_prepared(session_id, &file.name).await?;
            let data = self.client.get_bytes(&uri).await?;

            let target = directory.join(safe_file_name(&file.name)?);
            tokio::fs::write(&target, &data).await?;
            log::debug!("Downloaded {} ({} bytes)", target.display(), data.len());
            written.push(target);
        }
        Ok(written)
    }

    async fn wait_prepared(&self, session_id: &str, file_name: &str) -> VmwareResult<String> {
        let params = vec![("file_name".to_string(), file_name.to_string())];
        for _ in 0..PREPARE_MAX_POLLS {
            let info: DownloadFileInfo = self
                .client
                .get_with_params(&format!("{DOWNLOAD_SESSION}/{session_id}/file"), &params)
                .await?;
            match info.status {
                PrepareStatus::Prepared => {
                    return info.download_endpoint.map(|e| e.uri).ok_or_else(|| {
                        VmwareError::transfer(format!("No download endpoint for {file_name}"))
                    });
                }
                PrepareStatus::Error => {
                    return Err(VmwareError::transfer(format!("Server failed to prepare {file_name}")));
                }
                _ => tokio::time::sleep(PREPARE_POLL_INTERVAL).await,
            }
        }
        Err(VmwareError::timeout(format!("{file_name} was never prepared for download")))
    }
}

/// Reject names that would escape the download directory.
fn safe_file_name(name: &str) -> VmwareResult<&str> {
    let p = Path::new(name);
    match p.file_name().and_then(|n| n.to_str()) {
        Some(n) if n == name => Ok(n),
        _ => Err(VmwareError::transfer(format!("Refusing unsafe file name '{name}'"))),
    }
}
