//! The storage driver contract and its `object_store`-backed implementation.

use crate::{CloudError, Result};
use bytes::Bytes;
use futures_util::TryStreamExt;
use object_store::path::Path as ObjectPath;
use object_store::{DynObjectStore, PutPayload};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::debug;

/// Capability contract for a blob storage backend.
///
/// One production implementation exists ([`crate::AzureBlobDriver`]); tests
/// exercise the same code path through [`ObjectStoreDriver`] bound to an
/// in-memory store.
pub trait Driver {
    /// Fetch the named blob and write it under the output folder, creating
    /// intermediate directories as needed. Returns the destination path.
    fn pull(&self, remote_name: &str) -> Result<PathBuf>;

    /// Upload a local file under `remote_name`, defaulting to the file's
    /// base name. An existing blob of the same name is overwritten.
    /// Returns the remote name used.
    fn push(&self, local_path: &Path, remote_name: Option<&str>) -> Result<String>;

    /// Names of the blobs in the container. With a filter, only names
    /// containing the filter as a substring are returned.
    fn list_blobs(&self, filter: Option<&str>) -> Result<Vec<String>>;
}

/// A [`Driver`] over any `object_store` backend.
///
/// All operations are synchronous one-shot calls bridged onto a Tokio runtime
/// owned by the driver. No retries, no buffering; transport errors propagate
/// verbatim.
pub struct ObjectStoreDriver {
    store: Arc<DynObjectStore>,
    runtime: Arc<Runtime>,
    output_folder: PathBuf,
}

impl ObjectStoreDriver {
    /// Bind a driver to an existing store and output folder.
    ///
    /// # Errors
    /// Returns an error if the internal Tokio runtime cannot be created.
    pub fn new(store: Arc<DynObjectStore>, output_folder: impl Into<PathBuf>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .thread_name("blobctl-cloud-worker")
            .build()
            .map_err(|e| CloudError::Runtime(format!("Failed to create Tokio runtime: {}", e)))?;

        Ok(ObjectStoreDriver {
            store,
            runtime: Arc::new(runtime),
            output_folder: output_folder.into(),
        })
    }

    /// The folder pulled blobs are written under.
    pub fn output_folder(&self) -> &Path {
        &self.output_folder
    }

    fn parse_name(name: &str) -> Result<ObjectPath> {
        ObjectPath::parse(name)
            .map_err(|e| CloudError::InvalidName(format!("'{}': {}", name, e)))
    }
}

impl Driver for ObjectStoreDriver {
    fn pull(&self, remote_name: &str) -> Result<PathBuf> {
        let location = Self::parse_name(remote_name)?;

        let data: Bytes = self.runtime.block_on(async {
            let result = self.store.get(&location).await?;
            result.bytes().await
        })?;

        let dst = self.output_folder.join(location.as_ref());
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }

        // write to a sibling then rename, so a partial download is never
        // visible under the final name
        let tmp = dst.with_file_name(format!(
            ".{}.part",
            dst.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "blob".to_string())
        ));
        fs::write(&tmp, &data)?;
        fs::rename(&tmp, &dst)?;

        debug!("pulled '{}' ({} bytes) to {:?}", remote_name, data.len(), dst);
        Ok(dst)
    }

    fn push(&self, local_path: &Path, remote_name: Option<&str>) -> Result<String> {
        let name = match remote_name {
            Some(name) => name.to_string(),
            None => local_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    CloudError::InvalidName(format!(
                        "cannot derive a remote name from {:?}",
                        local_path
                    ))
                })?,
        };
        let location = Self::parse_name(&name)?;

        let data = Bytes::from(fs::read(local_path)?);
        let len = data.len();

        self.runtime
            .block_on(async { self.store.put(&location, PutPayload::from(data)).await })?;

        debug!("pushed {:?} ({} bytes) as '{}'", local_path, len, name);
        Ok(name)
    }

    fn list_blobs(&self, filter: Option<&str>) -> Result<Vec<String>> {
        let names: Vec<String> = self.runtime.block_on(async {
            self.store
                .list(None)
                .map_ok(|meta| meta.location.to_string())
                .try_collect()
                .await
        })?;

        Ok(match filter {
            Some(filter) => names.into_iter().filter(|n| n.contains(filter)).collect(),
            None => names,
        })
    }
}

impl std::fmt::Debug for ObjectStoreDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreDriver")
            .field("output_folder", &self.output_folder)
            .finish_non_exhaustive()
    }
}
