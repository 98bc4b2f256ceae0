//! Scoped ownership of the staged upload.

use std::path::PathBuf;

use tracing::{debug, warn};
use voxlingo_core::{ArtifactId, ArtifactKind, ArtifactStore, StoreError};

/// RAII guard deleting the staged upload on drop, including on panic and
/// when the request future is dropped mid-flight.
///
/// The success path calls [`StagedUpload::release`] so the delete runs on the
/// async store API; `Drop` only fires for uploads that were never released.
pub(crate) struct StagedUpload<'a> {
    store: &'a dyn ArtifactStore,
    id: ArtifactId,
    path: PathBuf,
    released: bool,
}

impl<'a> StagedUpload<'a> {
    pub(crate) async fn stage(store: &'a dyn ArtifactStore, audio: &[u8]) -> Result<Self, StoreError> {
        let id = store.put(ArtifactKind::Upload, audio).await?;
        let path = store.locate(&id);
        Ok(Self {
            store,
            id,
            path,
            released: false,
        })
    }

    pub(crate) fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Delete the upload now. Failures are logged, never returned.
    pub(crate) async fn release(mut self) {
        self.released = true;
        match self.store.discard(&self.id).await {
            Ok(_) => debug!(artifact = %self.id, "upload released"),
            Err(e) => warn!(artifact = %self.id, error = %e, "failed to delete staged upload"),
        }
    }
}

impl Drop for StagedUpload<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match self.store.remove(&self.id) {
            Ok(_) => debug!(artifact = %self.id, "upload dropped"),
            Err(e) => warn!(artifact = %self.id, error = %e, "failed to delete staged upload"),
        }
    }
}
