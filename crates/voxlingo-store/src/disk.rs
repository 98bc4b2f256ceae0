//! [`ArtifactStore`] over a flat directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tracing::{debug, info, warn};
use voxlingo_core::{ArtifactId, ArtifactKind, ArtifactStore, StoreError};

/// Artifact store writing `<uuid>.<ext>` files into one directory.
#[derive(Clone, Debug)]
pub struct DiskArtifactStore {
    root: PathBuf,
}

impl DiskArtifactStore {
    /// Store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Whether `path` carries one of the staged media extensions.
fn is_media(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ArtifactKind::from_extension)
        .is_some()
}

#[async_trait]
impl ArtifactStore for DiskArtifactStore {
    async fn put(&self, kind: ArtifactKind, bytes: &[u8]) -> Result<ArtifactId, StoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let id = ArtifactId::generate(kind);
        tokio::fs::write(self.locate(&id), bytes).await?;
        debug!(artifact = %id, bytes = bytes.len(), "artifact staged");
        Ok(id)
    }

    fn locate(&self, id: &ArtifactId) -> PathBuf {
        self.root.join(id.as_str())
    }

    async fn resolve(&self, id: &ArtifactId) -> Option<PathBuf> {
        let path = self.locate(id);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Some(path),
            _ => None,
        }
    }

    fn remove(&self, id: &ArtifactId) -> Result<bool, StoreError> {
        match std::fs::remove_file(self.locate(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn discard(&self, id: &ArtifactId) -> Result<bool, StoreError> {
        match tokio::fs::remove_file(self.locate(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn sweep(&self, max_age: Duration) -> Result<usize, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let now = SystemTime::now();
        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !is_media(&path) {
                continue;
            }
            let meta = match entry.metadata().await {
                Ok(meta) => meta,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot stat artifact");
                    continue;
                }
            };
            if !meta.is_file() {
                continue;
            }
            // Unknown or future mtimes count as age zero.
            let age = meta
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .unwrap_or(Duration::ZERO);
            if age < max_age {
                continue;
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove artifact"),
            }
        }

        info!(removed, dir = %self.root.display(), "artifact sweep finished");
        Ok(removed)
    }
}
