//! Request-scoped temporary files.
//!
//! A [`TempResource`] owns exactly one path in the scratch directory and removes
//! it when dropped, whichever way the owning request ends: normal return, early
//! `?` return, or the request future being dropped mid-flight. Removal failures
//! are logged and swallowed so they can never replace the request's own result.

use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::error::ProcessingError;

const RESOURCE_PREFIX: &str = "docscrub-";
const RANDOM_LEN: usize = 16;

/// Directory in which temporary resources are created.
#[derive(Debug, Clone)]
pub struct ScratchArea {
    dir: PathBuf,
}

impl ScratchArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the scratch directory if it does not exist yet.
    pub async fn ensure_exists(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Write `data` to a freshly created, uniquely named file and return its guard.
    ///
    /// The file is created exclusively, so two concurrent requests can never
    /// end up sharing a name.
    pub async fn materialize(&self, data: &[u8]) -> Result<TempResource, ProcessingError> {
        let named = tempfile::Builder::new()
            .prefix(RESOURCE_PREFIX)
            .suffix(".pdf")
            .rand_bytes(RANDOM_LEN)
            .tempfile_in(&self.dir)
            .map_err(ProcessingError::io("Failed to create temporary input file"))?;

        let (file, path) = named.keep().map_err(|e| ProcessingError::Io {
            context: "Failed to create temporary input file",
            source: e.error,
        })?;
        // Guard first so a failed write still cleans up.
        let resource = TempResource::new(path);

        let mut file = tokio::fs::File::from_std(file);
        file.write_all(data)
            .await
            .map_err(ProcessingError::io("Failed to write upload to temporary file"))?;
        file.flush()
            .await
            .map_err(ProcessingError::io("Failed to write upload to temporary file"))?;

        tracing::debug!(
            path = %resource.path().display(),
            bytes = data.len(),
            "Materialized temporary input resource"
        );
        Ok(resource)
    }
}

/// Owned temporary file path, removed on drop if it exists.
#[derive(Debug)]
pub struct TempResource {
    path: PathBuf,
}

impl TempResource {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Guard for a sibling path named after this resource: `<stem>_<tag>.<extension>`.
    ///
    /// Random stems are alphanumeric and tags always add an underscore, so a
    /// derived name can never equal a materialized one, from this request or
    /// any other. Nothing is created on disk; whoever writes the path later
    /// (usually the tool) leaves it for this guard to remove.
    pub fn derive(&self, tag: &str, extension: &str) -> TempResource {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = format!("{}_{}.{}", stem, tag, extension);
        let path = match self.path.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        };
        TempResource::new(path)
    }

    /// Guard for `<file name><suffix>` next to this resource, for files a tool
    /// creates on its own beside the one it was given.
    pub fn with_suffix(&self, suffix: &str) -> TempResource {
        let mut path = self.path.clone().into_os_string();
        path.push(suffix);
        TempResource::new(PathBuf::from(path))
    }

    pub async fn write(&self, data: &[u8]) -> Result<(), ProcessingError> {
        tokio::fs::write(&self.path, data)
            .await
            .map_err(ProcessingError::io("Failed to write temporary file"))
    }

    /// Read the whole resource into memory.
    pub async fn read(&self) -> Result<Vec<u8>, ProcessingError> {
        tokio::fs::read(&self.path)
            .await
            .map_err(ProcessingError::io("Failed to read tool output"))
    }
}

impl Drop for TempResource {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Removed temporary resource");
            }
            // Never created, e.g. the tool failed before writing its output.
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove temporary resource"
                );
            }
        }
    }
}
