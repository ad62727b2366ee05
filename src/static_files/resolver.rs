//! Document root resolution
//!
//! Maps request paths onto files inside the document root, refusing anything
//! that resolves outside of it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::static_files::ServeError;

/// Longest path, including the terminating NUL, the platform accepts.
const PATH_MAX: usize = libc::PATH_MAX as usize;

/// Snapshot of a resolved file taken when the path was checked.
///
/// The size is not re-validated before the transfer starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    /// Canonical path of the file
    pub path: PathBuf,
    /// File size in bytes at resolve time
    pub size: u64,
}

/// The directory every served file must live under.
#[derive(Debug, Clone)]
pub struct DocumentRoot {
    root: PathBuf,
}

impl DocumentRoot {
    /// Opens an existing document root, canonicalizing it once.
    pub fn open(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref().canonicalize()?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("document root {} is not a directory", root.display()),
            ));
        }
        Ok(Self { root })
    }

    /// Creates the directory with mode `rwxr-xr-x` when it is missing, then
    /// opens it.
    pub fn create(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        if !root.exists() {
            create_dir(root)?;
            tracing::info!(path = %root.display(), "Created document root");
        }
        Self::open(root)
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolves `requested` (relative to the root, leading `/` ignored) to a
    /// regular file under the root.
    pub fn resolve(&self, requested: &str) -> Result<FileMetadata, ServeError> {
        let relative = requested.trim_start_matches('/');
        let joined = self.root.join(relative);

        if joined.as_os_str().len() + 1 > PATH_MAX {
            return Err(ServeError::PathTooLong);
        }

        let canonical = match joined.canonicalize() {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!(path = %joined.display(), error = %e, "Path did not resolve");
                return Err(ServeError::NotFound);
            }
        };

        if !canonical.starts_with(&self.root) {
            tracing::warn!(
                requested = requested,
                resolved = %canonical.display(),
                "Rejected path outside document root"
            );
            return Err(ServeError::Traversal);
        }

        let metadata = fs::metadata(&canonical).map_err(|_| ServeError::NotFound)?;
        if !metadata.is_file() {
            return Err(ServeError::NotFound);
        }

        Ok(FileMetadata {
            path: canonical,
            size: metadata.len(),
        })
    }
}

#[cfg(unix)]
fn create_dir(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new().recursive(true).mode(0o755).create(path)
}

#[cfg(not(unix))]
fn create_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}
