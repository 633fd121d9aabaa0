//! Advisory experiment lock.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{Error, Result};

/// An exclusive advisory lock on an experiment, released on drop.
///
/// Every process that loads and saves the same records must hold this lock
/// for the whole sequence; otherwise one writer's appended job can be lost
/// to another's save.
#[derive(Debug)]
pub struct ExperimentLock {
    file: File,
    path: PathBuf,
}

impl ExperimentLock {
    /// Blocks until the lock at `path` is acquired, creating the file if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the lock file cannot be opened or locked.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self> {
        let (file, path) = open(path.as_ref())?;
        file.lock_exclusive()
            .map_err(|e| Error::Storage(format!("{}: {e}", path.display())))?;
        trace_debug!(path = %path.display(), "acquired experiment lock");
        Ok(Self { file, path })
    }

    /// Acquires the lock if no one else holds it.
    ///
    /// Returns `Ok(None)` when the lock is held elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the lock file cannot be opened or locked.
    pub fn try_acquire(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let (file, path) = open(path.as_ref())?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { file, path })),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => Err(Error::Storage(format!("{}: {e}", path.display()))),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ExperimentLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn open(path: &Path) -> Result<(File, PathBuf)> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .map_err(|e| Error::Storage(format!("{}: {e}", path.display())))?;
    Ok((file, path.to_path_buf()))
}
