//! Ephemeral scratch directories for intermediate files.
//!
//! A [`Workspace`] owns one uniquely-named temporary directory for the length
//! of a pipeline run. The directory is removed by [`Workspace::release`] or,
//! failing that, when the guard is dropped, so every exit path (including `?`
//! early returns and panics that unwind) cleans up.
//!
//! Names come from `tempfile`, which creates the directory atomically with a
//! random suffix; concurrent runs therefore never share a workspace.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Name of the single intermediate file a run produces.
const CROPPED_FILE: &str = "cropped.png";

/// Exclusively-owned scratch directory.
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl Workspace {
    /// Create a fresh directory named `<prefix><random>`.
    ///
    /// Created under `parent` when given, otherwise under the OS temp dir.
    pub fn acquire(prefix: &str, parent: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix);
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        let path = dir.path().to_path_buf();
        debug!(workspace = %path.display(), "acquired workspace");
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location of the crop step's output inside this workspace.
    pub fn cropped_path(&self) -> PathBuf {
        self.path.join(CROPPED_FILE)
    }

    /// Remove the directory and everything in it.
    ///
    /// Idempotent: releasing twice, or after the directory was removed by
    /// someone else, is not an error.
    pub fn release(&mut self) -> io::Result<()> {
        let Some(dir) = self.dir.take() else {
            return Ok(());
        };
        debug!(workspace = %self.path.display(), "releasing workspace");
        match dir.close() {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_creates_prefixed_directory() {
        let parent = TempDir::new().unwrap();
        let ws = Workspace::acquire("normalize-logo-", Some(parent.path())).unwrap();

        assert!(ws.path().is_dir());
        assert!(ws.path().starts_with(parent.path()));
        let name = ws.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("normalize-logo-"), "got {name}");
        assert_eq!(ws.cropped_path(), ws.path().join("cropped.png"));
    }

    #[test]
    fn acquire_without_parent_uses_temp_dir() {
        let mut ws = Workspace::acquire("brand-assets-test-", None).unwrap();
        assert!(ws.path().starts_with(std::env::temp_dir()));
        ws.release().unwrap();
    }

    #[test]
    fn each_acquire_is_unique() {
        let parent = TempDir::new().unwrap();
        let a = Workspace::acquire("x-", Some(parent.path())).unwrap();
        let b = Workspace::acquire("x-", Some(parent.path())).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn release_removes_directory_and_contents() {
        let parent = TempDir::new().unwrap();
        let mut ws = Workspace::acquire("x-", Some(parent.path())).unwrap();
        std::fs::write(ws.cropped_path(), b"data").unwrap();
        std::fs::create_dir(ws.path().join("nested")).unwrap();
        let path = ws.path().to_path_buf();

        ws.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn release_is_idempotent() {
        let parent = TempDir::new().unwrap();
        let mut ws = Workspace::acquire("x-", Some(parent.path())).unwrap();
        ws.release().unwrap();
        ws.release().unwrap();
    }

    #[test]
    fn release_tolerates_missing_directory() {
        let parent = TempDir::new().unwrap();
        let mut ws = Workspace::acquire("x-", Some(parent.path())).unwrap();
        std::fs::remove_dir_all(ws.path()).unwrap();
        ws.release().unwrap();
    }

    #[test]
    fn drop_removes_directory() {
        let parent = TempDir::new().unwrap();
        let path = {
            let ws = Workspace::acquire("x-", Some(parent.path())).unwrap();
            std::fs::write(ws.cropped_path(), b"data").unwrap();
            ws.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn acquire_in_missing_parent_errors() {
        let parent = TempDir::new().unwrap();
        let missing = parent.path().join("nope");
        assert!(Workspace::acquire("x-", Some(&missing)).is_err());
    }
}
