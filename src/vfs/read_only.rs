//! Read-only decorator over any backend.

use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use crate::core::{AccessMode, FsBackend, Metadata, WriteMode};
use crate::error::{FsError, Result};

/// Forwards every read and metadata operation to the wrapped backend and
/// rejects every mutating operation with `ReadOnly` before the inner backend
/// is touched. `access(path, Write)` reports `false` even when the inner
/// backend would allow the write.
///
/// Wrapping is cheap; the same inner backend may stay reachable elsewhere as
/// a writable handle.
pub struct ReadOnlyFS {
    inner: Arc<dyn FsBackend>,
}

impl ReadOnlyFS {
    pub fn new(inner: Arc<dyn FsBackend>) -> Self {
        Self { inner }
    }
}

impl FsBackend for ReadOnlyFS {
    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn is_file(&self, path: &Path) -> Result<bool> {
        self.inner.is_file(path)
    }

    fn is_dir(&self, path: &Path) -> Result<bool> {
        self.inner.is_dir(path)
    }

    fn stat(&self, path: &Path) -> Result<Metadata> {
        self.inner.stat(path)
    }

    fn access(&self, path: &Path, mode: AccessMode) -> bool {
        match mode {
            AccessMode::Write => false,
            AccessMode::Exists | AccessMode::Read => self.inner.access(path, mode),
        }
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        self.inner.open_read(path)
    }

    fn read_all(&self, path: &Path) -> Result<Vec<u8>> {
        self.inner.read_all(path)
    }

    fn listdir(&self, path: &Path) -> Result<Vec<String>> {
        self.inner.listdir(path)
    }

    fn open_write(&self, path: &Path, _mode: WriteMode) -> Result<Box<dyn Write + Send>> {
        Err(FsError::read_only(path))
    }

    fn mkdir(&self, path: &Path, _parents: bool) -> Result<()> {
        Err(FsError::read_only(path))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        Err(FsError::read_only(path))
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        Err(FsError::read_only(path))
    }

    fn rename(&self, src: &Path, _dst: &Path) -> Result<()> {
        Err(FsError::read_only(src))
    }
}
