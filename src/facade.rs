//! User-facing surface over a composed backend tree.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::{path, AccessMode, FsBackend, Metadata, WriteMode};
use crate::error::{FsError, Result};

/// Thin facade over one root [`FsBackend`].
///
/// The backend is usually a composition — a [`MountFS`](crate::MountFS)
/// wrapping [`UnionFS`](crate::UnionFS)es wrapping concrete backends — but
/// any backend works. The facade normalizes incoming paths, exposes the
/// backend capability set with `AsRef<Path>` ergonomics, and adds the
/// line-oriented and copy helpers, which are pure compositions over the
/// backend contract.
///
/// Cloning the facade clones the `Arc`, not the tree.
///
/// ### Example
///
/// ```
/// use std::sync::Arc;
/// use fs_stack::{FileSystem, MemoryFS};
///
/// let fs = FileSystem::new(Arc::new(MemoryFS::new()));
/// fs.mkdir("/notes", false).unwrap();
/// fs.writelines("/notes/todo", ["buy milk", "fix roof"]).unwrap();
/// assert_eq!(fs.read_one_line("/notes/todo").unwrap(), "buy milk");
/// ```
#[derive(Clone)]
pub struct FileSystem {
    backend: Arc<dyn FsBackend>,
}

impl FileSystem {
    pub fn new(backend: Arc<dyn FsBackend>) -> Self {
        Self { backend }
    }

    /// The root backend this facade answers from.
    pub fn backend(&self) -> &Arc<dyn FsBackend> {
        &self.backend
    }

    fn norm<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
        path::normalize(path)
    }

    // capability set

    pub fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        match Self::norm(path) {
            Ok(path) => self.backend.exists(&path),
            Err(_) => false,
        }
    }

    pub fn is_file<P: AsRef<Path>>(&self, path: P) -> Result<bool> {
        self.backend.is_file(&Self::norm(path)?)
    }

    pub fn is_dir<P: AsRef<Path>>(&self, path: P) -> Result<bool> {
        self.backend.is_dir(&Self::norm(path)?)
    }

    pub fn stat<P: AsRef<Path>>(&self, path: P) -> Result<Metadata> {
        self.backend.stat(&Self::norm(path)?)
    }

    pub fn access<P: AsRef<Path>>(&self, path: P, mode: AccessMode) -> bool {
        match Self::norm(path) {
            Ok(path) => self.backend.access(&path, mode),
            Err(_) => false,
        }
    }

    pub fn open_read<P: AsRef<Path>>(&self, path: P) -> Result<Box<dyn Read + Send>> {
        self.backend.open_read(&Self::norm(path)?)
    }

    pub fn read_all<P: AsRef<Path>>(&self, path: P) -> Result<Vec<u8>> {
        self.backend.read_all(&Self::norm(path)?)
    }

    pub fn listdir<P: AsRef<Path>>(&self, path: P) -> Result<Vec<String>> {
        self.backend.listdir(&Self::norm(path)?)
    }

    pub fn open_write<P: AsRef<Path>>(
        &self,
        path: P,
        mode: WriteMode,
    ) -> Result<Box<dyn Write + Send>> {
        self.backend.open_write(&Self::norm(path)?, mode)
    }

    pub fn mkdir<P: AsRef<Path>>(&self, path: P, parents: bool) -> Result<()> {
        self.backend.mkdir(&Self::norm(path)?, parents)
    }

    pub fn remove_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.backend.remove_file(&Self::norm(path)?)
    }

    pub fn remove_dir<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.backend.remove_dir(&Self::norm(path)?)
    }

    pub fn rename<P: AsRef<Path>, Q: AsRef<Path>>(&self, src: P, dst: Q) -> Result<()> {
        self.backend.rename(&Self::norm(src)?, &Self::norm(dst)?)
    }

    // helpers

    /// Reads the first line of a file, without its terminator.
    /// An empty file yields an empty string.
    ///
    /// Typically used to read a single-value file such as a password or a
    /// hostname.
    pub fn read_one_line<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let path = Self::norm(path)?;
        let stream = self.backend.open_read(&path)?;
        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| FsError::from_io(e, &path))?;
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    /// Reads all lines of a file, stripping the terminating `\n`s.
    pub fn readlines<P: AsRef<Path>>(&self, path: P) -> Result<Vec<String>> {
        let path = Self::norm(path)?;
        let stream = self.backend.open_read(&path)?;
        BufReader::new(stream)
            .lines()
            .collect::<io::Result<Vec<_>>>()
            .map_err(|e| FsError::from_io(e, &path))
    }

    /// Writes `lines` to a file, truncating it first. A `\n` is appended to
    /// every line.
    pub fn writelines<P, I, S>(&self, path: P, lines: I) -> Result<()>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let path = Self::norm(path)?;
        let mut stream = self.backend.open_write(&path, WriteMode::Truncate)?;
        for line in lines {
            stream
                .write_all(line.as_ref().as_bytes())
                .and_then(|_| stream.write_all(b"\n"))
                .map_err(|e| FsError::from_io(e, &path))?;
        }
        stream.flush().map_err(|e| FsError::from_io(e, &path))
    }

    /// Replaces the content of the file at `path` with `content`, creating
    /// the file if needed.
    pub fn write_all<P: AsRef<Path>>(&self, path: P, content: &[u8]) -> Result<()> {
        let path = Self::norm(path)?;
        let mut stream = self.backend.open_write(&path, WriteMode::Truncate)?;
        stream
            .write_all(content)
            .and_then(|_| stream.flush())
            .map_err(|e| FsError::from_io(e, &path))
    }

    /// Reads the file at `path` as UTF-8.
    pub fn read_to_string<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let path = Self::norm(path)?;
        let bytes = self.backend.read_all(&path)?;
        String::from_utf8(bytes)
            .map_err(|e| FsError::from_io(io::Error::new(io::ErrorKind::InvalidData, e), &path))
    }

    /// Stream-copies `src` to `dst` (truncating). The parent of `dst` must
    /// already exist. Returns the number of bytes copied.
    pub fn copy<P: AsRef<Path>, Q: AsRef<Path>>(&self, src: P, dst: Q) -> Result<u64> {
        let src = Self::norm(src)?;
        let dst = Self::norm(dst)?;
        let mut reader = self.backend.open_read(&src)?;
        let mut writer = self.backend.open_write(&dst, WriteMode::Truncate)?;
        let copied = io::copy(&mut reader, &mut writer).map_err(|e| FsError::from_io(e, &dst))?;
        writer.flush().map_err(|e| FsError::from_io(e, &dst))?;
        Ok(copied)
    }
}
