use std::io::{Read, Write};
use std::path::Path;
use std::time::SystemTime;

use crate::error::{FsError, Result};

/// Kind of a filesystem entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

/// Metadata for a single entry, as returned by [`FsBackend::stat`].
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub kind: EntryType,
    pub size: u64,
    pub mtime: SystemTime,
}

impl Metadata {
    pub fn is_file(&self) -> bool {
        self.kind == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryType::Directory
    }
}

/// Access check mode for [`FsBackend::access`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AccessMode {
    Exists,
    Read,
    Write,
}

/// Mode for [`FsBackend::open_write`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WriteMode {
    Truncate,
    Append,
}

/// FsBackend defines a common API for all virtual file systems (vfs) in the
/// crate. Every `path` parameter refers to the backend's own tree: an
/// absolute path whose root `/` is the backend root, regardless of where the
/// backend sits in a composition. Paths are normalized on entry (see
/// [`path::normalize`]); an unusable path fails with `InvalidPath`.
///
/// The trait is object-safe: the composition layer (`UnionFS`, `MountFS`,
/// `ReadOnlyFS`, the `FileSystem` facade) holds `Arc<dyn FsBackend>` so that
/// one backend instance can participate in several compositions at once.
pub trait FsBackend: Send + Sync {
    /// Returns true if `path` exists.
    fn exists(&self, path: &Path) -> bool;

    /// Checks if `path` is a regular file.
    /// Error returns in case the `path` does not exist.
    fn is_file(&self, path: &Path) -> Result<bool> {
        Ok(self.stat(path)?.is_file())
    }

    /// Checks if `path` is a directory.
    /// Error returns in case the `path` does not exist.
    fn is_dir(&self, path: &Path) -> Result<bool> {
        Ok(self.stat(path)?.is_dir())
    }

    /// Returns size, mtime and kind for `path`.
    fn stat(&self, path: &Path) -> Result<Metadata>;

    /// Whether `path` can be accessed in the given mode. Never errors; an
    /// unreachable path is simply not accessible.
    fn access(&self, path: &Path, mode: AccessMode) -> bool;

    /// Opens a readable byte stream over the file at `path`.
    /// Dropping the stream releases its resources.
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>>;

    /// Reads the entire contents of the file at `path`.
    fn read_all(&self, path: &Path) -> Result<Vec<u8>> {
        let mut stream = self.open_read(path)?;
        let mut content = Vec::new();
        stream
            .read_to_end(&mut content)
            .map_err(|e| FsError::from_io(e, path))?;
        Ok(content)
    }

    /// Returns the leaf names of the entries in the directory at `path`.
    /// Order is backend-specific but stable within a single call.
    fn listdir(&self, path: &Path) -> Result<Vec<String>>;

    /// Opens a writable byte stream at `path`, creating the file if absent.
    /// The parent directory must already exist. Fails with `IsADirectory`
    /// when `path` names a directory.
    fn open_write(&self, path: &Path, mode: WriteMode) -> Result<Box<dyn Write + Send>>;

    /// Creates the directory at `path`. With `parents`, missing intermediate
    /// directories are created and an existing directory is not an error.
    fn mkdir(&self, path: &Path, parents: bool) -> Result<()>;

    /// Removes the file at `path`.
    fn remove_file(&self, path: &Path) -> Result<()>;

    /// Removes the directory at `path`, which must be empty.
    fn remove_dir(&self, path: &Path) -> Result<()>;

    /// Renames `src` to `dst` within this backend.
    fn rename(&self, src: &Path, dst: &Path) -> Result<()>;
}

pub mod path {
    //! Pure path reasoning. No I/O happens here; `..` is resolved lexically,
    //! never by following symlinks.

    use std::path::{Component, Path, PathBuf};

    use crate::error::{FsError, Result};

    /// Normalizes an absolute `path` by dropping `.` components and resolving
    /// `..` against the preceding component. A `..` that would climb above
    /// the root is kept verbatim: it can never resolve inside a backend, and
    /// the OS backend rejects it outright.
    ///
    /// Fails with `InvalidPath` when `path` is empty, relative, or contains
    /// an embedded NUL.
    pub fn normalize<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(FsError::invalid_path(path));
        }
        if path.as_os_str().as_encoded_bytes().contains(&0) {
            return Err(FsError::invalid_path(path));
        }
        if !path.has_root() {
            return Err(FsError::invalid_path(path));
        }

        let mut result = PathBuf::from("/");
        for component in path.components() {
            match component {
                Component::RootDir | Component::CurDir => {}
                Component::ParentDir => match result.components().next_back() {
                    Some(Component::Normal(_)) => {
                        result.pop();
                    }
                    _ => result.push(".."),
                },
                Component::Normal(name) => result.push(name),
                Component::Prefix(_) => return Err(FsError::invalid_path(path)),
            }
        }
        Ok(result)
    }

    /// Splits a normalized `path` into `(parent, leaf)`.
    /// For the root, returns `("/", "")`.
    pub fn split<P: AsRef<Path>>(path: P) -> Result<(PathBuf, String)> {
        let path = normalize(path)?;
        if path == Path::new("/") {
            return Ok((PathBuf::from("/"), String::new()));
        }
        let parent = path
            .parent()
            .unwrap_or_else(|| Path::new("/"))
            .to_path_buf();
        let leaf = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok((parent, leaf))
    }

    /// Joins `tail` onto `base` and normalizes the result. An absolute
    /// `tail` replaces `base` entirely; a relative one is appended.
    pub fn join<P: AsRef<Path>, Q: AsRef<Path>>(base: P, tail: Q) -> Result<PathBuf> {
        let tail = tail.as_ref();
        if tail.has_root() {
            return normalize(tail);
        }
        normalize(base.as_ref().join(tail))
    }

    /// Returns the components of `path` beneath `base`, as a relative path.
    /// `relative_to("/a/b/c", "/a")` is `b/c`; `relative_to(p, p)` is empty.
    /// Fails with `NotUnderBase` if `path` is not a descendant of `base`.
    pub fn relative_to<P: AsRef<Path>, B: AsRef<Path>>(path: P, base: B) -> Result<PathBuf> {
        let path = normalize(&path)?;
        let base = normalize(&base)?;
        match path.strip_prefix(&base) {
            Ok(rest) => Ok(rest.to_path_buf()),
            Err(_) => Err(FsError::not_under_base(path, base)),
        }
    }

    /// Whether `prefix` is a prefix of `path` on component boundaries:
    /// `/a/b` is a prefix of `/a/b/c` but not of `/a/bb`.
    pub fn is_prefix<P: AsRef<Path>, Q: AsRef<Path>>(prefix: P, path: Q) -> bool {
        let Ok(prefix) = normalize(prefix) else {
            return false;
        };
        let Ok(path) = normalize(path) else {
            return false;
        };
        path.starts_with(prefix)
    }
}
