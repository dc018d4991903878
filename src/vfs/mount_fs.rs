//! A UNIX-like tree of file systems: backends mounted at logical paths,
//! with each operation routed to the mount owning the longest matching
//! prefix of the path.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use log::debug;

use crate::core::{path, AccessMode, EntryType, FsBackend, Metadata, WriteMode};
use crate::error::{FsError, Result};

/// Routes every path operation to the backend whose mount path is the
/// longest component-aligned prefix of the operated path. The chosen backend
/// sees the path relativized to its mount point, so each backend keeps
/// believing its own root is `/`.
///
/// A mount point does not have to exist in any lower backend: mounting
/// creates the directory in the logical view, and every ancestor of a mount
/// point is a synthetic directory — it exists, lists its mount children, and
/// accepts no file operations.
///
/// Mounts are configured through `mount_fs`/`umount_fs` before the table is
/// shared. If no mount covers a path (no backend mounted at `/`), operations
/// on it fail with `NotFound`.
///
/// ### Example
///
/// ```
/// use std::path::Path;
/// use std::sync::Arc;
/// use fs_stack::{FsBackend, MemoryFS, MountFS};
///
/// let mut mount = MountFS::new();
/// mount.mount_fs("/", Arc::new(MemoryFS::new())).unwrap();
/// mount.mount_fs("/data", Arc::new(MemoryFS::new())).unwrap();
/// assert!(mount.is_dir(Path::new("/data")).unwrap());
/// ```
pub struct MountFS {
    mounts: BTreeMap<PathBuf, Arc<dyn FsBackend>>,
}

impl MountFS {
    /// Creates an empty mount table.
    pub fn new() -> Self {
        Self { mounts: BTreeMap::new() }
    }

    /// Mounts `fs` at `mount_path`. The path is normalized; mounting twice
    /// at the same path fails with `AlreadyExists`. The mount path does not
    /// need to exist in any already-mounted backend.
    pub fn mount_fs<P: AsRef<Path>>(
        &mut self,
        mount_path: P,
        fs: Arc<dyn FsBackend>,
    ) -> Result<()> {
        let mount_path = path::normalize(mount_path)?;
        if self.mounts.contains_key(&mount_path) {
            return Err(FsError::already_exists(&mount_path));
        }
        self.mounts.insert(mount_path, fs);
        Ok(())
    }

    /// Unmounts the backend at `mount_path`. An unknown mount path fails
    /// with `InvalidPath`; a mount with live mounts below it fails with
    /// `NotEmpty`.
    pub fn umount_fs<P: AsRef<Path>>(&mut self, mount_path: P) -> Result<()> {
        let mount_path = path::normalize(mount_path)?;
        if !self.mounts.contains_key(&mount_path) {
            return Err(FsError::invalid_path(&mount_path));
        }
        if self
            .mounts
            .keys()
            .any(|m| m != &mount_path && m.starts_with(&mount_path))
        {
            return Err(FsError::not_empty(&mount_path));
        }
        self.mounts.remove(&mount_path);
        Ok(())
    }

    /// Longest-prefix dispatch: walks the ancestor chain of `path` from the
    /// longest candidate down and returns `(anchor, backend, relativized)`.
    fn resolve(&self, path: &Path) -> Result<(PathBuf, &Arc<dyn FsBackend>, PathBuf)> {
        let mut anchor = path.to_path_buf();
        loop {
            if let Some(fs) = self.mounts.get(&anchor) {
                let rel = match path.strip_prefix(&anchor) {
                    Ok(rest) => Path::new("/").join(rest),
                    Err(_) => PathBuf::from("/"),
                };
                return Ok((anchor, fs, rel));
            }
            if !anchor.pop() {
                break;
            }
        }
        debug!("mount: no mount covers {}", path.display());
        Err(FsError::not_found(path))
    }

    /// Whether `path` is a mount point or an ancestor of one.
    fn covered(&self, path: &Path) -> bool {
        self.mounts.keys().any(|m| m.starts_with(path))
    }

    /// Whether `path` is a strict ancestor of a mount point: a directory
    /// that exists only because mounts live below it.
    fn synthetic_dir(&self, path: &Path) -> bool {
        self.mounts
            .keys()
            .any(|m| m != path && m.starts_with(path))
    }

    /// Immediate-child component names contributed by mounts below `path`.
    fn mount_children(&self, path: &Path) -> Vec<String> {
        let mut names = Vec::new();
        let mut seen = HashSet::new();
        for mount in self.mounts.keys() {
            if mount == path {
                continue;
            }
            let Ok(rest) = mount.strip_prefix(path) else {
                continue;
            };
            if let Some(first) = rest.components().next() {
                let name = first.as_os_str().to_string_lossy().into_owned();
                if seen.insert(name.clone()) {
                    names.push(name);
                }
            }
        }
        names
    }

    fn synthetic_metadata() -> Metadata {
        Metadata {
            kind: EntryType::Directory,
            size: 0,
            mtime: SystemTime::UNIX_EPOCH,
        }
    }
}

impl Default for MountFS {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MountFS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MountFS")?;
        f.debug_list()
            .entries(self.mounts.keys().map(|m| m.display().to_string()))
            .finish()
    }
}

impl FsBackend for MountFS {
    fn exists(&self, path: &Path) -> bool {
        let Ok(path) = path::normalize(path) else {
            return false;
        };
        if self.covered(&path) {
            return true;
        }
        match self.resolve(&path) {
            Ok((_, fs, rel)) => fs.exists(&rel),
            Err(_) => false,
        }
    }

    fn stat(&self, path: &Path) -> Result<Metadata> {
        let path = path::normalize(path)?;
        if self.covered(&path) {
            // a mount point answers through its backend when it can; a
            // synthetic ancestor (or a shadowed file) is a plain directory
            if let Ok((_, fs, rel)) = self.resolve(&path) {
                if let Ok(meta) = fs.stat(&rel) {
                    if meta.is_dir() {
                        return Ok(meta);
                    }
                }
            }
            return Ok(Self::synthetic_metadata());
        }
        let (_, fs, rel) = self.resolve(&path)?;
        fs.stat(&rel)
    }

    fn access(&self, path: &Path, mode: AccessMode) -> bool {
        let Ok(path) = path::normalize(path) else {
            return false;
        };
        if let Ok((_, fs, rel)) = self.resolve(&path) {
            if fs.access(&rel, mode) {
                return true;
            }
        }
        match mode {
            AccessMode::Exists | AccessMode::Read => self.covered(&path),
            AccessMode::Write => false,
        }
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let path = path::normalize(path)?;
        if self.synthetic_dir(&path) {
            return Err(FsError::is_a_directory(&path));
        }
        let (_, fs, rel) = self.resolve(&path)?;
        fs.open_read(&rel)
    }

    fn listdir(&self, path: &Path) -> Result<Vec<String>> {
        let path = path::normalize(path)?;
        let covered = self.covered(&path);
        let mut names = Vec::new();
        let mut seen = HashSet::new();

        match self.resolve(&path) {
            Ok((_, fs, rel)) => match fs.listdir(&rel) {
                Ok(list) => {
                    for name in list {
                        if seen.insert(name.clone()) {
                            names.push(name);
                        }
                    }
                }
                // a synthetic directory may have nothing behind it
                Err(FsError::NotFound { .. }) | Err(FsError::NotADirectory { .. })
                    if covered => {}
                Err(e) => return Err(e),
            },
            Err(_) if covered => {}
            Err(e) => return Err(e),
        }

        for name in self.mount_children(&path) {
            if seen.insert(name.clone()) {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn open_write(&self, path: &Path, mode: WriteMode) -> Result<Box<dyn Write + Send>> {
        let path = path::normalize(path)?;
        if self.covered(&path) {
            // mount points and their ancestors are directories
            return Err(FsError::is_a_directory(&path));
        }
        let (anchor, fs, rel) = self.resolve(&path)?;
        debug!(
            "mount: routing write of {} to mount {}",
            path.display(),
            anchor.display()
        );
        fs.open_write(&rel, mode)
    }

    fn mkdir(&self, path: &Path, parents: bool) -> Result<()> {
        let path = path::normalize(path)?;
        if self.covered(&path) {
            return if parents {
                Ok(())
            } else {
                Err(FsError::already_exists(&path))
            };
        }
        let (_, fs, rel) = self.resolve(&path)?;
        fs.mkdir(&rel, parents)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let path = path::normalize(path)?;
        if self.covered(&path) {
            return Err(FsError::is_a_directory(&path));
        }
        let (_, fs, rel) = self.resolve(&path)?;
        fs.remove_file(&rel)
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        let path = path::normalize(path)?;
        if self.synthetic_dir(&path) {
            // mounts below keep the directory alive
            return Err(FsError::not_empty(&path));
        }
        if self.mounts.contains_key(&path) {
            return Err(FsError::invalid_path(&path));
        }
        let (_, fs, rel) = self.resolve(&path)?;
        fs.remove_dir(&rel)
    }

    fn rename(&self, src: &Path, dst: &Path) -> Result<()> {
        let src = path::normalize(src)?;
        let dst = path::normalize(dst)?;
        if self.covered(&src) || self.covered(&dst) {
            return Err(FsError::invalid_path(&src));
        }
        let (src_anchor, fs, src_rel) = self.resolve(&src)?;
        let (dst_anchor, _, dst_rel) = self.resolve(&dst)?;
        if src_anchor != dst_anchor {
            return Err(FsError::cross_backend(&src, &dst));
        }
        fs.rename(&src_rel, &dst_rel)
    }
}
