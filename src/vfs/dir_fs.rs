//! This module provides a virtual filesystem (VFS) implementation that maps
//! to a real directory on the host system. All operations are confined to a
//! designated root path; a logical path that would escape the root is
//! refused before any OS call is made.

use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};

use log::debug;

use crate::core::{path, AccessMode, EntryType, FsBackend, Metadata, WriteMode};
use crate::error::{FsError, Result};

/// A virtual filesystem (VFS) implementation rooted at a host directory.
///
/// Every logical path `p` is translated to the host path `root + p` after
/// normalization. The translation is purely lexical: `..` components are
/// resolved without consulting the OS, and a normalized path that still
/// starts with `..` is rejected with `InvalidPath`. Symlinks inside the root
/// are the OS's business and are not followed by the translation itself.
///
/// Key features:
/// - **Isolated root**: operations cannot name anything outside `root`.
/// - **Thin adapter**: the OS is the source of truth; no entry bookkeeping
///   happens on this side.
/// - **Error mapping**: OS error codes are folded into the crate taxonomy
///   (`NotFound`, `NotADirectory`, `PermissionDenied`, ...).
///
/// Example:
/// ```no_run
/// use std::path::Path;
/// use fs_stack::{FsBackend, OsFS};
///
/// let fs = OsFS::new(std::env::temp_dir().join("my_vfs")).unwrap();
/// fs.mkdir(Path::new("/docs"), false).unwrap();
/// assert!(fs.exists(Path::new("/docs")));
/// ```
pub struct OsFS {
    root: PathBuf,
}

impl OsFS {
    /// Creates a new `OsFS` rooted at `root` on the host.
    /// The root must be an absolute path; a missing root directory is
    /// created together with its parents.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        if root.as_os_str().is_empty() {
            return Err(FsError::invalid_path(root));
        }
        if root.is_relative() {
            return Err(FsError::invalid_path(root));
        }
        let root = path::normalize(root)?;
        if matches!(root.components().nth(1), Some(Component::ParentDir)) {
            return Err(FsError::invalid_path(&root));
        }
        if root.exists() {
            if !root.is_dir() {
                return Err(FsError::not_a_directory(&root));
            }
        } else {
            debug!("creating OsFS root {}", root.display());
            fs::create_dir_all(&root).map_err(|e| FsError::from_io(e, &root))?;
        }
        Ok(Self { root })
    }

    /// Returns the host path of the backend root.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Maps a logical path to its host path, refusing root escapes.
    fn to_host(&self, path: &Path) -> Result<PathBuf> {
        let inner = path::normalize(path)?;
        if matches!(inner.components().nth(1), Some(Component::ParentDir)) {
            return Err(FsError::invalid_path(&inner));
        }
        let rest = inner.strip_prefix("/").unwrap_or(&inner);
        Ok(self.root.join(rest))
    }
}

impl FsBackend for OsFS {
    fn exists(&self, path: &Path) -> bool {
        match self.to_host(path) {
            Ok(host) => host.exists(),
            Err(_) => false,
        }
    }

    fn stat(&self, path: &Path) -> Result<Metadata> {
        let host = self.to_host(path)?;
        let meta = fs::metadata(&host).map_err(|e| FsError::from_io(e, path))?;
        let kind = if meta.is_dir() {
            EntryType::Directory
        } else {
            EntryType::File
        };
        let mtime = meta.modified().map_err(|e| FsError::from_io(e, path))?;
        Ok(Metadata { kind, size: meta.len(), mtime })
    }

    fn access(&self, path: &Path, mode: AccessMode) -> bool {
        let Ok(host) = self.to_host(path) else {
            return false;
        };
        let Ok(meta) = fs::metadata(&host) else {
            return false;
        };
        match mode {
            AccessMode::Exists | AccessMode::Read => true,
            AccessMode::Write => !meta.permissions().readonly(),
        }
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let host = self.to_host(path)?;
        if host.is_dir() {
            return Err(FsError::is_a_directory(path));
        }
        let file = fs::File::open(&host).map_err(|e| FsError::from_io(e, path))?;
        Ok(Box::new(file))
    }

    fn read_all(&self, path: &Path) -> Result<Vec<u8>> {
        let host = self.to_host(path)?;
        if host.is_dir() {
            return Err(FsError::is_a_directory(path));
        }
        fs::read(&host).map_err(|e| FsError::from_io(e, path))
    }

    fn listdir(&self, path: &Path) -> Result<Vec<String>> {
        let host = self.to_host(path)?;
        let entries = fs::read_dir(&host).map_err(|e| FsError::from_io(e, path))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FsError::from_io(e, path))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn open_write(&self, path: &Path, mode: WriteMode) -> Result<Box<dyn Write + Send>> {
        let host = self.to_host(path)?;
        if host.is_dir() {
            return Err(FsError::is_a_directory(path));
        }
        let mut options = OpenOptions::new();
        match mode {
            WriteMode::Truncate => options.write(true).create(true).truncate(true),
            WriteMode::Append => options.append(true).create(true),
        };
        let file = options.open(&host).map_err(|e| FsError::from_io(e, path))?;
        Ok(Box::new(file))
    }

    fn mkdir(&self, path: &Path, parents: bool) -> Result<()> {
        let host = self.to_host(path)?;
        if parents {
            if host.is_file() {
                return Err(FsError::already_exists(path));
            }
            fs::create_dir_all(&host).map_err(|e| FsError::from_io(e, path))
        } else {
            fs::create_dir(&host).map_err(|e| FsError::from_io(e, path))
        }
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let host = self.to_host(path)?;
        if host.is_dir() {
            return Err(FsError::is_a_directory(path));
        }
        fs::remove_file(&host).map_err(|e| FsError::from_io(e, path))
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        let host = self.to_host(path)?;
        fs::remove_dir(&host).map_err(|e| FsError::from_io(e, path))
    }

    fn rename(&self, src: &Path, dst: &Path) -> Result<()> {
        let host_src = self.to_host(src)?;
        let host_dst = self.to_host(dst)?;
        fs::rename(&host_src, &host_dst).map_err(|e| FsError::from_io(e, src))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn p(s: &str) -> &Path {
        Path::new(s)
    }

    fn setup_test_env() -> TempDir {
        TempDir::new("osfs-test").unwrap()
    }

    mod creations {
        use super::*;

        #[test]
        fn test_new_existing_root() {
            let temp_dir = setup_test_env();
            let fs = OsFS::new(temp_dir.path()).unwrap();
            assert_eq!(fs.root(), temp_dir.path());
            assert!(fs.exists(p("/")));
        }

        #[test]
        fn test_new_creates_missing_root() {
            let temp_dir = setup_test_env();
            let nested = temp_dir.path().join("a/b/c");
            let fs = OsFS::new(&nested).unwrap();
            assert!(nested.is_dir());
            assert!(fs.exists(p("/")));
        }

        #[test]
        fn test_new_relative_root_fails() {
            assert!(matches!(
                OsFS::new("relative/root"),
                Err(FsError::InvalidPath { .. })
            ));
        }

        #[test]
        fn test_new_root_is_file_fails() {
            let temp_dir = setup_test_env();
            let file_path = temp_dir.path().join("file.txt");
            fs::write(&file_path, "content").unwrap();
            assert!(matches!(
                OsFS::new(&file_path),
                Err(FsError::NotADirectory { .. })
            ));
        }
    }

    mod escapes {
        use super::*;

        #[test]
        fn test_escape_refused() {
            let temp_dir = setup_test_env();
            let fs = OsFS::new(temp_dir.path()).unwrap();
            assert!(matches!(
                fs.read_all(p("/../etc/passwd")),
                Err(FsError::InvalidPath { .. })
            ));
            assert!(matches!(
                fs.open_write(p("/../escape"), WriteMode::Truncate),
                Err(FsError::InvalidPath { .. })
            ));
            assert!(!fs.exists(p("/../etc")));
        }

        #[test]
        fn test_inner_dotdot_stays_inside() {
            let temp_dir = setup_test_env();
            let fs = OsFS::new(temp_dir.path()).unwrap();
            fs.mkdir(p("/a"), false).unwrap();
            let mut w = fs.open_write(p("/a/../f"), WriteMode::Truncate).unwrap();
            w.write_all(b"x").unwrap();
            drop(w);
            assert!(temp_dir.path().join("f").is_file());
        }
    }

    mod read_write {
        use super::*;

        #[test]
        fn test_write_then_read() {
            let temp_dir = setup_test_env();
            let fs = OsFS::new(temp_dir.path()).unwrap();
            let mut w = fs.open_write(p("/data"), WriteMode::Truncate).unwrap();
            w.write_all(b"hello").unwrap();
            drop(w);
            assert_eq!(fs.read_all(p("/data")).unwrap(), b"hello");
            assert_eq!(fs.stat(p("/data")).unwrap().size, 5);
            assert!(fs.is_file(p("/data")).unwrap());
        }

        #[test]
        fn test_append() {
            let temp_dir = setup_test_env();
            let fs = OsFS::new(temp_dir.path()).unwrap();
            let mut w = fs.open_write(p("/log"), WriteMode::Append).unwrap();
            w.write_all(b"one").unwrap();
            drop(w);
            let mut w = fs.open_write(p("/log"), WriteMode::Append).unwrap();
            w.write_all(b"two").unwrap();
            drop(w);
            assert_eq!(fs.read_all(p("/log")).unwrap(), b"onetwo");
        }

        #[test]
        fn test_missing_file_is_not_found() {
            let temp_dir = setup_test_env();
            let fs = OsFS::new(temp_dir.path()).unwrap();
            assert!(matches!(
                fs.read_all(p("/missing")),
                Err(FsError::NotFound { .. })
            ));
        }

        #[test]
        fn test_read_dir_is_a_directory() {
            let temp_dir = setup_test_env();
            let fs = OsFS::new(temp_dir.path()).unwrap();
            fs.mkdir(p("/d"), false).unwrap();
            assert!(matches!(
                fs.open_read(p("/d")),
                Err(FsError::IsADirectory { .. })
            ));
        }
    }

    mod dirs {
        use super::*;

        #[test]
        fn test_mkdir_and_listdir() {
            let temp_dir = setup_test_env();
            let fs = OsFS::new(temp_dir.path()).unwrap();
            fs.mkdir(p("/docs"), false).unwrap();
            fs.open_write(p("/docs/a.txt"), WriteMode::Truncate).unwrap();
            fs.open_write(p("/docs/b.txt"), WriteMode::Truncate).unwrap();

            let mut names = fs.listdir(p("/docs")).unwrap();
            names.sort();
            assert_eq!(names, vec!["a.txt", "b.txt"]);
        }

        #[test]
        fn test_mkdir_missing_parent_fails() {
            let temp_dir = setup_test_env();
            let fs = OsFS::new(temp_dir.path()).unwrap();
            assert!(matches!(
                fs.mkdir(p("/a/b"), false),
                Err(FsError::NotFound { .. })
            ));
            fs.mkdir(p("/a/b"), true).unwrap();
            assert!(fs.is_dir(p("/a/b")).unwrap());
        }

        #[test]
        fn test_mkdir_over_file_fails() {
            let temp_dir = setup_test_env();
            let fs = OsFS::new(temp_dir.path()).unwrap();
            fs.open_write(p("/f"), WriteMode::Truncate).unwrap();
            assert!(matches!(
                fs.mkdir(p("/f"), true),
                Err(FsError::AlreadyExists { .. })
            ));
        }

        #[test]
        fn test_remove_dir_not_empty() {
            let temp_dir = setup_test_env();
            let fs = OsFS::new(temp_dir.path()).unwrap();
            fs.mkdir(p("/d"), false).unwrap();
            fs.open_write(p("/d/f"), WriteMode::Truncate).unwrap();
            assert!(matches!(
                fs.remove_dir(p("/d")),
                Err(FsError::NotEmpty { .. })
            ));
            fs.remove_file(p("/d/f")).unwrap();
            fs.remove_dir(p("/d")).unwrap();
        }
    }

    mod rename {
        use super::*;

        #[test]
        fn test_rename_within_backend() {
            let temp_dir = setup_test_env();
            let fs = OsFS::new(temp_dir.path()).unwrap();
            let mut w = fs.open_write(p("/old"), WriteMode::Truncate).unwrap();
            w.write_all(b"data").unwrap();
            drop(w);
            fs.rename(p("/old"), p("/new")).unwrap();
            assert!(!fs.exists(p("/old")));
            assert_eq!(fs.read_all(p("/new")).unwrap(), b"data");
        }
    }
}
