//! This module provides a virtual filesystem (VFS) implementation that keeps
//! the whole tree in process memory.

use std::io::{self, Cursor, Read, Write};
use std::path::{Component, Path};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use crate::core::{path, AccessMode, EntryType, FsBackend, Metadata, WriteMode};
use crate::error::{FsError, Result};

#[derive(Debug)]
struct FileData {
    bytes: Vec<u8>,
    mtime: SystemTime,
}

impl FileData {
    fn new() -> Self {
        Self { bytes: Vec::new(), mtime: SystemTime::now() }
    }
}

/// Shared cell behind every file node. Open write streams hold a clone, so a
/// file removed while a stream is open keeps accepting bytes the way an
/// unlinked open file does.
type FileCell = Arc<RwLock<FileData>>;

#[derive(Debug)]
enum MemNode {
    Dir(MemDir),
    File(FileCell),
}

#[derive(Debug)]
struct MemDir {
    mtime: SystemTime,
    children: Vec<(String, MemNode)>,
}

impl MemDir {
    fn new() -> Self {
        Self { mtime: SystemTime::now(), children: Vec::new() }
    }

    fn child(&self, name: &str) -> Option<&MemNode> {
        self.children
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut MemNode> {
        self.children
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    fn insert(&mut self, name: String, node: MemNode) {
        self.children.push((name, node));
        self.mtime = SystemTime::now();
    }

    fn remove(&mut self, name: &str) -> Option<MemNode> {
        let index = self.children.iter().position(|(n, _)| n == name)?;
        self.mtime = SystemTime::now();
        Some(self.children.remove(index).1)
    }
}

/// A virtual file system (VFS) implementation that stores file and directory
/// entries in an in-process tree.
///
/// `MemoryFS` is the reference implementation of the [`FsBackend`] contract:
/// it supports every operation, never touches the host filesystem, and is
/// the natural writable branch for overlays and the scratch backend for
/// tests.
///
/// ### Internal state
///
/// * The tree is a directory node holding named children in **insertion
///   order**; `listdir` reports that order and it stays stable for the
///   process lifetime.
/// * File content lives in a shared cell (`Arc<RwLock<..>>`). Read streams
///   take a snapshot at open time; write streams hold the cell and extend it
///   under its lock, updating the file's mtime.
///
/// ### Invariants
///
/// 1. The root `/` always exists and is a directory.
/// 2. Every child name is unique within its directory.
/// 3. Every node other than the root is reachable from the root; there are
///    no cycles (`rename` refuses to move a directory into itself).
///
/// ### Thread safety
///
/// The tree sits behind one `RwLock`, so each operation is internally
/// consistent: a reader racing a writer on the same file observes either the
/// pre- or the post-state. Callers that need cross-operation atomicity must
/// coordinate externally.
///
/// ### Example
///
/// ```
/// use std::io::Write;
/// use std::path::Path;
/// use fs_stack::{FsBackend, MemoryFS};
///
/// let fs = MemoryFS::new();
/// fs.mkdir(Path::new("/docs"), false).unwrap();
/// let mut w = fs.open_write(Path::new("/docs/note.txt"), fs_stack::WriteMode::Truncate).unwrap();
/// w.write_all(b"Hello").unwrap();
/// drop(w);
/// assert!(fs.exists(Path::new("/docs/note.txt")));
/// ```
#[derive(Debug)]
pub struct MemoryFS {
    root: RwLock<MemDir>,
}

impl MemoryFS {
    /// Creates an empty tree containing only the root directory.
    pub fn new() -> Self {
        Self { root: RwLock::new(MemDir::new()) }
    }

    fn read_tree(&self) -> std::sync::RwLockReadGuard<'_, MemDir> {
        self.root.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_tree(&self) -> std::sync::RwLockWriteGuard<'_, MemDir> {
        self.root.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryFS {
    fn default() -> Self {
        Self::new()
    }
}

/// Component names of a normalized path. A retained leading `..` flows
/// through as a literal name, which no directory ever contains.
fn names(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect()
}

/// Walks to the node at `path` (normalized, not `/`).
/// Fails with `NotFound` at the first missing component and `NotADirectory`
/// when descending into a file.
fn find<'a>(root: &'a MemDir, path: &Path) -> Result<&'a MemNode> {
    let names = names(path);
    let mut dir = root;
    for (i, name) in names.iter().enumerate() {
        let node = dir
            .child(name)
            .ok_or_else(|| FsError::not_found(path))?;
        if i + 1 == names.len() {
            return Ok(node);
        }
        match node {
            MemNode::Dir(d) => dir = d,
            MemNode::File(_) => return Err(FsError::not_a_directory(path)),
        }
    }
    Err(FsError::not_found(path))
}

fn find_dir<'a>(root: &'a MemDir, path: &Path) -> Result<&'a MemDir> {
    if path == Path::new("/") {
        return Ok(root);
    }
    match find(root, path)? {
        MemNode::Dir(dir) => Ok(dir),
        MemNode::File(_) => Err(FsError::not_a_directory(path)),
    }
}

fn find_dir_mut<'a>(root: &'a mut MemDir, path: &Path) -> Result<&'a mut MemDir> {
    if path == Path::new("/") {
        return Ok(root);
    }
    let names = names(path);
    let mut dir = root;
    for (i, name) in names.iter().enumerate() {
        let node = dir
            .child_mut(name)
            .ok_or_else(|| FsError::not_found(path))?;
        match node {
            MemNode::Dir(d) => dir = d,
            MemNode::File(_) => return Err(FsError::not_a_directory(path)),
        }
        if i + 1 == names.len() {
            return Ok(dir);
        }
    }
    Err(FsError::not_found(path))
}

/// Write stream over a file cell. Bytes land in the tree as they are
/// written; dropping the stream is the close.
struct MemWriter {
    file: FileCell,
}

impl Write for MemWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut data = self.file.write().unwrap_or_else(|e| e.into_inner());
        data.bytes.extend_from_slice(buf);
        data.mtime = SystemTime::now();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FsBackend for MemoryFS {
    fn exists(&self, path: &Path) -> bool {
        let Ok(path) = path::normalize(path) else {
            return false;
        };
        if path == Path::new("/") {
            return true;
        }
        find(&self.read_tree(), &path).is_ok()
    }

    fn stat(&self, path: &Path) -> Result<Metadata> {
        let path = path::normalize(path)?;
        let tree = self.read_tree();
        if path == Path::new("/") {
            return Ok(Metadata {
                kind: EntryType::Directory,
                size: 0,
                mtime: tree.mtime,
            });
        }
        match find(&tree, &path)? {
            MemNode::Dir(dir) => Ok(Metadata {
                kind: EntryType::Directory,
                size: 0,
                mtime: dir.mtime,
            }),
            MemNode::File(cell) => {
                let data = cell.read().unwrap_or_else(|e| e.into_inner());
                Ok(Metadata {
                    kind: EntryType::File,
                    size: data.bytes.len() as u64,
                    mtime: data.mtime,
                })
            }
        }
    }

    fn access(&self, path: &Path, _mode: AccessMode) -> bool {
        // memory entries carry no permission bits
        self.exists(path)
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let path = path::normalize(path)?;
        let tree = self.read_tree();
        if path == Path::new("/") {
            return Err(FsError::is_a_directory(&path));
        }
        match find(&tree, &path)? {
            MemNode::Dir(_) => Err(FsError::is_a_directory(&path)),
            MemNode::File(cell) => {
                let data = cell.read().unwrap_or_else(|e| e.into_inner());
                Ok(Box::new(Cursor::new(data.bytes.clone())))
            }
        }
    }

    fn read_all(&self, path: &Path) -> Result<Vec<u8>> {
        let path = path::normalize(path)?;
        let tree = self.read_tree();
        if path == Path::new("/") {
            return Err(FsError::is_a_directory(&path));
        }
        match find(&tree, &path)? {
            MemNode::Dir(_) => Err(FsError::is_a_directory(&path)),
            MemNode::File(cell) => {
                let data = cell.read().unwrap_or_else(|e| e.into_inner());
                Ok(data.bytes.clone())
            }
        }
    }

    fn listdir(&self, path: &Path) -> Result<Vec<String>> {
        let path = path::normalize(path)?;
        let tree = self.read_tree();
        let dir = find_dir(&tree, &path)?;
        Ok(dir.children.iter().map(|(name, _)| name.clone()).collect())
    }

    fn open_write(&self, path: &Path, mode: WriteMode) -> Result<Box<dyn Write + Send>> {
        let path = path::normalize(path)?;
        let (parent, leaf) = path::split(&path)?;
        if leaf.is_empty() {
            return Err(if path == Path::new("/") {
                FsError::is_a_directory(&path)
            } else {
                FsError::invalid_path(&path)
            });
        }

        let mut tree = self.write_tree();
        let dir = find_dir_mut(&mut tree, &parent)?;
        let cell = match dir.child(&leaf) {
            Some(MemNode::Dir(_)) => return Err(FsError::is_a_directory(&path)),
            Some(MemNode::File(cell)) => cell.clone(),
            None => {
                let cell: FileCell = Arc::new(RwLock::new(FileData::new()));
                dir.insert(leaf, MemNode::File(cell.clone()));
                cell
            }
        };
        if mode == WriteMode::Truncate {
            let mut data = cell.write().unwrap_or_else(|e| e.into_inner());
            data.bytes.clear();
            data.mtime = SystemTime::now();
        }
        Ok(Box::new(MemWriter { file: cell }))
    }

    fn mkdir(&self, path: &Path, parents: bool) -> Result<()> {
        let path = path::normalize(path)?;
        if path == Path::new("/") {
            return if parents {
                Ok(())
            } else {
                Err(FsError::already_exists(&path))
            };
        }

        let names = names(&path);
        let mut tree = self.write_tree();
        let mut dir: &mut MemDir = &mut tree;
        for (i, name) in names.iter().enumerate() {
            let last = i + 1 == names.len();
            if name == ".." {
                return Err(FsError::invalid_path(&path));
            }
            match dir.child(name) {
                Some(MemNode::File(_)) => {
                    return Err(if last {
                        FsError::already_exists(&path)
                    } else {
                        FsError::not_a_directory(&path)
                    });
                }
                Some(MemNode::Dir(_)) if last => {
                    return if parents {
                        Ok(())
                    } else {
                        Err(FsError::already_exists(&path))
                    };
                }
                Some(MemNode::Dir(_)) => {}
                None => {
                    if !last && !parents {
                        return Err(FsError::not_found(&path));
                    }
                    dir.insert(name.clone(), MemNode::Dir(MemDir::new()));
                    if last {
                        return Ok(());
                    }
                }
            }
            dir = match dir.child_mut(name) {
                Some(MemNode::Dir(d)) => d,
                _ => return Err(FsError::not_a_directory(&path)),
            };
        }
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let path = path::normalize(path)?;
        let (parent, leaf) = path::split(&path)?;
        if leaf.is_empty() {
            return Err(if path == Path::new("/") {
                FsError::is_a_directory(&path)
            } else {
                FsError::not_found(&path)
            });
        }

        let mut tree = self.write_tree();
        let dir = find_dir_mut(&mut tree, &parent)?;
        match dir.child(&leaf) {
            None => Err(FsError::not_found(&path)),
            Some(MemNode::Dir(_)) => Err(FsError::is_a_directory(&path)),
            Some(MemNode::File(_)) => {
                dir.remove(&leaf);
                Ok(())
            }
        }
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        let path = path::normalize(path)?;
        let (parent, leaf) = path::split(&path)?;
        if leaf.is_empty() {
            // the root cannot be removed
            return Err(FsError::invalid_path(&path));
        }

        let mut tree = self.write_tree();
        let dir = find_dir_mut(&mut tree, &parent)?;
        match dir.child(&leaf) {
            None => Err(FsError::not_found(&path)),
            Some(MemNode::File(_)) => Err(FsError::not_a_directory(&path)),
            Some(MemNode::Dir(d)) if !d.children.is_empty() => Err(FsError::not_empty(&path)),
            Some(MemNode::Dir(_)) => {
                dir.remove(&leaf);
                Ok(())
            }
        }
    }

    /// Atomic: the whole move happens under one write lock, so no observer
    /// sees the tree with the entry detached.
    fn rename(&self, src: &Path, dst: &Path) -> Result<()> {
        let src = path::normalize(src)?;
        let dst = path::normalize(dst)?;
        if src == Path::new("/") || dst == Path::new("/") {
            return Err(FsError::invalid_path(if src == Path::new("/") {
                &src
            } else {
                &dst
            }));
        }
        if src == dst {
            let tree = self.read_tree();
            return find(&tree, &src).map(|_| ());
        }
        if dst.starts_with(&src) {
            // moving a node into its own subtree would create a cycle
            return Err(FsError::invalid_path(&dst));
        }

        let (src_parent, src_leaf) = path::split(&src)?;
        let (dst_parent, dst_leaf) = path::split(&dst)?;
        if src_leaf.is_empty() || dst_leaf.is_empty() {
            return Err(FsError::invalid_path(if src_leaf.is_empty() { &src } else { &dst }));
        }

        let mut tree = self.write_tree();

        let src_is_dir = {
            let sp = find_dir(&tree, &src_parent)?;
            match sp.child(&src_leaf) {
                None => return Err(FsError::not_found(&src)),
                Some(MemNode::Dir(_)) => true,
                Some(MemNode::File(_)) => false,
            }
        };
        {
            let dp = find_dir(&tree, &dst_parent)?;
            match dp.child(&dst_leaf) {
                Some(MemNode::Dir(_)) => return Err(FsError::is_a_directory(&dst)),
                Some(MemNode::File(_)) if src_is_dir => {
                    return Err(FsError::already_exists(&dst))
                }
                _ => {}
            }
        }

        let node = find_dir_mut(&mut tree, &src_parent)?
            .remove(&src_leaf)
            .ok_or_else(|| FsError::not_found(&src))?;
        let dp = find_dir_mut(&mut tree, &dst_parent)?;
        dp.remove(&dst_leaf);
        dp.insert(dst_leaf, node);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn p(s: &str) -> &Path {
        Path::new(s)
    }

    mod creations {
        use super::*;

        #[test]
        fn test_new_memory_fs() {
            let fs = MemoryFS::new();
            assert!(fs.exists(p("/")));
            assert!(fs.is_dir(p("/")).unwrap());
            assert!(fs.listdir(p("/")).unwrap().is_empty());
        }

        #[test]
        fn test_root_cannot_be_removed() {
            let fs = MemoryFS::new();
            assert!(matches!(
                fs.remove_dir(p("/")),
                Err(FsError::InvalidPath { .. })
            ));
        }
    }

    mod reads {
        use super::*;

        #[test]
        fn test_read_missing_is_not_found() {
            let fs = MemoryFS::new();
            assert!(matches!(
                fs.read_all(p("/nope")),
                Err(FsError::NotFound { .. })
            ));
        }

        #[test]
        fn test_descending_into_file_is_not_a_directory() {
            let fs = MemoryFS::new();
            fs.open_write(p("/file"), WriteMode::Truncate).unwrap();
            assert!(matches!(
                fs.read_all(p("/file/below")),
                Err(FsError::NotADirectory { .. })
            ));
        }

        #[test]
        fn test_open_read_on_dir_is_a_directory() {
            let fs = MemoryFS::new();
            fs.mkdir(p("/d"), false).unwrap();
            assert!(matches!(
                fs.open_read(p("/d")),
                Err(FsError::IsADirectory { .. })
            ));
        }

        #[test]
        fn test_read_is_repeatable() {
            let fs = MemoryFS::new();
            let mut w = fs.open_write(p("/a"), WriteMode::Truncate).unwrap();
            w.write_all(b"stable").unwrap();
            drop(w);
            assert_eq!(fs.read_all(p("/a")).unwrap(), b"stable");
            assert_eq!(fs.read_all(p("/a")).unwrap(), b"stable");
        }

        #[test]
        fn test_reader_snapshot_is_isolated_from_later_writes() {
            let fs = MemoryFS::new();
            let mut w = fs.open_write(p("/a"), WriteMode::Truncate).unwrap();
            w.write_all(b"before").unwrap();
            drop(w);

            let mut reader = fs.open_read(p("/a")).unwrap();
            let mut w = fs.open_write(p("/a"), WriteMode::Truncate).unwrap();
            w.write_all(b"after").unwrap();
            drop(w);

            let mut seen = Vec::new();
            reader.read_to_end(&mut seen).unwrap();
            assert_eq!(seen, b"before");
        }
    }

    mod writes {
        use super::*;

        #[test]
        fn test_write_then_read_round_trip() {
            let fs = MemoryFS::new();
            let mut w = fs.open_write(p("/data"), WriteMode::Truncate).unwrap();
            w.write_all(b"hello").unwrap();
            drop(w);
            assert_eq!(fs.read_all(p("/data")).unwrap(), b"hello");
            assert_eq!(fs.stat(p("/data")).unwrap().size, 5);
        }

        #[test]
        fn test_truncate_replaces_content() {
            let fs = MemoryFS::new();
            let mut w = fs.open_write(p("/data"), WriteMode::Truncate).unwrap();
            w.write_all(b"long old content").unwrap();
            drop(w);
            let mut w = fs.open_write(p("/data"), WriteMode::Truncate).unwrap();
            w.write_all(b"new").unwrap();
            drop(w);
            assert_eq!(fs.read_all(p("/data")).unwrap(), b"new");
        }

        #[test]
        fn test_append_preserves_content() {
            let fs = MemoryFS::new();
            let mut w = fs.open_write(p("/data"), WriteMode::Truncate).unwrap();
            w.write_all(b"one,").unwrap();
            drop(w);
            let mut w = fs.open_write(p("/data"), WriteMode::Append).unwrap();
            w.write_all(b"two").unwrap();
            drop(w);
            assert_eq!(fs.read_all(p("/data")).unwrap(), b"one,two");
        }

        #[test]
        fn test_write_requires_existing_parent() {
            let fs = MemoryFS::new();
            assert!(matches!(
                fs.open_write(p("/missing/file"), WriteMode::Truncate),
                Err(FsError::NotFound { .. })
            ));
        }

        #[test]
        fn test_write_to_directory_fails() {
            let fs = MemoryFS::new();
            fs.mkdir(p("/d"), false).unwrap();
            assert!(matches!(
                fs.open_write(p("/d"), WriteMode::Truncate),
                Err(FsError::IsADirectory { .. })
            ));
        }
    }

    mod mkdir {
        use super::*;

        #[test]
        fn test_mkdir_single() {
            let fs = MemoryFS::new();
            fs.mkdir(p("/projects"), false).unwrap();
            assert!(fs.is_dir(p("/projects")).unwrap());
        }

        #[test]
        fn test_mkdir_missing_parent_fails_without_parents() {
            let fs = MemoryFS::new();
            assert!(matches!(
                fs.mkdir(p("/a/b/c"), false),
                Err(FsError::NotFound { .. })
            ));
        }

        #[test]
        fn test_mkdir_parents_creates_intermediates() {
            let fs = MemoryFS::new();
            fs.mkdir(p("/a/b/c"), true).unwrap();
            assert!(fs.is_dir(p("/a")).unwrap());
            assert!(fs.is_dir(p("/a/b")).unwrap());
            assert!(fs.is_dir(p("/a/b/c")).unwrap());
        }

        #[test]
        fn test_mkdir_existing_dir() {
            let fs = MemoryFS::new();
            fs.mkdir(p("/data"), false).unwrap();
            assert!(matches!(
                fs.mkdir(p("/data"), false),
                Err(FsError::AlreadyExists { .. })
            ));
            // idempotent with parents
            fs.mkdir(p("/data"), true).unwrap();
        }

        #[test]
        fn test_mkdir_over_file_fails() {
            let fs = MemoryFS::new();
            fs.open_write(p("/data"), WriteMode::Truncate).unwrap();
            assert!(matches!(
                fs.mkdir(p("/data"), true),
                Err(FsError::AlreadyExists { .. })
            ));
        }
    }

    mod listdir {
        use super::*;

        #[test]
        fn test_listdir_insertion_order() {
            let fs = MemoryFS::new();
            fs.open_write(p("/zeta"), WriteMode::Truncate).unwrap();
            fs.mkdir(p("/alpha"), false).unwrap();
            fs.open_write(p("/midway"), WriteMode::Truncate).unwrap();
            assert_eq!(fs.listdir(p("/")).unwrap(), vec!["zeta", "alpha", "midway"]);
        }

        #[test]
        fn test_listdir_on_file_fails() {
            let fs = MemoryFS::new();
            fs.open_write(p("/f"), WriteMode::Truncate).unwrap();
            assert!(matches!(
                fs.listdir(p("/f")),
                Err(FsError::NotADirectory { .. })
            ));
        }
    }

    mod remove {
        use super::*;

        #[test]
        fn test_remove_file() {
            let fs = MemoryFS::new();
            fs.open_write(p("/f"), WriteMode::Truncate).unwrap();
            fs.remove_file(p("/f")).unwrap();
            assert!(!fs.exists(p("/f")));
        }

        #[test]
        fn test_remove_file_on_dir_fails() {
            let fs = MemoryFS::new();
            fs.mkdir(p("/d"), false).unwrap();
            assert!(matches!(
                fs.remove_file(p("/d")),
                Err(FsError::IsADirectory { .. })
            ));
        }

        #[test]
        fn test_remove_dir_must_be_empty() {
            let fs = MemoryFS::new();
            fs.mkdir(p("/d"), false).unwrap();
            fs.open_write(p("/d/f"), WriteMode::Truncate).unwrap();
            assert!(matches!(
                fs.remove_dir(p("/d")),
                Err(FsError::NotEmpty { .. })
            ));
            fs.remove_file(p("/d/f")).unwrap();
            fs.remove_dir(p("/d")).unwrap();
            assert!(!fs.exists(p("/d")));
        }
    }

    mod rename {
        use super::*;

        #[test]
        fn test_rename_file() {
            let fs = MemoryFS::new();
            fs.mkdir(p("/a"), false).unwrap();
            fs.mkdir(p("/b"), false).unwrap();
            let mut w = fs.open_write(p("/a/f"), WriteMode::Truncate).unwrap();
            w.write_all(b"payload").unwrap();
            drop(w);

            fs.rename(p("/a/f"), p("/b/g")).unwrap();
            assert!(!fs.exists(p("/a/f")));
            assert_eq!(fs.read_all(p("/b/g")).unwrap(), b"payload");
        }

        #[test]
        fn test_rename_replaces_existing_file() {
            let fs = MemoryFS::new();
            let mut w = fs.open_write(p("/old"), WriteMode::Truncate).unwrap();
            w.write_all(b"old").unwrap();
            drop(w);
            let mut w = fs.open_write(p("/new"), WriteMode::Truncate).unwrap();
            w.write_all(b"new").unwrap();
            drop(w);

            fs.rename(p("/new"), p("/old")).unwrap();
            assert_eq!(fs.read_all(p("/old")).unwrap(), b"new");
            assert!(!fs.exists(p("/new")));
        }

        #[test]
        fn test_rename_dir_keeps_contents() {
            let fs = MemoryFS::new();
            fs.mkdir(p("/src/deep"), true).unwrap();
            fs.open_write(p("/src/deep/f"), WriteMode::Truncate).unwrap();
            fs.rename(p("/src"), p("/dst")).unwrap();
            assert!(fs.exists(p("/dst/deep/f")));
            assert!(!fs.exists(p("/src")));
        }

        #[test]
        fn test_rename_into_own_subtree_fails() {
            let fs = MemoryFS::new();
            fs.mkdir(p("/a/b"), true).unwrap();
            assert!(matches!(
                fs.rename(p("/a"), p("/a/b/c")),
                Err(FsError::InvalidPath { .. })
            ));
        }

        #[test]
        fn test_rename_missing_source_fails() {
            let fs = MemoryFS::new();
            assert!(matches!(
                fs.rename(p("/nope"), p("/x")),
                Err(FsError::NotFound { .. })
            ));
        }
    }
}
