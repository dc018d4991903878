//! Union (overlay) filesystem: several ranked branches presented as one
//! tree, with reads answered by the most visible branch and writes routed to
//! a writable branch.

use std::collections::HashSet;
use std::fmt;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};

use crate::core::{path, AccessMode, FsBackend, Metadata, WriteMode};
use crate::error::{FsError, Result};

struct Branch {
    fs: Arc<dyn FsBackend>,
    name: String,
    rank: u32,
    writable: bool,
}

/// Merges N ranked branches into one logical tree.
///
/// Branches are ordered by `rank` ascending; a lower rank is more visible.
/// Equal ranks are ordered by insertion (earlier added wins). Reads are
/// answered by the first branch where the path exists; directory listings
/// are the union over every branch that has the directory; writes go to the
/// most visible writable branch, shadowing lower branches rather than
/// promoting their content (there is no copy-on-write here: a file modified
/// through the union is written fresh into the writable branch).
///
/// Branches are added before the union is shared; the composition itself is
/// immutable afterwards, which keeps path operations lock-free.
///
/// ### Example
///
/// ```
/// use std::path::Path;
/// use std::sync::Arc;
/// use fs_stack::{FsBackend, MemoryFS, ReadOnlyFS, UnionFS, WriteMode};
///
/// let base = Arc::new(MemoryFS::new());
/// base.open_write(Path::new("/motd"), WriteMode::Truncate).unwrap();
///
/// let mut union = UnionFS::new();
/// union.add_branch(Arc::new(MemoryFS::new()), "upper", Some(0), true).unwrap();
/// union.add_branch(Arc::new(ReadOnlyFS::new(base)), "lower", Some(1), false).unwrap();
/// assert!(union.exists(Path::new("/motd")));
/// ```
pub struct UnionFS {
    branches: Vec<Branch>,
}

impl UnionFS {
    /// Creates a union with no branches. Until a branch is added, every
    /// lookup fails with `NotFound` and every write with `ReadOnly`.
    pub fn new() -> Self {
        Self { branches: Vec::new() }
    }

    /// Adds a branch.
    ///
    /// * `name` — unique reference for the branch (used in diagnostics and
    ///   in `PartialRemove` errors).
    /// * `rank` — visibility, lower is more visible; `None` places the
    ///   branch below every existing one.
    /// * `writable` — whether writes may be routed here. The caller is
    ///   declaring intent; adding a read-only wrapped backend as writable
    ///   will simply make every routed write fail.
    pub fn add_branch(
        &mut self,
        fs: Arc<dyn FsBackend>,
        name: &str,
        rank: Option<u32>,
        writable: bool,
    ) -> Result<()> {
        if self.branches.iter().any(|b| b.name == name) {
            return Err(FsError::already_exists(name));
        }
        let rank = rank.unwrap_or_else(|| {
            self.branches
                .iter()
                .map(|b| b.rank + 1)
                .max()
                .unwrap_or(0)
        });
        self.branches.push(Branch {
            fs,
            name: name.to_string(),
            rank,
            writable,
        });
        // stable sort: insertion order breaks equal-rank ties
        self.branches.sort_by_key(|b| b.rank);
        Ok(())
    }

    /// Removes the branch registered under `name`.
    pub fn remove_branch(&mut self, name: &str) -> Result<()> {
        let index = self
            .branches
            .iter()
            .position(|b| b.name == name)
            .ok_or_else(|| FsError::not_found(name))?;
        self.branches.remove(index);
        Ok(())
    }

    /// First branch where `path` exists, in visibility order. A branch where
    /// the path (or one of its parents) is missing is skipped; any other
    /// branch failure aborts the walk.
    fn lookup(&self, path: &Path) -> Result<(&Branch, Metadata)> {
        for branch in &self.branches {
            match branch.fs.stat(path) {
                Ok(meta) => return Ok((branch, meta)),
                Err(FsError::NotFound { .. }) | Err(FsError::NotADirectory { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(FsError::not_found(path))
    }

    /// The most visible writable branch, if any.
    fn write_branch(&self) -> Option<&Branch> {
        self.branches.iter().find(|b| b.writable)
    }

    /// Routes a mutation to the write branch, materializing `parent` there
    /// first. The parent must already be a directory in the union view.
    fn write_branch_for(&self, path: &Path, parent: &Path) -> Result<&Branch> {
        match self.lookup(parent) {
            Ok((_, meta)) if meta.is_dir() => {}
            Ok(_) => return Err(FsError::not_a_directory(parent)),
            Err(e) => return Err(e),
        }
        let branch = self.write_branch().ok_or_else(|| FsError::read_only(path))?;
        if !branch.fs.exists(parent) {
            branch.fs.mkdir(parent, true)?;
        }
        Ok(branch)
    }
}

impl Default for UnionFS {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UnionFS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnionFS")?;
        let mut list = f.debug_list();
        for b in &self.branches {
            list.entry(&format_args!(
                "{}(rank={}, {})",
                b.name,
                b.rank,
                if b.writable { "rw" } else { "ro" }
            ));
        }
        list.finish()
    }
}

impl FsBackend for UnionFS {
    fn exists(&self, path: &Path) -> bool {
        let Ok(path) = path::normalize(path) else {
            return false;
        };
        self.branches.iter().any(|b| b.fs.exists(&path))
    }

    fn stat(&self, path: &Path) -> Result<Metadata> {
        let path = path::normalize(path)?;
        self.lookup(&path).map(|(_, meta)| meta)
    }

    fn access(&self, path: &Path, mode: AccessMode) -> bool {
        let Ok(path) = path::normalize(path) else {
            return false;
        };
        match self.lookup(&path) {
            Ok((branch, _)) => branch.fs.access(&path, mode),
            Err(_) => false,
        }
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let path = path::normalize(path)?;
        let (branch, _) = self.lookup(&path)?;
        branch.fs.open_read(&path)
    }

    fn read_all(&self, path: &Path) -> Result<Vec<u8>> {
        let path = path::normalize(path)?;
        let (branch, _) = self.lookup(&path)?;
        branch.fs.read_all(&path)
    }

    /// Union of the listings of every branch where `path` is a directory,
    /// deduplicated, in first-seen (visibility) order.
    fn listdir(&self, path: &Path) -> Result<Vec<String>> {
        let path = path::normalize(path)?;
        let mut found_any = false;
        let mut found_dir = false;
        let mut names = Vec::new();
        let mut seen = HashSet::new();
        for branch in &self.branches {
            match branch.fs.stat(&path) {
                Ok(meta) if meta.is_dir() => {
                    found_any = true;
                    found_dir = true;
                    for name in branch.fs.listdir(&path)? {
                        if seen.insert(name.clone()) {
                            names.push(name);
                        }
                    }
                }
                Ok(_) => found_any = true,
                Err(FsError::NotFound { .. }) | Err(FsError::NotADirectory { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        if !found_any {
            return Err(FsError::not_found(&path));
        }
        if !found_dir {
            return Err(FsError::not_a_directory(&path));
        }
        Ok(names)
    }

    fn open_write(&self, path: &Path, mode: WriteMode) -> Result<Box<dyn Write + Send>> {
        let path = path::normalize(path)?;
        if let Ok((_, meta)) = self.lookup(&path) {
            if meta.is_dir() {
                return Err(FsError::is_a_directory(&path));
            }
        }
        let (parent, leaf) = path::split(&path)?;
        if leaf.is_empty() {
            return Err(FsError::is_a_directory(&path));
        }
        let branch = self.write_branch_for(&path, &parent)?;
        debug!(
            "union: routing write of {} to branch '{}'",
            path.display(),
            branch.name
        );
        branch.fs.open_write(&path, mode)
    }

    fn mkdir(&self, path: &Path, parents: bool) -> Result<()> {
        let path = path::normalize(path)?;
        match self.lookup(&path) {
            // directories are implicitly unioned: an existing one is fine
            Ok((_, meta)) => {
                return if meta.is_dir() {
                    Ok(())
                } else {
                    Err(FsError::already_exists(&path))
                };
            }
            Err(FsError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        if parents {
            let branch = self.write_branch().ok_or_else(|| FsError::read_only(&path))?;
            return branch.fs.mkdir(&path, true);
        }
        let (parent, _) = path::split(&path)?;
        let branch = self.write_branch_for(&path, &parent)?;
        branch.fs.mkdir(&path, true)
    }

    /// Removes `path` from every branch that contains it as a file.
    ///
    /// If any containing branch is not writable the whole operation is
    /// refused with `ReadOnly` and no branch is touched. Once removal has
    /// started, a failing branch aborts the walk with `PartialRemove`;
    /// branches already processed are NOT rolled back. This is the one
    /// non-atomic operation in the crate.
    fn remove_file(&self, path: &Path) -> Result<()> {
        let path = path::normalize(path)?;
        let (_, meta) = self.lookup(&path)?;
        if meta.is_dir() {
            return Err(FsError::is_a_directory(&path));
        }

        let mut containing = Vec::new();
        for branch in &self.branches {
            match branch.fs.stat(&path) {
                Ok(meta) if meta.is_file() => containing.push(branch),
                Ok(_) => {}
                Err(FsError::NotFound { .. }) | Err(FsError::NotADirectory { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        if containing.iter().any(|b| !b.writable) {
            return Err(FsError::read_only(&path));
        }
        for branch in containing {
            if let Err(e) = branch.fs.remove_file(&path) {
                warn!(
                    "union: removal of {} failed in branch '{}', earlier branches not rolled back",
                    path.display(),
                    branch.name
                );
                return Err(FsError::PartialRemove {
                    branch: branch.name.clone(),
                    path: path.clone(),
                    source: Box::new(e),
                });
            }
        }
        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        let path = path::normalize(path)?;

        let mut found_any = false;
        let mut found_dir = false;
        let mut readonly_present = false;
        let mut containing = Vec::new();
        for branch in &self.branches {
            match branch.fs.stat(&path) {
                Ok(meta) => {
                    found_any = true;
                    found_dir |= meta.is_dir();
                    if branch.writable {
                        containing.push((branch, meta));
                    } else {
                        // removing from writable branches only would leave a shadow
                        readonly_present = true;
                    }
                }
                Err(FsError::NotFound { .. }) | Err(FsError::NotADirectory { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        if !found_any {
            return Err(FsError::not_found(&path));
        }
        if !found_dir {
            return Err(FsError::not_a_directory(&path));
        }
        if !self.listdir(&path)?.is_empty() {
            return Err(FsError::not_empty(&path));
        }
        if readonly_present {
            return Err(FsError::read_only(&path));
        }
        for (branch, meta) in containing {
            if meta.is_dir() {
                branch.fs.remove_dir(&path)?;
            } else {
                branch.fs.remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Supported only when the branch that answers reads for `src` is also
    /// the branch writes are routed to; everything else is `CrossBackend`.
    fn rename(&self, src: &Path, dst: &Path) -> Result<()> {
        let src = path::normalize(src)?;
        let dst = path::normalize(dst)?;

        let (src_branch, _) = self.lookup(&src)?;
        let write_branch = self
            .write_branch()
            .ok_or_else(|| FsError::read_only(&src))?;
        if !src_branch.writable || !std::ptr::eq(src_branch, write_branch) {
            return Err(FsError::cross_backend(&src, &dst));
        }
        src_branch.fs.rename(&src, &dst)
    }
}
