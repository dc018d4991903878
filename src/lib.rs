//! Composable virtual file systems (VFS) for Rust: one path-addressed API,
//! many storage backends behind it.
//!
//! `fs-stack` lets a program declare its storage layout instead of wiring
//! backend-awareness through application code. A [`FileSystem`] facade holds
//! one root [`FsBackend`]; that backend is usually a small tree of
//! compositions over concrete storage:
//!
//! - [`MemoryFS`] — in-process tree, the reference backend and test staple.
//! - [`OsFS`] — a real directory on the host, confined to its root.
//! - [`ReadOnlyFS`] — decorator that rejects every mutation.
//! - [`UnionFS`] — ranked overlay of branches; reads see the most visible
//!   branch, writes land in a writable branch and shadow the rest.
//! - [`MountFS`] — a mount table dispatching each path to the backend with
//!   the longest matching mount prefix.
//!
//! **Key ideas**:
//! - **Abstraction**: one trait covers real directories, memory trees, and
//!   composed overlays.
//! - **Safety**: `OsFS` refuses any path that would lexically escape its
//!   root; `ReadOnlyFS` guards whole subtrees.
//! - **Composability**: every composition is itself an `FsBackend`, so
//!   mounts can hold unions, unions can hold mounts.
//! - **Testability**: swap `OsFS` for `MemoryFS` and a test never touches
//!   the disk.
//!
//! ```
//! use std::sync::Arc;
//! use fs_stack::{FileSystem, MemoryFS, MountFS, ReadOnlyFS, UnionFS};
//!
//! // read-only base with a writable memory overlay, mounted at /
//! let base = Arc::new(MemoryFS::new());
//! let mut overlay = UnionFS::new();
//! overlay.add_branch(Arc::new(MemoryFS::new()), "upper", Some(0), true).unwrap();
//! overlay.add_branch(Arc::new(ReadOnlyFS::new(base)), "base", Some(1), false).unwrap();
//!
//! let mut mounts = MountFS::new();
//! mounts.mount_fs("/", Arc::new(overlay)).unwrap();
//! mounts.mount_fs("/scratch", Arc::new(MemoryFS::new())).unwrap();
//!
//! let fs = FileSystem::new(Arc::new(mounts));
//! fs.write_all("/scratch/tmp.txt", b"kept out of the overlay").unwrap();
//! ```

mod core;
mod error;
mod facade;
mod vfs;

pub use crate::core::{path, AccessMode, EntryType, FsBackend, Metadata, WriteMode};
pub use crate::error::{FsError, Result};
pub use crate::facade::FileSystem;
pub use crate::vfs::{MemoryFS, MountFS, OsFS, ReadOnlyFS, UnionFS};
