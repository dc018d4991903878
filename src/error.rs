//! Error taxonomy shared by every backend in the crate.
//!
//! Callers are expected to match on the variants: the distinctions between
//! `NotFound`, `NotADirectory`, `IsADirectory`, `ReadOnly` and
//! `PermissionDenied` are part of the contract, not just message text.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FsError>;

/// Errors produced by filesystem backends and the composition layer.
///
/// Every variant carries the offending path. Errors from inner backends
/// surface unchanged through wrappers; the only exceptions are documented on
/// the wrappers themselves (`ReadOnlyFS` short-circuits mutations to
/// [`FsError::ReadOnly`], `UnionFS` reports a failing branch through
/// [`FsError::PartialRemove`]).
#[derive(Debug, Error)]
pub enum FsError {
    #[error("no such file or directory: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("is a directory: {}", .path.display())]
    IsADirectory { path: PathBuf },

    #[error("already exists: {}", .path.display())]
    AlreadyExists { path: PathBuf },

    #[error("directory not empty: {}", .path.display())]
    NotEmpty { path: PathBuf },

    #[error("read-only file system: {}", .path.display())]
    ReadOnly { path: PathBuf },

    #[error("permission denied: {}", .path.display())]
    PermissionDenied { path: PathBuf },

    #[error("invalid path: {}", .path.display())]
    InvalidPath { path: PathBuf },

    #[error("{} is not under {}", .path.display(), .base.display())]
    NotUnderBase { path: PathBuf, base: PathBuf },

    #[error("operation crosses backends: {} -> {}", .src.display(), .dst.display())]
    CrossBackend { src: PathBuf, dst: PathBuf },

    /// Multi-branch removal stopped part-way; removals already performed in
    /// more visible branches are not rolled back.
    #[error("branch '{branch}' failed to remove {}: {source}", .path.display())]
    PartialRemove {
        branch: String,
        path: PathBuf,
        #[source]
        source: Box<FsError>,
    },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    pub fn not_found<P: AsRef<Path>>(path: P) -> Self {
        FsError::NotFound { path: path.as_ref().to_path_buf() }
    }

    pub fn not_a_directory<P: AsRef<Path>>(path: P) -> Self {
        FsError::NotADirectory { path: path.as_ref().to_path_buf() }
    }

    pub fn is_a_directory<P: AsRef<Path>>(path: P) -> Self {
        FsError::IsADirectory { path: path.as_ref().to_path_buf() }
    }

    pub fn already_exists<P: AsRef<Path>>(path: P) -> Self {
        FsError::AlreadyExists { path: path.as_ref().to_path_buf() }
    }

    pub fn not_empty<P: AsRef<Path>>(path: P) -> Self {
        FsError::NotEmpty { path: path.as_ref().to_path_buf() }
    }

    pub fn read_only<P: AsRef<Path>>(path: P) -> Self {
        FsError::ReadOnly { path: path.as_ref().to_path_buf() }
    }

    pub fn permission_denied<P: AsRef<Path>>(path: P) -> Self {
        FsError::PermissionDenied { path: path.as_ref().to_path_buf() }
    }

    pub fn invalid_path<P: AsRef<Path>>(path: P) -> Self {
        FsError::InvalidPath { path: path.as_ref().to_path_buf() }
    }

    pub fn not_under_base<P: AsRef<Path>, B: AsRef<Path>>(path: P, base: B) -> Self {
        FsError::NotUnderBase {
            path: path.as_ref().to_path_buf(),
            base: base.as_ref().to_path_buf(),
        }
    }

    pub fn cross_backend<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Self {
        FsError::CrossBackend {
            src: src.as_ref().to_path_buf(),
            dst: dst.as_ref().to_path_buf(),
        }
    }

    /// Maps an OS error onto the taxonomy, attaching the logical path.
    pub fn from_io<P: AsRef<Path>>(err: io::Error, path: P) -> Self {
        use io::ErrorKind;

        let path = path.as_ref();
        match err.kind() {
            ErrorKind::NotFound => Self::not_found(path),
            ErrorKind::NotADirectory => Self::not_a_directory(path),
            ErrorKind::IsADirectory => Self::is_a_directory(path),
            ErrorKind::AlreadyExists => Self::already_exists(path),
            ErrorKind::DirectoryNotEmpty => Self::not_empty(path),
            ErrorKind::PermissionDenied => Self::permission_denied(path),
            ErrorKind::ReadOnlyFilesystem => Self::read_only(path),
            ErrorKind::InvalidInput => Self::invalid_path(path),
            _ => FsError::Io { path: path.to_path_buf(), source: err },
        }
    }

    /// The path the error is about. `CrossBackend` reports its source path.
    pub fn path(&self) -> &Path {
        match self {
            FsError::NotFound { path }
            | FsError::NotADirectory { path }
            | FsError::IsADirectory { path }
            | FsError::AlreadyExists { path }
            | FsError::NotEmpty { path }
            | FsError::ReadOnly { path }
            | FsError::PermissionDenied { path }
            | FsError::InvalidPath { path }
            | FsError::NotUnderBase { path, .. }
            | FsError::PartialRemove { path, .. }
            | FsError::Io { path, .. } => path,
            FsError::CrossBackend { src, .. } => src,
        }
    }
}
