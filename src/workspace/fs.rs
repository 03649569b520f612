//! Filesystem capability for directory and link creation.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A directory the workspace needs could not be created.
#[derive(Error, Debug)]
#[error("failed to create directory {}: {source}", .path.display())]
pub struct CreateDirError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// The filesystem operations the materializer and linker perform.
///
/// `exists` must not follow symlinks: a dangling link still counts as
/// present so it is never overwritten. `source_exists` follows them: a
/// dangling link in a checkout is not worth linking to.
pub trait Filesystem {
    /// Returns true if anything (file, directory or link) is at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Returns true if `path` resolves to an existing file or directory,
    /// following links.
    fn source_exists(&self, path: &Path) -> bool;

    /// Returns true if `path` is a directory, following links.
    fn is_dir(&self, path: &Path) -> bool;

    /// Create a single directory; the parent must already exist.
    fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// Create a directory and any missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create a symbolic link at `link` pointing to `target`.
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;
}

/// Make sure `path` is a directory, creating it (without parents) if
/// nothing is there. Returns true if the directory was created.
pub fn ensure_dir<F: Filesystem + ?Sized>(fs: &F, path: &Path) -> Result<bool, CreateDirError> {
    if fs.is_dir(path) {
        return Ok(false);
    }
    if fs.exists(path) {
        return Err(CreateDirError {
            path: path.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::AlreadyExists,
                "path exists and is not a directory",
            ),
        });
    }
    fs.create_dir(path).map_err(|source| CreateDirError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

/// [`Filesystem`] backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
    fn exists(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path).is_ok()
    }

    fn source_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    #[cfg(unix)]
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        std::os::unix::fs::symlink(target, link)
    }

    #[cfg(windows)]
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        }
    }
}
