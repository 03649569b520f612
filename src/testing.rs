//! In-memory fakes for the filesystem and version-control capabilities.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use crate::cache::{GitError, PullOutcome, VersionControl};
use crate::workspace::Filesystem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Dir,
    File,
    Symlink(PathBuf),
}

const MAX_SYMLINK_HOPS: usize = 40;

/// A filesystem made of a path-to-node map.
#[derive(Debug, Default)]
pub struct MemoryFs {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
    denied: RefCell<HashSet<PathBuf>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory and all of its ancestors.
    pub fn mkdir_p(&self, path: impl AsRef<Path>) {
        let mut nodes = self.nodes.borrow_mut();
        for ancestor in path.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
    }

    /// Create a file, creating missing parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.mkdir_p(parent);
        }
        self.nodes.borrow_mut().insert(path.to_path_buf(), Node::File);
    }

    /// Make directory and link creation at `path` fail with PermissionDenied.
    pub fn deny(&self, path: impl AsRef<Path>) {
        self.denied.borrow_mut().insert(path.as_ref().to_path_buf());
    }

    pub fn node(&self, path: impl AsRef<Path>) -> Option<Node> {
        self.nodes.borrow().get(path.as_ref()).cloned()
    }

    pub fn symlink_target(&self, path: impl AsRef<Path>) -> Option<PathBuf> {
        match self.node(path) {
            Some(Node::Symlink(target)) => Some(target),
            _ => None,
        }
    }

    /// Every symlink under `root`.
    pub fn symlinks_under(&self, root: impl AsRef<Path>) -> Vec<PathBuf> {
        let root = root.as_ref();
        self.nodes
            .borrow()
            .iter()
            .filter(|(path, node)| path.starts_with(root) && matches!(node, Node::Symlink(_)))
            .map(|(path, _)| path.clone())
            .collect()
    }

    pub fn snapshot(&self) -> BTreeMap<PathBuf, Node> {
        self.nodes.borrow().clone()
    }

    /// Follow symlinks from `path` to the node they end at. Cycles resolve
    /// to nothing.
    fn resolve(&self, path: &Path) -> Option<Node> {
        let mut current = path.to_path_buf();
        for _ in 0..MAX_SYMLINK_HOPS {
            match self.node(&current)? {
                Node::Symlink(target) => current = target,
                node => return Some(node),
            }
        }
        None
    }

    fn check_denied(&self, path: &Path) -> io::Result<()> {
        if self.denied.borrow().contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }
        Ok(())
    }

    fn check_parent(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !self.is_dir(parent) => Err(
                io::Error::new(io::ErrorKind::NotFound, "parent directory does not exist"),
            ),
            _ => Ok(()),
        }
    }
}

impl Filesystem for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.nodes.borrow().contains_key(path)
    }

    fn source_exists(&self, path: &Path) -> bool {
        matches!(self.resolve(path), Some(Node::Dir | Node::File))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.resolve(path), Some(Node::Dir))
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        self.check_denied(path)?;
        if self.exists(path) {
            return Err(io::Error::new(io::ErrorKind::AlreadyExists, "exists"));
        }
        self.check_parent(path)?;
        self.nodes.borrow_mut().insert(path.to_path_buf(), Node::Dir);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.check_denied(path)?;
        for ancestor in path.ancestors() {
            if self.exists(ancestor) && !self.is_dir(ancestor) {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "not a directory",
                ));
            }
        }
        self.mkdir_p(path);
        Ok(())
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        self.check_denied(link)?;
        if self.exists(link) {
            return Err(io::Error::new(io::ErrorKind::AlreadyExists, "exists"));
        }
        self.check_parent(link)?;
        self.nodes
            .borrow_mut()
            .insert(link.to_path_buf(), Node::Symlink(target.to_path_buf()));
        Ok(())
    }
}

/// Version control that "clones" by writing a fixed file list into a
/// [`MemoryFs`], and records every call.
pub struct FakeVcs<'a> {
    fs: &'a MemoryFs,
    upstream: HashMap<String, Vec<PathBuf>>,
    failing_pulls: HashSet<PathBuf>,
    pub clones: RefCell<Vec<(String, PathBuf)>>,
    pub pulls: RefCell<Vec<PathBuf>>,
}

impl<'a> FakeVcs<'a> {
    pub fn new(fs: &'a MemoryFs) -> Self {
        Self {
            fs,
            upstream: HashMap::new(),
            failing_pulls: HashSet::new(),
            clones: RefCell::new(Vec::new()),
            pulls: RefCell::new(Vec::new()),
        }
    }

    /// Register an upstream repository at `url` containing `files`.
    pub fn with_repo(mut self, url: impl Into<String>, files: &[&str]) -> Self {
        self.upstream
            .insert(url.into(), files.iter().map(PathBuf::from).collect());
        self
    }

    pub fn fail_pull(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing_pulls.insert(path.into());
        self
    }

    pub fn clone_count(&self) -> usize {
        self.clones.borrow().len()
    }

    pub fn pull_count(&self) -> usize {
        self.pulls.borrow().len()
    }
}

impl VersionControl for FakeVcs<'_> {
    fn exists(&self, path: &Path) -> bool {
        self.fs.is_dir(path)
    }

    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        self.clones
            .borrow_mut()
            .push((url.to_string(), dest.to_path_buf()));

        let files = self
            .upstream
            .get(url)
            .ok_or_else(|| GitError::CloneError(format!("repository '{}' not found", url)))?;

        self.fs.create_dir(dest)?;
        for file in files {
            self.fs.add_file(dest.join(file));
        }
        Ok(())
    }

    fn pull(&self, path: &Path) -> Result<PullOutcome, GitError> {
        self.pulls.borrow_mut().push(path.to_path_buf());
        if self.failing_pulls.contains(path) {
            return Err(GitError::PullError("Not possible to fast-forward".into()));
        }
        Ok(PullOutcome::UpToDate)
    }
}
