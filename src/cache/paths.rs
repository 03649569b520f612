//! Cache directory path management
//!
//! Layout of the cache root:
//!
//! ```text
//! ../_repos/
//! ├── express/              # Full checkout of {origin}/express
//! ├── jquery/
//! └── angularjs/            # Family checkout
//!     ├── core/             # Component, linked separately
//!     └── ui-router/
//! ```

use std::path::{Path, PathBuf};

use crate::types::RepoName;

/// Manages filesystem paths under the cache root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    root: PathBuf,
}

impl CachePaths {
    /// Creates a new CachePaths with the specified root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root cache directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the checkout directory for a repository: `{root}/{name}`
    pub fn checkout_dir(&self, name: &RepoName) -> PathBuf {
        self.root.join(name.as_str())
    }

    /// Returns the directory of a family component: `{root}/{name}/{component}`
    pub fn component_dir(&self, name: &RepoName, component: &RepoName) -> PathBuf {
        self.checkout_dir(name).join(component.as_str())
    }
}
