//! Version-control capability used by the materializer.

use std::path::Path;

use super::git::{GitCli, GitError, PullOutcome};

/// The three version-control operations the installer needs.
///
/// Abstracting them lets the materializer be exercised without a network
/// or a git binary.
pub trait VersionControl {
    /// Returns true if something is present at the checkout path.
    fn exists(&self, path: &Path) -> bool;

    /// Clone `url` into `dest`.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError>;

    /// Fast-forward the existing checkout at `path`.
    fn pull(&self, path: &Path) -> Result<PullOutcome, GitError>;
}

/// [`VersionControl`] backed by the system git.
#[derive(Debug, Clone, Default)]
pub struct GitGateway {
    git: GitCli,
}

impl GitGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VersionControl for GitGateway {
    fn exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        log::debug!("git clone {} {}", url, dest.display());
        self.git.clone_full(url, dest)
    }

    fn pull(&self, path: &Path) -> Result<PullOutcome, GitError> {
        log::debug!("git pull {}", path.display());
        self.git.pull(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn exists_reports_directories_only() {
        let temp_dir = tempdir().unwrap();
        let gateway = GitGateway::new();

        assert!(gateway.exists(temp_dir.path()));
        assert!(!gateway.exists(&temp_dir.path().join("missing")));

        let file = temp_dir.path().join("file");
        std::fs::write(&file, "x").unwrap();
        assert!(!gateway.exists(&file));
    }

    #[test]
    fn pull_on_non_checkout_is_error() {
        let temp_dir = tempdir().unwrap();
        let gateway = GitGateway::new();
        assert!(matches!(
            gateway.pull(temp_dir.path()),
            Err(GitError::NotACheckout(_))
        ));
    }
}
