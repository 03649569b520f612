//! Git operations using a hybrid CLI + libgit2 approach.
//!
//! **CLI (with hardening) for operations that touch the network:**
//! - `clone_full` - full checkout of a remote into the cache
//! - `pull` - fast-forward an existing checkout
//!
//! The CLI picks up whatever credentials, proxies and transports the user
//! has configured for git.
//!
//! **libgit2 for local reads:**
//! - `open_repository` - detect whether a directory is a checkout
//! - `head_commit` - read HEAD so a pull can report what changed

use git2::Repository;
use std::path::{Component, Path};
use std::process::{Command, Stdio};
use thiserror::Error;

/// Errors returned by git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// libgit2 reported an error.
    #[error("git operation failed: {0}")]
    Git(#[from] git2::Error),
    /// Path exists but does not contain a git checkout.
    #[error("not a git checkout: {0}")]
    NotACheckout(String),
    /// Output parsing or unexpected git data.
    #[error("failed to parse git data: {0}")]
    ParseError(String),
    /// Clone failed.
    #[error("clone failed: {0}")]
    CloneError(String),
    /// Pull failed.
    #[error("pull failed: {0}")]
    PullError(String),
    /// Underlying IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid inputs were provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result of fast-forwarding a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullOutcome {
    /// HEAD did not move.
    UpToDate,
    /// HEAD moved from one commit to another.
    Updated { from: String, to: String },
}

/// Validate that a URL is safe to pass to `git clone`.
///
/// Rejects:
/// - Empty strings
/// - Strings starting with `-` (could be interpreted as flags)
/// - Strings containing null bytes or control characters
fn validate_url(url: &str) -> Result<(), GitError> {
    if url.is_empty() {
        return Err(GitError::InvalidInput("url cannot be empty".to_string()));
    }
    if url.starts_with('-') {
        return Err(GitError::InvalidInput(
            "url cannot start with '-'".to_string(),
        ));
    }
    if url.bytes().any(|b| b < 0x20) {
        return Err(GitError::InvalidInput(
            "url cannot contain null or control characters".to_string(),
        ));
    }
    Ok(())
}

/// Validate the final component of a checkout destination before it is
/// placed on a command line.
///
/// Rejects names that are missing, `.` or `..`, start with `-`, or contain
/// control characters.
fn validate_checkout_name(dest: &Path) -> Result<(), GitError> {
    let name = match dest.components().next_back() {
        Some(Component::Normal(name)) => name.to_str().ok_or_else(|| {
            GitError::InvalidInput("checkout name is not valid UTF-8".to_string())
        })?,
        _ => {
            return Err(GitError::InvalidInput(format!(
                "{} does not end in a checkout name",
                dest.display()
            )));
        }
    };
    if name.starts_with('-') {
        return Err(GitError::InvalidInput(
            "checkout name cannot start with '-'".to_string(),
        ));
    }
    if name.bytes().any(|b| b < 0x20) {
        return Err(GitError::InvalidInput(
            "checkout name cannot contain control characters".to_string(),
        ));
    }
    Ok(())
}

fn path_str<'a>(path: &'a Path, what: &str) -> Result<&'a str, GitError> {
    path.to_str()
        .ok_or_else(|| GitError::ParseError(format!("{} path is not valid UTF-8", what)))
}

/// Git CLI wrapper with security hardening.
#[derive(Debug, Clone)]
pub struct GitCli {
    git_path: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    /// Create a new GitCli instance using the system git.
    pub fn new() -> Self {
        Self {
            git_path: "git".into(),
        }
    }

    /// Create a hardened Command.
    ///
    /// Applies:
    /// - `GIT_TERMINAL_PROMPT=0` - disable interactive prompts
    /// - `core.hooksPath=` - disable hooks execution
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.git_path);
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd.args(["-c", "core.hooksPath="]);
        cmd.stdin(Stdio::null());
        cmd
    }

    /// Returns the `git --version` line, or None if git cannot be run.
    pub fn version(&self) -> Option<String> {
        let output = Command::new(&self.git_path)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Clone `url` into `dest` with a full working tree.
    ///
    /// The parent of `dest` must exist. If the clone fails and `dest` did
    /// not exist beforehand, whatever git left behind is removed.
    pub fn clone_full(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        validate_url(url)?;
        validate_checkout_name(dest)?;

        let dest_existed = dest.exists();
        let dest_str = path_str(dest, "destination")?;

        let output = self
            .command()
            .args(["clone", "--quiet", "--"])
            .arg(url)
            .arg(dest_str)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !dest_existed && dest.exists() {
                if let Err(e) = std::fs::remove_dir_all(dest) {
                    log::warn!(
                        "failed to remove partial checkout {}: {}",
                        dest.display(),
                        e
                    );
                }
            }
            return Err(GitError::CloneError(stderr.trim().to_string()));
        }

        Ok(())
    }

    /// Fast-forward the checkout at `checkout` to its upstream.
    ///
    /// Fails if the directory is not a checkout, or if the branch has
    /// diverged and cannot be fast-forwarded.
    pub fn pull(&self, checkout: &Path) -> Result<PullOutcome, GitError> {
        let before = head_commit(&open_repository(checkout)?)?;
        let checkout_str = path_str(checkout, "checkout")?;

        let output = self
            .command()
            .arg("-C")
            .arg(checkout_str)
            .args(["pull", "--ff-only", "--quiet"])
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::PullError(stderr.trim().to_string()));
        }

        let after = head_commit(&open_repository(checkout)?)?;
        if before == after {
            Ok(PullOutcome::UpToDate)
        } else {
            Ok(PullOutcome::Updated {
                from: before,
                to: after,
            })
        }
    }
}

/// Open an existing checkout at the given path.
pub fn open_repository(path: &Path) -> Result<Repository, GitError> {
    let repo = Repository::open(path).map_err(|e| {
        if e.code() == git2::ErrorCode::NotFound {
            GitError::NotACheckout(path.display().to_string())
        } else {
            GitError::Git(e)
        }
    })?;
    Ok(repo)
}

/// Resolve the commit SHA HEAD points at.
pub fn head_commit(repo: &Repository) -> Result<String, GitError> {
    let head = repo.head()?;
    let commit = head.peel_to_commit()?;
    Ok(commit.id().to_string())
}

/// Abbreviate a commit SHA for display.
pub fn short_sha(sha: &str) -> &str {
    if sha.len() > 12 { &sha[..12] } else { sha }
}
