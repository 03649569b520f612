//! Repository cache: paths and git access

mod gateway;
mod git;
mod paths;

pub use gateway::{GitGateway, VersionControl};
pub use git::{GitCli, GitError, PullOutcome, short_sha};
pub use paths::CachePaths;
