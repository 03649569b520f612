//! Workspace materialization
//!
//! One synchronous pass over the catalog. For each repository, in order:
//!
//! 1. Clone it into the cache if its checkout is missing, otherwise pull.
//! 2. Create the local working directory if missing (parent must exist).
//! 3. Link the checkout into the local directory.
//!
//! Every step checks before acting, so an interrupted run can simply be
//! started again.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::fs::{CreateDirError, Filesystem, ensure_dir};
use super::link::{LinkReport, Linker};
use crate::cache::{GitError, PullOutcome, VersionControl, short_sha};
use crate::catalog::Catalog;
use crate::config::{Config, FailurePolicy};
use crate::types::RepoName;

/// Errors that stop a repository (or the whole run) from being materialized.
#[derive(Error, Debug)]
pub enum MaterializeError {
    /// The cache root could not be created.
    #[error("failed to create cache directory {}: {source}", .path.display())]
    CacheRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Cloning a missing checkout failed.
    #[error("failed to clone {name}: {source}")]
    Clone {
        name: RepoName,
        #[source]
        source: GitError,
    },
    /// Pulling an existing checkout failed.
    #[error("failed to update {name}: {source}")]
    Pull {
        name: RepoName,
        #[source]
        source: GitError,
    },
    /// A local or component directory could not be created.
    #[error(transparent)]
    CreateDir(#[from] CreateDirError),
}

/// How a repository's checkout was brought up to date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutSync {
    Cloned,
    Pulled(PullOutcome),
}

/// Result of materializing one repository.
#[derive(Debug)]
pub struct EntryOutcome {
    pub sync: CheckoutSync,
    pub local_dir_created: bool,
    pub links: LinkReport,
}

/// Tally of a whole run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub cloned: usize,
    pub updated: usize,
    pub up_to_date: usize,
    pub directories_created: usize,
    pub links_created: usize,
    pub link_failures: usize,
    /// Repositories skipped under [`FailurePolicy::Continue`].
    pub failures: Vec<(RepoName, MaterializeError)>,
}

impl RunSummary {
    fn record(&mut self, outcome: &EntryOutcome) {
        match &outcome.sync {
            CheckoutSync::Cloned => self.cloned += 1,
            CheckoutSync::Pulled(PullOutcome::Updated { .. }) => self.updated += 1,
            CheckoutSync::Pulled(PullOutcome::UpToDate) => self.up_to_date += 1,
        }
        if outcome.local_dir_created {
            self.directories_created += 1;
        }
        self.directories_created += outcome.links.directories_created.len();
        self.links_created += outcome.links.created.len();
        self.link_failures += outcome.links.failed.len();
    }

    /// True if every repository was cloned or updated and got its local
    /// directory. Link failures are reported but do not fail the run.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Materializer<'a, V: ?Sized, F: ?Sized> {
    vcs: &'a V,
    fs: &'a F,
    config: &'a Config,
}

impl<'a, V, F> Materializer<'a, V, F>
where
    V: VersionControl + ?Sized,
    F: Filesystem + ?Sized,
{
    pub fn new(vcs: &'a V, fs: &'a F, config: &'a Config) -> Self {
        Self { vcs, fs, config }
    }

    /// Materialize every repository in the catalog, in order.
    pub fn materialize(&self, catalog: &Catalog) -> Result<RunSummary, MaterializeError> {
        self.ensure_cache_root()?;

        println!("Checking status of {} repos...", catalog.len());
        let mut summary = RunSummary::default();

        for name in catalog {
            match self.materialize_one(name) {
                Ok(outcome) => summary.record(&outcome),
                Err(e) => match self.config.failure_policy {
                    FailurePolicy::Abort => return Err(e),
                    FailurePolicy::Continue => {
                        log::error!("{}: {}", name, e);
                        println!("Skipping {}: {}", name, e);
                        summary.failures.push((name.clone(), e));
                    }
                },
            }
        }

        Ok(summary)
    }

    fn ensure_cache_root(&self) -> Result<(), MaterializeError> {
        let root = self.config.cache.root();
        if self.fs.exists(root) {
            return Ok(());
        }
        println!(
            "Creating the repository cache directory ({})...",
            root.display()
        );
        self.fs
            .create_dir_all(root)
            .map_err(|source| MaterializeError::CacheRoot {
                path: root.to_path_buf(),
                source,
            })
    }

    /// Clone or pull, create the local directory, then link.
    pub fn materialize_one(&self, name: &RepoName) -> Result<EntryOutcome, MaterializeError> {
        let sync = self.sync_checkout(name)?;

        let local = self.config.local_dir(name);
        let local_dir_created = ensure_dir(self.fs, &local)?;
        if local_dir_created {
            log::debug!("created local directory {}", local.display());
        }

        let links = if self.fs.is_dir(&local) {
            Linker::new(self.fs, self.config).link(name)?
        } else {
            LinkReport::default()
        };

        Ok(EntryOutcome {
            sync,
            local_dir_created,
            links,
        })
    }

    fn sync_checkout(&self, name: &RepoName) -> Result<CheckoutSync, MaterializeError> {
        let checkout = self.config.cache.checkout_dir(name);

        if !self.vcs.exists(&checkout) {
            println!("Cloning {}...", name);
            let url = self.config.remote_url(name);
            self.vcs
                .clone_repo(&url, &checkout)
                .map_err(|source| MaterializeError::Clone {
                    name: name.clone(),
                    source,
                })?;
            return Ok(CheckoutSync::Cloned);
        }

        println!("Updating {}...", name);
        let outcome = self
            .vcs
            .pull(&checkout)
            .map_err(|source| MaterializeError::Pull {
                name: name.clone(),
                source,
            })?;
        if let PullOutcome::Updated { from, to } = &outcome {
            println!("  {} -> {}", short_sha(from), short_sha(to));
        }
        Ok(CheckoutSync::Pulled(outcome))
    }
}
