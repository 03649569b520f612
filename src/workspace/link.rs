//! Symbolic link creation from cache checkouts into local directories.
//!
//! For a repository `name` and every rule in the link mapping, the link
//! `{local_root}/{name}/{target}` is created pointing at
//! `{cache_root}/{name}/{source}`, but only when the source exists and
//! nothing is at the link path yet. Existing paths are never replaced,
//! removed or resolved.
//!
//! Family repositories repeat this for each `{name}/{component}`, after
//! creating the component's local directory.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::fs::{CreateDirError, Filesystem, ensure_dir};
use crate::config::{Config, LinkStrategy};
use crate::types::RepoName;

/// A link that could not be created.
#[derive(Error, Debug)]
#[error("failed to create link {}: {source}", .path.display())]
pub struct LinkError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// What a linking pass did.
#[derive(Debug, Default)]
pub struct LinkReport {
    /// Links created in this pass.
    pub created: Vec<PathBuf>,
    /// Component directories created in this pass.
    pub directories_created: Vec<PathBuf>,
    /// Rules skipped because something was already at the link path.
    pub already_present: usize,
    /// Rules skipped because the checkout has no such source.
    pub missing_source: usize,
    /// Links the filesystem refused to create.
    pub failed: Vec<LinkError>,
}

impl LinkReport {
    fn merge(&mut self, other: LinkReport) {
        self.created.extend(other.created);
        self.directories_created.extend(other.directories_created);
        self.already_present += other.already_present;
        self.missing_source += other.missing_source;
        self.failed.extend(other.failed);
    }
}

pub struct Linker<'a, F: ?Sized> {
    fs: &'a F,
    config: &'a Config,
}

impl<'a, F: Filesystem + ?Sized> Linker<'a, F> {
    pub fn new(fs: &'a F, config: &'a Config) -> Self {
        Self { fs, config }
    }

    /// Link a repository using the strategy configured for it.
    ///
    /// Failing to create a family component directory ends linking for the
    /// repository. Failing to create an individual link does not; it is
    /// logged and recorded in the report.
    pub fn link(&self, name: &RepoName) -> Result<LinkReport, CreateDirError> {
        match self.config.strategies.strategy_for(name) {
            LinkStrategy::Common => Ok(self.link_checkout(
                &self.config.cache.checkout_dir(name),
                &self.config.local_dir(name),
            )),
            LinkStrategy::Family(components) => self.link_family(name, components),
        }
    }

    fn link_family(
        &self,
        name: &RepoName,
        components: &[RepoName],
    ) -> Result<LinkReport, CreateDirError> {
        let mut report = LinkReport::default();
        for component in components {
            let local = self
                .config
                .local_dir(Path::new(name.as_str()).join(component.as_str()));
            if ensure_dir(self.fs, &local)? {
                log::debug!("created component directory {}", local.display());
                report.directories_created.push(local.clone());
            }
            let checkout = self.config.cache.component_dir(name, component);
            report.merge(self.link_checkout(&checkout, &local));
        }
        Ok(report)
    }

    /// Apply the link mapping from `checkout` into `local`.
    fn link_checkout(&self, checkout: &Path, local: &Path) -> LinkReport {
        let mut report = LinkReport::default();

        for rule in self.config.links.rules() {
            let source = checkout.join(&rule.source);
            let link = local.join(&rule.target);

            if !self.fs.source_exists(&source) {
                log::debug!("no {} in {}", rule.source.display(), checkout.display());
                report.missing_source += 1;
                continue;
            }
            if self.fs.exists(&link) {
                report.already_present += 1;
                continue;
            }

            match self.fs.symlink(&source, &link) {
                Ok(()) => {
                    log::info!("linked {}", link.display());
                    report.created.push(link);
                }
                Err(source) => {
                    let err = LinkError { path: link, source };
                    log::warn!("{}", err);
                    report.failed.push(err);
                }
            }
        }

        report
    }
}
