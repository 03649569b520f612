//! Run configuration
//!
//! Everything a run needs to know (where the cache lives, where local
//! directories go, which origin to clone from, what to link, how to treat
//! family repositories and failures) is gathered into one [`Config`] value
//! that is built once in `main` and passed down by reference.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::cache::CachePaths;
use crate::types::{ParseError, RepoName};

/// Default hosting origin; each repository URL is `{origin}/{name}`.
pub const DEFAULT_ORIGIN: &str = "https://github.com/scalajs-io";

/// Default directory for cache checkouts, relative to the working directory.
pub const DEFAULT_CACHE_ROOT: &str = "../_repos";

const ANGULARJS_COMPONENTS: &[&str] = &[
    "anchor-scroll",
    "animate",
    "cookies",
    "core",
    "facebook",
    "md5",
    "nervgh-fileupload",
    "nvd3",
    "sanitize",
    "toaster",
    "ui-bootstrap",
    "ui-router",
];

const SCALAJS_IO_COMPONENTS: &[&str] = &["core", "dom_html", "nodejs"];

/// One source-in-checkout to target-in-local pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRule {
    /// Path relative to the cache checkout.
    pub source: PathBuf,
    /// Path relative to the local working directory.
    pub target: PathBuf,
}

impl LinkRule {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// The fixed set of links created in every local working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMapping {
    rules: Vec<LinkRule>,
}

impl LinkMapping {
    pub fn new(rules: Vec<LinkRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[LinkRule] {
        &self.rules
    }
}

impl Default for LinkMapping {
    /// The build descriptor is renamed so the downstream build does not pick
    /// it up as its own project file.
    fn default() -> Self {
        Self::new(vec![
            LinkRule::new("build.sbt", "build.sbt.txt"),
            LinkRule::new("package.json", "package.json"),
            LinkRule::new("README.md", "README.md"),
            LinkRule::new("src", "src"),
        ])
    }
}

/// How a repository's local directory is populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStrategy {
    /// Apply the link mapping directly to `{name}`.
    Common,
    /// The repository holds several components; each `{name}/{component}`
    /// gets its own directory and its own application of the link mapping.
    Family(Vec<RepoName>),
}

impl LinkStrategy {
    /// Build a family strategy from component names.
    pub fn family<I, S>(components: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let components = components
            .into_iter()
            .map(|c| c.as_ref().parse::<RepoName>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::Family(components))
    }

    /// Short label used by `list`.
    pub fn label(&self) -> String {
        match self {
            Self::Common => "common".to_string(),
            Self::Family(components) => format!("family({})", components.len()),
        }
    }
}

static COMMON: LinkStrategy = LinkStrategy::Common;

/// Maps repository names to linking strategies. Anything not listed uses
/// [`LinkStrategy::Common`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyTable {
    entries: HashMap<RepoName, LinkStrategy>,
}

impl StrategyTable {
    /// An empty table: every repository is linked with the common rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// The families the platform ships with.
    pub fn builtin() -> Result<Self, ParseError> {
        let mut table = Self::new();
        table.insert("angularjs".parse()?, LinkStrategy::family(ANGULARJS_COMPONENTS)?);
        table.insert("scalajs.io".parse()?, LinkStrategy::family(SCALAJS_IO_COMPONENTS)?);
        Ok(table)
    }

    pub fn insert(&mut self, name: RepoName, strategy: LinkStrategy) -> Option<LinkStrategy> {
        self.entries.insert(name, strategy)
    }

    pub fn strategy_for(&self, name: &RepoName) -> &LinkStrategy {
        self.entries.get(name).unwrap_or(&COMMON)
    }
}

/// What to do when cloning, pulling or creating a directory fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the run at the first failing entry.
    #[default]
    Abort,
    /// Record the failure, skip the entry and carry on.
    Continue,
}

/// Configuration for a single installer run.
#[derive(Debug, Clone)]
pub struct Config {
    pub cache: CachePaths,
    pub local_root: PathBuf,
    pub origin: String,
    pub links: LinkMapping,
    pub strategies: StrategyTable,
    pub failure_policy: FailurePolicy,
}

impl Config {
    /// Create a configuration with the default origin, link mapping and an
    /// empty strategy table.
    pub fn new(cache_root: impl Into<PathBuf>, local_root: impl Into<PathBuf>) -> Self {
        Self {
            cache: CachePaths::new(cache_root),
            local_root: local_root.into(),
            origin: DEFAULT_ORIGIN.to_string(),
            links: LinkMapping::default(),
            strategies: StrategyTable::new(),
            failure_policy: FailurePolicy::default(),
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_strategies(mut self, strategies: StrategyTable) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Make the cache root absolute so links created from it stay valid
    /// regardless of where they are resolved from. `.` and `..` are folded
    /// lexically; symlinks in the path are not resolved.
    pub fn absolutize(mut self) -> io::Result<Self> {
        let root = std::path::absolute(self.cache.root())?;
        self.cache = CachePaths::new(normalize(&root));
        Ok(self)
    }

    /// Remote URL for a repository: `{origin}/{name}`.
    pub fn remote_url(&self, name: &RepoName) -> String {
        format!("{}/{}", self.origin.trim_end_matches('/'), name)
    }

    /// Local working directory for a path relative to the local root.
    pub fn local_dir(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.local_root.join(relative)
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_ROOT, ".")
    }
}
