pub mod cache;
pub mod catalog;
pub mod config;
#[cfg(test)]
mod testing;
pub mod types;
pub mod workspace;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cache::{GitCli, GitGateway, VersionControl};
use crate::catalog::Catalog;
use crate::config::{
    Config, DEFAULT_CACHE_ROOT, DEFAULT_ORIGIN, FailurePolicy, StrategyTable,
};
use crate::types::RepoName;
use crate::workspace::{Filesystem, Materializer, OsFilesystem};

#[derive(Parser)]
#[command(
    name = "sjs-installer",
    version,
    about = "ScalaJs.io Complete Platform Build Installer - clone, update and link platform repos"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding the repository checkouts
    #[arg(long, global = true, default_value = DEFAULT_CACHE_ROOT)]
    cache_root: PathBuf,

    /// Directory in which the per-repository link directories are created
    #[arg(long, global = true, default_value = ".")]
    local_root: PathBuf,

    /// Hosting origin; each repository is cloned from <ORIGIN>/<name>
    #[arg(long, global = true, default_value = DEFAULT_ORIGIN)]
    origin: String,

    /// File of whitespace separated repository names to use instead of the built-in list
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Skip repositories that fail to clone or update instead of stopping
    #[arg(long, global = true)]
    keep_going: bool,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Clone or update every repository and create the links (default)
    Install,

    /// List the catalog and what exists locally
    List,

    /// Check dependencies
    Doctor,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Install);

    let result = match command {
        Commands::Install => cmd_install(&cli),
        Commands::List => cmd_list(&cli),
        Commands::Doctor => cmd_doctor(&cli),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let policy = if cli.keep_going {
        FailurePolicy::Continue
    } else {
        FailurePolicy::Abort
    };
    let config = Config::new(&cli.cache_root, &cli.local_root)
        .with_origin(&cli.origin)
        .with_strategies(StrategyTable::builtin()?)
        .with_failure_policy(policy)
        .absolutize()?;
    log::debug!("configuration: {:?}", config);
    Ok(config)
}

fn load_catalog(cli: &Cli) -> Result<Catalog, Box<dyn std::error::Error>> {
    let catalog = match &cli.catalog {
        Some(path) => Catalog::from_file(path)?,
        None => Catalog::builtin()?,
    };
    Ok(catalog)
}

fn cmd_install(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "ScalaJs.io Complete Platform Build Installer v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = load_config(cli)?;
    let catalog = load_catalog(cli)?;

    let gateway = GitGateway::new();
    let summary = Materializer::new(&gateway, &OsFilesystem, &config).materialize(&catalog)?;

    println!(
        "{} cloned, {} updated, {} up to date, {} links created",
        summary.cloned, summary.updated, summary.up_to_date, summary.links_created
    );
    if summary.link_failures > 0 {
        println!(
            "{} links could not be created (set RUST_LOG=warn for details)",
            summary.link_failures
        );
    }
    println!("Done.");

    if !summary.is_success() {
        for (name, e) in &summary.failures {
            eprintln!("  {}: {}", name, e);
        }
        return Err(format!("{} repositories failed", summary.failures.len()).into());
    }

    Ok(())
}

/// One row of `list` output.
#[derive(Debug, PartialEq, Eq)]
struct ListRow<'a> {
    name: &'a RepoName,
    linking: String,
    cached: bool,
    local: bool,
}

fn list_rows<'a, V, F>(catalog: &'a Catalog, config: &Config, vcs: &V, fs: &F) -> Vec<ListRow<'a>>
where
    V: VersionControl + ?Sized,
    F: Filesystem + ?Sized,
{
    catalog
        .iter()
        .map(|name| ListRow {
            name,
            linking: config.strategies.strategy_for(name).label(),
            cached: vcs.exists(&config.cache.checkout_dir(name)),
            local: fs.is_dir(&config.local_dir(name)),
        })
        .collect()
}

fn cmd_list(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(cli)?;
    let catalog = load_catalog(cli)?;

    if catalog.is_empty() {
        println!("Catalog is empty");
        return Ok(());
    }

    println!("{:<28} {:<12} {:>8} {:>8}", "REPO", "LINKING", "CACHED", "LOCAL");
    println!("{}", "-".repeat(60));

    for row in list_rows(&catalog, &config, &GitGateway::new(), &OsFilesystem) {
        println!(
            "{:<28} {:<12} {:>8} {:>8}",
            row.name.as_str(),
            row.linking,
            yes_no(row.cached),
            yes_no(row.local)
        );
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckStatus {
    Ok,
    Info,
    Fail,
}

impl CheckStatus {
    fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Info => "INFO",
            Self::Fail => "FAIL",
        }
    }
}

/// One line of `doctor` output.
#[derive(Debug)]
struct Check {
    status: CheckStatus,
    line: String,
}

impl Check {
    fn new(status: CheckStatus, line: impl Into<String>) -> Self {
        Self {
            status,
            line: line.into(),
        }
    }
}

/// Only a missing git or an unreadable catalog fail; the cache root and
/// local directories are informational since `install` creates or reports
/// them itself.
fn doctor_checks<F: Filesystem + ?Sized>(
    config: &Config,
    fs: &F,
    git_version: Option<&str>,
    catalog: Result<usize, String>,
) -> Vec<Check> {
    let mut checks = Vec::new();

    checks.push(match git_version {
        Some(version) => Check::new(CheckStatus::Ok, format!("git: {}", version)),
        None => Check::new(CheckStatus::Fail, "git: not found"),
    });

    let cache_root = config.cache.root();
    checks.push(Check::new(
        if fs.is_dir(cache_root) { CheckStatus::Ok } else { CheckStatus::Info },
        format!("Cache dir: {}", cache_root.display()),
    ));

    checks.push(Check::new(
        if fs.is_dir(&config.local_root) { CheckStatus::Ok } else { CheckStatus::Info },
        format!("Local dir: {}", config.local_root.display()),
    ));

    checks.push(Check::new(CheckStatus::Info, format!("Origin: {}", config.origin)));

    checks.push(match catalog {
        Ok(len) => Check::new(CheckStatus::Ok, format!("Catalog: {} repos", len)),
        Err(e) => Check::new(CheckStatus::Fail, format!("Catalog: {}", e)),
    });

    checks
}

fn cmd_doctor(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    println!("ScalaJs.io Installer System Check\n");

    let config = load_config(cli)?;
    let git_version = GitCli::new().version();
    let catalog = load_catalog(cli)
        .map(|c| c.len())
        .map_err(|e| e.to_string());

    let checks = doctor_checks(&config, &OsFilesystem, git_version.as_deref(), catalog);
    for check in &checks {
        println!("[{}] {}", check.status.label(), check.line);
    }

    if checks.iter().any(|c| c.status == CheckStatus::Fail) {
        std::process::exit(1);
    }

    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
