//! Local workspace: directories and links built from the cache

mod fs;
mod link;
mod materialize;

pub use fs::{CreateDirError, Filesystem, OsFilesystem, ensure_dir};
pub use link::{LinkError, LinkReport, Linker};
pub use materialize::{CheckoutSync, EntryOutcome, MaterializeError, Materializer, RunSummary};
