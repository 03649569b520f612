//! Repository catalog
//!
//! The catalog is the ordered list of repositories the installer manages. It
//! is read from whitespace separated text: either the built-in list below or
//! a file given on the command line.

use std::path::Path;

use thiserror::Error;

use crate::types::{ParseError, RepoName};

/// Repositories managed by default.
const BUILTIN_CATALOG: &str = "angularjs async bcrypt bignum body-parser brake buffermaker
            cassandra-driver chalk cheerio colors cookie cookie-parser csv-parse
            csvtojson drama escape-html express express-csv express-fileupload express-ws
            facebook-api feedparser-promised filed github-api-node glob html-to-json htmlparser2
            jquery jsdom jwt-simple kafka-node linkedin-api md5 memory-fs minimist mkdirp
            moment moment-timezone mongodb multer mysql node-zookeeper-client
            numeral oppressor phaser pixijs readable-stream request rx scalajs.io splitargs
            tingodb tough-cookie transducers-js type-is watch winston winston-daily-rotate-file
            xml2js";

/// Errors returned while loading a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// An entry is not a usable repository name.
    #[error("invalid catalog entry {entry:?}: {source}")]
    InvalidEntry {
        entry: String,
        #[source]
        source: ParseError,
    },
    /// The catalog file could not be read.
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
}

/// Ordered list of repository names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    names: Vec<RepoName>,
}

/// Returns true if the entry is empty or only whitespace.
fn is_blank(entry: &str) -> bool {
    entry.trim().is_empty()
}

impl Catalog {
    /// Load the built-in catalog.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::parse(BUILTIN_CATALOG)
    }

    /// Load a catalog from a file of whitespace separated names.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse whitespace separated text into a catalog.
    ///
    /// Every whitespace character is a separator, so runs of whitespace
    /// produce blank entries which are dropped.
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        Self::from_entries(text.split(char::is_whitespace))
    }

    /// Build a catalog from raw entries, dropping blank ones and trimming the
    /// rest. Order is preserved and duplicates are kept.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.as_ref();
            if is_blank(entry) {
                continue;
            }
            let trimmed = entry.trim();
            let name = trimmed
                .parse::<RepoName>()
                .map_err(|source| CatalogError::InvalidEntry {
                    entry: trimmed.to_string(),
                    source,
                })?;
            names.push(name);
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RepoName> {
        self.names.iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a RepoName;
    type IntoIter = std::slice::Iter<'a, RepoName>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}
