//! Shared types for the installer

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Error type for parsing failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("value cannot be empty")]
    Empty,
    #[error("invalid character in value: {0:?}")]
    InvalidCharacter(char),
    #[error("value cannot start with '{0}'")]
    InvalidStart(char),
    #[error("value cannot contain '..'")]
    ParentTraversal,
}

/// A repository name from the catalog.
///
/// The same string is used as the remote repository suffix, the cache
/// checkout directory and the local working directory, so it has to be a
/// single safe path component.
///
/// Validation rules:
/// - Non-empty
/// - Alphanumeric characters, hyphens, underscores, and dots only
/// - Cannot start with a dot or a hyphen
/// - Cannot contain `..`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoName(String);

impl RepoName {
    /// Returns the repository name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RepoName {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseError::Empty);
        }

        if s.starts_with('.') {
            return Err(ParseError::InvalidStart('.'));
        }

        if s.starts_with('-') {
            return Err(ParseError::InvalidStart('-'));
        }

        if s.contains("..") {
            return Err(ParseError::ParentTraversal);
        }

        for c in s.chars() {
            if !c.is_ascii_alphanumeric() && c != '-' && c != '_' && c != '.' {
                return Err(ParseError::InvalidCharacter(c));
            }
        }

        Ok(RepoName(s.to_string()))
    }
}

impl AsRef<str> for RepoName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<Path> for RepoName {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_simple_name() {
        let name: RepoName = "express".parse().unwrap();
        assert_eq!(name.as_str(), "express");
    }

    #[test]
    fn valid_name_with_dot_and_hyphen() {
        let name: RepoName = "scalajs.io".parse().unwrap();
        assert_eq!(name.as_str(), "scalajs.io");

        let name: RepoName = "winston-daily-rotate-file".parse().unwrap();
        assert_eq!(name.to_string(), "winston-daily-rotate-file");
    }

    #[test]
    fn valid_name_with_underscore() {
        let name: RepoName = "dom_html".parse().unwrap();
        assert_eq!(name.as_str(), "dom_html");
    }

    #[test]
    fn empty_name_rejected() {
        assert_eq!("".parse::<RepoName>(), Err(ParseError::Empty));
    }

    #[test]
    fn leading_dot_rejected() {
        assert_eq!(
            ".hidden".parse::<RepoName>(),
            Err(ParseError::InvalidStart('.'))
        );
    }

    #[test]
    fn leading_hyphen_rejected() {
        assert_eq!(
            "-flag".parse::<RepoName>(),
            Err(ParseError::InvalidStart('-'))
        );
    }

    #[test]
    fn parent_traversal_rejected() {
        assert_eq!(
            "a..b".parse::<RepoName>(),
            Err(ParseError::ParentTraversal)
        );
    }

    #[test]
    fn path_separator_rejected() {
        assert_eq!(
            "angularjs/core".parse::<RepoName>(),
            Err(ParseError::InvalidCharacter('/'))
        );
        assert_eq!(
            "a\\b".parse::<RepoName>(),
            Err(ParseError::InvalidCharacter('\\'))
        );
    }

    #[test]
    fn whitespace_rejected() {
        assert_eq!(
            "two words".parse::<RepoName>(),
            Err(ParseError::InvalidCharacter(' '))
        );
    }

    #[test]
    fn as_path_is_single_component() {
        let name: RepoName = "jquery".parse().unwrap();
        let path: &Path = name.as_ref();
        assert_eq!(path.components().count(), 1);
    }
}
