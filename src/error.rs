//! Load-time errors for the license databases.
//!
//! Resolution itself never fails: an unrecognized or ambiguous license name is a
//! [`Verdict`](crate::models::Verdict), not an error. Everything in here is raised
//! while reading and validating the databases, before the first lookup.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which of the two database documents an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    Aliases,
    Ambiguities,
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Document::Aliases => write!(f, "alias"),
            Document::Ambiguities => write!(f, "ambiguity"),
        }
    }
}

/// The owner of a normalized surface form inside the loaded databases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// Listed in the `aliases` of a canonical license.
    Alias(String),
    /// The canonical identifier itself.
    Canonical(String),
    /// Listed in the `aliases` of an ambiguity entry.
    Ambiguity(String),
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Claim::Alias(id) => write!(f, "alias of `{}`", id),
            Claim::Canonical(id) => write!(f, "canonical id `{}`", id),
            Claim::Ambiguity(problem) => write!(f, "ambiguity `{}`", problem),
        }
    }
}

/// Errors raised while loading the alias and ambiguity databases.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DatabaseError {
    /// The document is not valid JSON or does not have the expected shape.
    #[error("malformed {document} database{}: {message}", key_suffix(.key))]
    Malformed {
        document: Document,
        key: Option<String>,
        message: String,
    },

    /// One normalized surface form is claimed twice.
    #[error("duplicate alias \"{alias}\": {first} conflicts with {second}")]
    DuplicateAlias {
        alias: String,
        first: Claim,
        second: Claim,
    },

    /// The document could not be read from disk.
    #[error("failed to read {document} database at {path:?}")]
    Io {
        document: Document,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn key_suffix(key: &Option<String>) -> String {
    match key {
        Some(key) => format!(" (entry \"{}\")", key),
        None => String::new(),
    }
}

impl DatabaseError {
    pub(crate) fn malformed(
        document: Document,
        key: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        DatabaseError::Malformed {
            document,
            key: key.map(str::to_string),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_names_key() {
        let err = DatabaseError::malformed(Document::Ambiguities, Some("BSD"), "missing field `problem`");
        assert_eq!(
            err.to_string(),
            "malformed ambiguity database (entry \"BSD\"): missing field `problem`"
        );
    }

    #[test]
    fn test_duplicate_message_names_both_claims() {
        let err = DatabaseError::DuplicateAlias {
            alias: "bsd license".to_string(),
            first: Claim::Ambiguity("BSD".to_string()),
            second: Claim::Alias("BSD-3-Clause".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "duplicate alias \"bsd license\": ambiguity `BSD` conflicts with alias of `BSD-3-Clause`"
        );
    }
}
