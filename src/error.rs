//! Error types shared by every operation in the crate.

use std::fmt;
use std::path::PathBuf;

/// Calendar field that failed validation during strict parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Month => "month",
            Field::Day => "day",
            Field::Hour => "hour",
            Field::Minute => "minute",
            Field::Second => "second",
        };
        f.write_str(name)
    }
}

/// Errors raised while extracting, formatting or comparing filename timestamps
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// More than one strict timestamp was found in a single string
    #[error("found {count} timestamps in {input:?}, expected at most one")]
    Ambiguous { input: String, count: usize },

    /// A strict timestamp was found but one of its fields is out of range
    #[error("invalid {field}: {value} in {input:?}")]
    InvalidTimestamp {
        field: Field,
        value: u32,
        input: String,
    },

    /// The fuzzy parser could not locate a date, or the input has no usable text
    #[error("cannot parse a date from {input:?}: {reason}")]
    Parse { input: String, reason: String },

    /// The format pattern is malformed or cannot be rendered for this value
    #[error("cannot format with pattern {pattern:?}: {reason}")]
    Format { pattern: String, reason: String },

    /// The directory to scan does not exist or is not a directory
    #[error("directory not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Listing the directory failed for a reason other than absence
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A caller supplied regular expression failed to compile
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl Error {
    pub(crate) fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn format(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Format {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
