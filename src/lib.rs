//! filestamp - timestamps embedded in filenames
//!
//! Extracts and compares timestamps such as `report_20230615_093000.csv` so callers can
//! tell whether a reference file is newer than files sharing a stem, and pick the most
//! recent file of a family.
//!
//! ## Pieces
//!
//! - Strict parsing of the fixed `YYYYMMDD_HHMMSS` layout, with calendar validation
//!   ([`parse_strict`]) and its inverse ([`format_timestamp`])
//! - Fuzzy parsing that finds a date anywhere in a string ([`parse_fuzzy`]), behind
//!   the [`DateParser`] trait
//! - Three-state staleness checks ([`out_of_date`])
//! - Directory scanning by stem, timestamp regex and extension glob ([`filepaths`],
//!   [`filenames`]) and latest-version selection ([`latest_version`])
//!
//! Strict parsing treats every year divisible by 4 as a leap year. See [`time`].

pub mod config;
pub mod error;
pub mod fuzzy;
pub mod patterns;
pub mod scanner;
pub mod staleness;
pub mod time;
pub mod timestamper;

// Re-export commonly used items
pub use config::ScanConfig;
pub use error::{Error, Field, Result};
pub use fuzzy::{parse_fuzzy, DateParser, FuzzyDateParser, StampInput};
pub use patterns::{CompiledPattern, FilenamePattern, DEFAULT_EXTENSION, DEFAULT_STAMP_PATTERN};
pub use scanner::{
    filenames, filepaths, latest_version, versions, DirectoryScanner, Filenames, Filepaths,
};
pub use staleness::{out_of_date, out_of_date_with, Staleness};
pub use time::{format_timestamp, parse_strict, Timestamp, STRICT_FORMAT};
pub use timestamper::Timestamper;
