//! Filename patterns: a literal stem, a timestamp regex and an extension glob.

use crate::error::Result;

use regex::Regex;
use serde::Deserialize;

/// Default timestamp regex, matching the strict `YYYYMMDD_HHMMSS` layout
pub const DEFAULT_STAMP_PATTERN: &str = r"\d{8}_\d{6}";

/// Default extension glob, matching anything after the timestamp
pub const DEFAULT_EXTENSION: &str = "*";

fn default_stamp_pattern() -> String {
    DEFAULT_STAMP_PATTERN.to_string()
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

/// Describes the family of files that share a stem, e.g. `report_20230101_120000.csv`
/// has stem `report_`, stamp `20230101_120000` and extension `.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilenamePattern {
    /// Literal prefix every matching filename starts with
    pub stem: String,
    /// Glob for whatever follows the timestamp: `*` for any, `.csv`, `*.csv`, or a bare `csv`
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Regular expression the timestamp portion must match, directly after the stem
    #[serde(default = "default_stamp_pattern")]
    pub stamp_pattern: String,
}

impl FilenamePattern {
    /// Pattern for `stem` with the default timestamp regex and any extension
    pub fn new(stem: impl Into<String>) -> Self {
        FilenamePattern {
            stem: stem.into(),
            extension: default_extension(),
            stamp_pattern: default_stamp_pattern(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_stamp_pattern(mut self, stamp_pattern: impl Into<String>) -> Self {
        self.stamp_pattern = stamp_pattern.into();
        self
    }

    /// Regex that matches the stem literally, for stripping it before fuzzy parsing
    pub fn stem_regex(&self) -> String {
        regex::escape(&self.stem)
    }

    /// Full-name regex: escaped stem, then the stamp pattern, then the extension glob
    pub fn regex_source(&self) -> String {
        format!(
            "^{}(?:{}){}$",
            regex::escape(&self.stem),
            self.stamp_pattern,
            extension_regex(&self.extension)
        )
    }

    /// Compile the pattern, failing with `Error::Pattern` on a malformed stamp regex
    pub fn compile(&self) -> Result<CompiledPattern> {
        Ok(CompiledPattern {
            stem: self.stem.clone(),
            regex: Regex::new(&self.regex_source())?,
        })
    }
}

/// Translate an extension glob into a regex fragment.
/// `*` and `?` are wildcards; everything else is literal. A bare extension
/// without dot or wildcard gets a leading dot.
fn extension_regex(extension: &str) -> String {
    let has_wildcard = extension.contains(['*', '?']);
    let mut out = String::new();

    if !extension.is_empty() && !has_wildcard && !extension.starts_with('.') {
        out.push_str(r"\.");
    }

    let mut buf = [0u8; 4];
    for c in extension.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }

    out
}

/// A `FilenamePattern` ready for matching names
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    stem: String,
    regex: Regex,
}

impl CompiledPattern {
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Check a bare filename (no directory components)
    pub fn is_match(&self, name: &str) -> bool {
        name.starts_with(&self.stem) && self.regex.is_match(name)
    }
}
