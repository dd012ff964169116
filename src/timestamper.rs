//! Parser-bound entry point for callers that supply their own `DateParser`.

use crate::error::Result;
use crate::fuzzy::{DateParser, FuzzyDateParser, StampInput};
use crate::patterns::FilenamePattern;
use crate::scanner::DirectoryScanner;
use crate::staleness::{out_of_date_with, Staleness};
use crate::time::Timestamp;

use std::path::Path;

/// Fuzzy parsing, staleness checks and latest-version selection over one parser
#[derive(Debug, Clone, Default)]
pub struct Timestamper<P = FuzzyDateParser> {
    parser: P,
}

impl<P: DateParser> Timestamper<P> {
    pub fn new(parser: P) -> Self {
        Timestamper { parser }
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    pub fn parse_fuzzy<'a>(
        &self,
        input: impl Into<StampInput<'a>>,
        strip_pattern: &str,
    ) -> Result<Timestamp> {
        input.into().resolve(&self.parser, strip_pattern)
    }

    pub fn out_of_date<'a, 'b>(
        &self,
        reference: Option<impl Into<StampInput<'a>>>,
        target: Option<impl Into<StampInput<'b>>>,
        strip_pattern: &str,
    ) -> Result<Staleness> {
        out_of_date_with(&self.parser, reference, target, strip_pattern)
    }

    pub fn versions(
        &self,
        directory: impl AsRef<Path>,
        pattern: &FilenamePattern,
    ) -> Result<Vec<(String, Timestamp)>> {
        DirectoryScanner::new(directory.as_ref(), pattern.clone())?.versions_with(&self.parser)
    }

    pub fn latest_version(
        &self,
        directory: impl AsRef<Path>,
        pattern: &FilenamePattern,
    ) -> Result<Option<String>> {
        DirectoryScanner::new(directory.as_ref(), pattern.clone())?
            .latest_version_with(&self.parser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;

    /// Reads only a trailing `vNNN` counter, as if it were the year
    struct VersionCounter;

    impl DateParser for VersionCounter {
        fn parse_fuzzy(&self, text: &str) -> Result<Timestamp> {
            let digits: String = text
                .rsplit('v')
                .next()
                .unwrap_or("")
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            let year = digits
                .parse()
                .map_err(|_| Error::Parse {
                    input: text.to_string(),
                    reason: "no counter".to_string(),
                })?;
            Timestamp::new(year, 1, 1, 0, 0, 0)
        }
    }

    #[test]
    fn test_default_timestamper_uses_fuzzy_parser() {
        let stamper = Timestamper::<FuzzyDateParser>::default();
        let t = stamper.parse_fuzzy("a_20200102_030405", "").unwrap();
        assert_eq!(t, Timestamp::new(2020, 1, 2, 3, 4, 5).unwrap());
    }

    #[test]
    fn test_injected_parser_drives_comparison() {
        let stamper = Timestamper::new(VersionCounter);
        let verdict = stamper.out_of_date(Some("build_v10"), Some("build_v9"), "").unwrap();
        assert_eq!(verdict, Staleness::Outdated);
    }

    #[test]
    fn test_injected_parser_drives_selection() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["m_20200101_000000_v3", "m_20210101_000000_v2", "m_20190101_000000_v1"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let stamper = Timestamper::new(VersionCounter);
        let latest = stamper
            .latest_version(dir.path(), &FilenamePattern::new("m_"))
            .unwrap();
        assert_eq!(latest.as_deref(), Some("m_20200101_000000_v3"));

        let default = Timestamper::<FuzzyDateParser>::default()
            .latest_version(dir.path(), &FilenamePattern::new("m_"))
            .unwrap();
        assert_eq!(default.as_deref(), Some("m_20210101_000000_v2"));
    }
}
