//! Directory scanning for timestamped files and latest-version selection.

use crate::error::{Error, Result};
use crate::fuzzy::{DateParser, FuzzyDateParser, StampInput};
use crate::patterns::{CompiledPattern, FilenamePattern};
use crate::time::Timestamp;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Scans one directory for files matching a `FilenamePattern`.
///
/// Nothing is cached: every call re-reads the directory, so results reflect its
/// current contents. Entries come back in directory-listing order.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    directory: PathBuf,
    pattern: FilenamePattern,
    compiled: CompiledPattern,
}

impl DirectoryScanner {
    pub fn new(directory: impl Into<PathBuf>, pattern: FilenamePattern) -> Result<Self> {
        let compiled = pattern.compile()?;
        Ok(DirectoryScanner {
            directory: directory.into(),
            pattern,
            compiled,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn pattern(&self) -> &FilenamePattern {
        &self.pattern
    }

    /// Lazily iterate over matching paths
    pub fn paths(&self) -> Result<Filepaths> {
        Ok(Filepaths(Entries::open(&self.directory, self.compiled.clone())?))
    }

    /// Collect every matching path
    pub fn filepaths(&self) -> Result<Vec<PathBuf>> {
        Ok(self.paths()?.collect())
    }

    /// Lazily iterate over matching file names
    pub fn filenames(&self) -> Result<Filenames> {
        Ok(Filenames(Entries::open(&self.directory, self.compiled.clone())?))
    }

    /// Every matching file name with its fuzzy-parsed timestamp, oldest first.
    ///
    /// The stem is stripped before parsing. One unparseable name fails the whole call.
    pub fn versions_with<P: DateParser + ?Sized>(
        &self,
        parser: &P,
    ) -> Result<Vec<(String, Timestamp)>> {
        let strip = self.pattern.stem_regex();
        let mut versions = self
            .filenames()?
            .map(|name| -> Result<(String, Timestamp)> {
                let stamp = StampInput::Text(&name).resolve(parser, &strip)?;
                Ok((name, stamp))
            })
            .collect::<Result<Vec<_>>>()?;

        // Stable sort: equal timestamps keep listing order
        versions.sort_by(|a, b| a.1.cmp(&b.1));
        Ok(versions)
    }

    pub fn versions(&self) -> Result<Vec<(String, Timestamp)>> {
        self.versions_with(&FuzzyDateParser)
    }

    /// Name of the most recent matching file, or `None` when nothing matches
    pub fn latest_version_with<P: DateParser + ?Sized>(
        &self,
        parser: &P,
    ) -> Result<Option<String>> {
        let latest = self.versions_with(parser)?.pop().map(|(name, _)| name);
        match &latest {
            Some(name) => log::debug!(
                "latest {}* in {}: {}",
                self.pattern.stem,
                self.directory.display(),
                name
            ),
            None => log::debug!(
                "no {}* versions in {}",
                self.pattern.stem,
                self.directory.display()
            ),
        }
        Ok(latest)
    }

    pub fn latest_version(&self) -> Result<Option<String>> {
        self.latest_version_with(&FuzzyDateParser)
    }
}

/// Open `directory` for listing, distinguishing a missing directory from other I/O failures
fn read_directory(directory: &Path) -> Result<fs::ReadDir> {
    let io_error = |source: io::Error| Error::Io {
        path: directory.to_path_buf(),
        source,
    };

    match fs::metadata(directory) {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => return Err(Error::NotFound(directory.to_path_buf())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(Error::NotFound(directory.to_path_buf()))
        }
        Err(err) => return Err(io_error(err)),
    }

    fs::read_dir(directory).map_err(io_error)
}

/// Matching directory entries, read lazily
#[derive(Debug)]
struct Entries {
    entries: fs::ReadDir,
    pattern: CompiledPattern,
}

impl Entries {
    fn open(directory: &Path, pattern: CompiledPattern) -> Result<Self> {
        log::debug!("scanning {} for {}*", directory.display(), pattern.stem());
        Ok(Entries {
            entries: read_directory(directory)?,
            pattern,
        })
    }

    fn next_match(&mut self) -> Option<(PathBuf, String)> {
        for entry in self.entries.by_ref() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("skipping unreadable directory entry: {}", err);
                    continue;
                }
            };

            let Ok(name) = entry.file_name().into_string() else {
                log::debug!("skipping non UTF-8 name: {}", entry.path().display());
                continue;
            };

            if self.pattern.is_match(&name) {
                return Some((entry.path(), name));
            }
        }
        None
    }
}

/// Lazy iterator over matching paths
#[derive(Debug)]
pub struct Filepaths(Entries);

impl Iterator for Filepaths {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        self.0.next_match().map(|(path, _)| path)
    }
}

/// Lazy iterator over matching file names
#[derive(Debug)]
pub struct Filenames(Entries);

impl Iterator for Filenames {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.0.next_match().map(|(_, name)| name)
    }
}

/// Paths in `directory` whose names match `pattern`, in listing order
pub fn filepaths(directory: impl AsRef<Path>, pattern: &FilenamePattern) -> Result<Vec<PathBuf>> {
    DirectoryScanner::new(directory.as_ref(), pattern.clone())?.filepaths()
}

/// Lazily yield the names in `directory` that match `pattern`
pub fn filenames(directory: impl AsRef<Path>, pattern: &FilenamePattern) -> Result<Filenames> {
    DirectoryScanner::new(directory.as_ref(), pattern.clone())?.filenames()
}

/// Matching names paired with their timestamps, oldest first
pub fn versions(
    directory: impl AsRef<Path>,
    pattern: &FilenamePattern,
) -> Result<Vec<(String, Timestamp)>> {
    DirectoryScanner::new(directory.as_ref(), pattern.clone())?.versions()
}

/// The matching name with the most recent timestamp, or `None` when nothing matches
pub fn latest_version(
    directory: impl AsRef<Path>,
    pattern: &FilenamePattern,
) -> Result<Option<String>> {
    DirectoryScanner::new(directory.as_ref(), pattern.clone())?.latest_version()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), b"").unwrap();
        }
    }

    fn sorted(mut names: Vec<String>) -> Vec<String> {
        names.sort();
        names
    }

    // ============ scanning tests ============

    #[test]
    fn test_filenames_filters_by_stem_and_stamp() {
        let dir = tempdir().unwrap();
        touch(
            dir.path(),
            &[
                "report_20230101_120000.csv",
                "report_20220101_000000.txt",
                "report_latest.csv",
                "summary_20230101_120000.csv",
            ],
        );

        let names = filenames(dir.path(), &FilenamePattern::new("report_")).unwrap();
        assert_eq!(
            sorted(names.collect()),
            vec!["report_20220101_000000.txt", "report_20230101_120000.csv"]
        );
    }

    #[test]
    fn test_filepaths_are_inside_directory() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["log_20230101_120000.txt"]);

        let paths = filepaths(dir.path(), &FilenamePattern::new("log_")).unwrap();
        assert_eq!(paths, vec![dir.path().join("log_20230101_120000.txt")]);
    }

    #[test]
    fn test_extension_filter() {
        let dir = tempdir().unwrap();
        touch(
            dir.path(),
            &["report_20230101_120000.csv", "report_20230102_120000.txt"],
        );

        let pattern = FilenamePattern::new("report_").with_extension(".csv");
        let names: Vec<String> = filenames(dir.path(), &pattern).unwrap().collect();
        assert_eq!(names, vec!["report_20230101_120000.csv"]);
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempdir().unwrap();
        assert!(filepaths(dir.path(), &FilenamePattern::new("x_")).unwrap().is_empty());
        assert_eq!(latest_version(dir.path(), &FilenamePattern::new("x_")).unwrap(), None);
    }

    #[test]
    fn test_no_matching_stem_is_empty() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["other_20230101_000000.csv"]);

        let pattern = FilenamePattern::new("report_");
        assert!(filepaths(dir.path(), &pattern).unwrap().is_empty());
        assert_eq!(latest_version(dir.path(), &pattern).unwrap(), None);
    }

    #[test]
    fn test_missing_directory_is_not_found() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = filepaths(&missing, &FilenamePattern::new("x_")).unwrap_err();
        assert!(matches!(err, Error::NotFound(path) if path == missing));
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["plain.txt"]);
        let err = filenames(dir.path().join("plain.txt"), &FilenamePattern::new("x_")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_scanner_rescans_each_call() {
        let dir = tempdir().unwrap();
        let scanner = DirectoryScanner::new(dir.path(), FilenamePattern::new("a_")).unwrap();
        assert_eq!(scanner.filenames().unwrap().count(), 0);

        touch(dir.path(), &["a_20230101_000000"]);
        assert_eq!(scanner.filenames().unwrap().count(), 1);

        touch(dir.path(), &["a_20230102_000000"]);
        assert_eq!(scanner.filenames().unwrap().count(), 2);
    }

    // ============ latest version tests ============

    #[test]
    fn test_latest_version_picks_newest() {
        let dir = tempdir().unwrap();
        touch(
            dir.path(),
            &[
                "report_20230101_120000.csv",
                "report_20230615_093000.csv",
                "report_20220101_000000.csv",
            ],
        );

        let latest = latest_version(dir.path(), &FilenamePattern::new("report_")).unwrap();
        assert_eq!(latest.as_deref(), Some("report_20230615_093000.csv"));
    }

    #[test]
    fn test_versions_are_sorted_oldest_first() {
        let dir = tempdir().unwrap();
        touch(
            dir.path(),
            &[
                "b_20230101_000001",
                "b_20210101_000000",
                "b_20230101_000000",
            ],
        );

        let names: Vec<String> = versions(dir.path(), &FilenamePattern::new("b_"))
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(
            names,
            vec!["b_20210101_000000", "b_20230101_000000", "b_20230101_000001"]
        );
    }

    #[test]
    fn test_equal_timestamps_keep_listing_order() {
        let dir = tempdir().unwrap();
        touch(
            dir.path(),
            &["r_20230101_000000.a", "r_20230101_000000.b", "r_20230101_000000.c"],
        );

        let pattern = FilenamePattern::new("r_");
        let listed: Vec<String> = filenames(dir.path(), &pattern).unwrap().collect();
        assert_eq!(listed.len(), 3);

        let names: Vec<String> = versions(dir.path(), &pattern)
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, listed);

        let latest = latest_version(dir.path(), &pattern).unwrap();
        assert_eq!(latest.as_ref(), listed.last());
    }

    #[test]
    fn test_stem_with_digits_is_stripped_before_parsing() {
        let dir = tempdir().unwrap();
        touch(
            dir.path(),
            &["run20990101_20200101_000000.log", "run20990101_20210101_000000.log"],
        );

        let latest = latest_version(dir.path(), &FilenamePattern::new("run20990101_")).unwrap();
        assert_eq!(latest.as_deref(), Some("run20990101_20210101_000000.log"));
    }

    #[test]
    fn test_unparseable_name_aborts_selection() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["x_00000000_000000", "x_20230101_000000"]);

        let result = latest_version(dir.path(), &FilenamePattern::new("x_"));
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn test_invalid_stamp_pattern_fails_before_scanning() {
        let dir = tempdir().unwrap();
        let pattern = FilenamePattern::new("x_").with_stamp_pattern("[");
        assert!(matches!(filepaths(dir.path(), &pattern), Err(Error::Pattern(_))));
    }
}
