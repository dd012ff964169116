//! Free-form date extraction for sorting and comparing filenames.
//!
//! Unlike strict parsing this tolerates any surrounding text and several
//! date layouts. The parser sits behind the `DateParser` trait so callers can
//! plug in their own.

use crate::error::{Error, Result};
use crate::time::Timestamp;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Capability to locate a date anywhere inside a piece of text
pub trait DateParser {
    fn parse_fuzzy(&self, text: &str) -> Result<Timestamp>;
}

impl<P: DateParser + ?Sized> DateParser for &P {
    fn parse_fuzzy(&self, text: &str) -> Result<Timestamp> {
        (**self).parse_fuzzy(text)
    }
}

/// Something a timestamp can be taken from: a value, a string, or a path's file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampInput<'a> {
    Time(Timestamp),
    Text(&'a str),
    Path(&'a Path),
}

impl StampInput<'_> {
    /// Resolve to a timestamp, parsing text and paths with `parser` after
    /// removing every match of `strip_pattern`
    pub fn resolve<P: DateParser + ?Sized>(
        self,
        parser: &P,
        strip_pattern: &str,
    ) -> Result<Timestamp> {
        let text = match self {
            StampInput::Time(stamp) => return Ok(stamp),
            StampInput::Text(text) => text,
            StampInput::Path(path) => path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| {
                    Error::parse(path.display().to_string(), "no UTF-8 file name")
                })?,
        };
        let remainder = strip(text, strip_pattern)?;
        parser.parse_fuzzy(&remainder)
    }
}

impl From<Timestamp> for StampInput<'_> {
    fn from(stamp: Timestamp) -> Self {
        StampInput::Time(stamp)
    }
}

impl From<NaiveDateTime> for StampInput<'_> {
    fn from(dt: NaiveDateTime) -> Self {
        StampInput::Time(dt.into())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for StampInput<'_> {
    fn from(dt: DateTime<Tz>) -> Self {
        StampInput::Time(dt.into())
    }
}

impl<'a> From<&'a str> for StampInput<'a> {
    fn from(text: &'a str) -> Self {
        StampInput::Text(text)
    }
}

impl<'a> From<&'a String> for StampInput<'a> {
    fn from(text: &'a String) -> Self {
        StampInput::Text(text)
    }
}

impl<'a> From<&'a Path> for StampInput<'a> {
    fn from(path: &'a Path) -> Self {
        StampInput::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for StampInput<'a> {
    fn from(path: &'a PathBuf) -> Self {
        StampInput::Path(path)
    }
}

/// Remove every match of `pattern` from `text`; an empty pattern leaves it untouched
fn strip<'t>(text: &'t str, pattern: &str) -> Result<Cow<'t, str>> {
    if pattern.is_empty() {
        return Ok(Cow::Borrowed(text));
    }
    let re = Regex::new(pattern)?;
    Ok(re.replace_all(text, ""))
}

/// Parse a timestamp from free-form text or a path's file name with the default parser.
///
/// `strip_pattern` is a regular expression (usually the escaped filename stem)
/// removed from the text before parsing.
pub fn parse_fuzzy<'a>(
    input: impl Into<StampInput<'a>>,
    strip_pattern: &str,
) -> Result<Timestamp> {
    input.into().resolve(&FuzzyDateParser, strip_pattern)
}

/// Date layouts recognised by `FuzzyDateParser`, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateShape {
    /// 20230615_093000, 20230615T093000, 20230615-093000
    CompactDateTime,
    /// 2023-06-15T09:30:00, 2023-06-15 09:30
    IsoDateTime,
    /// 2023-06-15, 2023/06/15, 2023.06.15
    IsoDate,
    /// 20230615
    CompactDate,
    /// 15 Jun 2023, 15th-June-2023
    DayMonthName,
    /// June 15, 2023
    MonthNameDay,
}

fn date_patterns() -> &'static [(DateShape, Regex)] {
    static PATTERNS: OnceLock<Vec<(DateShape, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (
                DateShape::CompactDateTime,
                r"(?:^|\D)(\d{4})(\d{2})(\d{2})[_T-](\d{2})(\d{2})(\d{2})",
            ),
            (
                DateShape::IsoDateTime,
                r"(?:^|\D)(\d{4})-(\d{1,2})-(\d{1,2})[T _](\d{1,2}):(\d{2})(?::(\d{2}))?",
            ),
            (
                DateShape::IsoDate,
                r"(?:^|\D)(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})",
            ),
            (DateShape::CompactDate, r"(?:^|\D)(\d{4})(\d{2})(\d{2})"),
            (
                DateShape::DayMonthName,
                r"(?i)(?:^|[^0-9a-z])(\d{1,2})(?:st|nd|rd|th)?[\s_.-]*([a-z]{3,9})[\s_.,-]*(\d{4})",
            ),
            (
                DateShape::MonthNameDay,
                r"(?i)(?:^|[^a-z])([a-z]{3,9})[\s_.-]*(\d{1,2})(?:st|nd|rd|th)?[\s_.,-]*(\d{4})",
            ),
        ]
        .into_iter()
        .map(|(shape, src)| (shape, Regex::new(src).expect("date pattern is valid")))
        .collect()
    })
}

fn time_pattern() -> &'static Regex {
    static TIME: OnceLock<Regex> = OnceLock::new();
    TIME.get_or_init(|| {
        Regex::new(r"(?:^|\D)(\d{1,2}):(\d{2})(?::(\d{2}))?").expect("time pattern is valid")
    })
}

const MONTH_NAMES: &[(&str, u32)] = &[
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sept", 9),
    ("sep", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    MONTH_NAMES
        .iter()
        .find(|(month_name, _)| *month_name == lower)
        .map(|(_, number)| *number)
}

/// Default fuzzy parser built from regular expressions and chrono's calendar.
///
/// Scans for the first recognisable date in the text, ignoring everything else.
/// When the date carries no time of day, the first `HH:MM[:SS]` elsewhere in the
/// text is used, before or after the date, otherwise midnight. Dates are
/// validated against the Gregorian calendar.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyDateParser;

impl DateParser for FuzzyDateParser {
    fn parse_fuzzy(&self, text: &str) -> Result<Timestamp> {
        for (shape, pattern) in date_patterns() {
            for caps in pattern.captures_iter(text) {
                if let Some(dt) = datetime_from(&caps, *shape, text) {
                    log::trace!("fuzzy match {:?} in {:?}: {}", shape, text, dt);
                    return Ok(dt.into());
                }
            }
        }
        Err(Error::parse(text, "no date found"))
    }
}

fn number<T: std::str::FromStr>(caps: &Captures, index: usize) -> Option<T> {
    caps.get(index)?.as_str().parse().ok()
}

fn datetime_from(caps: &Captures, shape: DateShape, text: &str) -> Option<NaiveDateTime> {
    let whole = caps.get(0)?;
    let rest = &text[whole.end()..];

    // Numeric shapes must not run into further digits
    let numeric = matches!(
        shape,
        DateShape::CompactDateTime | DateShape::IsoDate | DateShape::CompactDate
    );
    if numeric && rest.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let (year, month, day) = match shape {
        DateShape::CompactDateTime
        | DateShape::IsoDateTime
        | DateShape::IsoDate
        | DateShape::CompactDate => (number(caps, 1)?, number(caps, 2)?, number(caps, 3)?),
        DateShape::DayMonthName => (number(caps, 3)?, month_from_name(&caps[2])?, number(caps, 1)?),
        DateShape::MonthNameDay => (number(caps, 3)?, month_from_name(&caps[1])?, number(caps, 2)?),
    };
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    match shape {
        DateShape::CompactDateTime | DateShape::IsoDateTime => date.and_hms_opt(
            number(caps, 4)?,
            number(caps, 5)?,
            number(caps, 6).unwrap_or(0),
        ),
        _ => {
            let remainder = format!("{} {}", &text[..whole.start()], rest);
            match time_in(&remainder) {
                Some((hour, minute, second)) => date.and_hms_opt(hour, minute, second),
                None => date.and_hms_opt(0, 0, 0),
            }
        }
    }
}

/// First valid `HH:MM[:SS]` in `text`
fn time_in(text: &str) -> Option<(u32, u32, u32)> {
    time_pattern().captures_iter(text).find_map(|caps| {
        let hour = number(&caps, 1)?;
        let minute = number(&caps, 2)?;
        let second = number(&caps, 3).unwrap_or(0);
        (hour < 24 && minute < 60 && second < 60).then_some((hour, minute, second))
    })
}
