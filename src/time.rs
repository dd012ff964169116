//! Fixed-format timestamps: the `Timestamp` value, strict extraction and formatting.
//!
//! The strict format is `YYYYMMDD_HHMMSS`, e.g. `20200102_140203` is 2:02:03 pm
//! on Jan 2nd, 2020. Years must start with `1` or `2`.
//!
//! February validation uses a simplified leap rule: every year divisible by 4
//! is a leap year. Century years such as 1900 therefore accept Feb 29 even
//! though the Gregorian calendar does not. This is kept for parity with
//! existing filenames and is not a bug to fix.

use crate::error::{Error, Field, Result};

use chrono::format::{Item, Numeric, Pad, StrftimeItems};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use regex::Regex;
use std::fmt::{self, Write};
use std::str::FromStr;
use std::sync::OnceLock;

/// strftime pattern of the strict filename stamp
pub const STRICT_FORMAT: &str = "%Y%m%d_%H%M%S";

fn strict_regex() -> &'static Regex {
    static STRICT: OnceLock<Regex> = OnceLock::new();
    STRICT.get_or_init(|| {
        Regex::new(r"([12][0-9]{3})([0-9]{2})([0-9]{2})_([0-9]{2})([0-9]{2})([0-9]{2})")
            .expect("strict stamp regex is valid")
    })
}

/// A wall-clock timestamp with second resolution and no timezone.
///
/// Ordering is chronological because fields compare from most to least significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
}

impl Timestamp {
    /// Build a timestamp, validating every field with the strict-format rules
    pub fn new(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self> {
        let stamp = Timestamp {
            year,
            month,
            day,
            hour,
            minute,
            second,
        };
        stamp.validate().map_err(|(field, value)| Error::InvalidTimestamp {
            field,
            value,
            input: stamp.to_string(),
        })?;
        Ok(stamp)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn second(&self) -> u32 {
        self.second
    }

    /// Convert to a chrono value, or `None` when the date only exists under the
    /// simplified leap rule (e.g. 1900-02-29)
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_opt(
            self.hour,
            self.minute,
            self.second,
        )
    }

    fn validate(&self) -> std::result::Result<(), (Field, u32)> {
        if !(1..=12).contains(&self.month) {
            return Err((Field::Month, self.month));
        }
        if !(1..=days_in_month(self.year, self.month)).contains(&self.day) {
            return Err((Field::Day, self.day));
        }
        if self.hour > 23 {
            return Err((Field::Hour, self.hour));
        }
        if self.minute > 59 {
            return Err((Field::Minute, self.minute));
        }
        if self.second > 59 {
            return Err((Field::Second, self.second));
        }
        Ok(())
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(dt: NaiveDateTime) -> Self {
        // Leap seconds live in the nanosecond field, so second() is always <= 59
        Timestamp {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
        }
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    /// Uses the local wall-clock fields of the datetime; the offset is dropped
    fn from(dt: DateTime<Tz>) -> Self {
        dt.naive_local().into()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}{:02}{:02}_{:02}{:02}{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    /// Strictly parse a string that must contain exactly one timestamp
    fn from_str(s: &str) -> Result<Self> {
        parse_strict(s)?.ok_or_else(|| Error::parse(s, "no YYYYMMDD_HHMMSS timestamp found"))
    }
}

/// Leap-year test used by strict validation: divisible by 4, no century exceptions
pub fn is_leap_year(year: i32) -> bool {
    year.rem_euclid(4) == 0
}

/// Number of days in `month` of `year` under the simplified leap rule
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        _ => 30,
    }
}

/// Extract a strict `YYYYMMDD_HHMMSS` timestamp from arbitrary text.
///
/// Returns `Ok(None)` when the text holds no timestamp, `Error::Ambiguous` when it
/// holds more than one, and `Error::InvalidTimestamp` when the single match has an
/// out-of-range field.
pub fn parse_strict(text: &str) -> Result<Option<Timestamp>> {
    let matches: Vec<_> = strict_regex().captures_iter(text).collect();

    let caps = match matches.as_slice() {
        [] => return Ok(None),
        [caps] => caps,
        _ => {
            return Err(Error::Ambiguous {
                input: text.to_string(),
                count: matches.len(),
            })
        }
    };

    let stamp = Timestamp {
        year: digits(&caps[1]) as i32,
        month: digits(&caps[2]),
        day: digits(&caps[3]),
        hour: digits(&caps[4]),
        minute: digits(&caps[5]),
        second: digits(&caps[6]),
    };

    stamp
        .validate()
        .map_err(|(field, value)| Error::InvalidTimestamp {
            field,
            value,
            input: text.to_string(),
        })?;

    Ok(Some(stamp))
}

/// Decimal value of an ASCII digit run already matched by the strict regex
fn digits(s: &str) -> u32 {
    s.bytes().fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
}

/// Render a timestamp with a strftime pattern (`STRICT_FORMAT` for filenames).
///
/// Year, month, day, hour, minute and second directives are rendered straight from
/// the fields. Any other directive needs a real calendar date and fails with
/// `Error::Format` for dates that only exist under the simplified leap rule.
pub fn format_timestamp(value: impl Into<Timestamp>, pattern: &str) -> Result<String> {
    let stamp = value.into();
    let naive = stamp.to_naive();
    let mut out = String::with_capacity(pattern.len() * 2);

    for item in StrftimeItems::new(pattern) {
        match item {
            Item::Literal(s) | Item::Space(s) => out.push_str(s),
            Item::Error => return Err(Error::format(pattern, "unrecognised directive")),
            Item::Numeric(numeric, pad) => match field_of(&stamp, &numeric) {
                Some((value, width)) => push_padded(&mut out, value, width, pad)
                    .map_err(|_| Error::format(pattern, "write failed"))?,
                None => push_chrono(&mut out, naive, Item::Numeric(numeric, pad), pattern)?,
            },
            other => push_chrono(&mut out, naive, other, pattern)?,
        }
    }

    Ok(out)
}

fn field_of(stamp: &Timestamp, numeric: &Numeric) -> Option<(i64, usize)> {
    let field = match numeric {
        Numeric::Year => (i64::from(stamp.year), 4),
        Numeric::Month => (i64::from(stamp.month), 2),
        Numeric::Day => (i64::from(stamp.day), 2),
        Numeric::Hour => (i64::from(stamp.hour), 2),
        Numeric::Minute => (i64::from(stamp.minute), 2),
        Numeric::Second => (i64::from(stamp.second), 2),
        _ => return None,
    };
    Some(field)
}

fn push_padded(out: &mut String, value: i64, width: usize, pad: Pad) -> fmt::Result {
    match pad {
        Pad::Zero => write!(out, "{value:0width$}"),
        Pad::Space => write!(out, "{value:width$}"),
        Pad::None => write!(out, "{value}"),
    }
}

fn push_chrono(
    out: &mut String,
    naive: Option<NaiveDateTime>,
    item: Item<'_>,
    pattern: &str,
) -> Result<()> {
    let dt = naive.ok_or_else(|| {
        Error::format(pattern, "directive requires a real calendar date")
    })?;
    write!(out, "{}", dt.format_with_items(std::iter::once(item)))
        .map_err(|_| Error::format(pattern, "directive not supported for naive timestamps"))
}
