//! Three-state staleness comparison between a reference and a target timestamp.

use crate::error::Result;
use crate::fuzzy::{DateParser, FuzzyDateParser, StampInput};
use crate::time::Timestamp;

/// Outcome of comparing a reference timestamp with a target timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Staleness {
    /// The target is missing or older than the reference
    Outdated,
    /// The target is at least as recent as the reference, or there is no reference
    Current,
    /// Neither side has a timestamp
    Unknown,
}

impl Staleness {
    /// Decide staleness from two optional timestamps.
    ///
    /// Equal timestamps count as current.
    pub fn between(reference: Option<Timestamp>, target: Option<Timestamp>) -> Self {
        match (reference, target) {
            (None, None) => Staleness::Unknown,
            (None, Some(_)) => Staleness::Current,
            (Some(_), None) => Staleness::Outdated,
            (Some(reference), Some(target)) if target >= reference => Staleness::Current,
            (Some(_), Some(_)) => Staleness::Outdated,
        }
    }

    /// Boolean view of the verdict: `None` when unknown
    pub fn is_outdated(self) -> Option<bool> {
        match self {
            Staleness::Outdated => Some(true),
            Staleness::Current => Some(false),
            Staleness::Unknown => None,
        }
    }
}

/// Compare `reference` and `target`, parsing text and paths with the default fuzzy parser
pub fn out_of_date<'a, 'b>(
    reference: Option<impl Into<StampInput<'a>>>,
    target: Option<impl Into<StampInput<'b>>>,
) -> Result<Staleness> {
    out_of_date_with(&FuzzyDateParser, reference, target, "")
}

/// Compare `reference` and `target` with an explicit parser and stem-stripping pattern
pub fn out_of_date_with<'a, 'b, P: DateParser + ?Sized>(
    parser: &P,
    reference: Option<impl Into<StampInput<'a>>>,
    target: Option<impl Into<StampInput<'b>>>,
    strip_pattern: &str,
) -> Result<Staleness> {
    let reference = reference
        .map(|input| input.into().resolve(parser, strip_pattern))
        .transpose()?;
    let target = target
        .map(|input| input.into().resolve(parser, strip_pattern))
        .transpose()?;
    Ok(Staleness::between(reference, target))
}
