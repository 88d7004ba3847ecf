use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use thiserror::Error;

/// Identifier of a weekly ranking bucket: ISO-8601 week-year plus week number.
///
/// Formats as `YYYY-W##` (4-digit week-year, 2-digit zero-padded week). Other
/// readers key off that exact string, and the padding keeps keys from adjacent
/// weeks lexicographically ordered even across a year boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekId {
    year: i32,
    week: u32,
}

impl WeekId {
    /// Resolve the bucket an instant belongs to. ISO week rules: weeks start
    /// Monday, and a week belongs to the year that contains its Thursday, so
    /// late-December instants can resolve into week 1 of the next year and
    /// early-January instants into week 52/53 of the prior one.
    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        let iso = instant.date_naive().iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// The bucket for right now.
    pub fn current() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u32 {
        self.week
    }
}

impl fmt::Display for WeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-W{:02}", self.year, self.week)
    }
}

#[derive(Debug, Clone, Error)]
#[error("invalid week id {0:?}, expected YYYY-W##")]
pub struct ParseWeekIdError(pub String);

impl FromStr for WeekId {
    type Err = ParseWeekIdError;

    /// Strict parse of the `YYYY-W##` format. Only accepts what `Display`
    /// emits; week numbers outside 01..=53 are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseWeekIdError(s.to_string());

        let (year_part, week_part) = s.split_once("-W").ok_or_else(malformed)?;
        if year_part.len() != 4 || !year_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        if week_part.len() != 2 || !week_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        let year: i32 = year_part.parse().map_err(|_| malformed())?;
        let week: u32 = week_part.parse().map_err(|_| malformed())?;
        if !(1..=53).contains(&week) {
            return Err(malformed());
        }

        Ok(Self { year, week })
    }
}
