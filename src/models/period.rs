//! Calendar grouping granularity and period keys.

use core::str::FromStr;

use chrono::{Datelike as _, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar field used to group transactions into periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Granularity {
    /// Calendar month (`YYYY-MM`).
    Month,
    /// Calendar quarter (`YYYYQn`).
    Quarter,
    /// Calendar year (`YYYY`).
    Year,
}

impl Granularity {
    /// Returns the key of the period containing `day`.
    #[inline]
    #[must_use]
    pub fn key_for(self, day: NaiveDate) -> PeriodKey {
        let year = day.year();
        let key = match self {
            Self::Month => format!("{year:04}-{:02}", day.month()),
            Self::Quarter => format!("{year:04}Q{}", quarter_of(day.month())),
            Self::Year => format!("{year:04}"),
        };
        PeriodKey::new(key)
    }

    /// Lower-case name used in messages and CLI output.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }
}

/// Maps a 1-based month number to its 1-based quarter.
const fn quarter_of(month: u32) -> u32 {
    match month {
        1..=3 => 1,
        4..=6 => 2,
        7..=9 => 3,
        _ => 4,
    }
}

impl core::fmt::Display for Granularity {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a granularity name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown granularity {0:?} (expected month, quarter or year)")]
pub struct ParseGranularityError(String);

impl FromStr for Granularity {
    type Err = ParseGranularityError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "month" | "monthly" => Ok(Self::Month),
            "q" | "quarter" | "quarterly" => Ok(Self::Quarter),
            "y" | "year" | "yearly" => Ok(Self::Year),
            _ => Err(ParseGranularityError(s.to_owned())),
        }
    }
}

/// Stable, sortable identifier of a calendar period.
///
/// Keys are zero-padded ISO-like strings (`2025-03`, `2025Q1`, `2025`), so
/// lexicographic order equals chronological order within one granularity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodKey(String);

impl PeriodKey {
    /// Creates a key from its string form.
    #[inline]
    #[must_use]
    pub const fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns the key as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key and returns the inner string.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for PeriodKey {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeriodKey {
    #[inline]
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}
