use std::{
    fmt::{self, Debug, Display},
    str::FromStr,
    sync::OnceLock,
};
use thiserror::Error as ThisError;
use time::{Date as TimeDate, format_description::FormatItem};

static FORMAT: OnceLock<Vec<FormatItem<'static>>> = OnceLock::new();

fn ddmmyyyy_format() -> &'static [FormatItem<'static>] {
    FORMAT.get_or_init(|| {
        time::format_description::parse("[day][month][year]").expect("static format")
    })
}

///
/// IngestDate
///
/// Business date of one upstream snapshot, written and parsed in the
/// `ddMMyyyy` form the ingestion jobs are keyed by. Also the value of the
/// `ingest_date` partition column on every persisted row.
///

#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct IngestDate(TimeDate);

impl IngestDate {
    /// Parse a `ddMMyyyy` date string, e.g. `01092024`.
    pub fn parse(s: &str) -> Result<Self, ParseDateError> {
        TimeDate::parse(s, ddmmyyyy_format())
            .map(Self)
            .map_err(|_| ParseDateError::Invalid { raw: s.to_string() })
    }

    #[must_use]
    pub const fn from_civil(date: TimeDate) -> Self {
        Self(date)
    }

    /// Returns the year component (e.g. 2024)
    #[must_use]
    pub const fn year(self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1–12)
    #[must_use]
    pub const fn month(self) -> u8 {
        self.0.month() as u8
    }

    /// Returns the day-of-month component (1–31)
    #[must_use]
    pub const fn day(self) -> u8 {
        self.0.day()
    }
}

impl Debug for IngestDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IngestDate({self})")
    }
}

impl Display for IngestDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}{:04}", self.day(), self.month(), self.year())
    }
}

impl FromStr for IngestDate {
    type Err = ParseDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

///
/// ParseDateError
///

#[derive(Debug, ThisError)]
pub enum ParseDateError {
    #[error("invalid ingest date '{raw}', expected ddMMyyyy")]
    Invalid { raw: String },
}

///
/// TESTS
///
