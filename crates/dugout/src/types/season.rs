use crate::types::IngestDate;
use std::fmt::{self, Display};

///
/// Season
///
/// Football season label in the `"2024/2025"` form carried by every promoted
/// row. A season window opens in August: snapshots dated August–December
/// belong to `year/year+1`, snapshots dated January–July close out the
/// previous season as `year-1/year`.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Season {
    start_year: i32,
}

impl Season {
    #[must_use]
    pub const fn from_ingest_date(date: IngestDate) -> Self {
        let year = date.year();
        let start_year = if date.month() >= 8 { year } else { year - 1 };

        Self { start_year }
    }

    #[must_use]
    pub const fn start_year(&self) -> i32 {
        self.start_year
    }

    #[must_use]
    pub const fn end_year(&self) -> i32 {
        self.start_year + 1
    }
}

impl Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.start_year(), self.end_year())
    }
}

///
/// TESTS
///
