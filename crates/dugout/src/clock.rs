use crate::types::IngestDate;
use time::{OffsetDateTime, UtcOffset};

// Malaysia time. The zone has no daylight saving, so a fixed offset is
// exact.
const MYT: UtcOffset = match UtcOffset::from_hms(8, 0, 0) {
    Ok(offset) => offset,
    Err(_) => UtcOffset::UTC,
};

///
/// Clock
///
/// Where "today" comes from. The engine stamps `created_timestamp` with the
/// clock's date; injecting it keeps runs reproducible under test.
///

pub trait Clock {
    fn today(&self) -> IngestDate;
}

///
/// SystemClock
///
/// Wall-clock date in the zone the ingestion jobs schedule in.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> IngestDate {
        IngestDate::from_civil(OffsetDateTime::now_utc().to_offset(MYT).date())
    }
}

///
/// FixedClock
///

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub IngestDate);

impl Clock for FixedClock {
    fn today(&self) -> IngestDate {
        self.0
    }
}

///
/// TESTS
///
