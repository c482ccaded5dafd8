mod date;
mod location;
mod season;
mod source;

pub use date::{IngestDate, ParseDateError};
pub use location::{Layer, TableLocation};
pub use season::Season;
pub use source::{
    CREATED_TIMESTAMP_COLUMN, DataSource, INGEST_DATE_COLUMN, KeyRule, PLAYER_SEASON_KEY,
    POSITION_SEASON_KEY, ParseSourceError, SEASON_COLUMN, SourceDescriptor, TEAM_SEASON_KEY,
};
