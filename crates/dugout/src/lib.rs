//! Incremental promotion engine for football-statistics snapshots: raw
//! landing files are normalized into staging, and staging snapshots promote
//! into an append-only bronze history of new-or-changed rows, one idempotent
//! partition swap per `(source, date)`.
#![warn(unreachable_pub)]

pub mod batch;
pub mod clock;
pub mod config;
pub mod detect;
pub mod error;
pub mod keys;
pub mod landing;
pub mod obs;
pub mod pipeline;
pub mod row_hash;
pub mod schema;
pub mod store;
pub mod types;
pub mod value;

///
/// Prelude
///
/// Prelude contains only the vocabulary a caller wires a pipeline with.
/// Module-level helpers and error types stay one level down.
///

pub mod prelude {
    pub use crate::{
        clock::{Clock, FixedClock, SystemClock},
        config::{MemorySecretProvider, SecretProvider, StorageOptions},
        error::Error,
        landing::{LandingSource, MemoryLandingSource},
        obs::{EventSink, NullSink, PipelineEvent},
        pipeline::{Pipeline, PromoteOutcome, StageOutcome},
        store::{MemoryTableStore, Predicate, TableStore},
        types::{DataSource, IngestDate, Layer, Season, TableLocation},
        value::Value,
    };
}
