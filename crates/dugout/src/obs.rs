//! Pipeline observability boundary.
//!
//! Events are optional, injected by the caller, and must not affect
//! promotion semantics.

use crate::types::{DataSource, IngestDate, TableLocation};

///
/// EventSink
///

pub trait EventSink {
    fn on_event(&self, event: PipelineEvent);
}

///
/// PipelineEvent
///
/// One per decision point a run makes, carrying enough to reconstruct what
/// the run did without re-reading the lake.
///

#[derive(Clone, Debug, PartialEq)]
pub enum PipelineEvent {
    StageStarted {
        source: DataSource,
        date: IngestDate,
    },
    SnapshotDecoded {
        source: DataSource,
        file: String,
        rows: u64,
    },
    ColumnsNormalized {
        source: DataSource,
        converted: Vec<String>,
        skipped: Vec<String>,
    },
    StagingReplaced {
        source: DataSource,
        rows: u64,
    },
    PromoteStarted {
        source: DataSource,
        date: IngestDate,
    },
    /// The bronze table does not exist yet; reconciliation and change
    /// detection are skipped and the whole snapshot promotes.
    BootstrapTarget {
        location: TableLocation,
    },
    /// The target schema could not be read; reconciliation is skipped and
    /// promotion continues.
    ReconcileSkipped {
        location: TableLocation,
        reason: String,
    },
    /// Diagnostic only. Promotion proceeds regardless of drift.
    SchemaDrift {
        location: TableLocation,
        missing_in_target: Vec<String>,
        missing_in_staging: Vec<String>,
    },
    /// Every staged fingerprint already exists in bronze; nothing is
    /// deleted or written.
    PartitionUnchanged {
        source: DataSource,
        date: IngestDate,
    },
    PartitionReplaced {
        source: DataSource,
        date: IngestDate,
        rows_deleted: u64,
    },
    RowsPromoted {
        source: DataSource,
        date: IngestDate,
        rows_written: u64,
    },
}

///
/// NullSink
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn on_event(&self, _: PipelineEvent) {}
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sink_swallows_events() {
        let date = IngestDate::parse("01092024").unwrap();
        NullSink.on_event(PipelineEvent::PromoteStarted {
            source: DataSource::PlayerMetadata,
            date,
        });
        NullSink.on_event(PipelineEvent::RowsPromoted {
            source: DataSource::PlayerMetadata,
            date,
            rows_written: 3,
        });
    }
}
