use crate::{
    clock::{Clock, SystemClock},
    detect,
    error::Error,
    keys,
    landing::{self, LandingError, LandingSource},
    obs::{EventSink, NullSink, PipelineEvent},
    schema,
    store::{Predicate, StoreError, TableStore},
    types::{
        CREATED_TIMESTAMP_COLUMN, DataSource, INGEST_DATE_COLUMN, IngestDate, SEASON_COLUMN,
        Season, TableLocation,
    },
    value::Value,
};

static SYSTEM_CLOCK: SystemClock = SystemClock;
static NULL_SINK: NullSink = NullSink;

///
/// Pipeline
///
/// The promotion engine over injected collaborators. One instance serves
/// every feed; per-feed behaviour comes from the source descriptor, not
/// from per-feed code paths. Calls are synchronous and the caller runs at
/// most one per `(source, date)` at a time.
///

pub struct Pipeline<'a> {
    store: &'a dyn TableStore,
    landing: Option<&'a dyn LandingSource>,
    clock: &'a dyn Clock,
    sink: &'a dyn EventSink,
}

impl<'a> Pipeline<'a> {
    #[must_use]
    pub fn new(store: &'a dyn TableStore) -> Self {
        Self {
            store,
            landing: None,
            clock: &SYSTEM_CLOCK,
            sink: &NULL_SINK,
        }
    }

    #[must_use]
    pub fn with_landing(mut self, landing: &'a dyn LandingSource) -> Self {
        self.landing = Some(landing);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: &'a dyn Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: &'a dyn EventSink) -> Self {
        self.sink = sink;
        self
    }

    /// Stage one landed snapshot: pick the date's single raw file, decode
    /// it, project the feed's business columns, normalize its float
    /// columns, stamp `ingest_date` and `created_timestamp`, and replace
    /// the staging table wholesale.
    ///
    /// Inputs are validated before any storage or landing call.
    pub fn stage(&self, source: &str, date: &str) -> Result<StageOutcome, Error> {
        let source: DataSource = source.parse()?;
        let date: IngestDate = date.parse()?;

        self.run_stage(source, date)
    }

    /// Promote one staged snapshot into bronze, returning how many rows
    /// were written and how many the partition swap deleted.
    ///
    /// Inputs are validated before any storage call. Reruns for a
    /// `(source, date)` already promoted are no-ops.
    pub fn promote(&self, source: &str, date: &str) -> Result<PromoteOutcome, Error> {
        let source: DataSource = source.parse()?;
        let date: IngestDate = date.parse()?;

        self.run_promote(source, date)
    }

    fn run_stage(&self, source: DataSource, date: IngestDate) -> Result<StageOutcome, Error> {
        let landing_source = self.landing.ok_or(LandingError::NotConfigured)?;
        self.sink.on_event(PipelineEvent::StageStarted { source, date });

        let descriptor = keys::descriptor_for(source)?;

        let files = landing_source.list_files(source, date)?;
        let file = landing::select_snapshot(source, files)?;
        let bytes = landing_source.fetch(source, date, &file)?;
        let snapshot = landing::decode_snapshot(&file, &bytes)?;
        self.sink.on_event(PipelineEvent::SnapshotDecoded {
            source,
            file: file.clone(),
            rows: snapshot.len() as u64,
        });

        // Project the business columns; ingest_date is stamped, not read.
        let picks: Vec<&str> = descriptor
            .business_columns
            .iter()
            .copied()
            .filter(|column| *column != INGEST_DATE_COLUMN)
            .collect();
        let mut staged = snapshot.select(&picks)?;

        let (converted, skipped) =
            landing::normalize_float_columns(&mut staged, descriptor.float_columns)?;
        if !(converted.is_empty() && skipped.is_empty()) {
            self.sink.on_event(PipelineEvent::ColumnsNormalized {
                source,
                converted,
                skipped,
            });
        }

        staged.set_column(INGEST_DATE_COLUMN, Value::Text(date.to_string()));
        staged.set_column(
            CREATED_TIMESTAMP_COLUMN,
            Value::Text(self.clock.today().to_string()),
        );

        let rows_staged = self
            .store
            .overwrite(&TableLocation::staging(source), &staged)?;
        self.sink
            .on_event(PipelineEvent::StagingReplaced { source, rows: rows_staged });

        Ok(StageOutcome { file, rows_staged })
    }

    fn run_promote(&self, source: DataSource, date: IngestDate) -> Result<PromoteOutcome, Error> {
        self.sink
            .on_event(PipelineEvent::PromoteStarted { source, date });

        let descriptor = keys::descriptor_for(source)?;
        let staging_location = TableLocation::staging(source);
        let bronze_location = TableLocation::bronze(source);

        // A missing staging table is fatal; staging rows for a different
        // date are simply not this run's business.
        let staging = self.store.read_table(&staging_location)?;
        let staged = staging.filter_eq(INGEST_DATE_COLUMN, &Value::Text(date.to_string()))?;
        if staged.is_empty() {
            self.sink
                .on_event(PipelineEvent::PartitionUnchanged { source, date });
            return Ok(PromoteOutcome::default());
        }

        // Derive season-scoped keys, then stamp the audit columns.
        let season = Season::from_ingest_date(date);
        let mut snapshot = staged;
        keys::derive_keys(descriptor, &mut snapshot, &season)?;
        snapshot.set_column(SEASON_COLUMN, Value::Text(season.to_string()));
        snapshot.set_column(
            CREATED_TIMESTAMP_COLUMN,
            Value::Text(self.clock.today().to_string()),
        );

        // No bronze table yet: bootstrap with the whole snapshot.
        let target_columns = match self.store.read_columns(&bronze_location) {
            Ok(columns) => Some(columns),
            Err(StoreError::TableNotFound { .. }) => {
                self.sink.on_event(PipelineEvent::BootstrapTarget {
                    location: bronze_location,
                });
                let rows_written = self.store.append_rows(&bronze_location, &snapshot)?;
                self.sink.on_event(PipelineEvent::RowsPromoted {
                    source,
                    date,
                    rows_written,
                });
                return Ok(PromoteOutcome {
                    rows_written,
                    rows_deleted: 0,
                });
            }
            Err(err) => {
                self.sink.on_event(PipelineEvent::ReconcileSkipped {
                    location: bronze_location,
                    reason: err.to_string(),
                });
                None
            }
        };

        // Reconciliation is diagnostic; drift never stops promotion, and an
        // unreadable schema skips the comparison rather than the run.
        if let Some(target_columns) = target_columns {
            let mut ignored = vec![SEASON_COLUMN, CREATED_TIMESTAMP_COLUMN];
            ignored.extend(descriptor.derived_columns());
            let diff = schema::reconcile(snapshot.columns(), &target_columns, &ignored);
            if !diff.is_clean() {
                self.sink.on_event(PipelineEvent::SchemaDrift {
                    location: bronze_location,
                    missing_in_target: diff.missing_in_target,
                    missing_in_staging: diff.missing_in_staging,
                });
            }
        }

        // Probe against the full table, this date's partition included. If
        // no staged fingerprint is new the run leaves bronze untouched.
        let target = self.store.read_table(&bronze_location)?;
        let probe = detect::new_rows(source, &snapshot, &target)?;
        if probe.is_empty() {
            self.sink
                .on_event(PipelineEvent::PartitionUnchanged { source, date });
            return Ok(PromoteOutcome::default());
        }

        // Something is new. Swap the partition: delete this date's rows,
        // then detect against what survives so rows first promoted on this
        // date are rewritten rather than lost. A failed delete stops the
        // run before anything is written.
        let predicate = Predicate::column_eq(INGEST_DATE_COLUMN, Value::Text(date.to_string()));
        let rows_deleted = self.store.delete_where(&bronze_location, &predicate)?;
        self.sink.on_event(PipelineEvent::PartitionReplaced {
            source,
            date,
            rows_deleted,
        });

        let remainder = self.store.read_table(&bronze_location)?;
        let fresh = detect::new_rows(source, &snapshot, &remainder)?;
        let rows_written = self.store.append_rows(&bronze_location, &fresh)?;
        self.sink.on_event(PipelineEvent::RowsPromoted {
            source,
            date,
            rows_written,
        });

        Ok(PromoteOutcome {
            rows_written,
            rows_deleted,
        })
    }
}

///
/// StageOutcome
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StageOutcome {
    pub file: String,
    pub rows_staged: u64,
}

///
/// PromoteOutcome
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PromoteOutcome {
    pub rows_written: u64,
    pub rows_deleted: u64,
}

///
/// TESTS
///
