mod memory;

pub use memory::MemoryTableStore;

use crate::{
    batch::Batch,
    types::TableLocation,
    value::{Value, ValueKind},
};
use thiserror::Error as ThisError;

///
/// Predicate
///
/// The one predicate shape the engine deletes by: column equality. Partition
/// replacement is always `ingest_date == <date>`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub value: Value,
}

impl Predicate {
    #[must_use]
    pub fn column_eq(column: &str, value: Value) -> Self {
        Self {
            column: column.to_string(),
            value,
        }
    }
}

///
/// TableStore
///
/// Narrow contract against the lake's table storage. Real deployments stand
/// a remote client behind this trait; the engine never sees paths,
/// credentials or wire formats. Every failure mode is a distinguishable
/// [`StoreError`] kind so the pipeline can tell a missing table from a
/// broken one.
///

pub trait TableStore {
    /// Column names of a persisted table, in table order.
    fn read_columns(&self, location: &TableLocation) -> Result<Vec<String>, StoreError>;

    /// Read the whole table.
    fn read_table(&self, location: &TableLocation) -> Result<Batch, StoreError>;

    /// Delete every row matching the predicate, returning how many went.
    /// Zero is a valid result.
    fn delete_where(
        &self,
        location: &TableLocation,
        predicate: &Predicate,
    ) -> Result<u64, StoreError>;

    /// All-or-nothing append with schema evolution: new columns may appear,
    /// a column type change is a [`StoreError::SchemaConflict`]. Creates the
    /// table on first write. Returns the row count written.
    fn append_rows(&self, location: &TableLocation, batch: &Batch) -> Result<u64, StoreError>;

    /// Replace the table wholesale, schema included. Creates the table if
    /// absent. Returns the row count written.
    fn overwrite(&self, location: &TableLocation, batch: &Batch) -> Result<u64, StoreError>;
}

///
/// StoreError
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("table not found: {location}")]
    TableNotFound { location: TableLocation },

    #[error("schema read failed for {location}: {reason}")]
    SchemaRead {
        location: TableLocation,
        reason: String,
    },

    #[error("read failed for {location}: {reason}")]
    ReadFailed {
        location: TableLocation,
        reason: String,
    },

    #[error("delete failed for {location}: {reason}")]
    DeleteFailed {
        location: TableLocation,
        reason: String,
    },

    #[error("write failed for {location}: {reason}")]
    WriteFailed {
        location: TableLocation,
        reason: String,
    },

    #[error(
        "schema conflict on {location}: column '{column}' holds {existing}, incoming batch has {incoming}"
    )]
    SchemaConflict {
        location: TableLocation,
        column: String,
        existing: ValueKind,
        incoming: ValueKind,
    },
}
