use crate::{
    batch::{Batch, BatchError},
    row_hash::{self, RowHash, VOLATILE_COLUMNS},
    types::DataSource,
};
use std::{collections::HashSet, fmt};

/// The columns a batch is fingerprinted over: everything it carries except
/// the volatile metadata columns.
#[must_use]
pub fn hash_columns(staging: &Batch) -> Vec<&str> {
    staging
        .columns()
        .iter()
        .map(String::as_str)
        .filter(|c| !VOLATILE_COLUMNS.contains(c))
        .collect()
}

/// Fingerprint every row of `batch` over `columns`, in row order. A column
/// absent from the batch is a named error; nulls hash as their own tag and
/// are never substituted with a default.
pub fn row_fingerprints(
    source: DataSource,
    batch: &Batch,
    columns: &[&str],
) -> Result<Vec<RowHash>, DetectError> {
    let indices = columns
        .iter()
        .map(|name| {
            batch
                .column_index(name)
                .map(|idx| (*name, idx))
                .ok_or_else(|| DetectError::MissingColumn {
                    source,
                    column: (*name).to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let fingerprints = batch
        .rows()
        .map(|row| {
            let cells: Vec<(&str, _)> = indices
                .iter()
                .map(|&(name, idx)| (name, &row[idx]))
                .collect();
            row_hash::hash_row(&cells)
        })
        .collect();

    Ok(fingerprints)
}

/// Return the staging rows whose fingerprint does not occur in the target:
/// brand-new rows and rows whose business content changed. An empty target
/// bootstraps the whole staging batch.
pub fn new_rows(
    source: DataSource,
    staging: &Batch,
    target: &Batch,
) -> Result<Batch, DetectError> {
    if target.is_empty() {
        return Ok(staging.clone());
    }

    let columns = hash_columns(staging);
    let known: HashSet<RowHash> = row_fingerprints(source, target, &columns)?
        .into_iter()
        .collect();
    let staging_fingerprints = row_fingerprints(source, staging, &columns)?;

    let mut survivors = staging.empty_like();
    for (row, fingerprint) in staging.rows().zip(staging_fingerprints) {
        if !known.contains(&fingerprint) {
            survivors.push_row(row.to_vec())?;
        }
    }

    Ok(survivors)
}

///
/// DetectError
///

// Display and Error are written by hand: deriving `thiserror::Error` would
// treat the field named `source` as the error's cause and demand
// `DataSource: std::error::Error`, but here `source` is domain data naming
// the feed, not an underlying error. `Batch` keeps transparent semantics.
#[derive(Debug)]
pub enum DetectError {
    MissingColumn { source: DataSource, column: String },

    Batch(BatchError),
}

impl fmt::Display for DetectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumn { source, column } => {
                write!(f, "column '{column}' required to fingerprint {source} rows is missing")
            }
            Self::Batch(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for DetectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MissingColumn { .. } => None,
            Self::Batch(err) => err.source(),
        }
    }
}

impl From<BatchError> for DetectError {
    fn from(err: BatchError) -> Self {
        Self::Batch(err)
    }
}

///
/// TESTS
///
