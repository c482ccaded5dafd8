use crate::{
    batch::{Batch, BatchError},
    types::{DataSource, IngestDate},
    value::{Value, ValueKind},
};
use serde_json::{Map, Value as JsonValue};
use std::{collections::BTreeMap, fmt};

///
/// LandingSource
///
/// Read-only view over the landing layer, one directory of raw files per
/// `source/date`. Deployments put their blob client behind this; listing a
/// date that never landed returns an empty list, not an error.
///

pub trait LandingSource {
    fn list_files(&self, source: DataSource, date: IngestDate) -> Result<Vec<String>, LandingError>;

    fn fetch(
        &self,
        source: DataSource,
        date: IngestDate,
        file: &str,
    ) -> Result<Vec<u8>, LandingError>;
}

/// Pick the snapshot to stage. The ingestion jobs write exactly one file per
/// `source/date`; zero or several means the landing layer is in a state the
/// engine must not guess its way through.
pub fn select_snapshot(source: DataSource, mut files: Vec<String>) -> Result<String, LandingError> {
    if files.len() > 1 {
        return Err(LandingError::AmbiguousSnapshot {
            source,
            count: files.len(),
        });
    }

    files.pop().ok_or(LandingError::NoSnapshot { source })
}

/// Decode one raw snapshot into a batch. Accepts a JSON array of objects, a
/// single object, or newline-delimited objects. Keys missing from a given
/// row decode as null; nested arrays and objects are kept as their compact
/// JSON text.
pub fn decode_snapshot(file: &str, bytes: &[u8]) -> Result<Batch, LandingError> {
    let objects = parse_objects(file, bytes)?;
    if objects.is_empty() {
        return Err(LandingError::Decode {
            file: file.to_string(),
            reason: "snapshot holds no rows".to_string(),
        });
    }

    let mut columns: Vec<String> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !columns.iter().any(|column| column == key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = objects
        .into_iter()
        .map(|mut object| {
            columns
                .iter()
                .map(|column| {
                    object
                        .remove(column)
                        .map_or(Value::Null, Value::from_json)
                })
                .collect()
        })
        .collect();

    let mut batch =
        Batch::from_rows(columns, rows).map_err(|err| LandingError::Decode {
            file: file.to_string(),
            reason: err.to_string(),
        })?;

    unify_numeric_columns(&mut batch).map_err(|err| LandingError::Decode {
        file: file.to_string(),
        reason: err.to_string(),
    })?;

    Ok(batch)
}

fn parse_objects(file: &str, bytes: &[u8]) -> Result<Vec<Map<String, JsonValue>>, LandingError> {
    let decode = |reason: String| LandingError::Decode {
        file: file.to_string(),
        reason,
    };

    // A whole-buffer parse covers arrays, single objects and pretty-printed
    // files; anything it rejects gets the newline-delimited treatment.
    if let Ok(value) = serde_json::from_slice::<JsonValue>(bytes) {
        return match value {
            JsonValue::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(n, item)| match item {
                    JsonValue::Object(map) => Ok(map),
                    _ => Err(decode(format!("element {n} is not an object"))),
                })
                .collect(),
            JsonValue::Object(map) => Ok(vec![map]),
            _ => Err(decode(
                "top-level value is neither an array nor an object".to_string(),
            )),
        };
    }

    let text = std::str::from_utf8(bytes).map_err(|err| decode(err.to_string()))?;
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(n, line)| {
            serde_json::from_str::<Map<String, JsonValue>>(line)
                .map_err(|err| decode(format!("line {}: {err}", n + 1)))
        })
        .collect()
}

/// Upstream delivers some numeric fields as int on one row and float on the
/// next. Widen any column holding both to float so its kind is stable, the
/// way schema inference would.
fn unify_numeric_columns(batch: &mut Batch) -> Result<(), BatchError> {
    let names: Vec<String> = batch.columns().to_vec();

    for name in names {
        let Some(idx) = batch.column_index(&name) else {
            continue;
        };

        let mut ints = false;
        let mut floats = false;
        let mut other = false;
        for row in batch.rows() {
            match row[idx].kind() {
                Some(ValueKind::Int) => ints = true,
                Some(ValueKind::Float) => floats = true,
                None => {}
                Some(_) => other = true,
            }
        }
        if !(ints && floats) || other {
            continue;
        }

        let widened: Vec<Value> = batch
            .rows()
            .map(|row| match &row[idx] {
                v @ Value::Int(_) => v.as_f64().map_or_else(|| v.clone(), Value::Float),
                v => v.clone(),
            })
            .collect();
        batch.push_column(&name, widened)?;
    }

    Ok(())
}

/// Force the named columns to float, nulls becoming `0.0`. A column with any
/// value that has no numeric reading is left untouched rather than failing
/// the run. Returns the converted and skipped column names; names absent
/// from the batch are ignored.
pub fn normalize_float_columns(
    batch: &mut Batch,
    columns: &[&str],
) -> Result<(Vec<String>, Vec<String>), BatchError> {
    let mut converted = Vec::new();
    let mut skipped = Vec::new();

    for &name in columns {
        let Some(idx) = batch.column_index(name) else {
            continue;
        };

        let recast: Option<Vec<Value>> = batch
            .rows()
            .map(|row| float_view(&row[idx]).map(Value::Float))
            .collect();

        match recast {
            Some(values) => {
                batch.push_column(name, values)?;
                converted.push(name.to_string());
            }
            None => skipped.push(name.to_string()),
        }
    }

    Ok((converted, skipped))
}

fn float_view(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => s.trim().parse().ok(),
        numeric => numeric.as_f64(),
    }
}

///
/// MemoryLandingSource
///
/// In-memory landing layer for tests and demos, files keyed by
/// `(source, date)`.
///

#[derive(Debug, Default)]
pub struct MemoryLandingSource {
    files: BTreeMap<(DataSource, IngestDate), Vec<(String, Vec<u8>)>>,
}

impl MemoryLandingSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Land a file under `source/date`, builder style.
    #[must_use]
    pub fn with_file(
        mut self,
        source: DataSource,
        date: IngestDate,
        name: &str,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        self.files
            .entry((source, date))
            .or_default()
            .push((name.to_string(), bytes.into()));
        self
    }
}

impl LandingSource for MemoryLandingSource {
    fn list_files(
        &self,
        source: DataSource,
        date: IngestDate,
    ) -> Result<Vec<String>, LandingError> {
        Ok(self
            .files
            .get(&(source, date))
            .map(|files| files.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default())
    }

    fn fetch(
        &self,
        source: DataSource,
        date: IngestDate,
        file: &str,
    ) -> Result<Vec<u8>, LandingError> {
        self.files
            .get(&(source, date))
            .and_then(|files| files.iter().find(|(name, _)| name == file))
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| LandingError::FetchFailed {
                source,
                file: file.to_string(),
                reason: "file is not present".to_string(),
            })
    }
}

///
/// LandingError
///

// Display and Error are written by hand: deriving `thiserror::Error` would
// treat every field named `source` as the error's cause and demand
// `DataSource: std::error::Error`, but here `source` is domain data naming
// the feed, not an underlying error.
#[derive(Debug)]
pub enum LandingError {
    NotConfigured,

    NoSnapshot { source: DataSource },

    AmbiguousSnapshot { source: DataSource, count: usize },

    ListFailed { source: DataSource, reason: String },

    FetchFailed {
        source: DataSource,
        file: String,
        reason: String,
    },

    Decode { file: String, reason: String },
}

impl fmt::Display for LandingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "no landing source configured"),
            Self::NoSnapshot { source } => write!(f, "no snapshot found for {source}"),
            Self::AmbiguousSnapshot { source, count } => {
                write!(f, "{count} files found for {source}, expected exactly one snapshot")
            }
            Self::ListFailed { source, reason } => {
                write!(f, "listing landing files for {source} failed: {reason}")
            }
            Self::FetchFailed {
                source,
                file,
                reason,
            } => {
                write!(f, "fetching '{file}' for {source} failed: {reason}")
            }
            Self::Decode { file, reason } => write!(f, "decoding '{file}' failed: {reason}"),
        }
    }
}

impl std::error::Error for LandingError {}

///
/// TESTS
///
