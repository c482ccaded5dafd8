use crate::value::Value;
use thiserror::Error as ThisError;

///
/// Batch
///
/// An in-memory table: ordered column names over row-major values. Every row
/// is exactly as wide as the column list; column names are unique. Batches
/// flowing through the promotion pipeline additionally share one
/// `ingest_date` value per batch, which the pipeline enforces by reading
/// partitions rather than whole tables.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Batch {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Batch {
    pub fn new(columns: Vec<String>) -> Result<Self, BatchError> {
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].contains(column) {
                return Err(BatchError::DuplicateColumn {
                    column: column.clone(),
                });
            }
        }

        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, BatchError> {
        let mut batch = Self::new(columns)?;
        for row in rows {
            batch.push_row(row)?;
        }
        Ok(batch)
    }

    /// A batch with no columns and no rows; stands in for a table that does
    /// not exist yet.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// An empty batch sharing this batch's columns.
    #[must_use]
    pub fn empty_like(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    #[must_use]
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), BatchError> {
        if row.len() != self.columns.len() {
            return Err(BatchError::WidthMismatch {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Project onto the given columns, in the given order.
    pub fn select(&self, columns: &[&str]) -> Result<Self, BatchError> {
        let indices = columns
            .iter()
            .map(|name| {
                self.column_index(name).ok_or_else(|| BatchError::MissingColumn {
                    column: (*name).to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Self::from_rows(columns.iter().map(ToString::to_string).collect(), rows)
    }

    /// Rows whose `column` equals `value`.
    pub fn filter_eq(&self, column: &str, value: &Value) -> Result<Self, BatchError> {
        let (matching, _) = self.partition_eq(column, value)?;
        Ok(matching)
    }

    /// Split into (rows where `column` equals `value`, everything else).
    pub fn partition_eq(&self, column: &str, value: &Value) -> Result<(Self, Self), BatchError> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| BatchError::MissingColumn {
                column: column.to_string(),
            })?;

        let mut matching = Self {
            columns: self.columns.clone(),
            rows: Vec::new(),
        };
        let mut rest = Self {
            columns: self.columns.clone(),
            rows: Vec::new(),
        };
        for row in &self.rows {
            if row[idx] == *value {
                matching.rows.push(row.clone());
            } else {
                rest.rows.push(row.clone());
            }
        }

        Ok((matching, rest))
    }

    /// Set every row's `name` to `value`, appending the column if absent.
    pub fn set_column(&mut self, name: &str, value: Value) {
        if let Some(idx) = self.column_index(name) {
            for row in &mut self.rows {
                row[idx] = value.clone();
            }
        } else {
            self.columns.push(name.to_string());
            for row in &mut self.rows {
                row.push(value.clone());
            }
        }
    }

    /// Attach a per-row column, replacing it if the name already exists.
    pub fn push_column(&mut self, name: &str, values: Vec<Value>) -> Result<(), BatchError> {
        if values.len() != self.rows.len() {
            return Err(BatchError::WidthMismatch {
                expected: self.rows.len(),
                got: values.len(),
            });
        }

        if let Some(idx) = self.column_index(name) {
            for (row, value) in self.rows.iter_mut().zip(values) {
                row[idx] = value;
            }
        } else {
            self.columns.push(name.to_string());
            for (row, value) in self.rows.iter_mut().zip(values) {
                row.push(value);
            }
        }

        Ok(())
    }
}

///
/// BatchError
///

#[derive(Debug, ThisError)]
pub enum BatchError {
    #[error("column not found: {column}")]
    MissingColumn { column: String },

    #[error("duplicate column: {column}")]
    DuplicateColumn { column: String },

    #[error("expected {expected} values, got {got}")]
    WidthMismatch { expected: usize, got: usize },
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    fn sample() -> Batch {
        Batch::from_rows(
            cols(&["id", "name", "ingest_date"]),
            vec![
                vec![Value::Int(1), "alpha".into(), "01092024".into()],
                vec![Value::Int(2), "beta".into(), "01092024".into()],
                vec![Value::Int(3), "gamma".into(), "02092024".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let err = Batch::new(cols(&["id", "id"])).unwrap_err();
        assert!(matches!(err, BatchError::DuplicateColumn { column } if column == "id"));
    }

    #[test]
    fn push_row_enforces_width() {
        let mut batch = Batch::new(cols(&["a", "b"])).unwrap();
        let err = batch.push_row(vec![Value::Int(1)]).unwrap_err();
        assert!(matches!(
            err,
            BatchError::WidthMismatch {
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn select_projects_in_request_order() {
        let projected = sample().select(&["name", "id"]).unwrap();
        assert_eq!(projected.columns(), &["name", "id"]);
        assert_eq!(projected.value(0, "id"), Some(&Value::Int(1)));
        assert_eq!(projected.value(0, "name"), Some(&"alpha".into()));
    }

    #[test]
    fn select_names_the_missing_column() {
        let err = sample().select(&["id", "web_name"]).unwrap_err();
        assert!(matches!(err, BatchError::MissingColumn { column } if column == "web_name"));
    }

    #[test]
    fn partition_eq_splits_without_losing_rows() {
        let batch = sample();
        let (matching, rest) = batch
            .partition_eq("ingest_date", &"01092024".into())
            .unwrap();
        assert_eq!(matching.len(), 2);
        assert_eq!(rest.len(), 1);
        assert_eq!(matching.len() + rest.len(), batch.len());
        assert_eq!(rest.value(0, "id"), Some(&Value::Int(3)));
    }

    #[test]
    fn filter_eq_on_missing_column_errors() {
        assert!(sample().filter_eq("season", &Value::Null).is_err());
    }

    #[test]
    fn set_column_appends_then_replaces() {
        let mut batch = sample();
        batch.set_column("season", "2024/2025".into());
        assert_eq!(batch.value(2, "season"), Some(&"2024/2025".into()));

        batch.set_column("season", "2025/2026".into());
        assert_eq!(batch.columns().len(), 4);
        assert_eq!(batch.value(0, "season"), Some(&"2025/2026".into()));
    }

    #[test]
    fn push_column_requires_one_value_per_row() {
        let mut batch = sample();
        let err = batch
            .push_column("player_season_key", vec![Value::Null])
            .unwrap_err();
        assert!(matches!(err, BatchError::WidthMismatch { .. }));

        batch
            .push_column(
                "player_season_key",
                vec!["1-a".into(), "2-a".into(), "3-a".into()],
            )
            .unwrap();
        assert_eq!(batch.value(1, "player_season_key"), Some(&"2-a".into()));
    }
}
