use crate::{
    batch::Batch,
    store::{Predicate, StoreError, TableStore},
    types::TableLocation,
    value::{Value, ValueKind},
};
use derive_more::{Deref, DerefMut};
use std::{cell::RefCell, collections::BTreeMap};

///
/// TableMap
///

#[derive(Debug, Default, Deref, DerefMut)]
struct TableMap(BTreeMap<TableLocation, MemoryTable>);

///
/// MemoryTable
///
/// Row-major storage plus the pinned kind of every column. A column's kind
/// is set by the first non-null value it ever holds; nulls match any kind.
///

#[derive(Clone, Debug, Default)]
struct MemoryTable {
    columns: Vec<String>,
    kinds: BTreeMap<String, ValueKind>,
    rows: Vec<Vec<Value>>,
}

impl MemoryTable {
    /// Validate an incoming batch against existing column kinds, returning
    /// the kind map after the batch. Nothing is mutated on failure, which
    /// keeps writes all-or-nothing.
    fn checked_kinds(
        existing: &BTreeMap<String, ValueKind>,
        location: &TableLocation,
        batch: &Batch,
    ) -> Result<BTreeMap<String, ValueKind>, StoreError> {
        let mut staged = existing.clone();
        for (idx, column) in batch.columns().iter().enumerate() {
            for row in batch.rows() {
                let Some(incoming) = row[idx].kind() else {
                    continue;
                };
                match staged.get(column) {
                    Some(&pinned) if pinned != incoming => {
                        return Err(StoreError::SchemaConflict {
                            location: *location,
                            column: column.clone(),
                            existing: pinned,
                            incoming,
                        });
                    }
                    Some(_) => {}
                    None => {
                        staged.insert(column.clone(), incoming);
                    }
                }
            }
        }

        Ok(staged)
    }

    /// Commit a validated batch: grow the schema with any new columns
    /// (backfilled with nulls), then append every row in table column order.
    fn absorb(&mut self, kinds: BTreeMap<String, ValueKind>, batch: &Batch) {
        self.kinds = kinds;

        for column in batch.columns() {
            if !self.columns.iter().any(|have| have == column) {
                self.columns.push(column.clone());
                for row in &mut self.rows {
                    row.push(Value::Null);
                }
            }
        }

        let spots: Vec<Option<usize>> = self
            .columns
            .iter()
            .map(|column| batch.column_index(column))
            .collect();

        for row in batch.rows() {
            let mapped = spots
                .iter()
                .map(|spot| spot.map_or(Value::Null, |idx| row[idx].clone()))
                .collect();
            self.rows.push(mapped);
        }
    }
}

///
/// MemoryTableStore
///
/// Reference [`TableStore`] backed by a `BTreeMap`. Carries the same
/// contract a remote lake client does, in particular create-on-append,
/// all-or-nothing writes and kind pinning, so pipeline behaviour can be
/// exercised without any storage account. Interior mutability matches the
/// engine's single-threaded call pattern.
///

#[derive(Debug, Default)]
pub struct MemoryTableStore {
    tables: RefCell<TableMap>,
}

impl MemoryTableStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True if a table has been created at this location.
    #[must_use]
    pub fn has_table(&self, location: &TableLocation) -> bool {
        self.tables.borrow().contains_key(location)
    }
}

impl TableStore for MemoryTableStore {
    fn read_columns(&self, location: &TableLocation) -> Result<Vec<String>, StoreError> {
        self.tables
            .borrow()
            .get(location)
            .map(|table| table.columns.clone())
            .ok_or(StoreError::TableNotFound {
                location: *location,
            })
    }

    fn read_table(&self, location: &TableLocation) -> Result<Batch, StoreError> {
        let map = self.tables.borrow();
        let table = map.get(location).ok_or(StoreError::TableNotFound {
            location: *location,
        })?;

        Batch::from_rows(table.columns.clone(), table.rows.clone()).map_err(|err| {
            StoreError::ReadFailed {
                location: *location,
                reason: err.to_string(),
            }
        })
    }

    fn delete_where(
        &self,
        location: &TableLocation,
        predicate: &Predicate,
    ) -> Result<u64, StoreError> {
        let mut map = self.tables.borrow_mut();
        let table = map.get_mut(location).ok_or(StoreError::TableNotFound {
            location: *location,
        })?;

        let Some(idx) = table
            .columns
            .iter()
            .position(|column| *column == predicate.column)
        else {
            return Err(StoreError::DeleteFailed {
                location: *location,
                reason: format!("unknown predicate column '{}'", predicate.column),
            });
        };

        let before = table.rows.len();
        table.rows.retain(|row| row[idx] != predicate.value);

        Ok((before - table.rows.len()) as u64)
    }

    fn append_rows(&self, location: &TableLocation, batch: &Batch) -> Result<u64, StoreError> {
        let mut map = self.tables.borrow_mut();

        let empty = BTreeMap::new();
        let existing = map.get(location).map_or(&empty, |table| &table.kinds);
        let staged = MemoryTable::checked_kinds(existing, location, batch)?;

        map.entry(*location).or_default().absorb(staged, batch);

        Ok(batch.len() as u64)
    }

    fn overwrite(&self, location: &TableLocation, batch: &Batch) -> Result<u64, StoreError> {
        let empty = BTreeMap::new();
        let staged = MemoryTable::checked_kinds(&empty, location, batch)?;

        let mut table = MemoryTable::default();
        table.absorb(staged, batch);
        self.tables.borrow_mut().insert(*location, table);

        Ok(batch.len() as u64)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataSource;

    fn batch(columns: &[&str], rows: Vec<Vec<Value>>) -> Batch {
        Batch::from_rows(columns.iter().map(ToString::to_string).collect(), rows)
            .expect("valid batch")
    }

    fn bronze() -> TableLocation {
        TableLocation::bronze(DataSource::TeamMetadata)
    }

    #[test]
    fn append_creates_the_table() {
        let store = MemoryTableStore::new();
        assert!(!store.has_table(&bronze()));

        let written = store
            .append_rows(
                &bronze(),
                &batch(&["id", "name"], vec![vec![1.into(), "Arsenal".into()]]),
            )
            .unwrap();

        assert_eq!(written, 1);
        assert!(store.has_table(&bronze()));
        assert_eq!(store.read_columns(&bronze()).unwrap(), vec!["id", "name"]);
    }

    #[test]
    fn missing_table_reads_fail_with_not_found() {
        let store = MemoryTableStore::new();

        assert!(matches!(
            store.read_columns(&bronze()),
            Err(StoreError::TableNotFound { .. })
        ));
        assert!(matches!(
            store.read_table(&bronze()),
            Err(StoreError::TableNotFound { .. })
        ));
    }

    #[test]
    fn append_evolves_schema_with_null_backfill() {
        let store = MemoryTableStore::new();
        store
            .append_rows(&bronze(), &batch(&["id"], vec![vec![1.into()]]))
            .unwrap();
        store
            .append_rows(
                &bronze(),
                &batch(&["id", "name"], vec![vec![2.into(), "Villa".into()]]),
            )
            .unwrap();

        let table = store.read_table(&bronze()).unwrap();
        assert_eq!(table.columns(), ["id", "name"]);
        assert_eq!(table.value(0, "name"), Some(&Value::Null));
        assert_eq!(table.value(1, "name"), Some(&Value::Text("Villa".into())));
    }

    #[test]
    fn kind_conflict_rejects_the_whole_batch() {
        let store = MemoryTableStore::new();
        store
            .append_rows(&bronze(), &batch(&["id"], vec![vec![1.into()]]))
            .unwrap();

        // Second row is fine on its own; the first poisons the batch.
        let bad = batch(&["id"], vec![vec!["one".into()], vec![2.into()]]);
        let err = store.append_rows(&bronze(), &bad).unwrap_err();

        assert!(matches!(
            err,
            StoreError::SchemaConflict {
                existing: ValueKind::Int,
                incoming: ValueKind::Text,
                ..
            }
        ));
        assert_eq!(store.read_table(&bronze()).unwrap().len(), 1);
    }

    #[test]
    fn nulls_never_pin_a_column_kind() {
        let store = MemoryTableStore::new();
        store
            .append_rows(&bronze(), &batch(&["id"], vec![vec![Value::Null]]))
            .unwrap();

        // An Int arriving later is the first real kind, not a conflict.
        store
            .append_rows(&bronze(), &batch(&["id"], vec![vec![7.into()]]))
            .unwrap();

        assert_eq!(store.read_table(&bronze()).unwrap().len(), 2);
    }

    #[test]
    fn delete_where_removes_only_matching_rows() {
        let store = MemoryTableStore::new();
        store
            .append_rows(
                &bronze(),
                &batch(
                    &["id", "ingest_date"],
                    vec![
                        vec![1.into(), "01092024".into()],
                        vec![2.into(), "02092024".into()],
                        vec![3.into(), "01092024".into()],
                    ],
                ),
            )
            .unwrap();

        let deleted = store
            .delete_where(&bronze(), &Predicate::column_eq("ingest_date", "01092024".into()))
            .unwrap();

        assert_eq!(deleted, 2);
        let table = store.read_table(&bronze()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.value(0, "id"), Some(&Value::Int(2)));
    }

    #[test]
    fn delete_where_on_missing_table_is_not_found() {
        let store = MemoryTableStore::new();
        let err = store
            .delete_where(&bronze(), &Predicate::column_eq("ingest_date", "01092024".into()))
            .unwrap_err();

        assert!(matches!(err, StoreError::TableNotFound { .. }));
    }

    #[test]
    fn delete_where_on_unknown_column_fails() {
        let store = MemoryTableStore::new();
        store
            .append_rows(&bronze(), &batch(&["id"], vec![vec![1.into()]]))
            .unwrap();

        let err = store
            .delete_where(&bronze(), &Predicate::column_eq("ingest_date", "01092024".into()))
            .unwrap_err();

        assert!(matches!(err, StoreError::DeleteFailed { .. }));
    }

    #[test]
    fn deleting_zero_rows_is_fine() {
        let store = MemoryTableStore::new();
        store
            .append_rows(
                &bronze(),
                &batch(&["id", "ingest_date"], vec![vec![1.into(), "01092024".into()]]),
            )
            .unwrap();

        let deleted = store
            .delete_where(&bronze(), &Predicate::column_eq("ingest_date", "09092024".into()))
            .unwrap();

        assert_eq!(deleted, 0);
        assert_eq!(store.read_table(&bronze()).unwrap().len(), 1);
    }

    #[test]
    fn overwrite_replaces_rows_and_schema() {
        let store = MemoryTableStore::new();
        store
            .append_rows(
                &bronze(),
                &batch(&["id", "name"], vec![vec![1.into(), "Arsenal".into()]]),
            )
            .unwrap();

        store
            .overwrite(&bronze(), &batch(&["code"], vec![vec!["ARS".into()]]))
            .unwrap();

        let table = store.read_table(&bronze()).unwrap();
        assert_eq!(table.columns(), ["code"]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn overwrite_resets_pinned_kinds() {
        let store = MemoryTableStore::new();
        store
            .append_rows(&bronze(), &batch(&["id"], vec![vec![1.into()]]))
            .unwrap();

        // After a full replace the old Int pin is gone.
        store
            .overwrite(&bronze(), &batch(&["id"], vec![vec!["one".into()]]))
            .unwrap();

        assert_eq!(
            store.read_table(&bronze()).unwrap().value(0, "id"),
            Some(&Value::Text("one".into()))
        );
    }
}
