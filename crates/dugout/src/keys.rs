use crate::{
    batch::Batch,
    types::{DataSource, Season, SourceDescriptor},
    value::Value,
};
use std::fmt;

/// Separator between the natural key and the season in a composite key.
pub const KEY_SEPARATOR: char = '-';

/// Look up the descriptor for a feed, treating a registry miss as the
/// configuration error it is rather than silently skipping the feed.
pub fn descriptor_for(source: DataSource) -> Result<&'static SourceDescriptor, KeyError> {
    SourceDescriptor::find(source).ok_or(KeyError::UnknownDataSource { source })
}

/// Stamp every composite key the feed's descriptor calls for, one derived
/// string column per rule: `"{natural_key}-{season}"`.
///
/// Keys are best-effort join helpers, not a uniqueness constraint: a null
/// natural key derives a null key rather than a `"null-…"` lookalike.
pub fn derive_keys(
    descriptor: &SourceDescriptor,
    batch: &mut Batch,
    season: &Season,
) -> Result<(), KeyError> {
    for rule in descriptor.key_rules {
        let natural =
            batch
                .column_index(rule.natural_key)
                .ok_or_else(|| KeyError::MissingNaturalKey {
                    source: descriptor.source,
                    column: rule.natural_key.to_string(),
                })?;

        let keys: Vec<Value> = batch
            .rows()
            .map(|row| composite_key(&row[natural], season))
            .collect();

        batch.push_column(rule.derived_column, keys)?;
    }

    Ok(())
}

fn composite_key(natural: &Value, season: &Season) -> Value {
    if natural.is_null() {
        return Value::Null;
    }

    Value::Text(format!("{natural}{KEY_SEPARATOR}{season}"))
}

///
/// KeyError
///

// Display and Error are written by hand: deriving `thiserror::Error` would
// treat every field named `source` as the error's cause and demand
// `DataSource: std::error::Error`, but here `source` is domain data naming
// the feed, not an underlying error. `Batch` keeps transparent semantics.
#[derive(Debug)]
pub enum KeyError {
    UnknownDataSource { source: DataSource },

    MissingNaturalKey { source: DataSource, column: String },

    Batch(crate::batch::BatchError),
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDataSource { source } => {
                write!(f, "no key descriptor registered for data source '{source}'")
            }
            Self::MissingNaturalKey { source, column } => {
                write!(f, "natural key column '{column}' missing from {source} batch")
            }
            Self::Batch(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for KeyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnknownDataSource { .. } | Self::MissingNaturalKey { .. } => None,
            Self::Batch(err) => err.source(),
        }
    }
}

impl From<crate::batch::BatchError> for KeyError {
    fn from(err: crate::batch::BatchError) -> Self {
        Self::Batch(err)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IngestDate, PLAYER_SEASON_KEY, POSITION_SEASON_KEY, TEAM_SEASON_KEY};

    fn season() -> Season {
        Season::from_ingest_date(IngestDate::parse("01092024").unwrap())
    }

    fn player_batch() -> Batch {
        Batch::from_rows(
            vec!["id".to_string(), "team".to_string(), "element_type".to_string()],
            vec![
                vec![Value::Int(1), Value::Int(3), Value::Int(4)],
                vec![Value::Int(2), Value::Int(14), Value::Int(1)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn every_source_resolves_a_descriptor() {
        for source in DataSource::ALL {
            assert!(descriptor_for(source).is_ok());
        }
    }

    #[test]
    fn player_metadata_derives_all_three_join_keys() {
        let descriptor = descriptor_for(DataSource::PlayerMetadata).unwrap();
        let mut batch = player_batch();
        derive_keys(descriptor, &mut batch, &season()).unwrap();

        assert_eq!(batch.value(0, PLAYER_SEASON_KEY), Some(&"1-2024/2025".into()));
        assert_eq!(batch.value(1, PLAYER_SEASON_KEY), Some(&"2-2024/2025".into()));
        assert_eq!(batch.value(0, TEAM_SEASON_KEY), Some(&"3-2024/2025".into()));
        assert_eq!(
            batch.value(1, POSITION_SEASON_KEY),
            Some(&"1-2024/2025".into())
        );
    }

    #[test]
    fn derivation_is_deterministic() {
        let descriptor = descriptor_for(DataSource::PlayerMetadata).unwrap();
        let mut a = player_batch();
        let mut b = player_batch();
        derive_keys(descriptor, &mut a, &season()).unwrap();
        derive_keys(descriptor, &mut b, &season()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_natural_key_names_column_and_source() {
        let descriptor = descriptor_for(DataSource::TeamMetadata).unwrap();
        let mut batch = Batch::from_rows(
            vec!["name".to_string()],
            vec![vec![Value::Text("Arsenal".to_string())]],
        )
        .unwrap();

        let err = derive_keys(descriptor, &mut batch, &season()).unwrap_err();
        match err {
            KeyError::MissingNaturalKey { source, column } => {
                assert_eq!(source, DataSource::TeamMetadata);
                assert_eq!(column, "id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn null_natural_key_derives_a_null_key() {
        let descriptor = descriptor_for(DataSource::PositionMetadata).unwrap();
        let mut batch = Batch::from_rows(
            vec!["id".to_string()],
            vec![vec![Value::Null], vec![Value::Int(2)]],
        )
        .unwrap();
        derive_keys(descriptor, &mut batch, &season()).unwrap();

        assert_eq!(batch.value(0, POSITION_SEASON_KEY), Some(&Value::Null));
        assert_eq!(
            batch.value(1, POSITION_SEASON_KEY),
            Some(&"2-2024/2025".into())
        );
    }

    #[test]
    fn text_natural_keys_pass_through_verbatim() {
        let code = Value::Text("GKP".to_string());
        assert_eq!(
            composite_key(&code, &season()),
            Value::Text("GKP-2024/2025".to_string())
        );
    }
}
