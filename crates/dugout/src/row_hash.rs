use crate::{
    types::{CREATED_TIMESTAMP_COLUMN, INGEST_DATE_COLUMN},
    value::Value,
};
use std::fmt::{self, Debug};
use xxhash_rust::xxh3::Xxh3;

/// Row-hash format version byte used by canonical fingerprint encoding.
pub const ROW_HASH_VERSION: u8 = 1;

/// Stable XXH3 seed used by canonical row hashing across releases.
pub const ROW_HASH_SEED: u64 = 0;

/// Metadata columns excluded from every fingerprint: they change on each run
/// without the row's business content changing.
pub const VOLATILE_COLUMNS: [&str; 2] = [INGEST_DATE_COLUMN, CREATED_TIMESTAMP_COLUMN];

fn feed_u8(h: &mut Xxh3, x: u8) {
    h.update(&[x]);
}
fn feed_u32(h: &mut Xxh3, x: u32) {
    h.update(&x.to_be_bytes());
}
fn feed_i64(h: &mut Xxh3, x: i64) {
    h.update(&x.to_be_bytes());
}
fn feed_bytes(h: &mut Xxh3, b: &[u8]) {
    h.update(b);
}

#[expect(clippy::cast_possible_truncation)]
fn write_value_to_hasher(value: &Value, h: &mut Xxh3) {
    feed_u8(h, value.canonical_tag());

    match value {
        Value::Bool(b) => feed_u8(h, u8::from(*b)),
        Value::Int(i) => feed_i64(h, *i),
        Value::Float(x) => feed_bytes(h, &x.to_be_bytes()),
        Value::Text(s) => {
            feed_u32(h, s.len() as u32);
            feed_bytes(h, s.as_bytes());
        }
        Value::Null => {
            // No payload beyond the canonical tag.
        }
    }
}

/// Fingerprint one row. Cells hash under canonical column-name order, so two
/// rows with the same values under differently ordered schemas fingerprint
/// identically.
#[must_use]
#[expect(clippy::cast_possible_truncation)]
pub fn hash_row(cells: &[(&str, &Value)]) -> RowHash {
    let mut ordered = cells.to_vec();
    ordered.sort_by(|(left, _), (right, _)| left.cmp(right));

    let mut h = Xxh3::with_seed(ROW_HASH_SEED);
    feed_u8(&mut h, ROW_HASH_VERSION);

    feed_u32(&mut h, ordered.len() as u32);
    for (name, value) in ordered {
        feed_u8(&mut h, 0xFD);
        feed_u32(&mut h, name.len() as u32);
        feed_bytes(&mut h, name.as_bytes());
        feed_u8(&mut h, 0xFE);
        write_value_to_hasher(value, &mut h);
    }

    RowHash(h.digest128().to_be_bytes())
}

///
/// RowHash
///
/// 128-bit content fingerprint of one row's business columns.
///

#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct RowHash([u8; 16]);

impl RowHash {
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

impl Debug for RowHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RowHash({:032x})", u128::from_be_bytes(self.0))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hash_contract_seed_and_version_are_frozen() {
        assert_eq!(ROW_HASH_SEED, 0);
        assert_eq!(ROW_HASH_VERSION, 1);
        assert_eq!(VOLATILE_COLUMNS, ["ingest_date", "created_timestamp"]);
    }

    #[test]
    fn hash_is_deterministic() {
        let id = Value::Int(7);
        let name = Value::Text("Saka".to_string());
        let cells = [("id", &id), ("web_name", &name)];
        assert_eq!(hash_row(&cells), hash_row(&cells));
    }

    #[test]
    fn column_order_does_not_affect_the_fingerprint() {
        let id = Value::Int(7);
        let name = Value::Text("Saka".to_string());
        let forward = hash_row(&[("id", &id), ("web_name", &name)]);
        let reversed = hash_row(&[("web_name", &name), ("id", &id)]);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn values_moving_between_columns_changes_the_fingerprint() {
        let one = Value::Int(1);
        let two = Value::Int(2);
        let a = hash_row(&[("assists", &one), ("bonus", &two)]);
        let b = hash_row(&[("assists", &two), ("bonus", &one)]);
        assert_ne!(a, b);
    }

    #[test]
    fn variant_tags_keep_lookalike_values_apart() {
        let int = Value::Int(5);
        let text = Value::Text("5".to_string());
        assert_ne!(hash_row(&[("x", &int)]), hash_row(&[("x", &text)]));

        let float = Value::Float(5.0);
        assert_ne!(hash_row(&[("x", &int)]), hash_row(&[("x", &float)]));
    }

    #[test]
    fn null_is_distinct_from_empty_and_zero() {
        let null = Value::Null;
        let empty = Value::Text(String::new());
        let zero = Value::Int(0);
        let h_null = hash_row(&[("news", &null)]);
        assert_ne!(h_null, hash_row(&[("news", &empty)]));
        assert_ne!(h_null, hash_row(&[("news", &zero)]));
    }

    #[test]
    fn text_boundaries_are_length_framed() {
        let ab = Value::Text("ab".to_string());
        let c = Value::Text("c".to_string());
        let a = Value::Text("a".to_string());
        let bc = Value::Text("bc".to_string());
        assert_ne!(
            hash_row(&[("x", &ab), ("y", &c)]),
            hash_row(&[("x", &a), ("y", &bc)]),
        );
    }

    #[test]
    fn column_count_affects_the_fingerprint() {
        let v = Value::Int(1);
        assert_ne!(hash_row(&[("a", &v)]), hash_row(&[("a", &v), ("b", &v)]));
    }

    fn as_refs<'a>(cells: &'a [(&'a str, Value)]) -> Vec<(&'a str, &'a Value)> {
        cells.iter().map(|(n, v)| (*n, v)).collect()
    }

    proptest! {
        #[test]
        fn any_permutation_fingerprints_identically(
            values in proptest::collection::vec(-1000i64..1000, 2..8),
            seed in 0usize..1000,
        ) {
            let names: Vec<String> = (0..values.len()).map(|i| format!("col_{i}")).collect();
            let cells: Vec<(&str, Value)> = names
                .iter()
                .zip(&values)
                .map(|(n, v)| (n.as_str(), Value::Int(*v)))
                .collect();

            let mut shuffled = cells.clone();
            let mid = seed % shuffled.len();
            shuffled.rotate_left(mid);

            prop_assert_eq!(
                hash_row(&as_refs(&cells)),
                hash_row(&as_refs(&shuffled))
            );
        }
    }
}
