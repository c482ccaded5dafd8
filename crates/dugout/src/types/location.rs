use crate::types::DataSource;
use derive_more::Display;
use std::fmt::{self, Display};

///
/// Layer
///
/// Lake layers a snapshot moves through: raw files land in `landing`,
/// `staging` holds exactly one normalized snapshot per feed, `bronze`
/// accumulates the per-date history of new-or-changed rows.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Layer {
    #[display("landing")]
    Landing,
    #[display("staging")]
    Staging,
    #[display("bronze")]
    Bronze,
}

///
/// TableLocation
///
/// Address of one persisted table: a layer plus the feed it holds. Rendered
/// as the `layer/source` suffix the storage client resolves against its
/// container root.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TableLocation {
    pub layer: Layer,
    pub source: DataSource,
}

impl TableLocation {
    #[must_use]
    pub const fn new(layer: Layer, source: DataSource) -> Self {
        Self { layer, source }
    }

    #[must_use]
    pub const fn staging(source: DataSource) -> Self {
        Self::new(Layer::Staging, source)
    }

    #[must_use]
    pub const fn bronze(source: DataSource) -> Self {
        Self::new(Layer::Bronze, source)
    }
}

impl Display for TableLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.layer, self.source)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_as_layer_slash_source() {
        let location = TableLocation::bronze(DataSource::PlayerMetadata);
        assert_eq!(location.to_string(), "bronze/player_metadata");

        let location = TableLocation::staging(DataSource::CurrentSeasonHistory);
        assert_eq!(location.to_string(), "staging/current_season_history");
    }

    #[test]
    fn locations_order_by_layer_then_source() {
        let a = TableLocation::staging(DataSource::TeamMetadata);
        let b = TableLocation::bronze(DataSource::CurrentSeasonHistory);
        assert!(a < b);
    }
}
