use std::fmt::{self, Display};
use std::str::FromStr;
use thiserror::Error as ThisError;

///
/// DataSource
///
/// The closed set of upstream snapshot feeds the engine promotes. Tags are
/// the wire names used in landing file names, table paths and run requests.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum DataSource {
    CurrentSeasonHistory,
    PlayerMetadata,
    TeamMetadata,
    PositionMetadata,
}

impl DataSource {
    pub const ALL: [Self; 4] = [
        Self::CurrentSeasonHistory,
        Self::PlayerMetadata,
        Self::TeamMetadata,
        Self::PositionMetadata,
    ];

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::CurrentSeasonHistory => "current_season_history",
            Self::PlayerMetadata => "player_metadata",
            Self::TeamMetadata => "team_metadata",
            Self::PositionMetadata => "position_metadata",
        }
    }
}

impl Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for DataSource {
    type Err = ParseSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.tag() == s)
            .ok_or_else(|| ParseSourceError::Unknown { raw: s.to_string() })
    }
}

///
/// ParseSourceError
///

#[derive(Debug, ThisError)]
pub enum ParseSourceError {
    #[error(
        "unknown data source '{raw}', expected one of current_season_history, \
         player_metadata, team_metadata, position_metadata"
    )]
    Unknown { raw: String },
}

///
/// KeyRule
///
/// One composite-key derivation: the natural identifier column the upstream
/// feed carries, and the derived column the key is persisted under. Derived
/// column names are aligned across feeds so equal keys join.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeyRule {
    pub natural_key: &'static str,
    pub derived_column: &'static str,
}

///
/// SourceDescriptor
///
/// Per-feed configuration: the business columns promoted to bronze, the
/// columns normalized to float at staging time (upstream delivers them
/// inconsistently as int, float or numeric text), and the composite-key
/// rules.
///

#[derive(Clone, Copy, Debug)]
pub struct SourceDescriptor {
    pub source: DataSource,
    pub business_columns: &'static [&'static str],
    pub float_columns: &'static [&'static str],
    pub key_rules: &'static [KeyRule],
}

impl SourceDescriptor {
    /// Look up the descriptor for a feed. Every member of [`DataSource::ALL`]
    /// must resolve; a miss means the registry drifted out of sync with the
    /// enum and the caller treats it as a configuration error.
    #[must_use]
    pub fn find(source: DataSource) -> Option<&'static Self> {
        DESCRIPTORS.iter().find(|d| d.source == source)
    }

    /// Derived key columns this feed persists (target-side only until keys
    /// are stamped).
    pub fn derived_columns(&self) -> impl Iterator<Item = &'static str> {
        self.key_rules.iter().map(|rule| rule.derived_column)
    }
}

pub const PLAYER_SEASON_KEY: &str = "player_season_key";
pub const TEAM_SEASON_KEY: &str = "team_season_key";
pub const POSITION_SEASON_KEY: &str = "position_season_key";

// Audit columns stamped by the engine rather than delivered upstream.
pub const INGEST_DATE_COLUMN: &str = "ingest_date";
pub const SEASON_COLUMN: &str = "season";
pub const CREATED_TIMESTAMP_COLUMN: &str = "created_timestamp";

static DESCRIPTORS: [SourceDescriptor; 4] = [
    SourceDescriptor {
        source: DataSource::CurrentSeasonHistory,
        business_columns: CURRENT_SEASON_HISTORY_COLUMNS,
        float_columns: &[],
        key_rules: &[KeyRule {
            natural_key: "element",
            derived_column: PLAYER_SEASON_KEY,
        }],
    },
    SourceDescriptor {
        source: DataSource::PlayerMetadata,
        business_columns: PLAYER_METADATA_COLUMNS,
        float_columns: PLAYER_METADATA_FLOAT_COLUMNS,
        key_rules: &[
            KeyRule {
                natural_key: "id",
                derived_column: PLAYER_SEASON_KEY,
            },
            KeyRule {
                natural_key: "team",
                derived_column: TEAM_SEASON_KEY,
            },
            KeyRule {
                natural_key: "element_type",
                derived_column: POSITION_SEASON_KEY,
            },
        ],
    },
    SourceDescriptor {
        source: DataSource::TeamMetadata,
        business_columns: TEAM_METADATA_COLUMNS,
        float_columns: &[],
        key_rules: &[KeyRule {
            natural_key: "id",
            derived_column: TEAM_SEASON_KEY,
        }],
    },
    SourceDescriptor {
        source: DataSource::PositionMetadata,
        business_columns: POSITION_METADATA_COLUMNS,
        float_columns: &[],
        key_rules: &[KeyRule {
            natural_key: "id",
            derived_column: POSITION_SEASON_KEY,
        }],
    },
];

// Business columns as delivered by the upstream bootstrap-static endpoint,
// ingest_date last. The order is the staging projection order, not a schema.
const PLAYER_METADATA_COLUMNS: &[&str] = &[
    "influence_rank_type",
    "selected_rank_type",
    "transfers_out_event",
    "mng_underdog_win",
    "corners_and_indirect_freekicks_text",
    "minutes",
    "has_temporary_code",
    "opta_code",
    "expected_assists_per_90",
    "team",
    "assists",
    "clean_sheets_per_90",
    "now_cost",
    "mng_clean_sheets",
    "second_name",
    "selected_by_percent",
    "birth_date",
    "special",
    "mng_win",
    "region",
    "creativity_rank",
    "transfers_in_event",
    "clean_sheets",
    "value_form",
    "penalties_saved",
    "saves_per_90",
    "selected_rank",
    "status",
    "photo",
    "can_transact",
    "expected_goal_involvements",
    "transfers_out",
    "cost_change_event_fall",
    "starts_per_90",
    "starts",
    "total_points",
    "mng_underdog_draw",
    "ep_next",
    "red_cards",
    "code",
    "cost_change_start_fall",
    "first_name",
    "mng_goals_scored",
    "direct_freekicks_order",
    "penalties_text",
    "direct_freekicks_text",
    "expected_goals_per_90",
    "expected_goals_conceded_per_90",
    "value_season",
    "form_rank_type",
    "points_per_game_rank",
    "chance_of_playing_next_round",
    "can_select",
    "goals_scored",
    "ict_index",
    "corners_and_indirect_freekicks_order",
    "now_cost_rank_type",
    "points_per_game_rank_type",
    "form",
    "dreamteam_count",
    "news_added",
    "bps",
    "threat",
    "influence",
    "threat_rank",
    "in_dreamteam",
    "influence_rank",
    "threat_rank_type",
    "own_goals",
    "ep_this",
    "now_cost_rank",
    "team_join_date",
    "id",
    "chance_of_playing_this_round",
    "news",
    "penalties_missed",
    "element_type",
    "expected_assists",
    "ict_index_rank",
    "transfers_in",
    "ict_index_rank_type",
    "mng_draw",
    "penalties_order",
    "removed",
    "cost_change_start",
    "web_name",
    "bonus",
    "goals_conceded_per_90",
    "event_points",
    "form_rank",
    "goals_conceded",
    "creativity_rank_type",
    "points_per_game",
    "squad_number",
    "yellow_cards",
    "creativity",
    "expected_goals_conceded",
    "mng_loss",
    "cost_change_event",
    "team_code",
    "expected_goals",
    "saves",
    "expected_goal_involvements_per_90",
    "ingest_date",
];

// Upstream flips these between int, float and numeric text across snapshots.
const PLAYER_METADATA_FLOAT_COLUMNS: &[&str] = &[
    "expected_goals_per_90",
    "saves_per_90",
    "expected_assists_per_90",
    "expected_goal_involvements_per_90",
    "expected_goals_conceded_per_90",
    "goals_conceded_per_90",
    "starts_per_90",
    "clean_sheets_per_90",
];

const CURRENT_SEASON_HISTORY_COLUMNS: &[&str] = &[
    "expected_goal_involvements",
    "transfers_in",
    "mng_clean_sheets",
    "goals_scored",
    "expected_assists",
    "element",
    "fixture",
    "minutes",
    "assists",
    "own_goals",
    "ict_index",
    "expected_goals",
    "transfers_out",
    "was_home",
    "total_points",
    "selected",
    "value",
    "mng_win",
    "team_a_score",
    "modified",
    "threat",
    "penalties_saved",
    "yellow_cards",
    "round",
    "red_cards",
    "opponent_team",
    "bps",
    "expected_goals_conceded",
    "penalties_missed",
    "bonus",
    "saves",
    "mng_draw",
    "mng_loss",
    "mng_underdog_draw",
    "clean_sheets",
    "kickoff_time",
    "creativity",
    "goals_conceded",
    "starts",
    "team_h_score",
    "mng_underdog_win",
    "influence",
    "mng_goals_scored",
    "transfers_balance",
    "ingest_date",
];

const TEAM_METADATA_COLUMNS: &[&str] = &[
    "code",
    "draw",
    "form",
    "id",
    "loss",
    "name",
    "played",
    "points",
    "position",
    "short_name",
    "strength",
    "team_division",
    "unavailable",
    "win",
    "strength_overall_home",
    "strength_overall_away",
    "strength_attack_home",
    "strength_attack_away",
    "strength_defence_home",
    "strength_defence_away",
    "pulse_id",
    "ingest_date",
];

const POSITION_METADATA_COLUMNS: &[&str] = &[
    "id",
    "plural_name",
    "plural_name_short",
    "singular_name",
    "singular_name_short",
    "squad_select",
    "squad_min_select",
    "squad_max_select",
    "squad_min_play",
    "squad_max_play",
    "ui_shirt_specific",
    "element_count",
    "ingest_date",
];

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_parse_back_to_their_source() {
        for source in DataSource::ALL {
            assert_eq!(source.tag().parse::<DataSource>().unwrap(), source);
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!("fixtures".parse::<DataSource>().is_err());
        assert!("".parse::<DataSource>().is_err());
        assert!("PLAYER_METADATA".parse::<DataSource>().is_err());
    }

    #[test]
    fn every_source_has_a_descriptor() {
        for source in DataSource::ALL {
            let descriptor = SourceDescriptor::find(source).unwrap();
            assert_eq!(descriptor.source, source);
            assert!(!descriptor.business_columns.is_empty());
            assert!(!descriptor.key_rules.is_empty());
        }
    }

    #[test]
    fn business_columns_carry_the_partition_column_and_no_duplicates() {
        for source in DataSource::ALL {
            let descriptor = SourceDescriptor::find(source).unwrap();
            let columns = descriptor.business_columns;
            assert_eq!(columns.last(), Some(&"ingest_date"), "{source}");

            let mut seen = std::collections::BTreeSet::new();
            for column in columns {
                assert!(seen.insert(column), "duplicate column {column} in {source}");
            }
        }
    }

    #[test]
    fn natural_keys_and_float_columns_are_business_columns() {
        for source in DataSource::ALL {
            let descriptor = SourceDescriptor::find(source).unwrap();
            for rule in descriptor.key_rules {
                assert!(
                    descriptor.business_columns.contains(&rule.natural_key),
                    "{source}: natural key {} not promoted",
                    rule.natural_key
                );
            }
            for column in descriptor.float_columns {
                assert!(descriptor.business_columns.contains(column), "{source}");
            }
        }
    }

    #[test]
    fn key_columns_align_for_downstream_joins() {
        let history = SourceDescriptor::find(DataSource::CurrentSeasonHistory).unwrap();
        let player = SourceDescriptor::find(DataSource::PlayerMetadata).unwrap();
        let team = SourceDescriptor::find(DataSource::TeamMetadata).unwrap();
        let position = SourceDescriptor::find(DataSource::PositionMetadata).unwrap();

        let derived = |d: &SourceDescriptor| d.derived_columns().collect::<Vec<_>>();
        assert_eq!(derived(history), vec![PLAYER_SEASON_KEY]);
        assert_eq!(
            derived(player),
            vec![PLAYER_SEASON_KEY, TEAM_SEASON_KEY, POSITION_SEASON_KEY]
        );
        assert_eq!(derived(team), vec![TEAM_SEASON_KEY]);
        assert_eq!(derived(position), vec![POSITION_SEASON_KEY]);
    }
}
