//! Demo composition root: an in-memory lake promoted across two ingest
//! dates, with every pipeline event echoed to stdout.

use dugout::{
    config::{SECRET_SP_CLIENT_ID, SECRET_SP_CLIENT_SECRET, SECRET_SP_TENANT_ID},
    prelude::*,
};
use serde_json::json;

///
/// PrintSink
///

struct PrintSink;

impl EventSink for PrintSink {
    fn on_event(&self, event: PipelineEvent) {
        println!("  [event] {event:?}");
    }
}

/// One raw `element_types` snapshot as the upstream endpoint delivers it.
/// The two counts move between days so the incremental run has something
/// to pick up.
fn positions_snapshot(
    keeper_count: i64,
    midfielder_count: i64,
) -> Result<Vec<u8>, serde_json::Error> {
    let snapshot = json!([
        {
            "id": 1, "plural_name": "Goalkeepers", "plural_name_short": "GKP",
            "singular_name": "Goalkeeper", "singular_name_short": "GKP",
            "squad_select": 2, "squad_min_select": null, "squad_max_select": null,
            "squad_min_play": 1, "squad_max_play": 1,
            "ui_shirt_specific": true, "element_count": keeper_count
        },
        {
            "id": 2, "plural_name": "Defenders", "plural_name_short": "DEF",
            "singular_name": "Defender", "singular_name_short": "DEF",
            "squad_select": 5, "squad_min_select": null, "squad_max_select": null,
            "squad_min_play": 3, "squad_max_play": 5,
            "ui_shirt_specific": false, "element_count": 251
        },
        {
            "id": 3, "plural_name": "Midfielders", "plural_name_short": "MID",
            "singular_name": "Midfielder", "singular_name_short": "MID",
            "squad_select": 5, "squad_min_select": null, "squad_max_select": null,
            "squad_min_play": 2, "squad_max_play": 5,
            "ui_shirt_specific": false, "element_count": midfielder_count
        },
        {
            "id": 4, "plural_name": "Forwards", "plural_name_short": "FWD",
            "singular_name": "Forward", "singular_name_short": "FWD",
            "squad_select": 3, "squad_min_select": null, "squad_max_select": null,
            "squad_min_play": 1, "squad_max_play": 3,
            "ui_shirt_specific": false, "element_count": 79
        },
    ]);

    serde_json::to_vec(&snapshot)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A real deployment assembles lake credentials from its vault before
    // wiring the storage client; the in-memory store here needs none.
    let vault = MemorySecretProvider::new()
        .with_secret(SECRET_SP_CLIENT_ID, "11111111-aaaa-4bbb-8ccc-222222222222")
        .with_secret(SECRET_SP_CLIENT_SECRET, "demo-secret")
        .with_secret(SECRET_SP_TENANT_ID, "33333333-dddd-4eee-9fff-444444444444");
    let credentials = StorageOptions::from_provider(&vault, "dugoutdev")?;
    println!("assembled {credentials:?}");
    println!();

    let store = MemoryTableStore::new();
    let landing = MemoryLandingSource::new()
        .with_file(
            DataSource::PositionMetadata,
            IngestDate::parse("01092024")?,
            "element_types.json",
            positions_snapshot(81, 296)?,
        )
        .with_file(
            DataSource::PositionMetadata,
            IngestDate::parse("02092024")?,
            "element_types.json",
            positions_snapshot(83, 297)?,
        );
    let sink = PrintSink;

    for (raw_date, label) in [("01092024", "bootstrap"), ("02092024", "incremental")] {
        println!("== {label} run, ingest date {raw_date} ==");
        let clock = FixedClock(IngestDate::parse(raw_date)?);
        let pipeline = Pipeline::new(&store)
            .with_landing(&landing)
            .with_clock(&clock)
            .with_sink(&sink);

        let staged = pipeline.stage("position_metadata", raw_date)?;
        println!("staged {} rows from '{}'", staged.rows_staged, staged.file);

        let outcome = pipeline.promote("position_metadata", raw_date)?;
        println!(
            "promoted: {} written, {} deleted",
            outcome.rows_written, outcome.rows_deleted
        );

        let rerun = pipeline.promote("position_metadata", raw_date)?;
        println!(
            "rerun:    {} written, {} deleted",
            rerun.rows_written, rerun.rows_deleted
        );
        println!();
    }

    let bronze = store.read_table(&TableLocation::bronze(DataSource::PositionMetadata))?;
    println!("bronze history now holds {} rows across both dates", bronze.len());

    Ok(())
}
