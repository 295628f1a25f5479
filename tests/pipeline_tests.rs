//! End-to-end tests: match files on disk through extraction into the store.

use buzzer_insider::db::store::Store;
use buzzer_insider::detection::extractor;
use buzzer_insider::report::RecordFilter;
use buzzer_insider::timeline::loader::JsonDirSource;
use buzzer_insider::timeline::models::Period;
use buzzer_insider::timeline::TimelineSource;

const MATCH_77: &str = r#"{
    "match_id": 77,
    "match_type": "cup",
    "home": {"id": 1, "name": "Aces"},
    "away": {"id": 2, "name": "Bats"},
    "events": [
        {"kind": "shot", "team": "home", "player_id": 11, "player_name": "Jay Kay",
         "clock": 1438, "made": true, "period": "Q2", "shot_type_label": "hook_shot",
         "position": {"x": 330, "y": 100}},
        {"kind": "shot", "team": "away", "player_id": 21, "player_name": "Bo Lee",
         "clock": 2878, "made": true, "period": "Q4", "three_point": true,
         "position": {"x": 110, "y": 20},
         "score_before": {"home": 80, "away": 78}, "score_after": {"home": 80, "away": 81}},
        {"kind": "rebound", "team": "away", "player_id": 21, "clock": 2879}
    ]
}"#;

fn write_fixtures(dir: &std::path::Path) {
    std::fs::write(dir.join("report_77.json"), MATCH_77).unwrap();
    std::fs::write(dir.join("report_78.json"), "{ not json").unwrap();
    std::fs::write(dir.join("notes.txt"), "ignored").unwrap();
}

// ──────────────────────────────────────────
// Source tests
// ──────────────────────────────────────────

#[test]
fn json_dir_lists_and_loads_matches() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    let source = JsonDirSource::new(dir.path());

    let ids = tokio_test::block_on(source.match_ids()).unwrap();
    assert_eq!(ids, vec![77, 78]);

    let loaded = tokio_test::block_on(source.load(77)).unwrap();
    assert_eq!(loaded.skipped_events, 1);
    assert_eq!(loaded.timeline.events.len(), 2);

    assert!(tokio_test::block_on(source.load(78)).is_err());
    assert!(tokio_test::block_on(source.load(79)).is_err());
}

// ──────────────────────────────────────────
// Store tests
// ──────────────────────────────────────────

#[tokio::test]
async fn extracted_records_survive_a_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    let source = JsonDirSource::new(dir.path());
    let db_path = dir.path().join("buzzer.db");
    let store = Store::new(db_path.to_str().unwrap()).await.unwrap();

    let loaded = source.load(77).await.unwrap();
    let records = extractor::extract_match(&loaded.timeline);
    assert_eq!(records.len(), 2);

    assert_eq!(store.upsert_records(&records).await.unwrap(), 2);
    // Re-running extraction must not duplicate rows.
    store.upsert_records(&records).await.unwrap();
    assert_eq!(store.count_records().await.unwrap(), 2);

    let stored = store.fetch_records(&RecordFilter::default()).await.unwrap();
    assert_eq!(stored, records);

    let away_flips = store
        .fetch_records(&RecordFilter {
            team_id: Some(2),
            only_outcome_change: true,
            ..RecordFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(away_flips.len(), 1);
    assert_eq!(away_flips[0].period, Period::Quarter(4));
    assert_eq!(away_flips[0].opponent.name, "Aces");
}

#[tokio::test]
async fn store_reopens_existing_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("buzzer.db");
    let path = db_path.to_str().unwrap();

    {
        let source = JsonDirSource::new(dir.path());
        std::fs::write(dir.path().join("report_77.json"), MATCH_77).unwrap();
        let loaded = source.load(77).await.unwrap();
        let store = Store::new(path).await.unwrap();
        store
            .upsert_records(&extractor::extract_match(&loaded.timeline))
            .await
            .unwrap();
    }

    let reopened = Store::new(path).await.unwrap();
    assert_eq!(reopened.count_records().await.unwrap(), 2);
}
