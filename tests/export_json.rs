use tempfile::TempDir;

use handball_scout::{
    core::session::{RecordIntent, ScoutSession},
    event::EventType,
    export::ExportSnapshot,
    types::{Side, TeamInfo},
};

fn scouted_session() -> ScoutSession {
    let mut s = ScoutSession::new(
        TeamInfo::new("t-1", "HC Kiel", "HCK", "#0055a4"),
        TeamInfo::new("t-2", "TV Hamm", "TVH", "#c8102e"),
    );
    s.toggle_clock();
    for _ in 0..90 {
        s.tick();
    }
    s.select_zone(Some("shot_center".into()));
    s.record(RecordIntent::new(EventType::Goal)).expect("late goal");

    s.select_team(Side::Away);
    s.select_zone(Some("shot_left".into()));
    s.record(RecordIntent::new(EventType::ShotMiss)).expect("miss");
    s
}

#[test]
fn export_json_has_expected_shape() {
    let export = scouted_session().export();
    let value: serde_json::Value = serde_json::from_str(&export.to_json().expect("json")).expect("parse");

    assert_eq!(value["gameInfo"]["homeTeam"]["shortName"], "HCK");
    assert_eq!(value["gameInfo"]["awayTeam"]["name"], "TV Hamm");
    assert_eq!(value["gameInfo"]["gameState"]["homeScore"], 1);
    assert_eq!(value["gameInfo"]["gameState"]["currentTime"], 90);
    assert_eq!(value["gameInfo"]["gameState"]["isRunning"], true);

    let events = value["events"].as_array().expect("events");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["type"], "goal");
    assert_eq!(events[1]["type"], "shot_miss");
    assert_eq!(events[1]["team"], "away");

    assert_eq!(value["stats"]["home"]["goals"], 1);
    assert_eq!(value["stats"]["away"]["shots"], 1);
    assert_eq!(value["stats"]["away"]["sevenMeters"]["attempts"], 0);
    assert_eq!(value["stats"]["away"]["accuracy"], 0.0);
}

#[test]
fn export_events_are_ordered_by_game_time() {
    let mut s = ScoutSession::new(
        TeamInfo::new("a", "A", "A", "#000"),
        TeamInfo::new("b", "B", "B", "#fff"),
    );
    s.toggle_clock();
    s.tick();
    s.tick();
    s.record(RecordIntent::new(EventType::Foul)).expect("foul at 2");
    s.record(RecordIntent::new(EventType::Timeout)).expect("timeout at 2");

    let export = s.export();
    let types: Vec<_> = export.events.iter().map(|e| e.event_type()).collect();
    assert_eq!(types, vec![EventType::Foul, EventType::Timeout]);
}

#[test]
fn write_to_leaves_only_the_final_file() {
    let tmp = TempDir::new().expect("tmp");
    let export = scouted_session().export();

    let path = export.write_to(tmp.path()).expect("write");
    assert!(path.exists());
    assert!(path.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.starts_with("scout_HCK_vs_TVH_")));

    let entries: Vec<_> = std::fs::read_dir(tmp.path()).expect("read dir").collect();
    assert_eq!(entries.len(), 1);

    let back: ExportSnapshot =
        serde_json::from_slice(&std::fs::read(&path).expect("read")).expect("decode");
    assert_eq!(back, export);
}

#[test]
fn write_to_missing_directory_fails_without_output() {
    let tmp = TempDir::new().expect("tmp");
    let missing = tmp.path().join("nope");
    let export = scouted_session().export();

    assert!(export.write_to(&missing).is_err());
    assert!(!missing.exists());
}

#[test]
fn failed_write_leaves_no_temporary_file() {
    let tmp = TempDir::new().expect("tmp");
    let export = scouted_session().export();

    // A directory squatting on the target name makes the final rename fail.
    let blocked = tmp.path().join(export.file_name());
    std::fs::create_dir(&blocked).expect("block target");

    assert!(export.write_to(tmp.path()).is_err());

    let names: Vec<_> = std::fs::read_dir(tmp.path())
        .expect("read dir")
        .map(|e| e.expect("entry").file_name())
        .collect();
    assert_eq!(names, vec![blocked.file_name().expect("name").to_os_string()]);
    assert!(blocked.is_dir());
}
