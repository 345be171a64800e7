use tempfile::TempDir;

use handball_scout::{
    core::{
        event_log::EventLog,
        session::{RecordIntent, ScoutSession},
    },
    event::{EventDraft, EventKind, EventType, ScoutEvent},
    persist::{OpSink, PersistError, SavedGame, sqlite::SqliteOpSink},
    types::{Side, TeamInfo},
};

fn goal(game_time: u32, team: Side) -> EventDraft {
    EventDraft::now(
        game_time,
        1,
        team,
        EventKind::Goal {
            zone: "shot_center".into(),
            success: true,
        },
    )
}

fn foul(game_time: u32, team: Side) -> EventDraft {
    EventDraft::now(game_time, 1, team, EventKind::Foul)
}

fn events(log: &EventLog) -> Vec<ScoutEvent> {
    log.appended().into_iter().cloned().collect()
}

#[test]
fn sqlite_replay_round_trips_events_and_order() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("ops.db");

    let mut log = EventLog::new();
    let mut sink = SqliteOpSink::open(&db_path).expect("open sqlite");

    let (g1, _) = log.append(goal(10, Side::Home));
    log.append(foul(20, Side::Away));
    log.append(goal(30, Side::Away));
    log.delete(g1).expect("delete first goal");
    log.undo().expect("undo away goal");
    log.redo().expect("redo away goal");

    let ops = log.drain_pending_ops();
    assert_eq!(ops.len(), 6);
    assert_eq!(sink.append_ops(&ops).expect("append"), 6);

    drop(sink);

    let reopened = SqliteOpSink::open(&db_path).expect("reopen");
    assert_eq!(reopened.latest_seq().expect("latest"), 6);
    let replayed = reopened.load_log().expect("replay");

    assert_eq!(events(&replayed), events(&log));
    assert_eq!(replayed.ordered_ids(), log.ordered_ids());
    assert_eq!(replayed.next_event_id(), log.next_event_id());
    assert_eq!(replayed.latest_op_seq(), log.latest_op_seq());
    assert_eq!(replayed.score(), log.score());
}

#[test]
fn replayed_reset_leaves_only_later_events() {
    let mut log = EventLog::new();
    let mut sink = SqliteOpSink::open_in_memory().expect("open sqlite");

    log.append(goal(5, Side::Home));
    log.append(goal(6, Side::Home));
    log.clear().expect("non-empty log produces a reset op");
    let (after, _) = log.append(foul(1, Side::Away));
    sink.append_ops(&log.drain_pending_ops()).expect("append");

    let replayed = sink.load_log().expect("replay");
    assert_eq!(replayed.ordered_ids(), &[after]);
    assert_eq!(replayed.score().home, 0);

    // Ids keep counting past the reset.
    assert_eq!(after, 3);
}

#[test]
fn remove_without_its_append_is_skipped_on_replay() {
    let mut log = EventLog::new();
    let mut sink = SqliteOpSink::open_in_memory().expect("open sqlite");

    log.append(goal(5, Side::Home));
    let (kept, _) = log.append(foul(8, Side::Away));
    log.delete(1).expect("delete goal");
    let ops = log.drain_pending_ops();

    // Journal everything except the goal's append.
    sink.append_ops(&ops[1..]).expect("append");

    let replayed = sink.load_log().expect("replay tolerates the gap");
    assert_eq!(replayed.ordered_ids(), &[kept]);
    assert_eq!(replayed.score().home, 0);
    assert_eq!(replayed.latest_op_seq(), 3);
}

#[test]
fn rows_from_another_format_version_are_refused() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("future.db");

    let mut log = EventLog::new();
    let mut sink = SqliteOpSink::open(&db_path).expect("open sqlite");
    log.append(foul(1, Side::Home));
    sink.append_ops(&log.drain_pending_ops()).expect("append");
    drop(sink);

    let conn = rusqlite::Connection::open(&db_path).expect("raw open");
    conn.execute("UPDATE ops SET format_version = 99", [])
        .expect("bump version");
    drop(conn);

    let err = SqliteOpSink::open(&db_path)
        .expect("reopen")
        .load_log()
        .expect_err("unknown format");
    assert!(matches!(err, PersistError::UnsupportedFormat(99)));
}

#[test]
fn resume_restores_teams_clock_and_log() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("game.db");

    let mut session = ScoutSession::new(
        TeamInfo::new("t-1", "HC Kiel", "HCK", "#0055a4"),
        TeamInfo::new("t-2", "TV Hamm", "TVH", "#c8102e"),
    );
    session.toggle_clock();
    for _ in 0..95 {
        session.tick();
    }
    session.next_period();
    session.select_zone(Some("shot_left".into()));
    session
        .record(RecordIntent::new(EventType::Goal))
        .expect("goal");

    let mut sink = SqliteOpSink::open(&db_path).expect("open sqlite");
    sink.append_ops(&session.drain_pending_ops()).expect("append");
    sink.save_game(&SavedGame::capture(&session)).expect("save");
    drop(sink);

    let resumed = SqliteOpSink::open(&db_path)
        .expect("reopen")
        .resume()
        .expect("resume")
        .expect("saved game");

    assert_eq!(resumed.team_info(Side::Away).name, "TV Hamm");
    let state = resumed.game_state();
    assert_eq!(state.current_time, 95);
    assert_eq!(state.period, 2);
    assert_eq!(state.home_score, 1);
    assert!(!state.is_running);
    assert!(state.is_paused);
    assert_eq!(events(resumed.log()), events(session.log()));
}

#[test]
fn empty_journal_has_nothing_to_resume() {
    let sink = SqliteOpSink::open_in_memory().expect("open");
    assert_eq!(sink.latest_seq().expect("latest"), 0);
    assert!(sink.load_log().expect("replay").is_empty());
    assert!(sink.resume().expect("resume").is_none());
}
