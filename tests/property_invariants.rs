use proptest::prelude::*;

use handball_scout::{
    core::session::{RecordIntent, ScoutSession},
    event::{EventType, ScoutEvent},
    stats::{projector::StatsProjector, score::Score, tally::ScoutStats},
    types::{Side, TeamInfo},
};

#[derive(Debug, Clone)]
enum Action {
    Record { event_type: u8, away: bool, success: bool, zone: bool },
    Undo,
    Redo,
    Delete { target: u8 },
    Tick,
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => (0u8..11, any::<bool>(), any::<bool>(), any::<bool>())
            .prop_map(|(event_type, away, success, zone)| Action::Record { event_type, away, success, zone }),
        2 => Just(Action::Undo),
        1 => Just(Action::Redo),
        1 => (0u8..32).prop_map(|target| Action::Delete { target }),
        1 => Just(Action::Tick),
    ]
}

const TYPES: [EventType; 11] = [
    EventType::Goal,
    EventType::ShotMiss,
    EventType::Save,
    EventType::Turnover,
    EventType::Foul,
    EventType::SevenMeter,
    EventType::Timeout,
    EventType::Substitution,
    EventType::YellowCard,
    EventType::RedCard,
    EventType::TwoMinSuspension,
];

fn session() -> ScoutSession {
    let mut s = ScoutSession::new(
        TeamInfo::new("h", "Home", "HOM", "#111"),
        TeamInfo::new("a", "Away", "AWY", "#eee"),
    );
    s.toggle_clock();
    s
}

fn scoring_goals(events: &[&ScoutEvent], side: Side) -> u32 {
    events
        .iter()
        .filter(|e| e.team == side && e.kind.is_scoring_goal())
        .count() as u32
}

fn apply(s: &mut ScoutSession, action: &Action) {
    match action {
        Action::Record { event_type, away, success, zone } => {
            s.select_team(if *away { Side::Away } else { Side::Home });
            s.select_zone(zone.then(|| "shot_center".into()));
            let intent = RecordIntent::new(TYPES[usize::from(*event_type)]).with_success(*success);
            let _ = s.record(intent);
        }
        Action::Undo => {
            s.undo();
        }
        Action::Redo => {
            s.redo();
        }
        Action::Delete { target } => {
            let ids = s.log().ordered_ids().to_vec();
            if !ids.is_empty() {
                let id = ids[usize::from(*target) % ids.len()];
                s.delete(id).expect("delete existing");
            }
        }
        Action::Tick => {
            s.tick();
        }
    }
}

proptest! {
    #[test]
    fn score_equals_fold_after_every_step(actions in prop::collection::vec(action_strategy(), 1..150)) {
        let mut s = session();

        for action in &actions {
            apply(&mut s, action);

            let events = s.log().appended();
            let state = s.game_state();
            prop_assert_eq!(state.home_score, scoring_goals(&events, Side::Home));
            prop_assert_eq!(state.away_score, scoring_goals(&events, Side::Away));
            prop_assert_eq!(s.log().score(), Score::fold(events.iter().copied()));
        }
    }

    #[test]
    fn record_then_undo_is_identity(
        prefix in prop::collection::vec(action_strategy(), 0..60),
        event_type in 0u8..11,
        away in any::<bool>(),
        success in any::<bool>(),
    ) {
        let mut s = session();
        for action in &prefix {
            apply(&mut s, action);
        }

        s.select_zone(Some("shot_left".into()));
        let before_events: Vec<ScoutEvent> = s.log().appended().into_iter().cloned().collect();
        let before_state = s.game_state();

        s.select_team(if away { Side::Away } else { Side::Home });
        s.record(RecordIntent::new(TYPES[usize::from(event_type)]).with_success(success))
            .expect("zone selected, record cannot fail");
        s.undo().expect("just recorded");

        let after_events: Vec<ScoutEvent> = s.log().appended().into_iter().cloned().collect();
        prop_assert_eq!(after_events, before_events);
        prop_assert_eq!(s.game_state(), before_state);
    }

    #[test]
    fn shots_without_zone_never_append(actions in prop::collection::vec(action_strategy(), 0..60), miss in any::<bool>()) {
        let mut s = session();
        for action in &actions {
            apply(&mut s, action);
        }
        s.select_zone(None);
        let len = s.log().len();
        let event_type = if miss { EventType::ShotMiss } else { EventType::Goal };

        prop_assert!(s.record(RecordIntent::new(event_type)).is_err());
        prop_assert_eq!(s.log().len(), len);
    }

    #[test]
    fn projector_matches_full_recompute(actions in prop::collection::vec(action_strategy(), 1..150), reset_at in 0usize..150) {
        let mut s = session();
        let mut projector = StatsProjector::new();

        for (i, action) in actions.iter().enumerate() {
            apply(&mut s, action);
            if i == reset_at {
                s.reset(true).expect("confirmed reset");
            }
            for op in s.drain_pending_ops() {
                projector.apply_stored_op(&op);
            }

            prop_assert_eq!(*projector.stats(), ScoutStats::fold(s.log().appended()));
            prop_assert_eq!(projector.score(), s.log().score());
        }
    }
}
