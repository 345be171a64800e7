use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    error::ScoutError,
    event::{EventDraft, EventKind, EventType, ScoutEvent},
    export::ExportSnapshot,
    op::StoredOp,
    shortcuts::{Intent, Key, Outcome},
    stats::tally::ScoutStats,
    types::{EventId, GameSeconds, Period, Side, TeamInfo, ZoneId},
};

use super::{clock::GameClock, event_log::EventLog};

/// Clock and score as shown on the scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub home_score: u32,
    pub away_score: u32,
    pub current_time: GameSeconds,
    pub period: Period,
    pub is_running: bool,
    pub is_paused: bool,
}

/// Team and court zone the next recorded event is attributed to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub team: Side,
    pub zone: Option<ZoneId>,
}

/// Modal layer shown over the scouting screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    /// Shortcut legend.
    Help,
    /// Prompt confirming a destructive reset.
    ConfirmReset,
}

/// Request to record one event for the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordIntent {
    pub event_type: EventType,
    /// Outcome flag; defaults to `true` for outcome-bearing types.
    pub success: Option<bool>,
    pub details: Option<String>,
}

impl RecordIntent {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            success: None,
            details: None,
        }
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<EventType> for RecordIntent {
    fn from(value: EventType) -> Self {
        Self::new(value)
    }
}

/// One live scouting session: clock, event log, teams and UI selection.
///
/// Every mutation runs to completion on `&mut self`; callers serialize access
/// (the runtime owns the session on a single task).
#[derive(Debug)]
pub struct ScoutSession {
    home: TeamInfo,
    away: TeamInfo,
    clock: GameClock,
    log: EventLog,
    selection: Selection,
    overlay: Option<Overlay>,
}

impl ScoutSession {
    pub fn new(home: TeamInfo, away: TeamInfo) -> Self {
        Self::restore(home, away, EventLog::new(), GameClock::new())
    }

    /// Resumes a session from a replayed log and a saved clock.
    pub fn restore(home: TeamInfo, away: TeamInfo, log: EventLog, clock: GameClock) -> Self {
        info!(home = %home.name, away = %away.name, events = log.len(), "scouting session started");
        Self {
            home,
            away,
            clock,
            log,
            selection: Selection::default(),
            overlay: None,
        }
    }

    pub fn team_info(&self, side: Side) -> &TeamInfo {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn overlay(&self) -> Option<Overlay> {
        self.overlay
    }

    pub fn select_team(&mut self, side: Side) {
        self.selection.team = side;
    }

    pub fn select_zone(&mut self, zone: Option<ZoneId>) {
        self.selection.zone = zone;
    }

    /// Records an event for the selected team and zone at the current clock.
    pub fn record(&mut self, intent: RecordIntent) -> Result<(EventId, StoredOp), ScoutError> {
        let kind = EventKind::build(intent.event_type, self.selection.zone.clone(), intent.success)
            .inspect_err(|err| warn!(error = %err, "record rejected"))?;

        let draft = EventDraft::now(
            self.clock.current_time(),
            self.clock.period(),
            self.selection.team,
            kind,
        )
        .with_details(intent.details);

        Ok(self.log.append(draft))
    }

    /// Court-zone click: selects `zone`, then records.
    pub fn record_in_zone(
        &mut self,
        zone: ZoneId,
        intent: RecordIntent,
    ) -> Result<(EventId, StoredOp), ScoutError> {
        self.selection.zone = Some(zone);
        self.record(intent)
    }

    pub fn undo(&mut self) -> Option<(ScoutEvent, StoredOp)> {
        self.log.undo()
    }

    pub fn redo(&mut self) -> Option<(EventId, StoredOp)> {
        self.log.redo()
    }

    pub fn delete(&mut self, id: EventId) -> Result<(ScoutEvent, StoredOp), ScoutError> {
        self.log.delete(id)
    }

    /// Zeroes clock and score and discards the log.
    ///
    /// With recorded events this needs `confirmed`; otherwise the confirm
    /// overlay opens and nothing changes.
    pub fn reset(&mut self, confirmed: bool) -> Result<Option<StoredOp>, ScoutError> {
        if !self.log.is_empty() && !confirmed {
            self.overlay = Some(Overlay::ConfirmReset);
            return Err(ScoutError::ResetNeedsConfirmation {
                events: self.log.len(),
            });
        }

        let discarded = self.log.len();
        self.clock.reset();
        let stored = self.log.clear();
        self.overlay = None;
        info!(discarded, "session reset");
        Ok(stored)
    }

    pub fn toggle_clock(&mut self) -> bool {
        self.clock.toggle()
    }

    pub fn tick(&mut self) -> Option<GameSeconds> {
        self.clock.tick()
    }

    pub fn next_period(&mut self) -> Period {
        let period = self.clock.next_period();
        info!(period, "period advanced");
        period
    }

    pub fn toggle_help(&mut self) -> bool {
        self.overlay = match self.overlay {
            Some(Overlay::Help) => None,
            _ => Some(Overlay::Help),
        };
        self.overlay == Some(Overlay::Help)
    }

    pub fn close_overlay(&mut self) -> Option<Overlay> {
        self.overlay.take()
    }

    pub fn game_state(&self) -> GameState {
        let score = self.log.score();
        GameState {
            home_score: score.home,
            away_score: score.away,
            current_time: self.clock.current_time(),
            period: self.clock.period(),
            is_running: self.clock.is_running(),
            is_paused: self.clock.is_paused(),
        }
    }

    /// Full recompute over the live log.
    pub fn stats(&self) -> ScoutStats {
        ScoutStats::fold(self.log.appended())
    }

    /// Point-in-time export; later mutations do not touch the returned value.
    pub fn export(&self) -> ExportSnapshot {
        ExportSnapshot::capture(self)
    }

    pub fn drain_pending_ops(&mut self) -> Vec<StoredOp> {
        self.log.drain_pending_ops()
    }

    /// Reduces one intent against the session.
    ///
    /// Record intents are ignored while an overlay is open; undo, help, clock
    /// and close stay live.
    pub fn dispatch(&mut self, intent: Intent) -> Result<Outcome, ScoutError> {
        debug!(?intent, "dispatch");
        let outcome = match intent {
            Intent::Record(_) if self.overlay.is_some() => {
                debug!(overlay = ?self.overlay, "record key ignored under overlay");
                Outcome::Ignored
            }
            Intent::Record(event_type) => {
                let (id, _) = self.record(RecordIntent::new(event_type))?;
                Outcome::Recorded(id)
            }
            Intent::Undo => Outcome::Undone(self.undo().map(|(event, _)| event.id)),
            Intent::ToggleHelp => Outcome::HelpToggled(self.toggle_help()),
            Intent::ToggleClock => Outcome::ClockToggled(self.toggle_clock()),
            Intent::CloseOverlay => Outcome::OverlayClosed(self.close_overlay()),
        };
        Ok(outcome)
    }

    /// Looks up the key binding and dispatches it; unbound keys are ignored.
    pub fn handle_key(&mut self, key: Key) -> Result<Outcome, ScoutError> {
        match key.intent() {
            Some(intent) => self.dispatch(intent),
            None => Ok(Outcome::Ignored),
        }
    }
}
