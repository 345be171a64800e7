//! Session event stream payloads.

use crate::{
    event::EventType,
    types::{EventId, GameSeconds, OpSeq, Period, Side},
};

/// Events broadcast by the session runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new event was recorded.
    Recorded {
        /// Recorded event id.
        id: EventId,
        /// Its type.
        event_type: EventType,
        /// Acting team.
        team: Side,
    },
    /// Undo removed the most recent event.
    UndoApplied {
        /// Removed event id.
        id: EventId,
    },
    /// Redo restored an undone event.
    RedoApplied {
        /// Restored event id.
        id: EventId,
    },
    /// An event was deleted explicitly.
    Deleted {
        /// Deleted event id.
        id: EventId,
    },
    /// The clock advanced one second.
    Tick {
        /// New clock reading.
        current_time: GameSeconds,
    },
    /// The clock started or paused.
    ClockToggled {
        /// True when the clock now runs.
        running: bool,
    },
    /// The next period began.
    PeriodAdvanced {
        /// New period number.
        period: Period,
    },
    /// Clock and log were reset.
    Reset,
    /// Score changed.
    ScoreChanged {
        /// Home goals.
        home: u32,
        /// Away goals.
        away: u32,
    },
    /// Transient user-facing message, e.g. a rejected shot without zone.
    Notice {
        /// Message text.
        message: String,
    },
    /// Persistence has reached at least this op sequence.
    DurableUpTo {
        /// Highest sequence known durable.
        op_seq: OpSeq,
    },
}
