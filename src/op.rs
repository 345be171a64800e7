//! Journaled event-log mutations.

use serde::{Deserialize, Serialize};

use crate::{
    event::ScoutEvent,
    types::{EventId, OpSeq},
};

/// Payload format written next to every journaled op.
pub const OP_FORMAT_VERSION: u16 = 1;

/// One change to the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Op {
    /// An event entered the log, by record or redo.
    Append {
        /// Appended event.
        event: ScoutEvent,
    },
    /// An event left the log, by undo or delete.
    Remove {
        /// Removed event, kept so projections can retract it.
        event: ScoutEvent,
    },
    /// Every event was discarded.
    Reset {
        /// Number of events discarded.
        discarded: usize,
    },
}

impl Op {
    /// Short name stored in the journal's `kind` column.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Append { .. } => "append",
            Self::Remove { .. } => "remove",
            Self::Reset { .. } => "reset",
        }
    }

    /// Event the op touches; `None` for a reset.
    pub fn event_id(&self) -> Option<EventId> {
        match self {
            Self::Append { event } | Self::Remove { event } => Some(event.id),
            Self::Reset { .. } => None,
        }
    }
}

/// An [`Op`] stamped with its journal sequence and wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredOp {
    pub seq: OpSeq,
    /// Unix milliseconds.
    pub ts_ms: u64,
    pub op: Op,
}
