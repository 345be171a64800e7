//! Errors surfaced by the scouting core.

use crate::{event::EventType, types::EventId};

/// Rejections and lookup failures raised by session operations.
///
/// None of these leave partial state behind: a rejected call changes nothing.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoutError {
    /// A shot-type event was requested while no court zone was selected.
    #[error("select a court zone before recording {event_type}")]
    ZoneRequired {
        /// Requested event type.
        event_type: EventType,
    },

    /// No event with this id is present in the log.
    #[error("event {0} is not in the log")]
    MissingEvent(EventId),

    /// An appended event reused an id already present in the log.
    #[error("event {0} is already in the log")]
    DuplicateEvent(EventId),

    /// A reset would discard recorded events and was not confirmed.
    #[error("reset would discard {events} recorded events; confirmation required")]
    ResetNeedsConfirmation {
        /// Number of events that would be discarded.
        events: usize,
    },

    /// Key text did not name any known key.
    #[error("unknown key: {0:?}")]
    UnknownKey(String),
}

impl ScoutError {
    /// True for rejections that should be shown to the user as a transient notice.
    pub fn is_user_notice(&self) -> bool {
        matches!(
            self,
            Self::ZoneRequired { .. } | Self::ResetNeedsConfirmation { .. }
        )
    }
}

/// Convenience alias for results carrying a [`ScoutError`].
pub type Result<T> = std::result::Result<T, ScoutError>;
