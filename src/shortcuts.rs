//! Keyboard surface of the scouting screen.
//!
//! Keys map one-to-one to [`Intent`]s; the session reduces intents in
//! [`crate::core::session::ScoutSession::dispatch`].

use std::str::FromStr;

use crate::{
    core::session::Overlay,
    error::ScoutError,
    event::EventType,
    types::EventId,
};

/// A key press delivered by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Printable key. Letters are matched case-insensitively.
    Char(char),
    /// Space bar.
    Space,
    /// Escape key.
    Escape,
}

impl Key {
    /// Intent bound to this key, if any.
    pub fn intent(self) -> Option<Intent> {
        let intent = match self {
            Self::Space => Intent::ToggleClock,
            Self::Escape => Intent::CloseOverlay,
            Self::Char(c) => match c.to_ascii_lowercase() {
                'g' => Intent::Record(EventType::Goal),
                's' => Intent::Record(EventType::ShotMiss),
                'd' => Intent::Record(EventType::Save),
                't' => Intent::Record(EventType::Turnover),
                'f' => Intent::Record(EventType::Foul),
                '7' => Intent::Record(EventType::SevenMeter),
                'c' => Intent::Record(EventType::YellowCard),
                'r' => Intent::Record(EventType::RedCard),
                'z' => Intent::Undo,
                '?' => Intent::ToggleHelp,
                ' ' => Intent::ToggleClock,
                _ => return None,
            },
        };
        Some(intent)
    }
}

impl FromStr for Key {
    type Err = ScoutError;

    /// Parses DOM-style key names: `"g"`, `"?"`, `" "`, `"Space"`, `"Escape"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            " " | "Space" | "Spacebar" => return Ok(Self::Space),
            "Escape" | "Esc" => return Ok(Self::Escape),
            _ => {}
        }

        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Self::Char(c)),
            _ => Err(ScoutError::UnknownKey(s.to_string())),
        }
    }
}

/// What a key press asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Record an event of this type for the selected team.
    Record(EventType),
    /// Remove the most recently appended event.
    Undo,
    /// Show or hide the shortcut help.
    ToggleHelp,
    /// Play/pause the game clock.
    ToggleClock,
    /// Close whichever overlay is open.
    CloseOverlay,
}

impl Intent {
    /// Shot intents are the only ones gated on a selected zone.
    pub fn requires_zone(self) -> bool {
        matches!(self, Self::Record(t) if t.requires_zone())
    }
}

/// Result of reducing one intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// An event was appended.
    Recorded(EventId),
    /// Undo ran; carries the removed id, `None` when the log was empty.
    Undone(Option<EventId>),
    /// Help overlay is now open (`true`) or closed.
    HelpToggled(bool),
    /// Clock is now running (`true`) or paused.
    ClockToggled(bool),
    /// Overlay that was closed, if any was open.
    OverlayClosed(Option<Overlay>),
    /// The key is not bound, or records are blocked by an open overlay.
    Ignored,
}

/// Key legend rendered by the help overlay.
pub const SHORTCUT_HELP: &[(&str, &str)] = &[
    ("G", "Goal (select a zone first)"),
    ("S", "Missed shot (select a zone first)"),
    ("D", "Save"),
    ("T", "Turnover"),
    ("F", "Foul"),
    ("7", "7m throw"),
    ("C", "Yellow card"),
    ("R", "Red card"),
    ("Z", "Undo last event"),
    ("?", "Toggle this help"),
    ("Space", "Start/pause clock"),
    ("Esc", "Close dialog"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_match_case_insensitively() {
        assert_eq!(Key::Char('G').intent(), Some(Intent::Record(EventType::Goal)));
        assert_eq!(Key::Char('g').intent(), Some(Intent::Record(EventType::Goal)));
        assert_eq!(Key::Char('7').intent(), Some(Intent::Record(EventType::SevenMeter)));
        assert_eq!(Key::Char('x').intent(), None);
    }

    #[test]
    fn parses_dom_key_names() {
        assert_eq!("Space".parse::<Key>().unwrap(), Key::Space);
        assert_eq!(" ".parse::<Key>().unwrap(), Key::Space);
        assert_eq!("Escape".parse::<Key>().unwrap(), Key::Escape);
        assert_eq!("?".parse::<Key>().unwrap(), Key::Char('?'));
        assert!(matches!("F12".parse::<Key>(), Err(ScoutError::UnknownKey(_))));
    }

    #[test]
    fn only_shot_intents_need_a_zone() {
        assert!(Intent::Record(EventType::Goal).requires_zone());
        assert!(Intent::Record(EventType::ShotMiss).requires_zone());
        assert!(!Intent::Record(EventType::Save).requires_zone());
        assert!(!Intent::Undo.requires_zone());
        assert!(!Intent::ToggleClock.requires_zone());
    }

    #[test]
    fn help_lists_every_binding() {
        assert_eq!(SHORTCUT_HELP.len(), 12);
    }
}
