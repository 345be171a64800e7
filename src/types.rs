//! Shared primitive IDs, sides, zones and team identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Monotonic scouted-event identifier.
pub type EventId = u64;
/// Monotonic operation sequence number.
pub type OpSeq = u64;
/// Game clock reading in whole seconds.
pub type GameSeconds = u32;
/// Game period number, starting at 1.
pub type Period = u8;

/// Which of the two teams an event belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Side {
    /// Home team.
    #[default]
    Home,
    /// Away team.
    Away,
}

impl Side {
    /// Returns the other side.
    pub fn opponent(self) -> Self {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
        }
    }
}

/// Identifier of a labeled court region, e.g. `shot_center`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl ZoneId {
    /// Wraps a zone label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Zone label as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ZoneId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ZoneId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static identity of a team taking part in a scouted game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInfo {
    /// Backend identifier of the team.
    pub id: String,
    /// Full team name.
    pub name: String,
    /// Abbreviation shown on the scoreboard.
    pub short_name: String,
    /// Display color, typically a CSS hex string.
    pub color: String,
}

impl TeamInfo {
    /// Builds team metadata.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        short_name: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            short_name: short_name.into(),
            color: color.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn sides_parse_case_insensitively_and_pair_up() {
        assert_eq!("HOME".parse::<Side>().unwrap(), Side::Home);
        assert_eq!("away".parse::<Side>().unwrap(), Side::Away);

        for side in Side::iter() {
            assert_ne!(side.opponent(), side);
            assert_eq!(side.opponent().opponent(), side);
        }
    }
}
