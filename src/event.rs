//! Scouted event record, its typed payload, and the draft used to create it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::ScoutError,
    types::{EventId, GameSeconds, Period, Side, ZoneId},
};

/// Closed set of event types a scout can record.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
    /// Shot that may have scored.
    Goal,
    /// Shot that missed the goal.
    ShotMiss,
    /// Goalkeeper save.
    Save,
    /// Lost possession.
    Turnover,
    /// Foul committed.
    Foul,
    /// Seven-meter penalty throw.
    SevenMeter,
    /// Team timeout.
    Timeout,
    /// Player substitution.
    Substitution,
    /// Yellow card.
    YellowCard,
    /// Red card.
    RedCard,
    /// Two-minute suspension.
    TwoMinSuspension,
}

impl EventType {
    /// Shot types can only be recorded against a selected court zone.
    pub fn requires_zone(self) -> bool {
        matches!(self, Self::Goal | Self::ShotMiss)
    }

    /// True when events of this type carry a success flag.
    pub fn has_outcome(self) -> bool {
        matches!(self, Self::Goal | Self::Save | Self::SevenMeter)
    }

    /// Human-readable label for event lists.
    pub fn label(self) -> &'static str {
        match self {
            Self::Goal => "Goal",
            Self::ShotMiss => "Missed shot",
            Self::Save => "Save",
            Self::Turnover => "Turnover",
            Self::Foul => "Foul",
            Self::SevenMeter => "7m throw",
            Self::Timeout => "Timeout",
            Self::Substitution => "Substitution",
            Self::YellowCard => "Yellow card",
            Self::RedCard => "Red card",
            Self::TwoMinSuspension => "2 min suspension",
        }
    }
}

/// Type-specific payload of a scouted event.
///
/// Each variant holds exactly the fields its type supports. Serialized with an
/// inline `type` tag so exported events stay flat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Shot on goal with its outcome.
    Goal {
        /// Court zone the shot came from.
        zone: ZoneId,
        /// True when the shot scored.
        success: bool,
    },
    /// Shot that missed.
    ShotMiss {
        /// Court zone the shot came from.
        zone: ZoneId,
    },
    /// Goalkeeper save.
    Save {
        /// True when the save held.
        success: bool,
    },
    /// Lost possession.
    Turnover,
    /// Foul committed.
    Foul,
    /// Seven-meter throw with its outcome.
    SevenMeter {
        /// True when the throw was converted.
        success: bool,
    },
    /// Team timeout.
    Timeout,
    /// Player substitution.
    Substitution,
    /// Yellow card.
    YellowCard,
    /// Red card.
    RedCard,
    /// Two-minute suspension.
    TwoMinSuspension,
}

impl EventKind {
    /// Builds the payload for `event_type` from the current selection.
    ///
    /// `success` defaults to `true` for outcome-bearing types and is ignored
    /// for the rest. Shot types fail with [`ScoutError::ZoneRequired`] when no
    /// zone is given; the zone is dropped for types that do not carry one.
    pub fn build(
        event_type: EventType,
        zone: Option<ZoneId>,
        success: Option<bool>,
    ) -> Result<Self, ScoutError> {
        let success = success.unwrap_or(true);
        let kind = match event_type {
            EventType::Goal => Self::Goal {
                zone: zone.ok_or(ScoutError::ZoneRequired { event_type })?,
                success,
            },
            EventType::ShotMiss => Self::ShotMiss {
                zone: zone.ok_or(ScoutError::ZoneRequired { event_type })?,
            },
            EventType::Save => Self::Save { success },
            EventType::Turnover => Self::Turnover,
            EventType::Foul => Self::Foul,
            EventType::SevenMeter => Self::SevenMeter { success },
            EventType::Timeout => Self::Timeout,
            EventType::Substitution => Self::Substitution,
            EventType::YellowCard => Self::YellowCard,
            EventType::RedCard => Self::RedCard,
            EventType::TwoMinSuspension => Self::TwoMinSuspension,
        };
        Ok(kind)
    }

    /// Event type tag of this payload.
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Goal { .. } => EventType::Goal,
            Self::ShotMiss { .. } => EventType::ShotMiss,
            Self::Save { .. } => EventType::Save,
            Self::Turnover => EventType::Turnover,
            Self::Foul => EventType::Foul,
            Self::SevenMeter { .. } => EventType::SevenMeter,
            Self::Timeout => EventType::Timeout,
            Self::Substitution => EventType::Substitution,
            Self::YellowCard => EventType::YellowCard,
            Self::RedCard => EventType::RedCard,
            Self::TwoMinSuspension => EventType::TwoMinSuspension,
        }
    }

    /// Court zone, for shot types.
    pub fn zone(&self) -> Option<&ZoneId> {
        match self {
            Self::Goal { zone, .. } | Self::ShotMiss { zone } => Some(zone),
            _ => None,
        }
    }

    /// Outcome flag, for outcome-bearing types.
    pub fn success(&self) -> Option<bool> {
        match self {
            Self::Goal { success, .. } | Self::Save { success } | Self::SevenMeter { success } => {
                Some(*success)
            }
            _ => None,
        }
    }

    /// True only for goals that count on the scoreboard.
    pub fn is_scoring_goal(&self) -> bool {
        matches!(self, Self::Goal { success: true, .. })
    }
}

/// Immutable scouted event as held in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoutEvent {
    /// Stable event identifier.
    pub id: EventId,
    /// Wall-clock creation instant.
    pub timestamp: DateTime<Utc>,
    /// Game clock reading at creation.
    pub game_time: GameSeconds,
    /// Period the event happened in.
    pub period: Period,
    /// Acting team.
    pub team: Side,
    /// Type-specific payload.
    #[serde(flatten)]
    pub kind: EventKind,
    /// Free-text annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ScoutEvent {
    /// Event type tag.
    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    /// Side whose score this event raises, if any.
    pub fn scoring_side(&self) -> Option<Side> {
        self.kind.is_scoring_goal().then_some(self.team)
    }
}

/// Append payload used to create a new [`ScoutEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    /// Wall-clock creation instant.
    pub timestamp: DateTime<Utc>,
    /// Game clock reading at creation.
    pub game_time: GameSeconds,
    /// Period the event happened in.
    pub period: Period,
    /// Acting team.
    pub team: Side,
    /// Type-specific payload.
    pub kind: EventKind,
    /// Free-text annotation.
    pub details: Option<String>,
}

impl EventDraft {
    /// Draft stamped with the current wall-clock time.
    pub fn now(game_time: GameSeconds, period: Period, team: Side, kind: EventKind) -> Self {
        Self {
            timestamp: Utc::now(),
            game_time,
            period,
            team,
            kind,
            details: None,
        }
    }

    /// Attaches a free-text annotation.
    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }

    pub(crate) fn into_event(self, id: EventId) -> ScoutEvent {
        ScoutEvent {
            id,
            timestamp: self.timestamp,
            game_time: self.game_time,
            period: self.period,
            team: self.team,
            kind: self.kind,
            details: self.details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shot_types_need_a_zone() {
        assert_eq!(
            EventKind::build(EventType::Goal, None, Some(true)),
            Err(ScoutError::ZoneRequired { event_type: EventType::Goal })
        );
        assert_eq!(
            EventKind::build(EventType::ShotMiss, None, None),
            Err(ScoutError::ZoneRequired { event_type: EventType::ShotMiss })
        );
        assert_eq!(
            EventKind::build(EventType::Foul, None, None),
            Ok(EventKind::Foul)
        );
    }

    #[test]
    fn zone_is_dropped_for_non_shot_types() {
        let kind = EventKind::build(EventType::Save, Some("shot_left".into()), None).unwrap();
        assert_eq!(kind, EventKind::Save { success: true });
        assert_eq!(kind.zone(), None);
    }

    #[test]
    fn event_serializes_flat_with_type_tag() {
        let event = EventDraft::now(
            95,
            1,
            Side::Home,
            EventKind::Goal {
                zone: "shot_center".into(),
                success: true,
            },
        )
        .into_event(4);

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "goal");
        assert_eq!(value["zone"], "shot_center");
        assert_eq!(value["success"], true);
        assert_eq!(value["gameTime"], 95);
        assert_eq!(value["team"], "home");
        assert!(value.get("details").is_none());

        let back: ScoutEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn type_names_match_wire_tags() {
        assert_eq!(EventType::TwoMinSuspension.to_string(), "two_min_suspension");
        assert_eq!("seven_meter".parse::<EventType>().unwrap(), EventType::SevenMeter);
    }

    #[test]
    fn every_type_builds_a_matching_payload() {
        use strum::IntoEnumIterator;

        for event_type in EventType::iter() {
            let kind = EventKind::build(event_type, Some("shot_center".into()), None).unwrap();
            assert_eq!(kind.event_type(), event_type);
            assert_eq!(kind.zone().is_some(), event_type.requires_zone());
            assert_eq!(kind.success().is_some(), event_type.has_outcome());

            let tag = serde_json::to_value(&kind).unwrap()["type"].clone();
            assert_eq!(tag, event_type.to_string());
        }
    }
}
