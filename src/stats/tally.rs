use serde::{Deserialize, Serialize};

use crate::{
    event::{EventKind, ScoutEvent},
    types::Side,
};

/// Seven-meter throw attempts and conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SevenMeterStats {
    pub attempts: u32,
    pub conversions: u32,
}

impl SevenMeterStats {
    /// Conversion percentage, `0.0` when nothing was attempted.
    pub fn conversion_rate(&self) -> f64 {
        percentage(self.conversions, self.attempts)
    }
}

/// Counters for one team, folded from its events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    /// Goal events, scored or not.
    pub goals: u32,
    /// Missed shots.
    pub shots: u32,
    pub saves: u32,
    pub turnovers: u32,
    pub fouls: u32,
    pub seven_meters: SevenMeterStats,
    pub timeouts: u32,
    pub substitutions: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub two_min_suspensions: u32,
}

impl TeamStats {
    /// `goals / shots * 100`, or exactly `0.0` without shots.
    pub fn accuracy(&self) -> f64 {
        percentage(self.goals, self.shots)
    }

    pub(crate) fn apply(&mut self, kind: &EventKind) {
        self.adjust(kind, |v| *v += 1);
    }

    pub(crate) fn retract(&mut self, kind: &EventKind) {
        self.adjust(kind, |v| *v = v.saturating_sub(1));
    }

    fn adjust(&mut self, kind: &EventKind, step: impl Fn(&mut u32)) {
        match kind {
            EventKind::Goal { .. } => step(&mut self.goals),
            EventKind::ShotMiss { .. } => step(&mut self.shots),
            EventKind::Save { .. } => step(&mut self.saves),
            EventKind::Turnover => step(&mut self.turnovers),
            EventKind::Foul => step(&mut self.fouls),
            EventKind::SevenMeter { success } => {
                step(&mut self.seven_meters.attempts);
                if *success {
                    step(&mut self.seven_meters.conversions);
                }
            }
            EventKind::Timeout => step(&mut self.timeouts),
            EventKind::Substitution => step(&mut self.substitutions),
            EventKind::YellowCard => step(&mut self.yellow_cards),
            EventKind::RedCard => step(&mut self.red_cards),
            EventKind::TwoMinSuspension => step(&mut self.two_min_suspensions),
        }
    }
}

/// Derived statistics for both teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoutStats {
    pub home: TeamStats,
    pub away: TeamStats,
}

impl ScoutStats {
    /// Full recompute from a sequence of events.
    pub fn fold<'a>(events: impl IntoIterator<Item = &'a ScoutEvent>) -> Self {
        let mut stats = Self::default();
        for event in events {
            stats.apply(event);
        }
        stats
    }

    pub fn team(&self, side: Side) -> &TeamStats {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub(crate) fn apply(&mut self, event: &ScoutEvent) {
        self.team_mut(event.team).apply(&event.kind);
    }

    pub(crate) fn retract(&mut self, event: &ScoutEvent) {
        self.team_mut(event.team).retract(&event.kind);
    }

    fn team_mut(&mut self, side: Side) -> &mut TeamStats {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }
}

/// Rounds a percentage to one decimal, the display convention.
pub fn round_pct(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Formats a percentage for display, e.g. `66.7%`.
pub fn format_pct(value: f64) -> String {
    format!("{:.1}%", round_pct(value))
}

fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    f64::from(part) / f64::from(whole) * 100.0
}
