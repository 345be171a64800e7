use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{GameSeconds, Period};

/// Pausable game clock counting whole seconds.
///
/// The clock never reads wall time itself; the owner calls [`GameClock::tick`]
/// once per elapsed second, and ticks while stopped are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameClock {
    current_time: GameSeconds,
    period: Period,
    is_running: bool,
    is_paused: bool,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl GameClock {
    pub fn new() -> Self {
        Self {
            current_time: 0,
            period: 1,
            is_running: false,
            is_paused: false,
        }
    }

    pub fn current_time(&self) -> GameSeconds {
        self.current_time
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    /// Play/pause. `is_paused` takes the previous running value.
    /// Returns whether the clock now runs.
    pub fn toggle(&mut self) -> bool {
        self.is_paused = self.is_running;
        self.is_running = !self.is_running;
        debug!(running = self.is_running, at = self.current_time, "clock toggled");
        self.is_running
    }

    pub fn start(&mut self) {
        if !self.is_running {
            self.toggle();
        }
    }

    pub fn pause(&mut self) {
        if self.is_running {
            self.toggle();
        }
    }

    /// Advances one second while running. Returns the new reading, or `None`
    /// when the tick was ignored.
    pub fn tick(&mut self) -> Option<GameSeconds> {
        if !self.is_running {
            return None;
        }
        self.current_time = self.current_time.saturating_add(1);
        Some(self.current_time)
    }

    /// Moves to the next period. Time keeps counting from the current reading.
    pub fn next_period(&mut self) -> Period {
        self.period = self.period.saturating_add(1);
        self.period
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Formats seconds as `MM:SS`.
pub fn format_game_time(seconds: GameSeconds) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_only_while_running() {
        let mut clock = GameClock::new();
        assert_eq!(clock.tick(), None);

        clock.start();
        assert_eq!(clock.tick(), Some(1));
        assert_eq!(clock.tick(), Some(2));

        clock.pause();
        assert_eq!(clock.tick(), None);
        assert_eq!(clock.current_time(), 2);
    }

    #[test]
    fn toggle_records_previous_running_state() {
        let mut clock = GameClock::new();
        assert!(clock.toggle());
        assert!(!clock.is_paused());

        assert!(!clock.toggle());
        assert!(clock.is_paused());
    }

    #[test]
    fn start_then_pause_without_tick_keeps_time() {
        let mut clock = GameClock::new();
        clock.toggle();
        clock.toggle();
        assert_eq!(clock.current_time(), 0);
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut clock = GameClock::new();
        clock.start();
        clock.tick();
        clock.next_period();
        clock.reset();
        assert_eq!(clock, GameClock::new());
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_game_time(0), "00:00");
        assert_eq!(format_game_time(1805), "30:05");
    }
}
