use serde::{Deserialize, Serialize};

use crate::{event::ScoutEvent, types::Side};

/// Goals on the scoreboard for each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    /// Folds a sequence of events into a score. Order does not matter.
    pub fn fold<'a>(events: impl IntoIterator<Item = &'a ScoutEvent>) -> Self {
        let mut score = Self::default();
        for event in events {
            score.credit(event);
        }
        score
    }

    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    pub(crate) fn credit(&mut self, event: &ScoutEvent) {
        if let Some(side) = event.scoring_side() {
            *self.slot(side) += 1;
        }
    }

    pub(crate) fn debit(&mut self, event: &ScoutEvent) {
        if let Some(side) = event.scoring_side() {
            let slot = self.slot(side);
            *slot = slot.saturating_sub(1);
        }
    }

    fn slot(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }
}
