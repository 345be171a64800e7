use tracing::trace;

use crate::{
    core::event_log::EventLog,
    op::{Op, StoredOp},
    types::OpSeq,
};

use super::{score::Score, tally::ScoutStats};

/// Keeps score and stats current by folding journaled ops one at a time.
///
/// After every op the cache equals [`ScoutStats::fold`] over the live log.
#[derive(Debug, Default, Clone)]
pub struct StatsProjector {
    stats: ScoutStats,
    score: Score,
    last_seq: OpSeq,
}

impl StatsProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the cache from an existing log; ops up to its latest sequence
    /// count as already projected.
    pub fn from_log(log: &EventLog) -> Self {
        Self {
            stats: ScoutStats::fold(log.appended()),
            score: log.score(),
            last_seq: log.latest_op_seq(),
        }
    }

    pub fn stats(&self) -> &ScoutStats {
        &self.stats
    }

    pub fn score(&self) -> Score {
        self.score
    }

    /// Sequence of the most recent op folded in.
    pub fn last_seq(&self) -> OpSeq {
        self.last_seq
    }

    /// Folds one op in. Ops at or below [`Self::last_seq`] are skipped.
    pub fn apply_stored_op(&mut self, stored: &StoredOp) {
        if stored.seq <= self.last_seq {
            return;
        }
        match &stored.op {
            Op::Append { event } => {
                self.stats.apply(event);
                self.score.credit(event);
            }
            Op::Remove { event, .. } => {
                self.stats.retract(event);
                self.score.debit(event);
            }
            Op::Reset { .. } => {
                self.stats = ScoutStats::default();
                self.score = Score::default();
            }
        }
        self.last_seq = stored.seq;
        trace!(seq = stored.seq, "projected op");
    }
}
