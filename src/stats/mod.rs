//! Score and statistics derived from the event log.

/// Incremental stats cache fed by journaled ops.
pub mod projector;
/// Score fold over goals.
pub mod score;
/// Per-team counters and rates.
pub mod tally;
