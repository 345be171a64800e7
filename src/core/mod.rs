//! In-memory scouting core: clock, event log and session.

/// Pausable game clock.
pub mod clock;
/// Authoritative event log with undo/redo.
pub mod event_log;
/// Scouting session and intent reducer.
pub mod session;
