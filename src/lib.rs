//! Live handball scouting recorder.
//!
//! A [`core::session::ScoutSession`] owns the game clock, the append-ordered
//! event log and the current team/zone selection. Score and statistics are
//! folds over the log; exports are owned point-in-time copies.
//!
//! # Examples
//!
//! Recording through the keyboard reducer:
//! ```
//! use handball_scout::{
//!     core::session::ScoutSession,
//!     shortcuts::{Key, Outcome},
//!     types::{Side, TeamInfo},
//! };
//!
//! let mut session = ScoutSession::new(
//!     TeamInfo::new("1", "HC Kiel", "HCK", "#0055a4"),
//!     TeamInfo::new("2", "TV Hamm", "TVH", "#c8102e"),
//! );
//! session.select_team(Side::Home);
//! session.select_zone(Some("shot_center".into()));
//!
//! let outcome = session.handle_key(Key::Char('g')).expect("goal");
//! assert!(matches!(outcome, Outcome::Recorded(_)));
//! assert_eq!(session.game_state().home_score, 1);
//!
//! session.handle_key(Key::Char('z')).expect("undo");
//! assert_eq!(session.game_state().home_score, 0);
//! ```
//!
//! Runtime usage with a ticking clock and SQLite journal, resuming the saved
//! game when there is one:
//! ```no_run
//! use handball_scout::{
//!     core::session::{RecordIntent, ScoutSession},
//!     event::EventType,
//!     persist::sqlite::SqliteOpSink,
//!     runtime::handle::{spawn_session, RuntimeConfig},
//!     types::TeamInfo,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let sink = SqliteOpSink::open("scout.db").expect("open sqlite");
//! let session = sink.resume().expect("read journal").unwrap_or_else(|| {
//!     ScoutSession::new(
//!         TeamInfo::new("1", "HC Kiel", "HCK", "#0055a4"),
//!         TeamInfo::new("2", "TV Hamm", "TVH", "#c8102e"),
//!     )
//! });
//! let handle = spawn_session(session, Some(Box::new(sink)), RuntimeConfig::default());
//! handle.toggle_clock().await.expect("start clock");
//! handle
//!     .record_in_zone("shot_left", RecordIntent::new(EventType::Goal))
//!     .await
//!     .expect("record");
//! let export = handle.export().await.expect("export");
//! export.write_to(".").expect("write export");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```

/// Clock, event log and session.
pub mod core;
/// Crate-wide scouting errors.
pub mod error;
/// Scouted event records.
pub mod event;
/// JSON export snapshot.
pub mod export;
/// Journaled log mutations.
pub mod op;
/// Game journal: op sinks, saved game and resume.
pub mod persist;
/// Session runtime, clock ticker and events.
pub mod runtime;
/// Keyboard shortcut mapping.
pub mod shortcuts;
/// Score and statistics derivation.
pub mod stats;
/// Shared primitive types.
pub mod types;
