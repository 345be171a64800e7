//! Downloadable JSON snapshot of a scouting session.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use crate::{
    core::session::{GameState, ScoutSession},
    event::ScoutEvent,
    stats::tally::{ScoutStats, TeamStats, round_pct},
    types::{Side, TeamInfo},
};

/// Version number written into every export.
pub const EXPORT_FORMAT_VERSION: u16 = 1;

/// Failures while producing an export file.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    /// The snapshot could not be serialized.
    #[error("failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing the file failed.
    #[error("failed to write export to {path}: {source}")]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Teams and scoreboard at export time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    /// Home team metadata.
    pub home_team: TeamInfo,
    /// Away team metadata.
    pub away_team: TeamInfo,
    /// Clock and score.
    pub game_state: GameState,
}

/// Team counters plus the rates shown on the stats panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedTeamStats {
    /// Raw counters.
    #[serde(flatten)]
    pub counters: TeamStats,
    /// Shooting accuracy in percent, one decimal.
    pub accuracy: f64,
    /// Seven-meter conversion in percent, one decimal.
    pub seven_meter_rate: f64,
}

impl From<&TeamStats> for ExportedTeamStats {
    fn from(value: &TeamStats) -> Self {
        Self {
            counters: *value,
            accuracy: round_pct(value.accuracy()),
            seven_meter_rate: round_pct(value.seven_meters.conversion_rate()),
        }
    }
}

/// Stats for both teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedStats {
    /// Home team stats.
    pub home: ExportedTeamStats,
    /// Away team stats.
    pub away: ExportedTeamStats,
}

impl From<&ScoutStats> for ExportedStats {
    fn from(value: &ScoutStats) -> Self {
        Self {
            home: (&value.home).into(),
            away: (&value.away).into(),
        }
    }
}

/// Owned, point-in-time copy of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    /// Export format version.
    pub format_version: u16,
    /// When the snapshot was taken.
    pub exported_at: DateTime<Utc>,
    /// Teams and scoreboard.
    pub game_info: GameInfo,
    /// Events ordered by game time.
    pub events: Vec<ScoutEvent>,
    /// Derived stats at export time.
    pub stats: ExportedStats,
}

impl ExportSnapshot {
    /// Copies everything out of `session`.
    pub fn capture(session: &ScoutSession) -> Self {
        let events: Vec<ScoutEvent> = session.log().chronological().into_iter().cloned().collect();
        let stats = ScoutStats::fold(&events);
        Self {
            format_version: EXPORT_FORMAT_VERSION,
            exported_at: Utc::now(),
            game_info: GameInfo {
                home_team: session.team_info(Side::Home).clone(),
                away_team: session.team_info(Side::Away).clone(),
                game_state: session.game_state(),
            },
            events,
            stats: (&stats).into(),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Suggested download name, e.g. `scout_HCK_vs_THW_20261018-201500.json`.
    pub fn file_name(&self) -> String {
        format!(
            "scout_{}_vs_{}_{}.json",
            sanitize(&self.game_info.home_team.short_name),
            sanitize(&self.game_info.away_team.short_name),
            self.exported_at.format("%Y%m%d-%H%M%S")
        )
    }

    /// Writes the export into `dir` and returns the final path.
    ///
    /// The JSON is fully serialized before the filesystem is touched, then
    /// written to a temporary file in `dir` and renamed into place. On any
    /// failure neither a partial export nor the temporary file is left behind.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        let json = self.to_json()?;
        let dir = dir.as_ref();
        let path = dir.join(self.file_name());
        let io_err = |source| ExportError::Io {
            path: path.clone(),
            source,
        };

        // The temp file is removed on drop unless persisted.
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.persist(&path).map_err(|err| io_err(err.error))?;

        info!(path = %path.display(), events = self.events.len(), "export written");
        Ok(path)
    }
}

fn sanitize(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if cleaned.is_empty() {
        "team".to_string()
    } else {
        cleaned
    }
}
