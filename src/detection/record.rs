use serde::Serialize;

use crate::detection::geometry;
use crate::timeline::models::{EventKind, Period, PixelPos, Score, TeamRef};

/// Shot classification attached to shot records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotInfo {
    pub shot_type: Option<String>,
    pub label: Option<String>,
    pub three_point: bool,
    pub position: Option<PixelPos>,
    pub distance_px: Option<f64>,
    /// Absent for dunks and for shots without a chart position.
    pub distance_ft: Option<f64>,
}

impl ShotInfo {
    pub fn is_dunk(&self) -> bool {
        geometry::is_dunk(self.label.as_deref()) || geometry::is_dunk(self.shot_type.as_deref())
    }
}

/// One detected buzzerbeater. Built once per extraction, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuzzerbeaterRecord {
    pub match_id: u32,
    pub season: Option<u32>,
    pub match_type: Option<String>,
    pub team: TeamRef,
    pub opponent: TeamRef,
    pub is_home: bool,
    pub player_id: u32,
    pub player_name: String,
    pub period: Period,
    pub game_clock: u32,
    pub comment: String,
    pub event_kind: EventKind,
    pub shot: Option<ShotInfo>,
    pub free_throw_type: Option<String>,
    pub score_before: Option<Score>,
    pub score_after: Option<Score>,
    pub final_score: Option<Score>,
    pub outcome_changed: bool,
}

/// Identity of a record across re-extractions of the same match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub match_id: u32,
    pub team_id: u32,
    pub player_id: u32,
    pub period: Period,
    pub game_clock: u32,
}

impl BuzzerbeaterRecord {
    pub fn key(&self) -> RecordKey {
        RecordKey {
            match_id: self.match_id,
            team_id: self.team.id,
            player_id: self.player_id,
            period: self.period,
            game_clock: self.game_clock,
        }
    }

    pub fn period_label(&self) -> String {
        self.period.label()
    }

    pub fn shot_type_label(&self) -> Option<&str> {
        self.shot.as_ref().and_then(|s| s.label.as_deref())
    }

    pub fn distance_ft(&self) -> Option<f64> {
        self.shot.as_ref().and_then(|s| s.distance_ft)
    }
}
