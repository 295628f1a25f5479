//! Typed play-by-play timeline consumed by the detection engine.
//!
//! Events arrive already parsed and commentary-annotated. Nothing in this
//! crate mutates them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Game-seconds in one quarter, and in one overtime period.
pub const PERIOD_LENGTH_SECS: u32 = 720;

/// Clock value at which the fourth quarter ends.
pub const REGULATION_END_SECS: u32 = 4 * PERIOD_LENGTH_SECS;

/// Last period end representable as a `u32` clock. Later clocks could not
/// be covered by a boundary.
pub const MAX_PERIOD_END_SECS: u32 = (u32::MAX / PERIOD_LENGTH_SECS) * PERIOD_LENGTH_SECS;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("score went backwards at clock {clock}: {before} -> {after}")]
    ScoreRegression { clock: u32, before: Score, after: Score },
    #[error("clock {0} is past the last representable period end")]
    ClockOutOfRange(u32),
    #[error("period {0} ends past the last representable clock")]
    PeriodOutOfRange(Period),
    #[error("failed to decode timeline: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodParseError {
    #[error("unrecognized period tag: {0:?}")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn is_home(self) -> bool {
        matches!(self, Side::Home)
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => write!(f, "home"),
            Self::Away => write!(f, "away"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    /// Signed score difference from `side`'s point of view.
    pub fn margin_for(&self, side: Side) -> i64 {
        let (home, away) = (i64::from(self.home), i64::from(self.away));
        match side {
            Side::Home => home - away,
            Side::Away => away - home,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{}", self.home, self.away)
    }
}

/// Shot-chart pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPos {
    pub x: i32,
    pub y: i32,
}

/// A quarter (1..=4) or an overtime period (1..).
///
/// Parsed from tags `Q1`..`Q4` and `OTn`; the legacy `Reg` tag means the
/// fourth quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Period {
    Quarter(u8),
    Overtime(u32),
}

impl Period {
    /// Storage tag, e.g. `Q2` or `OT1`.
    pub fn tag(&self) -> String {
        match self {
            Self::Quarter(q) => format!("Q{q}"),
            Self::Overtime(n) => format!("OT{n}"),
        }
    }

    /// Human label. The fourth quarter reads as "regulation".
    pub fn label(&self) -> String {
        match self {
            Self::Quarter(1) => "first quarter".to_string(),
            Self::Quarter(2) => "second quarter".to_string(),
            Self::Quarter(3) => "third quarter".to_string(),
            Self::Quarter(_) => "regulation".to_string(),
            Self::Overtime(n) => format!("OT{n}"),
        }
    }

    /// Game clock at which this period ends, `None` if it does not fit.
    pub fn checked_end_clock(&self) -> Option<u32> {
        let end = match self {
            Self::Quarter(q) => PERIOD_LENGTH_SECS.checked_mul(u32::from(*q)),
            Self::Overtime(n) => PERIOD_LENGTH_SECS
                .checked_mul(*n)
                .and_then(|ot| ot.checked_add(REGULATION_END_SECS)),
        }?;
        (end <= MAX_PERIOD_END_SECS).then_some(end)
    }

    /// Game clock at which this period ends, saturating at
    /// [`MAX_PERIOD_END_SECS`].
    pub fn end_clock(&self) -> u32 {
        self.checked_end_clock().unwrap_or(MAX_PERIOD_END_SECS)
    }

    /// Inverse of [`Period::end_clock`]; `None` for clocks that are not a period end.
    pub fn from_end_clock(clock: u32) -> Option<Self> {
        if clock == 0 || clock % PERIOD_LENGTH_SECS != 0 {
            return None;
        }
        let index = clock / PERIOD_LENGTH_SECS;
        if index <= 4 {
            Some(Self::Quarter(index as u8))
        } else {
            Some(Self::Overtime(index - 4))
        }
    }

    /// Parse a human label produced by [`Period::label`].
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "first quarter" => Some(Self::Quarter(1)),
            "second quarter" => Some(Self::Quarter(2)),
            "third quarter" => Some(Self::Quarter(3)),
            "regulation" => Some(Self::Quarter(4)),
            other => parse_overtime(other),
        }
    }
}

fn parse_overtime(lowered: &str) -> Option<Period> {
    let n: u32 = lowered.strip_prefix("ot")?.parse().ok()?;
    (n >= 1).then_some(Period::Overtime(n))
}

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        if lowered == "reg" {
            return Ok(Self::Quarter(4));
        }
        if let Some(q) = lowered.strip_prefix('q') {
            return match q.parse::<u8>() {
                Ok(q @ 1..=4) => Ok(Self::Quarter(q)),
                _ => Err(PeriodParseError::Unknown(s.to_string())),
            };
        }
        parse_overtime(&lowered).ok_or_else(|| PeriodParseError::Unknown(s.to_string()))
    }
}

impl TryFrom<String> for Period {
    type Error = PeriodParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.tag()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShotDetail {
    /// Upstream shot type code, e.g. `JUMP_SHOT` or `DUNK_ALLEY_OOP`.
    #[serde(default)]
    pub shot_type: Option<String>,
    #[serde(default)]
    pub shot_type_label: Option<String>,
    /// Three-point flag as tagged upstream; never re-derived from distance.
    #[serde(default)]
    pub three_point: bool,
    #[serde(default)]
    pub position: Option<PixelPos>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FreeThrowDetail {
    #[serde(default)]
    pub free_throw_type: Option<String>,
}

/// Kind-specific payload, discriminated by the `kind` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventDetail {
    Shot(ShotDetail),
    FreeThrow(FreeThrowDetail),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Shot,
    FreeThrow,
    Other,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shot => "shot",
            Self::FreeThrow => "free_throw",
            Self::Other => "other",
        }
    }

    /// Lenient parse used for stored rows; anything unrecognized is `Other`.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("shot") => Self::Shot,
            Some("free_throw") => Self::FreeThrow,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    #[serde(flatten)]
    pub detail: EventDetail,
    pub team: Side,
    pub player_id: u32,
    #[serde(default)]
    pub player_name: String,
    /// Game-seconds elapsed since tip-off.
    pub clock: u32,
    #[serde(default)]
    pub made: bool,
    #[serde(default)]
    pub period: Option<Period>,
    #[serde(default)]
    pub score_before: Option<Score>,
    #[serde(default)]
    pub score_after: Option<Score>,
    #[serde(default)]
    pub comment: String,
}

impl TimelineEvent {
    pub fn kind(&self) -> EventKind {
        match self.detail {
            EventDetail::Shot(_) => EventKind::Shot,
            EventDetail::FreeThrow(_) => EventKind::FreeThrow,
            EventDetail::Other => EventKind::Other,
        }
    }

    pub fn shot(&self) -> Option<&ShotDetail> {
        match &self.detail {
            EventDetail::Shot(shot) => Some(shot),
            _ => None,
        }
    }

    /// A made shot or made free throw.
    pub fn is_made_score(&self) -> bool {
        self.made && matches!(self.detail, EventDetail::Shot(_) | EventDetail::FreeThrow(_))
    }

    /// Reject events the detection pass cannot place on the game clock,
    /// and score pairs that run backwards.
    pub fn validate(&self) -> Result<(), TimelineError> {
        if self.clock > MAX_PERIOD_END_SECS {
            return Err(TimelineError::ClockOutOfRange(self.clock));
        }
        if let Some(period) = self.period {
            if period.checked_end_clock().is_none() {
                return Err(TimelineError::PeriodOutOfRange(period));
            }
        }
        if let (Some(before), Some(after)) = (self.score_before, self.score_after) {
            if after.home < before.home || after.away < before.away {
                return Err(TimelineError::ScoreRegression {
                    clock: self.clock,
                    before,
                    after,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: u32,
    pub name: String,
}

/// Per-match context supplied by the caller alongside the events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchContext {
    pub match_id: u32,
    #[serde(default)]
    pub season: Option<u32>,
    #[serde(default)]
    pub match_type: Option<String>,
    pub home: TeamRef,
    pub away: TeamRef,
    #[serde(default)]
    pub final_score: Option<Score>,
}

impl MatchContext {
    pub fn team(&self, side: Side) -> &TeamRef {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn opponent(&self, side: Side) -> &TeamRef {
        self.team(side.opposite())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchTimeline {
    #[serde(flatten)]
    pub context: MatchContext,
    pub events: Vec<TimelineEvent>,
}

impl MatchTimeline {
    pub fn max_clock(&self) -> Option<u32> {
        self.events.iter().map(|ev| ev.clock).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_tags_parse() {
        assert_eq!("Q1".parse::<Period>(), Ok(Period::Quarter(1)));
        assert_eq!("q4".parse::<Period>(), Ok(Period::Quarter(4)));
        assert_eq!("Reg".parse::<Period>(), Ok(Period::Quarter(4)));
        assert_eq!("OT2".parse::<Period>(), Ok(Period::Overtime(2)));
        assert!("Q5".parse::<Period>().is_err());
        assert!("OT0".parse::<Period>().is_err());
        assert!("".parse::<Period>().is_err());
    }

    #[test]
    fn test_period_labels_and_clocks() {
        assert_eq!(Period::Quarter(2).label(), "second quarter");
        assert_eq!(Period::Quarter(4).label(), "regulation");
        assert_eq!(Period::Overtime(3).label(), "OT3");
        assert_eq!(Period::Quarter(3).end_clock(), 2160);
        assert_eq!(Period::Overtime(1).end_clock(), 3600);
        assert_eq!(Period::from_end_clock(2880), Some(Period::Quarter(4)));
        assert_eq!(Period::from_end_clock(4320), Some(Period::Overtime(2)));
        assert_eq!(Period::from_end_clock(2875), None);
        assert_eq!(Period::from_label("OT2"), Some(Period::Overtime(2)));
        assert_eq!(Period::from_label("overtime"), None);
    }

    #[test]
    fn test_huge_overtime_has_no_end_clock() {
        let far = Period::Overtime(6_000_000);
        assert_eq!(far.checked_end_clock(), None);
        assert_eq!(far.end_clock(), MAX_PERIOD_END_SECS);
        assert_eq!(Period::Overtime(1).checked_end_clock(), Some(3600));
    }

    #[test]
    fn test_margin_perspective() {
        let score = Score::new(98, 99);
        assert_eq!(score.margin_for(Side::Home), -1);
        assert_eq!(score.margin_for(Side::Away), 1);
        assert_eq!(score.to_string(), "98–99");
    }

    #[test]
    fn test_decode_tagged_event() {
        let json = serde_json::json!({
            "kind": "shot",
            "team": "away",
            "player_id": 12,
            "player_name": "Jay Kay",
            "clock": 2878,
            "made": true,
            "period": "Q4",
            "shot_type": "JUMP_SHOT",
            "shot_type_label": "jump_shot",
            "three_point": true,
            "position": {"x": 100, "y": 90},
            "comment": "At the buzzer!"
        });
        let event: TimelineEvent = serde_json::from_value(json).expect("should decode");
        assert_eq!(event.kind(), EventKind::Shot);
        assert_eq!(event.period, Some(Period::Quarter(4)));
        let shot = event.shot().expect("shot payload");
        assert!(shot.three_point);
        assert_eq!(shot.position, Some(PixelPos { x: 100, y: 90 }));
        assert!(event.is_made_score());
    }

    #[test]
    fn test_other_event_is_never_a_score() {
        let json = serde_json::json!({
            "kind": "other",
            "team": "home",
            "player_id": 1,
            "clock": 10,
            "made": true
        });
        let event: TimelineEvent = serde_json::from_value(json).expect("should decode");
        assert_eq!(event.kind(), EventKind::Other);
        assert!(!event.is_made_score());
    }

    #[test]
    fn test_validate_rejects_score_regression() {
        let json = serde_json::json!({
            "kind": "free_throw",
            "team": "home",
            "player_id": 1,
            "clock": 10,
            "made": true,
            "score_before": {"home": 10, "away": 8},
            "score_after": {"home": 9, "away": 8}
        });
        let event: TimelineEvent = serde_json::from_value(json).expect("should decode");
        assert!(event.validate().is_err());
    }
}
