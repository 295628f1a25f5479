//! Window inspection for diagnosing boundary detection.
//!
//! Lists what happened inside each buzzer window of a match: commentary
//! lines and every scoring event, whether or not it made a record.

use std::fmt::Write as _;

use crate::detection::window::{self, BuzzerWindow};
use crate::timeline::models::{EventDetail, EventKind, MatchTimeline};

#[derive(Debug, Clone, PartialEq)]
pub struct WindowComment {
    pub clock: u32,
    pub label: String,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowScore {
    pub kind: EventKind,
    pub clock: u32,
    pub team: String,
    /// Shot type code or free-throw type, `-` when unknown.
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryScores {
    pub label: String,
    pub window: BuzzerWindow,
    pub scores: Vec<WindowScore>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchInspection {
    pub match_id: u32,
    pub max_clock: u32,
    pub boundaries: Vec<u32>,
    pub near_end_comments: Vec<WindowComment>,
    /// Subset of `near_end_comments` that mention the buzzer.
    pub buzzer_comments: Vec<WindowComment>,
    /// Only windows that contain at least one score.
    pub windows: Vec<BoundaryScores>,
}

fn label_or_unknown(boundary: u32, boundaries: &[u32]) -> String {
    window::label_for(boundary, boundaries).unwrap_or_else(|| "unknown".to_string())
}

pub fn inspect_match(timeline: &MatchTimeline, boundaries: &[u32]) -> MatchInspection {
    let ctx = &timeline.context;

    let mut near_end_comments = Vec::new();
    for event in &timeline.events {
        let Some(boundary) = window::matching_boundary(event.clock, boundaries) else {
            continue;
        };
        let comment = event.comment.trim();
        if comment.is_empty() {
            continue;
        }
        near_end_comments.push(WindowComment {
            clock: event.clock,
            label: label_or_unknown(boundary, boundaries),
            comment: comment.to_string(),
        });
    }
    let buzzer_comments = near_end_comments
        .iter()
        .filter(|c| c.comment.to_lowercase().contains("buzzer"))
        .cloned()
        .collect();

    let windows = boundaries
        .iter()
        .filter_map(|&boundary| {
            let win = BuzzerWindow::before(boundary);
            let scores: Vec<WindowScore> = timeline
                .events
                .iter()
                .filter(|ev| ev.is_made_score() && win.contains(ev.clock))
                .map(|ev| {
                    let detail = match &ev.detail {
                        EventDetail::Shot(s) => s.shot_type.clone(),
                        EventDetail::FreeThrow(ft) => ft.free_throw_type.clone(),
                        EventDetail::Other => None,
                    };
                    WindowScore {
                        kind: ev.kind(),
                        clock: ev.clock,
                        team: ctx.team(ev.team).name.clone(),
                        detail: detail.unwrap_or_else(|| "-".to_string()),
                    }
                })
                .collect();
            (!scores.is_empty()).then(|| BoundaryScores {
                label: label_or_unknown(boundary, boundaries),
                window: win,
                scores,
            })
        })
        .collect();

    MatchInspection {
        match_id: ctx.match_id,
        max_clock: timeline.max_clock().unwrap_or(0),
        boundaries: boundaries.to_vec(),
        near_end_comments,
        buzzer_comments,
        windows,
    }
}

impl MatchInspection {
    pub fn render(&self, only_buzzer_comments: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "match_id={} max_clock={} period_ends={:?}",
            self.match_id, self.max_clock, self.boundaries
        );
        if !only_buzzer_comments {
            for c in &self.near_end_comments {
                let _ = writeln!(out, "  comment t={} {}: {}", c.clock, c.label, c.comment);
            }
        }
        for c in &self.buzzer_comments {
            let _ = writeln!(out, "  buzzer_comment t={} {}: {}", c.clock, c.label, c.comment);
        }
        for w in &self.windows {
            let _ = writeln!(
                out,
                "  scores near end {} ({}-{}):",
                w.label, w.window.start, w.window.end
            );
            for s in &w.scores {
                let kind = match s.kind {
                    EventKind::FreeThrow => "ft",
                    other => other.as_str(),
                };
                let _ = writeln!(
                    out,
                    "    {kind} t={} team={} type={}",
                    s.clock, s.team, s.detail
                );
            }
        }
        out
    }
}
