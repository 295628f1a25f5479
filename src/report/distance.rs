//! Shot distance distribution across matches, split by shot value.

use std::fmt::Write as _;

use crate::detection::geometry::{self, CORNER_THREE_FT, THREE_POINT_ARC_FT};
use crate::timeline::models::MatchTimeline;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShotDistances {
    pub three_point: Vec<f64>,
    pub two_point: Vec<f64>,
}

impl ShotDistances {
    /// Every charted shot, made or missed, in feet.
    pub fn collect<'a>(timelines: impl IntoIterator<Item = &'a MatchTimeline>) -> Self {
        let mut out = Self::default();
        for timeline in timelines {
            for event in &timeline.events {
                let Some(shot) = event.shot() else { continue };
                let Some(pos) = shot.position else { continue };
                let ft = geometry::resolve(pos, event.team).distance_ft;
                if shot.three_point {
                    out.three_point.push(ft);
                } else {
                    out.two_point.push(ft);
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Upper bound on histogram bins; narrower widths are widened to fit.
pub const MAX_HISTOGRAM_BINS: usize = 1000;

/// Fixed-width bins from the smallest to the largest value. At most
/// [`MAX_HISTOGRAM_BINS`] + 1 bins are produced.
pub fn histogram(values: &[f64], bin_width: f64) -> Vec<HistogramBin> {
    if values.is_empty() || bin_width.is_nan() || bin_width <= 0.0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let bin_width = bin_width.max((max - min) / MAX_HISTOGRAM_BINS as f64);
    let n_bins = ((max - min) / bin_width).floor() as usize + 1;

    let mut bins: Vec<HistogramBin> = (0..n_bins)
        .map(|i| HistogramBin {
            start: min + bin_width * i as f64,
            end: min + bin_width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - min) / bin_width).floor() as usize).min(n_bins - 1);
        bins[idx].count += 1;
    }
    bins
}

/// Plain-text bar chart with the corner and arc reference distances marked.
pub fn render_text_chart(title: &str, values: &[f64], bin_width: f64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title} (n={})", values.len());
    for bin in histogram(values, bin_width) {
        let mut markers = Vec::new();
        for (reference, name) in [(CORNER_THREE_FT, "corner 22 ft"), (THREE_POINT_ARC_FT, "arc 23.75 ft")] {
            if bin.start <= reference && reference < bin.end {
                markers.push(name);
            }
        }
        let marker = if markers.is_empty() {
            String::new()
        } else {
            format!("  <- {}", markers.join(", "))
        };
        let _ = writeln!(
            out,
            "{:>7.2}–{:<7.2} | {} {}{}",
            bin.start,
            bin.end,
            "#".repeat(bin.count),
            bin.count,
            marker
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::geometry::FT_PER_PX;
    use crate::timeline::models::{
        EventDetail, MatchContext, PixelPos, ShotDetail, Side, TeamRef, TimelineEvent,
    };

    fn shot(team: Side, x: i32, three_point: bool) -> TimelineEvent {
        TimelineEvent {
            detail: EventDetail::Shot(ShotDetail {
                three_point,
                position: Some(PixelPos { x, y: 96 }),
                ..ShotDetail::default()
            }),
            team,
            player_id: 1,
            player_name: String::new(),
            clock: 100,
            made: false,
            period: None,
            score_before: None,
            score_after: None,
            comment: String::new(),
        }
    }

    #[test]
    fn test_collect_splits_by_value() {
        let timeline = MatchTimeline {
            context: MatchContext {
                match_id: 1,
                season: None,
                match_type: None,
                home: TeamRef { id: 1, name: "A".to_string() },
                away: TeamRef { id: 2, name: "B".to_string() },
                final_score: None,
            },
            events: vec![
                shot(Side::Home, 347 - 92, true),
                shot(Side::Away, 21 + 40, false),
            ],
        };
        let d = ShotDistances::collect([&timeline]);
        assert_eq!(d.three_point.len(), 1);
        assert_eq!(d.two_point.len(), 1);
        assert!((d.three_point[0] - 92.0 * FT_PER_PX).abs() < 1e-9);
    }

    #[test]
    fn test_histogram_bins() {
        let bins = histogram(&[1.0, 1.2, 2.9, 3.0], 1.0);
        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 1, 1]);
        assert_eq!(bins[0].start, 1.0);
        assert!(histogram(&[], 1.0).is_empty());
        assert!(histogram(&[1.0], 0.0).is_empty());
    }

    #[test]
    fn test_tiny_bin_width_is_widened() {
        let bins = histogram(&[0.0, 5.0, 47.5], 1e-12);
        assert!(bins.len() <= MAX_HISTOGRAM_BINS + 1);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn test_text_chart_marks_reference_lines() {
        let chart = render_text_chart("3PT", &[21.9, 22.1, 23.8], 0.5);
        assert!(chart.starts_with("3PT (n=3)"));
        assert!(chart.contains("<- corner 22 ft"));
    }
}
