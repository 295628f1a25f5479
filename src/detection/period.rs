//! Period boundary resolution.
//!
//! Boundaries are the game-clock values at which each quarter and overtime
//! ends. They come from explicit period tags on the events when present,
//! and are otherwise rebuilt from the last observed clock assuming fixed
//! 720-second periods.

use std::collections::BTreeSet;

use crate::timeline::models::{
    Period, TimelineEvent, PERIOD_LENGTH_SECS, REGULATION_END_SECS,
};

/// Boundary used when a match has no events at all.
pub const EMPTY_MATCH_BOUNDARY: u32 = REGULATION_END_SECS - 5;

/// Where a match's boundaries come from, chosen by data availability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundarySource {
    /// Periods tagged on the events themselves.
    Observed {
        periods: BTreeSet<Period>,
        max_clock: u32,
    },
    /// No tags anywhere: rebuild from the last clock.
    Reconstructed { max_clock: u32 },
    /// Nothing to go on.
    Empty,
}

impl BoundarySource {
    pub fn select(events: &[TimelineEvent]) -> Self {
        let Some(max_clock) = events.iter().map(|ev| ev.clock).max() else {
            return Self::Empty;
        };

        let periods: BTreeSet<Period> = events.iter().filter_map(|ev| ev.period).collect();
        if periods.is_empty() {
            Self::Reconstructed { max_clock }
        } else {
            Self::Observed { periods, max_clock }
        }
    }

    /// Ordered, strictly increasing period-end clocks.
    pub fn boundaries(&self) -> Vec<u32> {
        match self {
            Self::Observed { periods, max_clock } => {
                let mut ends: BTreeSet<u32> = periods.iter().map(Period::end_clock).collect();
                ends.insert(REGULATION_END_SECS);
                let mut boundaries: Vec<u32> = ends.into_iter().collect();
                extend_to_cover(&mut boundaries, *max_clock);
                boundaries
            }
            Self::Reconstructed { max_clock } => {
                let mut boundaries: Vec<u32> =
                    (1..=4).map(|q| q * PERIOD_LENGTH_SECS).collect();
                extend_to_cover(&mut boundaries, *max_clock);
                boundaries
            }
            Self::Empty => vec![EMPTY_MATCH_BOUNDARY],
        }
    }
}

/// Append overtime ends until the last boundary reaches `max_clock`, or
/// until the next end would not fit in a `u32`.
fn extend_to_cover(boundaries: &mut Vec<u32>, max_clock: u32) {
    let mut last = boundaries.last().copied().unwrap_or(REGULATION_END_SECS);
    while last < max_clock {
        let Some(next) = last.checked_add(PERIOD_LENGTH_SECS) else {
            break;
        };
        last = next;
        boundaries.push(last);
    }
}

/// Resolve the period boundaries for one match.
pub fn resolve(events: &[TimelineEvent]) -> Vec<u32> {
    let source = BoundarySource::select(events);
    let boundaries = source.boundaries();
    tracing::debug!(
        source = match source {
            BoundarySource::Observed { .. } => "observed",
            BoundarySource::Reconstructed { .. } => "reconstructed",
            BoundarySource::Empty => "empty",
        },
        boundaries = ?boundaries,
        "Resolved period boundaries"
    );
    boundaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::models::{EventDetail, Side, MAX_PERIOD_END_SECS};

    fn event(clock: u32, period: Option<Period>) -> TimelineEvent {
        TimelineEvent {
            detail: EventDetail::Other,
            team: Side::Home,
            player_id: 1,
            player_name: String::new(),
            clock,
            made: false,
            period,
            score_before: None,
            score_after: None,
            comment: String::new(),
        }
    }

    #[test]
    fn test_empty_match_uses_fallback() {
        assert_eq!(resolve(&[]), vec![2875]);
    }

    #[test]
    fn test_reconstructed_regulation_only() {
        let events = vec![event(10, None), event(2880, None)];
        assert_eq!(resolve(&events), vec![720, 1440, 2160, 2880]);
    }

    #[test]
    fn test_reconstructed_with_overtimes() {
        let events = vec![event(3000, None), event(4100, None)];
        assert_eq!(resolve(&events), vec![720, 1440, 2160, 2880, 3600, 4320]);
    }

    #[test]
    fn test_observed_tags_win() {
        let events = vec![
            event(700, Some(Period::Quarter(1))),
            event(2870, Some(Period::Quarter(4))),
            event(3590, Some(Period::Overtime(1))),
        ];
        assert!(matches!(
            BoundarySource::select(&events),
            BoundarySource::Observed { .. }
        ));
        assert_eq!(resolve(&events), vec![720, 2880, 3600]);
    }

    #[test]
    fn test_observed_tags_always_include_regulation_and_cover_max_clock() {
        let events = vec![
            event(100, Some(Period::Quarter(1))),
            event(3000, None),
        ];
        assert_eq!(resolve(&events), vec![720, 2880, 3600]);
    }

    #[test]
    fn test_boundaries_strictly_increasing() {
        for max_clock in [0, 719, 720, 2881, 5000, 9999] {
            let events = vec![event(max_clock, None)];
            let boundaries = resolve(&events);
            assert!(boundaries.windows(2).all(|w| w[0] < w[1]));
            assert!(*boundaries.last().unwrap() >= max_clock);
        }
    }

    #[test]
    fn test_extension_stops_at_last_representable_end() {
        let boundaries = resolve(&[event(u32::MAX, None)]);
        assert_eq!(boundaries.last(), Some(&MAX_PERIOD_END_SECS));
        assert!(boundaries.windows(2).all(|w| w[0] < w[1]));
    }
}
