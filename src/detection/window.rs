//! Trailing "at the buzzer" windows.

use crate::timeline::models::Period;

/// Width of the window before each boundary, in game-seconds.
pub const BUZZER_TOLERANCE_SECS: u32 = 5;

/// The closed interval `[boundary - tolerance, boundary]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuzzerWindow {
    pub start: u32,
    pub end: u32,
}

impl BuzzerWindow {
    pub fn before(boundary: u32) -> Self {
        Self {
            start: boundary.saturating_sub(BUZZER_TOLERANCE_SECS),
            end: boundary,
        }
    }

    pub fn contains(&self, clock: u32) -> bool {
        self.start <= clock && clock <= self.end
    }
}

/// The boundary whose window contains `clock`, if any.
///
/// Boundaries are at least one period apart, so at most one can match.
pub fn matching_boundary(clock: u32, boundaries: &[u32]) -> Option<u32> {
    boundaries
        .iter()
        .copied()
        .find(|&b| BuzzerWindow::before(b).contains(clock))
}

/// Period for a matched boundary, `None` for anything not in `boundaries`
/// or not on a period end.
pub fn period_for(boundary: u32, boundaries: &[u32]) -> Option<Period> {
    if !boundaries.contains(&boundary) {
        return None;
    }
    Period::from_end_clock(boundary)
}

/// Human label for a matched boundary: "first quarter" .. "regulation", "OTn".
pub fn label_for(boundary: u32, boundaries: &[u32]) -> Option<String> {
    period_for(boundary, boundaries).map(|p| p.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGULATION: [u32; 4] = [720, 1440, 2160, 2880];

    #[test]
    fn test_window_edges() {
        assert_eq!(matching_boundary(2877, &REGULATION), Some(2880));
        assert_eq!(matching_boundary(2875, &REGULATION), Some(2880));
        assert_eq!(matching_boundary(2880, &REGULATION), Some(2880));
        assert_eq!(matching_boundary(2870, &REGULATION), None);
        assert_eq!(matching_boundary(2874, &REGULATION), None);
        assert_eq!(matching_boundary(2881, &REGULATION), None);
    }

    #[test]
    fn test_quarter_windows() {
        assert_eq!(matching_boundary(716, &REGULATION), Some(720));
        assert_eq!(matching_boundary(1439, &REGULATION), Some(1440));
        assert_eq!(matching_boundary(1000, &REGULATION), None);
    }

    #[test]
    fn test_labels() {
        let boundaries = [720, 1440, 2160, 2880, 3600, 4320];
        assert_eq!(label_for(720, &boundaries).as_deref(), Some("first quarter"));
        assert_eq!(label_for(1440, &boundaries).as_deref(), Some("second quarter"));
        assert_eq!(label_for(2160, &boundaries).as_deref(), Some("third quarter"));
        assert_eq!(label_for(2880, &boundaries).as_deref(), Some("regulation"));
        assert_eq!(label_for(3600, &boundaries).as_deref(), Some("OT1"));
        assert_eq!(label_for(4320, &boundaries).as_deref(), Some("OT2"));
        assert_eq!(label_for(5040, &boundaries), None);
        assert_eq!(label_for(2875, &[2875]), None);
    }
}
