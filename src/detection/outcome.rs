//! Whether a scoring play changed the scoring team's standing.
//!
//! Only the fourth quarter and overtimes are evaluated. A buzzerbeater in
//! the first three quarters never counts as flipping the outcome.

use crate::timeline::models::{Period, Score, Side};

/// True iff the team's margin crosses zero, or leaves zero, across the play.
pub fn changed(
    period: Period,
    is_home: bool,
    score_before: Option<Score>,
    score_after: Option<Score>,
) -> bool {
    if matches!(period, Period::Quarter(1..=3)) {
        return false;
    }
    let (Some(before), Some(after)) = (score_before, score_after) else {
        return false;
    };

    let side = if is_home { Side::Home } else { Side::Away };
    let before = before.margin_for(side);
    let after = after.margin_for(side);

    (before > 0 && after <= 0) || (before == 0 && after != 0) || (before < 0 && after >= 0)
}

/// Label-based variant. Labels that do not name a period are not eligible.
pub fn changed_for_label(
    period_label: &str,
    is_home: bool,
    score_before: Option<Score>,
    score_after: Option<Score>,
) -> bool {
    match Period::from_label(period_label) {
        Some(period) => changed(period, is_home, score_before, score_after),
        None => {
            tracing::debug!(period_label, "Unknown period label, outcome not evaluated");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(home: u32, away: u32) -> Option<Score> {
        Some(Score::new(home, away))
    }

    #[test]
    fn test_trailing_to_leading_in_regulation() {
        assert!(changed(Period::Quarter(4), true, s(98, 99), s(100, 99)));
    }

    #[test]
    fn test_quarters_one_to_three_are_excluded() {
        for q in 1..=3 {
            assert!(!changed(Period::Quarter(q), true, s(98, 99), s(100, 99)));
        }
        assert!(!changed_for_label("first quarter", true, s(98, 99), s(100, 99)));
    }

    #[test]
    fn test_overtime_is_evaluated() {
        assert!(changed(Period::Overtime(2), false, s(80, 80), s(80, 82)));
    }

    #[test]
    fn test_tie_from_behind_counts() {
        assert!(changed(Period::Quarter(4), false, s(70, 68), s(70, 70)));
    }

    #[test]
    fn test_extending_a_lead_does_not_count() {
        assert!(!changed(Period::Quarter(4), true, s(90, 80), s(93, 80)));
        assert!(!changed(Period::Quarter(4), true, s(79, 80), s(79, 80)));
    }

    #[test]
    fn test_missing_scores_are_not_evaluated() {
        assert!(!changed(Period::Quarter(4), true, None, s(100, 99)));
        assert!(!changed(Period::Quarter(4), true, s(98, 99), None));
    }

    #[test]
    fn test_unknown_label_is_not_eligible() {
        assert!(!changed_for_label("garbage time", true, s(98, 99), s(100, 99)));
        assert!(changed_for_label("regulation", true, s(98, 99), s(100, 99)));
        assert!(changed_for_label("OT1", true, s(98, 99), s(100, 99)));
    }
}
