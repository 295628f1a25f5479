//! Buzzerbeater extraction.
//!
//! A single pass over the timeline: every made shot or free throw that
//! lands inside a boundary's window becomes a record. Records come out in
//! timeline order.

use tracing::debug;

use crate::detection::record::{BuzzerbeaterRecord, ShotInfo};
use crate::detection::{geometry, outcome, period, window};
use crate::timeline::models::{
    EventDetail, MatchContext, MatchTimeline, ShotDetail, Side, TimelineEvent,
};

/// Extract records against precomputed boundaries.
pub fn extract(timeline: &MatchTimeline, boundaries: &[u32]) -> Vec<BuzzerbeaterRecord> {
    timeline
        .events
        .iter()
        .filter_map(|event| build_record(&timeline.context, event, boundaries))
        .collect()
}

/// Resolve boundaries for the match, then extract.
pub fn extract_match(timeline: &MatchTimeline) -> Vec<BuzzerbeaterRecord> {
    let boundaries = period::resolve(&timeline.events);
    let records = extract(timeline, &boundaries);
    debug!(
        match_id = timeline.context.match_id,
        events = timeline.events.len(),
        records = records.len(),
        "Extracted buzzerbeaters"
    );
    records
}

fn build_record(
    ctx: &MatchContext,
    event: &TimelineEvent,
    boundaries: &[u32],
) -> Option<BuzzerbeaterRecord> {
    if !event.is_made_score() {
        return None;
    }
    let boundary = window::matching_boundary(event.clock, boundaries)?;
    let Some(period) = window::period_for(boundary, boundaries) else {
        debug!(
            match_id = ctx.match_id,
            clock = event.clock,
            boundary,
            "Window boundary is not a period end, skipping"
        );
        return None;
    };

    let side = event.team;
    let (shot, free_throw_type) = match &event.detail {
        EventDetail::Shot(detail) => (Some(shot_info(detail, side)), None),
        EventDetail::FreeThrow(detail) => (None, detail.free_throw_type.clone()),
        EventDetail::Other => (None, None),
    };

    Some(BuzzerbeaterRecord {
        match_id: ctx.match_id,
        season: ctx.season,
        match_type: ctx.match_type.clone(),
        team: ctx.team(side).clone(),
        opponent: ctx.opponent(side).clone(),
        is_home: side.is_home(),
        player_id: event.player_id,
        player_name: event.player_name.clone(),
        period,
        game_clock: event.clock,
        comment: event.comment.clone(),
        event_kind: event.kind(),
        shot,
        free_throw_type,
        score_before: event.score_before,
        score_after: event.score_after,
        final_score: ctx.final_score,
        outcome_changed: outcome::changed(
            period,
            side.is_home(),
            event.score_before,
            event.score_after,
        ),
    })
}

fn shot_info(detail: &ShotDetail, side: Side) -> ShotInfo {
    let marker = detail
        .shot_type_label
        .as_deref()
        .or(detail.shot_type.as_deref());
    let geo = geometry::reported(detail.position, side, marker);

    ShotInfo {
        shot_type: detail.shot_type.clone(),
        label: detail.shot_type_label.clone(),
        three_point: detail.three_point,
        position: detail.position,
        distance_px: geo.map(|g| g.distance_px),
        distance_ft: geo.map(|g| g.distance_ft),
    }
}
