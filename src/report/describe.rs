//! Natural-language rendering of buzzerbeater records.
//!
//! Verbosity 0 is a tab-separated column projection for scripting. Anything
//! higher produces the full sentence, optionally decorated with forum-style
//! identity tags and a deep link into the match viewer.

use crate::detection::record::BuzzerbeaterRecord;
use crate::detection::window::BUZZER_TOLERANCE_SECS;
use crate::timeline::models::{EventKind, Period};

pub const DEFAULT_COLUMNS: &[&str] = &["match_id", "player_id", "game_clock"];
pub const DEFAULT_LINK_BASE_URL: &str = "https://buzzerbeater.com";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub verbosity: u8,
    /// Add `[team=..]`-style tags and a viewer link.
    pub decorate: bool,
    pub link_base_url: String,
    /// Columns for verbosity 0.
    pub columns: Vec<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            verbosity: 2,
            decorate: true,
            link_base_url: DEFAULT_LINK_BASE_URL.to_string(),
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Parse a comma-separated column list, falling back to the defaults when empty.
pub fn parse_columns(list: &str) -> Vec<String> {
    let columns: Vec<String> = list
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    if columns.is_empty() {
        DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect()
    } else {
        columns
    }
}

/// `jump_shot` -> `jump shot`.
pub fn pretty_shot_label(label: Option<&str>) -> Option<String> {
    let label = label.filter(|l| !l.is_empty())?;
    Some(label.replace('_', " ").to_lowercase())
}

pub fn match_type_label(match_type: Option<&str>) -> String {
    match match_type.filter(|m| !m.is_empty()) {
        Some(m) => m.to_uppercase(),
        None => "unknown competition".to_string(),
    }
}

pub fn article_for(word: &str) -> &'static str {
    match word.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

/// Viewer real-time offset: five seconds before the period ends.
pub fn real_time_for(period: Period) -> u32 {
    period.end_clock().saturating_sub(BUZZER_TOLERANCE_SECS)
}

pub fn viewer_link(base_url: &str, match_id: u32, period: Period) -> String {
    format!(
        "{}/match/{}/reportmatch.aspx?realTime={}",
        base_url.trim_end_matches('/'),
        match_id,
        real_time_for(period)
    )
}

fn or_unknown(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

fn action_for(record: &BuzzerbeaterRecord, player: &str) -> String {
    match record.event_kind {
        EventKind::Shot => {
            let shot = record.shot.as_ref();
            let raw = shot.and_then(|s| s.label.as_deref().or(s.shot_type.as_deref()));
            let label = if raw.is_some_and(|l| l.to_uppercase().starts_with("DUNK")) {
                "dunk".to_string()
            } else {
                pretty_shot_label(raw).unwrap_or_else(|| "shot".to_string())
            };
            let distance = shot.filter(|s| !s.is_dunk()).and_then(|s| s.distance_ft);
            match distance {
                Some(ft) => format!("{player} hit a {label} from {ft:.1} ft"),
                None => format!("{player} hit a {label}"),
            }
        }
        EventKind::FreeThrow => format!("{player} made a free throw"),
        EventKind::Other => format!("{player} scored"),
    }
}

/// Full sentence for one record.
pub fn describe(record: &BuzzerbeaterRecord, decorate: bool) -> String {
    let mut team = or_unknown(&record.team.name, "Unknown Team");
    let mut opponent = or_unknown(&record.opponent.name, "Unknown Opponent");
    let mut player = or_unknown(&record.player_name, "Unknown Player");
    let mut match_type = match_type_label(record.match_type.as_deref());

    if decorate {
        team = format!("{team} [team={}]", record.team.id);
        opponent = format!("{opponent} [team={}]", record.opponent.id);
        player = format!("{player} [player={}]", record.player_id);
        match_type = format!("{match_type} [match={}]", record.match_id);
    }

    let home_away = if record.is_home { "home" } else { "away" };
    let season_prefix = record
        .season
        .map(|s| format!("In season {s}, "))
        .unwrap_or_default();

    let base = format!(
        "{season_prefix}{team} hit {} {home_away} buzzerbeater in {match_type} {} against {opponent}: {} as time expired",
        article_for(home_away),
        record.period_label(),
        action_for(record, &player),
    );

    match (record.score_before, record.score_after) {
        (Some(before), Some(after)) => {
            format!("{base}, turning the score from {before} to {after}.")
        }
        _ => format!("{base}."),
    }
}

/// Value of a named column; `None` for unknown columns and absent values.
pub fn column_value(record: &BuzzerbeaterRecord, column: &str) -> Option<String> {
    let shot = record.shot.as_ref();
    match column {
        "match_id" => Some(record.match_id.to_string()),
        "season" => record.season.map(|s| s.to_string()),
        "match_type" => record.match_type.clone(),
        "team_id" => Some(record.team.id.to_string()),
        "team_name" => Some(record.team.name.clone()),
        "opponent_id" => Some(record.opponent.id.to_string()),
        "opponent_name" => Some(record.opponent.name.clone()),
        "is_home" => Some(u8::from(record.is_home).to_string()),
        "player_id" => Some(record.player_id.to_string()),
        "player_name" => Some(record.player_name.clone()),
        "period" => Some(record.period.tag()),
        "period_label" => Some(record.period_label()),
        "game_clock" => Some(record.game_clock.to_string()),
        "comment" => Some(record.comment.clone()),
        "event_kind" => Some(record.event_kind.to_string()),
        "shot_type" => shot.and_then(|s| s.shot_type.clone()),
        "shot_type_label" => shot.and_then(|s| s.label.clone()),
        "three_point" => shot.map(|s| u8::from(s.three_point).to_string()),
        "shot_x" => shot.and_then(|s| s.position).map(|p| p.x.to_string()),
        "shot_y" => shot.and_then(|s| s.position).map(|p| p.y.to_string()),
        "shot_distance" => shot.and_then(|s| s.distance_px).map(|d| format!("{d:.1}")),
        "shot_distance_ft" => record.distance_ft().map(|d| format!("{d:.1}")),
        "free_throw_type" => record.free_throw_type.clone(),
        "score_before_home" => record.score_before.map(|s| s.home.to_string()),
        "score_before_away" => record.score_before.map(|s| s.away.to_string()),
        "score_after_home" => record.score_after.map(|s| s.home.to_string()),
        "score_after_away" => record.score_after.map(|s| s.away.to_string()),
        "final_score_home" => record.final_score.map(|s| s.home.to_string()),
        "final_score_away" => record.final_score.map(|s| s.away.to_string()),
        "outcome_changed" => Some(u8::from(record.outcome_changed).to_string()),
        _ => None,
    }
}

pub fn render_header(columns: &[String]) -> String {
    columns.join("\t")
}

/// Render one record at the requested verbosity.
pub fn render(record: &BuzzerbeaterRecord, options: &RenderOptions) -> String {
    if options.verbosity == 0 {
        return options
            .columns
            .iter()
            .map(|c| column_value(record, c).unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\t");
    }

    let sentence = describe(record, options.decorate);
    if options.decorate {
        let link = viewer_link(&options.link_base_url, record.match_id, record.period);
        format!("{sentence} [link={link}]")
    } else {
        sentence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::record::ShotInfo;
    use crate::timeline::models::{Score, TeamRef};

    fn record() -> BuzzerbeaterRecord {
        BuzzerbeaterRecord {
            match_id: 5,
            season: None,
            match_type: Some("league".to_string()),
            team: TeamRef { id: 1, name: "Aces".to_string() },
            opponent: TeamRef { id: 2, name: "Bats".to_string() },
            is_home: true,
            player_id: 10,
            player_name: "Jay Kay".to_string(),
            period: Period::Quarter(4),
            game_clock: 2878,
            comment: String::new(),
            event_kind: EventKind::Shot,
            shot: Some(ShotInfo {
                shot_type: Some("JUMP_SHOT".to_string()),
                label: Some("jump_shot".to_string()),
                three_point: false,
                position: None,
                distance_px: None,
                distance_ft: Some(18.0),
            }),
            free_throw_type: None,
            score_before: Some(Score::new(70, 71)),
            score_after: Some(Score::new(72, 71)),
            final_score: None,
            outcome_changed: true,
        }
    }

    #[test]
    fn test_full_sentence() {
        assert_eq!(
            describe(&record(), false),
            "Aces hit a home buzzerbeater in LEAGUE regulation against Bats: \
             Jay Kay hit a jump shot from 18.0 ft as time expired, \
             turning the score from 70–71 to 72–71."
        );
    }

    #[test]
    fn test_away_free_throw_without_scores() {
        let mut rec = record();
        rec.is_home = false;
        rec.event_kind = EventKind::FreeThrow;
        rec.shot = None;
        rec.score_before = None;
        rec.season = Some(61);
        rec.match_type = None;
        rec.period = Period::Overtime(1);
        assert_eq!(
            describe(&rec, false),
            "In season 61, Aces hit an away buzzerbeater in unknown competition OT1 \
             against Bats: Jay Kay made a free throw as time expired."
        );
    }

    #[test]
    fn test_dunk_omits_distance() {
        let mut rec = record();
        if let Some(shot) = rec.shot.as_mut() {
            shot.label = Some("DUNK_ALLEY_OOP".to_string());
        }
        let text = describe(&rec, false);
        assert!(text.contains("Jay Kay hit a dunk as time expired"));
        assert!(!text.contains(" ft"));
    }

    #[test]
    fn test_decorated_sentence_and_link() {
        let options = RenderOptions::default();
        let text = render(&record(), &options);
        assert!(text.starts_with("Aces [team=1] hit a home buzzerbeater in LEAGUE [match=5] regulation against Bats [team=2]: Jay Kay [player=10] hit"));
        assert!(text.ends_with(
            " [link=https://buzzerbeater.com/match/5/reportmatch.aspx?realTime=2875]"
        ));
    }

    #[test]
    fn test_real_time_offsets() {
        assert_eq!(real_time_for(Period::Quarter(1)), 715);
        assert_eq!(real_time_for(Period::Quarter(3)), 2155);
        assert_eq!(real_time_for(Period::Quarter(4)), 2875);
        assert_eq!(real_time_for(Period::Overtime(2)), 4315);
        assert_eq!(
            viewer_link("https://buzzerbeater.org/", 77, Period::Overtime(1)),
            "https://buzzerbeater.org/match/77/reportmatch.aspx?realTime=3595"
        );
    }

    #[test]
    fn test_column_projection() {
        let options = RenderOptions {
            verbosity: 0,
            columns: parse_columns("match_id, period,shot_distance_ft,nonsense,season"),
            ..RenderOptions::default()
        };
        assert_eq!(render_header(&options.columns), "match_id\tperiod\tshot_distance_ft\tnonsense\tseason");
        assert_eq!(render(&record(), &options), "5\tQ4\t18.0\t\t");
    }

    #[test]
    fn test_parse_columns_defaults() {
        assert_eq!(parse_columns(" , "), vec!["match_id", "player_id", "game_clock"]);
    }

    #[test]
    fn test_pretty_labels() {
        assert_eq!(pretty_shot_label(Some("JUMP_SHOT")).as_deref(), Some("jump shot"));
        assert_eq!(pretty_shot_label(Some("")), None);
        assert_eq!(pretty_shot_label(None), None);
        assert_eq!(article_for("away"), "an");
        assert_eq!(article_for("home"), "a");
    }
}
