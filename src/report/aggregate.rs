//! Grouping and summary statistics over buzzerbeater records.
//!
//! All reductions are read-only and deterministic: ties are broken by ids
//! or names, never by input order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::detection::record::BuzzerbeaterRecord;
use crate::timeline::models::Period;

/// Histogram bin edges in feet; bins are half-open `[lo, hi)`.
pub const DISTANCE_BINS_FT: [u32; 10] = [0, 5, 10, 15, 20, 25, 30, 35, 45, 100];

/// A player with more than one buzzerbeater in the same match.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiBuzzerGame {
    pub match_id: u32,
    pub player_id: u32,
    pub player_name: String,
    pub count: usize,
    pub clocks: Vec<u32>,
}

/// A team with buzzerbeaters from more than one player in the same match.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiPlayerGame {
    pub match_id: u32,
    pub team_id: u32,
    pub players: Vec<String>,
    pub clocks: Vec<u32>,
}

pub fn multi_buzzer_games(records: &[BuzzerbeaterRecord]) -> Vec<MultiBuzzerGame> {
    let mut groups: BTreeMap<(u32, u32, &str), Vec<u32>> = BTreeMap::new();
    for rec in records {
        groups
            .entry((rec.match_id, rec.player_id, rec.player_name.as_str()))
            .or_default()
            .push(rec.game_clock);
    }

    let mut hits: Vec<MultiBuzzerGame> = groups
        .into_iter()
        .filter(|(_, clocks)| clocks.len() > 1)
        .map(|((match_id, player_id, player_name), mut clocks)| {
            clocks.sort_unstable();
            MultiBuzzerGame {
                match_id,
                player_id,
                player_name: player_name.to_string(),
                count: clocks.len(),
                clocks,
            }
        })
        .collect();

    hits.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then(a.match_id.cmp(&b.match_id))
            .then(a.player_id.cmp(&b.player_id))
    });
    hits
}

pub fn multi_player_games(records: &[BuzzerbeaterRecord]) -> Vec<MultiPlayerGame> {
    let mut groups: BTreeMap<(u32, u32), (BTreeSet<&str>, Vec<u32>)> = BTreeMap::new();
    for rec in records {
        if rec.player_name.is_empty() {
            continue;
        }
        let (names, clocks) = groups.entry((rec.match_id, rec.team.id)).or_default();
        names.insert(rec.player_name.as_str());
        clocks.push(rec.game_clock);
    }

    let mut hits: Vec<MultiPlayerGame> = groups
        .into_iter()
        .filter(|(_, (names, _))| names.len() > 1)
        .map(|((match_id, team_id), (names, mut clocks))| {
            clocks.sort_unstable();
            MultiPlayerGame {
                match_id,
                team_id,
                players: names.into_iter().map(str::to_string).collect(),
                clocks,
            }
        })
        .collect();

    hits.sort_by(|a, b| {
        b.players
            .len()
            .cmp(&a.players.len())
            .then(a.match_id.cmp(&b.match_id))
            .then(a.team_id.cmp(&b.team_id))
    });
    hits
}

/// Sort key for period labels: quarters, regulation, overtimes by number,
/// then anything else alphabetically.
fn period_rank(label: &str) -> (u8, u32, String) {
    match Period::from_label(label) {
        Some(Period::Quarter(q)) => (0, u32::from(q), String::new()),
        Some(Period::Overtime(n)) => (1, n, String::new()),
        None => (2, 0, label.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceBin {
    pub lo: u32,
    pub hi: u32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LongestShot {
    pub distance_ft: f64,
    pub match_id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub by_period: Vec<(String, usize)>,
    pub by_match_type: Vec<(String, usize)>,
    pub top_players: Vec<(String, usize)>,
    pub by_shot_type: Vec<(String, usize)>,
    pub distance_histogram: Vec<DistanceBin>,
    pub longest: Option<LongestShot>,
}

impl Summary {
    pub fn from_records(records: &[BuzzerbeaterRecord], top_n: usize) -> Self {
        let mut by_period: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_match_type: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_player: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_shot_type: BTreeMap<String, usize> = BTreeMap::new();
        let mut distances: Vec<(f64, u32)> = Vec::new();

        for rec in records {
            *by_period.entry(rec.period_label()).or_default() += 1;
            let match_type = crate::report::describe::match_type_label(rec.match_type.as_deref());
            *by_match_type.entry(match_type).or_default() += 1;
            let player = if rec.player_name.is_empty() {
                "Unknown Player".to_string()
            } else {
                rec.player_name.clone()
            };
            *by_player.entry(player).or_default() += 1;
            if let Some(label) = rec.shot_type_label().filter(|l| !l.is_empty()) {
                *by_shot_type.entry(label.to_string()).or_default() += 1;
            }
            if let Some(d) = rec.distance_ft() {
                distances.push((d, rec.match_id));
            }
        }

        let mut by_period: Vec<(String, usize)> = by_period.into_iter().collect();
        by_period.sort_by_cached_key(|(label, _)| period_rank(label));

        let mut top_players: Vec<(String, usize)> = by_player.into_iter().collect();
        top_players.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_players.truncate(top_n);

        let distance_histogram = if distances.is_empty() {
            Vec::new()
        } else {
            histogram(distances.iter().map(|(d, _)| *d))
        };

        // First record wins ties.
        let longest = distances
            .iter()
            .fold(None::<(f64, u32)>, |best, &(d, m)| match best {
                Some((bd, _)) if bd >= d => best,
                _ => Some((d, m)),
            })
            .map(|(distance_ft, match_id)| LongestShot {
                distance_ft,
                match_id,
            });

        Self {
            total: records.len(),
            by_period,
            by_match_type: by_match_type.into_iter().collect(),
            top_players,
            by_shot_type: by_shot_type.into_iter().collect(),
            distance_histogram,
            longest,
        }
    }
}

fn histogram(distances: impl Iterator<Item = f64>) -> Vec<DistanceBin> {
    let mut bins: Vec<DistanceBin> = DISTANCE_BINS_FT
        .windows(2)
        .map(|w| DistanceBin {
            lo: w[0],
            hi: w[1],
            count: 0,
        })
        .collect();
    for d in distances {
        if let Some(bin) = bins
            .iter_mut()
            .find(|b| f64::from(b.lo) <= d && d < f64::from(b.hi))
        {
            bin.count += 1;
        }
    }
    bins
}

fn write_counts(f: &mut fmt::Formatter<'_>, title: &str, counts: &[(String, usize)]) -> fmt::Result {
    if counts.is_empty() {
        return Ok(());
    }
    writeln!(f, "{title}:")?;
    for (key, count) in counts {
        writeln!(f, "- {key}: {count}")?;
    }
    Ok(())
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary")?;
        writeln!(f, "total: {}", self.total)?;
        write_counts(f, "by_period", &self.by_period)?;
        write_counts(f, "by_match_type", &self.by_match_type)?;
        write_counts(f, "top_players", &self.top_players)?;
        write_counts(f, "by_shot_type", &self.by_shot_type)?;
        if !self.distance_histogram.is_empty() {
            writeln!(f, "distance_hist_ft:")?;
            for bin in &self.distance_histogram {
                writeln!(f, "- {}–{}: {}", bin.lo, bin.hi, bin.count)?;
            }
        }
        if let Some(longest) = &self.longest {
            writeln!(
                f,
                "longest: {:.1} ft (match_id={})",
                longest.distance_ft, longest.match_id
            )?;
        }
        Ok(())
    }
}
