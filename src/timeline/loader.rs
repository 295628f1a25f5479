//! JSON match files.
//!
//! A match file holds the match context plus an `events` array. Events are
//! decoded one at a time so a single malformed entry is dropped instead of
//! failing the whole match.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::timeline::models::{MatchContext, MatchTimeline, TimelineError, TimelineEvent};
use crate::timeline::TimelineSource;

/// A decoded match together with the number of events that were dropped.
#[derive(Debug, Clone)]
pub struct LoadedTimeline {
    pub timeline: MatchTimeline,
    pub skipped_events: usize,
}

#[derive(Debug, Deserialize)]
struct RawMatchFile {
    #[serde(flatten)]
    context: MatchContext,
    #[serde(default)]
    events: Vec<serde_json::Value>,
}

/// Decode a match file, skipping events that fail to decode or validate.
pub fn parse_match_timeline(json: &str) -> Result<LoadedTimeline, TimelineError> {
    let raw: RawMatchFile = serde_json::from_str(json)?;
    let match_id = raw.context.match_id;

    let mut events = Vec::with_capacity(raw.events.len());
    let mut skipped_events = 0;
    for (index, value) in raw.events.into_iter().enumerate() {
        match decode_event(value) {
            Ok(event) => events.push(event),
            Err(e) => {
                tracing::warn!(match_id, index, error = %e, "Skipping malformed timeline event");
                skipped_events += 1;
            }
        }
    }

    Ok(LoadedTimeline {
        timeline: MatchTimeline {
            context: raw.context,
            events,
        },
        skipped_events,
    })
}

fn decode_event(value: serde_json::Value) -> Result<TimelineEvent, TimelineError> {
    let event: TimelineEvent = serde_json::from_value(value)?;
    event.validate()?;
    Ok(event)
}

/// Extract the match id from a `report_<id>.json` file name.
pub fn match_id_from_file_name(name: &str) -> Option<u32> {
    name.strip_prefix("report_")?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

/// Reads `report_<match_id>.json` files from one directory.
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, match_id: u32) -> PathBuf {
        self.dir.join(format!("report_{match_id}.json"))
    }
}

#[async_trait]
impl TimelineSource for JsonDirSource {
    async fn match_ids(&self) -> Result<Vec<u32>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("Failed to read matches directory: {}", self.dir.display()))?;

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(id) = entry.file_name().to_str().and_then(match_id_from_file_name) {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    async fn load(&self, match_id: u32) -> Result<LoadedTimeline> {
        let path = self.path_for(match_id);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read match file: {}", path.display()))?;

        let loaded = parse_match_timeline(&contents)
            .with_context(|| format!("Failed to parse match file: {}", path.display()))?;

        if loaded.timeline.context.match_id != match_id {
            tracing::warn!(
                file_match_id = match_id,
                body_match_id = loaded.timeline.context.match_id,
                "Match file name and body disagree on match id"
            );
        }

        Ok(loaded)
    }

    fn name(&self) -> &str {
        "json_dir"
    }
}
