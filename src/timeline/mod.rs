pub mod loader;
pub mod models;

use anyhow::Result;
use async_trait::async_trait;

use crate::timeline::loader::LoadedTimeline;

/// Trait for anything that can hand over complete match timelines.
/// Fetching and parsing raw match reports happens behind this seam.
#[async_trait]
pub trait TimelineSource: Send + Sync {
    /// All match ids this source can load, in ascending order.
    async fn match_ids(&self) -> Result<Vec<u32>>;

    /// Load one fully materialized match timeline.
    async fn load(&self, match_id: u32) -> Result<LoadedTimeline>;

    /// Human-readable name of this source.
    fn name(&self) -> &str;
}
