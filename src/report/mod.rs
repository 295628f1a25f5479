pub mod aggregate;
pub mod describe;
pub mod distance;
pub mod inspect;

use crate::detection::record::BuzzerbeaterRecord;

/// Which records a report covers. Id filters are pushed down to the store;
/// the outcome filter is applied in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub team_id: Option<u32>,
    pub opponent_id: Option<u32>,
    pub match_id: Option<u32>,
    pub player_id: Option<u32>,
    pub only_outcome_change: bool,
}

impl RecordFilter {
    pub fn matches(&self, record: &BuzzerbeaterRecord) -> bool {
        self.team_id.map_or(true, |id| record.team.id == id)
            && self.opponent_id.map_or(true, |id| record.opponent.id == id)
            && self.match_id.map_or(true, |id| record.match_id == id)
            && self.player_id.map_or(true, |id| record.player_id == id)
            && (!self.only_outcome_change || record.outcome_changed)
    }

    pub fn apply(&self, records: Vec<BuzzerbeaterRecord>) -> Vec<BuzzerbeaterRecord> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
