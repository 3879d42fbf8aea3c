//! Outcome history and cumulative stats
//!
//! Each resolved attack appends exactly one row; cumulative stats update in
//! the same call. The durable store behind this trait is an external
//! collaborator - the in-memory implementation backs tests and the demo.

use std::sync::Mutex;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{CommunityId, Discipline, Result, UserId};
use crate::outcome::AttackOutcome;

/// Cumulative per-user, per-discipline statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineStats {
    pub attacks: u64,
    pub successes: u64,
    pub total_stolen: i64,
    pub total_fined: i64,
    pub times_targeted: u64,
    pub times_defended: u64,
}

pub trait HistoryStore: Send + Sync {
    /// Append one outcome row and fold it into both parties' stats
    fn append(&self, community: CommunityId, outcome: &AttackOutcome) -> Result<()>;

    fn stats(
        &self,
        community: CommunityId,
        user: UserId,
        discipline: Discipline,
    ) -> Result<DisciplineStats>;
}

/// In-process history used by tests and the demo binary
#[derive(Debug, Default)]
pub struct MemoryHistory {
    rows: Mutex<AHashMap<CommunityId, Vec<AttackOutcome>>>,
    stats: Mutex<AHashMap<(CommunityId, UserId, Discipline), DisciplineStats>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// All rows recorded for a community, oldest first
    pub fn rows(&self, community: CommunityId) -> Vec<AttackOutcome> {
        self.rows
            .lock()
            .unwrap()
            .get(&community)
            .cloned()
            .unwrap_or_default()
    }
}

impl HistoryStore for MemoryHistory {
    fn append(&self, community: CommunityId, outcome: &AttackOutcome) -> Result<()> {
        self.rows
            .lock()
            .unwrap()
            .entry(community)
            .or_default()
            .push(*outcome);

        let mut stats = self.stats.lock().unwrap();
        let attacker = stats
            .entry((community, outcome.attacker, outcome.discipline))
            .or_default();
        attacker.attacks += 1;
        if outcome.success {
            attacker.successes += 1;
            attacker.total_stolen += outcome.amount;
        } else {
            attacker.total_fined += outcome.amount;
        }

        let target = stats
            .entry((community, outcome.target, outcome.discipline))
            .or_default();
        target.times_targeted += 1;
        if outcome.defended {
            target.times_defended += 1;
        }
        Ok(())
    }

    fn stats(
        &self,
        community: CommunityId,
        user: UserId,
        discipline: Discipline,
    ) -> Result<DisciplineStats> {
        Ok(self
            .stats
            .lock()
            .unwrap()
            .get(&(community, user, discipline))
            .copied()
            .unwrap_or_default())
    }
}
