//! Anti-farming: repeated attacks on the same victim stop paying XP
//!
//! The rule deliberately removes the reward, never the attack itself, so
//! grudges stay playable while farming a single victim stays pointless.

use std::sync::Mutex;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{CommunityId, Discipline, TimestampMs, UserId};

/// One resolved attack, appended at resolution time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRecord {
    pub attacker: UserId,
    pub target: UserId,
    pub timestamp_ms: TimestampMs,
    pub success: bool,
}

/// Whether this attack earns XP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FarmingVerdict {
    /// Enough distinct targets since the last attack on this victim
    Fresh,
    /// XP is withheld until the attacker hits more distinct targets
    Farmed { targets_still_needed: u32 },
}

impl FarmingVerdict {
    pub fn awards_xp(&self) -> bool {
        matches!(self, Self::Fresh)
    }
}

/// Append-only per-community, per-discipline log of resolved attacks
///
/// Never pruned inside the operational window; long-term retention is the
/// persistent store's problem.
#[derive(Debug, Default)]
pub struct TargetLog {
    entries: Mutex<AHashMap<(CommunityId, Discipline), Vec<AttackRecord>>>,
}

impl TargetLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, community: CommunityId, discipline: Discipline, record: AttackRecord) {
        self.entries
            .lock()
            .unwrap()
            .entry((community, discipline))
            .or_default()
            .push(record);
    }

    /// Find the most recent attack on `target` (any outcome) and count the
    /// distinct targets hit strictly after it
    pub fn check(
        &self,
        community: CommunityId,
        discipline: Discipline,
        attacker: UserId,
        target: UserId,
        required: u32,
    ) -> FarmingVerdict {
        let entries = self.entries.lock().unwrap();
        let Some(log) = entries.get(&(community, discipline)) else {
            return FarmingVerdict::Fresh;
        };
        let Some(last_idx) = log
            .iter()
            .rposition(|r| r.attacker == attacker && r.target == target)
        else {
            return FarmingVerdict::Fresh;
        };
        let mut seen = Vec::new();
        for record in &log[last_idx + 1..] {
            if record.attacker == attacker && !seen.contains(&record.target) {
                seen.push(record.target);
            }
        }
        let distinct = seen.len() as u32;
        if distinct >= required {
            FarmingVerdict::Fresh
        } else {
            FarmingVerdict::Farmed {
                targets_still_needed: required - distinct,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: CommunityId = CommunityId(1);
    const A: UserId = UserId(1);

    fn record(attacker: u64, target: u64, ts: u64) -> AttackRecord {
        AttackRecord {
            attacker: UserId(attacker),
            target: UserId(target),
            timestamp_ms: ts,
            success: true,
        }
    }

    #[test]
    fn test_first_attack_is_fresh() {
        let log = TargetLog::new();
        assert_eq!(
            log.check(C, Discipline::Rob, A, UserId(2), 3),
            FarmingVerdict::Fresh
        );
    }

    #[test]
    fn test_immediate_repeat_is_farmed() {
        let log = TargetLog::new();
        log.record(C, Discipline::Rob, record(1, 2, 100));
        assert_eq!(
            log.check(C, Discipline::Rob, A, UserId(2), 3),
            FarmingVerdict::Farmed {
                targets_still_needed: 3
            }
        );
    }

    #[test]
    fn test_distinct_targets_restore_freshness() {
        let log = TargetLog::new();
        log.record(C, Discipline::Rob, record(1, 2, 100));
        log.record(C, Discipline::Rob, record(1, 3, 200));
        log.record(C, Discipline::Rob, record(1, 4, 300));
        assert_eq!(
            log.check(C, Discipline::Rob, A, UserId(2), 3),
            FarmingVerdict::Farmed {
                targets_still_needed: 1
            }
        );
        log.record(C, Discipline::Rob, record(1, 5, 400));
        assert_eq!(
            log.check(C, Discipline::Rob, A, UserId(2), 3),
            FarmingVerdict::Fresh
        );
    }

    #[test]
    fn test_repeat_hits_on_same_interleaved_target_count_once() {
        let log = TargetLog::new();
        log.record(C, Discipline::Rob, record(1, 2, 100));
        log.record(C, Discipline::Rob, record(1, 3, 200));
        log.record(C, Discipline::Rob, record(1, 3, 300));
        log.record(C, Discipline::Rob, record(1, 3, 400));
        assert_eq!(
            log.check(C, Discipline::Rob, A, UserId(2), 3),
            FarmingVerdict::Farmed {
                targets_still_needed: 2
            }
        );
    }

    #[test]
    fn test_other_attackers_do_not_count() {
        let log = TargetLog::new();
        log.record(C, Discipline::Rob, record(1, 2, 100));
        log.record(C, Discipline::Rob, record(9, 3, 200));
        log.record(C, Discipline::Rob, record(9, 4, 300));
        assert_eq!(
            log.check(C, Discipline::Rob, A, UserId(2), 1),
            FarmingVerdict::Farmed {
                targets_still_needed: 1
            }
        );
    }

    #[test]
    fn test_disciplines_are_scoped() {
        let log = TargetLog::new();
        log.record(C, Discipline::Rob, record(1, 2, 100));
        assert_eq!(
            log.check(C, Discipline::Hack, A, UserId(2), 3),
            FarmingVerdict::Fresh
        );
    }
}
