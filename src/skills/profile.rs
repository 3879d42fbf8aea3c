//! Per-user skill state and level-derived bonuses

use serde::{Deserialize, Serialize};

use crate::core::TimestampMs;
use crate::skills::tables;

/// A running training job
///
/// `started_at_level` is recorded so a level-up from ordinary play during
/// the job neither changes which level's reward is granted nor unlocks a
/// second attempt at the new level early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTraining {
    pub started_ms: TimestampMs,
    pub ends_ms: TimestampMs,
    pub xp_reward: u64,
    pub started_at_level: u8,
}

/// One user's progression in one discipline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillProfile {
    /// Monotonically non-decreasing outside the inactivity decay policy
    pub xp: u64,
    pub active_training: Option<ActiveTraining>,
    /// Last level at which a training reward was claimed
    pub trained_at_level: Option<u8>,
    pub last_activity_ms: TimestampMs,
}

impl SkillProfile {
    pub fn level(&self) -> u8 {
        tables::level_for_xp(self.xp)
    }
}

/// Level-derived bonuses fed into eligibility and outcome math
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SkillBonuses {
    /// Added to the attack success rate
    pub success_rate: f64,
    /// Widens the steal roll's lower bound
    pub steal_min: f64,
    /// Widens the steal roll's upper bound
    pub steal_max: f64,
    /// Percent shaved off the base cooldown
    pub cooldown_reduction: f64,
    /// Percent shaved off fines
    pub fine_reduction: f64,
    /// Subtracted from the trace-back chance against this attacker
    pub trace_reduction: f64,
}

/// Pure `level * per_level_rate` for every bonus type
pub fn bonuses_for_level(level: u8) -> SkillBonuses {
    let level = level as f64;
    SkillBonuses {
        success_rate: level * tables::SUCCESS_RATE_PER_LEVEL,
        steal_min: level * tables::STEAL_MIN_PER_LEVEL,
        steal_max: level * tables::STEAL_MAX_PER_LEVEL,
        cooldown_reduction: level * tables::COOLDOWN_REDUCTION_PER_LEVEL,
        fine_reduction: level * tables::FINE_REDUCTION_PER_LEVEL,
        trace_reduction: level * tables::TRACE_REDUCTION_PER_LEVEL,
    }
}
