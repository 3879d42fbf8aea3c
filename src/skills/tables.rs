//! Fixed progression tables - game balance lives here
//!
//! Levels, training costs and bonus rates are explicit data, not formulas.
//! Changing a single entry retunes the game without touching code paths.

/// Highest reachable level; level 0 is unranked
pub const MAX_LEVEL: u8 = 10;

/// Cumulative XP required to hold each level (index = level)
pub const XP_THRESHOLDS: [u64; 11] = [
    0, 100, 300, 700, 1_500, 3_000, 5_500, 9_000, 14_000, 20_000, 28_000,
];

/// Training cost in currency, indexed by the level the job starts at
pub const TRAINING_COSTS: [i64; 10] = [
    500, 1_200, 2_500, 5_000, 9_000, 15_000, 24_000, 36_000, 52_000, 75_000,
];

/// Training duration in seconds, indexed by the level the job starts at
pub const TRAINING_DURATIONS_SECS: [u64; 10] = [
    600, 1_200, 1_800, 3_600, 5_400, 7_200, 10_800, 14_400, 18_000, 21_600,
];

/// XP granted when a training job completes, indexed by the level it
/// started at
pub const TRAINING_XP_REWARDS: [u64; 10] = [
    80, 160, 320, 560, 900, 1_350, 1_900, 2_600, 3_400, 4_400,
];

// Per-level bonus rates (percent per level). Each bonus is a pure
// `level * rate` so a level-10 specialist tops out at rate * 10.
pub const SUCCESS_RATE_PER_LEVEL: f64 = 2.0;
pub const STEAL_MIN_PER_LEVEL: f64 = 1.0;
pub const STEAL_MAX_PER_LEVEL: f64 = 2.0;
pub const COOLDOWN_REDUCTION_PER_LEVEL: f64 = 4.0;
pub const FINE_REDUCTION_PER_LEVEL: f64 = 3.0;
pub const TRACE_REDUCTION_PER_LEVEL: f64 = 3.5;

// XP awarded for attacks
pub const XP_SUCCESS_BASE: u64 = 25;
/// Extra XP per 1000 units stolen, capped below
pub const XP_PER_THOUSAND_STOLEN: u64 = 1;
pub const XP_AMOUNT_BONUS_CAP: u64 = 50;
pub const XP_FAILURE: u64 = 8;

// Inactivity decay policy
/// Idle time before a profile starts decaying (90 days)
pub const DECAY_IDLE_MS: u64 = 90 * 24 * 3600 * 1000;
/// Fraction of XP lost per decay application
pub const DECAY_PERCENT: f64 = 10.0;

/// Level held at a given XP total
pub fn level_for_xp(xp: u64) -> u8 {
    let mut level = 0u8;
    for (idx, threshold) in XP_THRESHOLDS.iter().enumerate() {
        if xp >= *threshold {
            level = idx as u8;
        }
    }
    level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_strictly_increase() {
        for pair in XP_THRESHOLDS.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_training_tables_scale_monotonically() {
        for pair in TRAINING_COSTS.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        for pair in TRAINING_DURATIONS_SECS.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        for pair in TRAINING_XP_REWARDS.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_level_for_xp_boundaries() {
        assert_eq!(level_for_xp(0), 0);
        assert_eq!(level_for_xp(99), 0);
        assert_eq!(level_for_xp(100), 1);
        assert_eq!(level_for_xp(1_499), 3);
        assert_eq!(level_for_xp(1_500), 4);
        assert_eq!(level_for_xp(28_000), 10);
        assert_eq!(level_for_xp(u64::MAX), 10);
    }

    #[test]
    fn test_max_trace_reduction_leaves_floor() {
        // A level-10 hacker reduces the 40% trace chance to exactly the 5% floor
        assert_eq!(40.0 - TRACE_REDUCTION_PER_LEVEL * MAX_LEVEL as f64, 5.0);
    }
}
