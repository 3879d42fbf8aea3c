//! Defense, counter-virus and trace-back odds
//!
//! The band and step values are fixed tables. They encode the game's
//! reaction-speed reward curve and must not be re-derived from formulas.

use rand::Rng;

use serde::{Deserialize, Serialize};

/// The three ways a rob target can respond
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefenseChoice {
    /// Best base odds, no reward on success
    Flee,
    /// Worst base odds, pays consolation on success
    Fight,
    /// Middling odds, pays consolation on success
    Alarm,
}

impl DefenseChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flee => "flee",
            Self::Fight => "fight",
            Self::Alarm => "alarm",
        }
    }

    /// Whether a successful defense of this kind pays the target a
    /// consolation amount
    pub fn pays_consolation(&self) -> bool {
        matches!(self, Self::Fight | Self::Alarm)
    }
}

impl std::fmt::Display for DefenseChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reaction-time decay bands for rob defenses:
/// (upper bound as a fraction of the window, multiplier on the base rate)
pub static DEFENSE_DECAY_BANDS: [(f64, f64); 3] =
    [(1.0 / 3.0, 1.0), (2.0 / 3.0, 0.75), (1.0, 0.5)];

/// Defense rate after reaction-time decay
///
/// Full rate in the first third of the window, 75% in the middle third,
/// 50% in the final third. Slow reactions are weaker, never worthless.
pub fn decayed_defense_rate(base_rate: f64, elapsed_ms: u64, window_ms: u64) -> f64 {
    if window_ms == 0 {
        return base_rate;
    }
    let fraction = elapsed_ms as f64 / window_ms as f64;
    for (bound, multiplier) in DEFENSE_DECAY_BANDS {
        if fraction <= bound {
            return base_rate * multiplier;
        }
    }
    base_rate * DEFENSE_DECAY_BANDS[DEFENSE_DECAY_BANDS.len() - 1].1
}

/// Counter-virus chance steps: (minimum progress, chance percent).
/// Past 80% progress the hack can no longer be countered.
pub static COUNTER_CHANCE_STEPS: [(u8, f64); 5] =
    [(0, 80.0), (20, 60.0), (40, 40.0), (60, 20.0), (80, 0.0)];

/// Progress at which a hack becomes undefendable
pub const COUNTER_CUTOFF_PROGRESS: u8 = 80;

/// Counter-virus success chance at a given attack progress
pub fn counter_chance_at(progress: u8) -> f64 {
    let mut chance = 0.0;
    for (min_progress, step_chance) in COUNTER_CHANCE_STEPS {
        if progress >= min_progress {
            chance = step_chance;
        }
    }
    chance
}

// Trace-back after a failed or defended hack
pub const TRACE_BASE_CHANCE: f64 = 40.0;
pub const TRACE_CHANCE_FLOOR: f64 = 5.0;
pub const TRACE_RECOVERY_MIN_PERCENT: f64 = 10.0;
pub const TRACE_RECOVERY_MAX_PERCENT: f64 = 25.0;

/// Chance the target pins the attacker, after the attacker's
/// trace-reduction bonus, floored so nobody is ever fully invisible
pub fn trace_chance(trace_reduction: f64) -> f64 {
    (TRACE_BASE_CHANCE - trace_reduction).max(TRACE_CHANCE_FLOOR)
}

/// Amount recovered by a successful trace: 10-25% of what the hack would
/// have stolen
pub fn roll_trace_recovery(rng: &mut impl Rng, would_be_steal: i64) -> i64 {
    if would_be_steal <= 0 {
        return 0;
    }
    let percent = rng.gen_range(TRACE_RECOVERY_MIN_PERCENT..=TRACE_RECOVERY_MAX_PERCENT);
    (would_be_steal as f64 * percent / 100.0).floor() as i64
}
