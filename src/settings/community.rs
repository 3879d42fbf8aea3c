//! Per-community tunables with documented defaults
//!
//! These values shape game pacing and fairness. They are immutable during a
//! single attack resolution; administrative writes go through the store so
//! the cache is invalidated explicitly.

use serde::{Deserialize, Serialize};

use crate::outcome::DefenseChoice;

/// Settings for the rob discipline (liquid cash theft)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RobSettings {
    /// Lower bound of the steal roll, percent of the target's cash
    pub min_steal_percent: f64,
    /// Upper bound of the steal roll; skill widens it, capped at 100
    pub max_steal_percent: f64,
    /// Base attacker cooldown before skill reduction
    pub cooldown_secs: u64,
    /// How long a robbed target stays protected
    pub protection_secs: u64,
    /// Fine bounds, percent of the attacker's total balance
    pub min_fine_percent: f64,
    pub max_fine_percent: f64,
    /// How long the target has to pick a defense
    pub decision_window_ms: u64,
    /// Base success rate for each defense choice, decayed by reaction time
    pub flee_success_rate: f64,
    pub fight_success_rate: f64,
    pub alarm_success_rate: f64,
    /// Consolation paid to the target after a successful fight or alarm
    /// defense, percent of what would have been stolen
    pub consolation_percent: f64,
}

impl Default for RobSettings {
    fn default() -> Self {
        Self {
            min_steal_percent: 10.0,
            max_steal_percent: 50.0,
            cooldown_secs: 3600,
            protection_secs: 1800,
            min_fine_percent: 10.0,
            max_fine_percent: 30.0,
            decision_window_ms: 30_000,
            flee_success_rate: 60.0,
            fight_success_rate: 40.0,
            alarm_success_rate: 50.0,
            consolation_percent: 10.0,
        }
    }
}

impl RobSettings {
    /// Base success rate for a defense choice, before time decay
    pub fn base_defense_rate(&self, choice: DefenseChoice) -> f64 {
        match choice {
            DefenseChoice::Flee => self.flee_success_rate,
            DefenseChoice::Fight => self.fight_success_rate,
            DefenseChoice::Alarm => self.alarm_success_rate,
        }
    }
}

/// Settings for the hack discipline (bank theft)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HackSettings {
    /// Steal ceiling at full progress, percent of the target's bank;
    /// the actual percentage scales linearly with attack progress
    pub max_steal_percent: f64,
    /// Base attacker cooldown before skill reduction
    pub cooldown_secs: u64,
    /// How long a successfully hacked target stays protected
    pub protection_secs: u64,
    /// Fine bounds, percent of the attacker's total balance
    pub min_fine_percent: f64,
    pub max_fine_percent: f64,
    /// Cadence of the progress ticks
    pub tick_interval_ms: u64,
    /// How long the target has to attempt a trace after a failed or
    /// defended hack
    pub trace_window_ms: u64,
}

impl Default for HackSettings {
    fn default() -> Self {
        Self {
            max_steal_percent: 20.0,
            cooldown_secs: 7200,
            protection_secs: 3600,
            min_fine_percent: 5.0,
            max_fine_percent: 15.0,
            tick_interval_ms: 3_000,
            trace_window_ms: 20_000,
        }
    }
}

/// One community's configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunitySettings {
    pub enabled: bool,
    /// Distinct targets an attacker must hit before the same victim
    /// earns them XP again
    pub unique_targets_required: u32,
    pub rob: RobSettings,
    pub hack: HackSettings,
}

/// Documented defaults used when a community has no stored settings
impl Default for CommunitySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            unique_targets_required: 3,
            rob: RobSettings::default(),
            hack: HackSettings::default(),
        }
    }
}
