//! Outcome calculation: pure odds and payout math
//!
//! Everything here is deterministic given its inputs and a random draw; the
//! state machine in `engine/` owns when each function is consulted.

pub mod defense;
pub mod payout;
pub mod rates;

use serde::{Deserialize, Serialize};

use crate::core::{Discipline, TimestampMs, UserId};

pub use defense::{
    counter_chance_at, decayed_defense_rate, roll_trace_recovery, trace_chance, DefenseChoice,
    COUNTER_CHANCE_STEPS, COUNTER_CUTOFF_PROGRESS, DEFENSE_DECAY_BANDS, TRACE_BASE_CHANCE,
    TRACE_CHANCE_FLOOR,
};
pub use payout::{
    hack_steal_at_progress, rob_steal_amount, rob_steal_bounds, roll_fine, roll_rob_steal,
    roll_success,
};
pub use rates::{hack_success_rate, rob_success_rate};

/// Terminal result of one attack, written to history exactly once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub discipline: Discipline,
    pub attacker: UserId,
    pub target: UserId,
    /// Whether the theft landed
    pub success: bool,
    /// Amount stolen on success, fined on failure
    pub amount: i64,
    /// Whether the target's defense pre-empted the attack
    pub defended: bool,
    /// False when the anti-farming rule disqualified this target
    pub awards_xp: bool,
    pub timestamp_ms: TimestampMs,
}
