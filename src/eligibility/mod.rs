//! Eligibility gates: cooldowns, protection windows and the anti-farming rule

pub mod farming;
pub mod tracker;

pub use farming::{AttackRecord, FarmingVerdict, TargetLog};
pub use tracker::{effective_cooldown_secs, AttackGate, EligibilityTracker, TargetGate};
