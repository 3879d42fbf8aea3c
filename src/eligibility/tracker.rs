//! Attacker cooldowns and target protection windows
//!
//! The attacker cooldown is stamped the instant an attack begins, so it
//! ticks while the interactive phase is still running. Target protection is
//! stamped by the resolution path instead: unconditionally for rob,
//! success-only for hack (with an explicit clear on failure). The asymmetry
//! is a fairness rule, not an accident.

use std::sync::{Arc, Mutex};

use ahash::AHashMap;

use crate::core::{Clock, CommunityId, Discipline, TimestampMs, UserId};

/// Whether an attacker may begin an attack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackGate {
    Ready,
    CoolingDown { remaining_secs: u64 },
}

/// Whether a target may be attacked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetGate {
    Open,
    Protected { remaining_secs: u64 },
}

/// Base cooldown after skill reduction, floored at zero
pub fn effective_cooldown_secs(base_secs: u64, reduction_percent: f64) -> u64 {
    let factor = (1.0 - reduction_percent / 100.0).max(0.0);
    (base_secs as f64 * factor) as u64
}

type Key = (CommunityId, UserId, Discipline);

pub struct EligibilityTracker {
    clock: Arc<dyn Clock>,
    /// Last attack start per attacker
    cooldowns: Mutex<AHashMap<Key, TimestampMs>>,
    /// Last time each user was (rob) attacked or (hack) successfully hit
    protections: Mutex<AHashMap<Key, TimestampMs>>,
}

impl EligibilityTracker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            cooldowns: Mutex::new(AHashMap::new()),
            protections: Mutex::new(AHashMap::new()),
        }
    }

    pub fn can_attack(
        &self,
        community: CommunityId,
        attacker: UserId,
        discipline: Discipline,
        base_cooldown_secs: u64,
        cooldown_reduction_percent: f64,
    ) -> AttackGate {
        let Some(last) = self
            .cooldowns
            .lock()
            .unwrap()
            .get(&(community, attacker, discipline))
            .copied()
        else {
            return AttackGate::Ready;
        };
        let effective = effective_cooldown_secs(base_cooldown_secs, cooldown_reduction_percent);
        let elapsed_secs = self.clock.now_ms().saturating_sub(last) / 1000;
        if elapsed_secs >= effective {
            AttackGate::Ready
        } else {
            AttackGate::CoolingDown {
                remaining_secs: effective - elapsed_secs,
            }
        }
    }

    /// Stamp the attacker cooldown; called the moment an attack begins
    pub fn record_attack_start(
        &self,
        community: CommunityId,
        attacker: UserId,
        discipline: Discipline,
    ) {
        self.cooldowns
            .lock()
            .unwrap()
            .insert((community, attacker, discipline), self.clock.now_ms());
    }

    pub fn can_be_targeted(
        &self,
        community: CommunityId,
        target: UserId,
        discipline: Discipline,
        protection_secs: u64,
    ) -> TargetGate {
        let Some(last) = self
            .protections
            .lock()
            .unwrap()
            .get(&(community, target, discipline))
            .copied()
        else {
            return TargetGate::Open;
        };
        let elapsed_secs = self.clock.now_ms().saturating_sub(last) / 1000;
        if elapsed_secs >= protection_secs {
            TargetGate::Open
        } else {
            TargetGate::Protected {
                remaining_secs: protection_secs - elapsed_secs,
            }
        }
    }

    /// Stamp the target's protection window; called at resolution
    pub fn record_target_protection(
        &self,
        community: CommunityId,
        target: UserId,
        discipline: Discipline,
    ) {
        self.protections
            .lock()
            .unwrap()
            .insert((community, target, discipline), self.clock.now_ms());
    }

    /// Drop any protection; a failed hack must not shield its target
    pub fn clear_target_protection(
        &self,
        community: CommunityId,
        target: UserId,
        discipline: Discipline,
    ) {
        self.protections
            .lock()
            .unwrap()
            .remove(&(community, target, discipline));
    }
}
