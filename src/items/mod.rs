//! Item and effect modifier boundary
//!
//! Consumable items live in the shop/inventory subsystem; the engine only
//! reads the net percentage each effect contributes for a user.

use std::sync::Mutex;

use ahash::AHashMap;

use crate::core::{CommunityId, UserId};

/// Effect categories the engine consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Added to the attack success rate
    SuccessBoost,
    /// Scales down fines on failed attacks
    FineReduction,
    /// Scales down how much can be stolen from the holder
    Protection,
    /// Multiplies XP earned from attacks
    XpBoost,
    /// Lowers the chance of being traced after a hack
    TraceReduction,
}

pub trait ModifierSource: Send + Sync {
    /// Net percentage for this effect; 0 when the user has nothing active
    fn modifier(&self, community: CommunityId, user: UserId, kind: EffectKind) -> f64;
}

/// Source with no active effects
#[derive(Debug, Default)]
pub struct NoModifiers;

impl ModifierSource for NoModifiers {
    fn modifier(&self, _community: CommunityId, _user: UserId, _kind: EffectKind) -> f64 {
        0.0
    }
}

/// Fixed-value source for tests and the demo binary
#[derive(Debug, Default)]
pub struct MemoryModifiers {
    values: Mutex<AHashMap<(CommunityId, UserId, EffectKind), f64>>,
}

impl MemoryModifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, community: CommunityId, user: UserId, kind: EffectKind, percent: f64) {
        self.values
            .lock()
            .unwrap()
            .insert((community, user, kind), percent);
    }
}

impl ModifierSource for MemoryModifiers {
    fn modifier(&self, community: CommunityId, user: UserId, kind: EffectKind) -> f64 {
        self.values
            .lock()
            .unwrap()
            .get(&(community, user, kind))
            .copied()
            .unwrap_or(0.0)
    }
}
