//! Active-operation registry
//!
//! At most one multi-stage attack may be in flight against a target. The
//! claim is an atomic check-and-set under one lock; whichever attacker gets
//! there first wins, everyone else is told the target is busy. The entry
//! carries a shared progress cell so the submit path can judge "too late"
//! without talking to the attack task.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use ahash::AHashMap;

use crate::core::{CommunityId, Discipline, OperationId, TimestampMs, UserId};

/// One in-flight multi-stage attack
#[derive(Debug, Clone)]
pub struct ActiveOp {
    pub op_id: OperationId,
    pub attacker: UserId,
    pub discipline: Discipline,
    pub started_ms: TimestampMs,
    /// Advanced by the attack task on every tick
    pub progress: Arc<AtomicU8>,
}

impl ActiveOp {
    pub fn new(
        op_id: OperationId,
        attacker: UserId,
        discipline: Discipline,
        started_ms: TimestampMs,
    ) -> Self {
        Self {
            op_id,
            attacker,
            discipline,
            started_ms,
            progress: Arc::new(AtomicU8::new(0)),
        }
    }

    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::SeqCst)
    }

    pub fn set_progress(&self, progress: u8) {
        self.progress.store(progress, Ordering::SeqCst);
    }
}

/// In-memory map of targets currently under attack
///
/// Ephemeral by design: it does not survive a process restart, unlike the
/// cooldown timestamps.
#[derive(Debug, Default)]
pub struct ActiveOps {
    inner: Mutex<AHashMap<(CommunityId, UserId), ActiveOp>>,
}

impl ActiveOps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomic check-and-set; false when the target is already claimed
    pub fn try_claim(&self, community: CommunityId, target: UserId, op: ActiveOp) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.contains_key(&(community, target)) {
            return false;
        }
        inner.insert((community, target), op);
        true
    }

    pub fn release(&self, community: CommunityId, target: UserId) {
        self.inner.lock().unwrap().remove(&(community, target));
    }

    pub fn get(&self, community: CommunityId, target: UserId) -> Option<ActiveOp> {
        self.inner.lock().unwrap().get(&(community, target)).cloned()
    }
}
