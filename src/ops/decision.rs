//! Single-winner decision slots
//!
//! Each interactive window installs a oneshot sender keyed by the user who
//! owns the decision. The first submission removes and fires it; everyone
//! after that is told there is nothing left to decide. First writer wins,
//! the second write is a no-op - the state machine's race against its own
//! timeout relies on this.

use std::sync::Mutex;

use ahash::AHashMap;
use tokio::sync::oneshot;

use crate::core::{CommunityId, EngineError, Result, UserId};
use crate::outcome::DefenseChoice;

/// What kind of decision a slot is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionKind {
    RobDefense,
    HackCounter,
    Trace,
}

/// The player input a slot can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionInput {
    Defense(DefenseChoice),
    Counter,
    Trace,
}

type SlotKey = (CommunityId, UserId, DecisionKind);

#[derive(Debug, Default)]
pub struct DecisionSlots {
    inner: Mutex<AHashMap<SlotKey, oneshot::Sender<DecisionInput>>>,
}

impl DecisionSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a slot for `owner`, returning the receiving end
    ///
    /// A stale slot under the same key is dropped; its receiver resolves to
    /// an error and the superseded operation has already moved on.
    pub fn open(
        &self,
        community: CommunityId,
        owner: UserId,
        kind: DecisionKind,
    ) -> oneshot::Receiver<DecisionInput> {
        let (tx, rx) = oneshot::channel();
        self.inner
            .lock()
            .unwrap()
            .insert((community, owner, kind), tx);
        rx
    }

    /// Fire the slot if `owner` still holds one; first caller wins
    pub fn submit(
        &self,
        community: CommunityId,
        owner: UserId,
        kind: DecisionKind,
        input: DecisionInput,
    ) -> Result<()> {
        let sender = self
            .inner
            .lock()
            .unwrap()
            .remove(&(community, owner, kind))
            .ok_or(EngineError::NoPendingDecision)?;
        sender
            .send(input)
            .map_err(|_| EngineError::NoPendingDecision)
    }

    /// Retire an unfired slot once the timer has won the race
    pub fn close(&self, community: CommunityId, owner: UserId, kind: DecisionKind) {
        self.inner.lock().unwrap().remove(&(community, owner, kind));
    }
}
