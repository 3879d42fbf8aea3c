//! State-transition events consumed by the presentation layer
//!
//! The engine never talks to the chat platform directly; it broadcasts
//! these and the command layer renders them. A lagging or absent receiver
//! never stalls resolution.

use crate::core::{CommunityId, OperationId, UserId};
use crate::outcome::{AttackOutcome, DefenseChoice};

#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A rob has begun; the target has one decision window to respond
    RobAnnounced {
        community: CommunityId,
        op: OperationId,
        attacker: UserId,
        target: UserId,
        window_ms: u64,
    },
    /// A hack has begun ticking against the target
    HackStarted {
        community: CommunityId,
        op: OperationId,
        attacker: UserId,
        target: UserId,
        tick_interval_ms: u64,
    },
    /// One progress tick of a running hack
    HackProgress {
        community: CommunityId,
        op: OperationId,
        target: UserId,
        progress: u8,
        /// Counter-virus success chance at this progress
        counter_chance: f64,
    },
    /// The target responded; `choice` is None for a hack counter-virus
    DefenseOutcome {
        community: CommunityId,
        op: OperationId,
        target: UserId,
        choice: Option<DefenseChoice>,
        success: bool,
        /// Minted for the target after a successful fight or alarm defense
        consolation: i64,
    },
    /// Exactly one per operation; the attack has reached a terminal state
    Resolved {
        community: CommunityId,
        op: OperationId,
        outcome: AttackOutcome,
        xp_awarded: u64,
        level_up: bool,
    },
    /// The target of a failed or defended hack may attempt a trace-back
    TraceWindowOpened {
        community: CommunityId,
        op: OperationId,
        target: UserId,
        window_ms: u64,
    },
    /// A trace attempt finished
    TraceResolved {
        community: CommunityId,
        op: OperationId,
        target: UserId,
        success: bool,
        recovered: i64,
    },
}
