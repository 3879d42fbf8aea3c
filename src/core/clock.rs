//! Injectable wall-clock time
//!
//! Cooldowns, target protection and training jobs are timestamp math against
//! this clock, so tests can drive time without sleeping. Interactive decision
//! windows run on the async runtime's timers instead.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::types::TimestampMs;

pub trait Clock: Send + Sync {
    /// Current unix time in milliseconds
    fn now_ms(&self) -> TimestampMs;
}

/// Real wall clock
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> TimestampMs {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Settable clock for tests and offline simulation
#[derive(Debug, Default)]
pub struct ManualClock {
    ms: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: TimestampMs) -> Self {
        Self {
            ms: AtomicU64::new(start_ms),
        }
    }

    pub fn set(&self, ms: TimestampMs) {
        self.ms.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.ms.fetch_add(delta_ms, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(secs * 1000);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> TimestampMs {
        self.ms.load(Ordering::SeqCst)
    }
}
