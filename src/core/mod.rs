//! Core types, errors and time shared across the engine

pub mod clock;
pub mod error;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{EngineError, Result};
pub use types::{CommunityId, Discipline, OperationId, TimestampMs, UserId};
