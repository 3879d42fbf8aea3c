//! In-flight operation state: the active-attack registry and the
//! single-winner decision slots

pub mod decision;
pub mod registry;

pub use decision::{DecisionInput, DecisionKind, DecisionSlots};
pub use registry::{ActiveOp, ActiveOps};
