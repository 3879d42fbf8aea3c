use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Attacks are disabled in this community")]
    Disabled,

    #[error("You cannot target yourself")]
    SelfTarget,

    #[error("Cooldown active: {remaining_secs}s remaining")]
    CooldownActive { remaining_secs: u64 },

    #[error("Target is protected: {remaining_secs}s remaining")]
    TargetProtected { remaining_secs: u64 },

    #[error("Target has nothing worth taking")]
    TargetBroke,

    #[error("Target is already under attack")]
    TargetBusy,

    #[error("No pending decision for this user")]
    NoPendingDecision,

    #[error("The attack can no longer be countered")]
    TooLate,

    #[error("Already at maximum level")]
    MaxLevel,

    #[error("A training job is already running")]
    AlreadyTraining,

    #[error("Training already claimed at the current level")]
    AlreadyTrainedAtLevel,

    #[error("Insufficient funds: {needed} required")]
    InsufficientFunds { needed: i64 },

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("History error: {0}")]
    History(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
