//! Skill progression: XP, levels, timed training and the bonuses they feed
//! into eligibility and outcome math
//!
//! A level-10 robber strikes faster, steals wider and shrugs off fines; a
//! level-10 hacker is close to untraceable. Levels come only from XP, XP
//! comes from attacks and from training jobs that pay out after a delay.

pub mod profile;
pub mod progression;
pub mod tables;

pub use profile::{bonuses_for_level, ActiveTraining, SkillBonuses, SkillProfile};
pub use progression::{SkillEngine, TrainingReceipt, TrainingStatus};
