//! Per-community configuration and its cached store

pub mod community;
pub mod store;

pub use community::{CommunitySettings, HackSettings, RobSettings};
pub use store::{
    MemorySettingsRepository, SettingsRepository, SettingsStore, TomlSettingsRepository,
};
