//! Skill progression engine
//!
//! Tracks XP per user and discipline, hands out level-derived bonuses and
//! runs the timed training jobs. Training completion is an idempotent poll:
//! whoever asks first after the end time triggers the one-time grant.

use std::sync::{Arc, Mutex};

use ahash::AHashMap;

use crate::core::{Clock, CommunityId, Discipline, EngineError, Result, UserId};
use crate::skills::profile::{bonuses_for_level, ActiveTraining, SkillBonuses, SkillProfile};
use crate::skills::tables;

/// Cost and duration quoted when a training job starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingReceipt {
    /// Level the job trains toward
    pub target_level: u8,
    pub cost: i64,
    pub duration_secs: u64,
}

/// Result of polling a training job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingStatus {
    /// No job running
    Idle,
    InProgress { remaining_secs: u64 },
    /// The poll that crossed the end time; granted exactly once
    Completed { xp_gained: u64, level_up: bool },
}

type ProfileKey = (CommunityId, UserId, Discipline);

pub struct SkillEngine {
    clock: Arc<dyn Clock>,
    profiles: Mutex<AHashMap<ProfileKey, SkillProfile>>,
}

impl SkillEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            profiles: Mutex::new(AHashMap::new()),
        }
    }

    pub fn profile(&self, community: CommunityId, user: UserId, discipline: Discipline) -> SkillProfile {
        self.profiles
            .lock()
            .unwrap()
            .get(&(community, user, discipline))
            .cloned()
            .unwrap_or_default()
    }

    pub fn level(&self, community: CommunityId, user: UserId, discipline: Discipline) -> u8 {
        self.profile(community, user, discipline).level()
    }

    /// Bonuses the user currently enjoys in a discipline
    pub fn bonuses(&self, community: CommunityId, user: UserId, discipline: Discipline) -> SkillBonuses {
        bonuses_for_level(self.level(community, user, discipline))
    }

    /// Grant XP; returns whether a level-up occurred
    pub fn add_xp(
        &self,
        community: CommunityId,
        user: UserId,
        discipline: Discipline,
        amount: u64,
    ) -> bool {
        let now = self.clock.now_ms();
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles.entry((community, user, discipline)).or_default();
        let before = profile.level();
        profile.xp += amount;
        profile.last_activity_ms = now;
        let after = profile.level();
        if after > before {
            tracing::info!(
                user = user.0,
                discipline = %discipline,
                level = after,
                "level up"
            );
        }
        after > before
    }

    /// XP earned by one attack
    ///
    /// Success pays a base plus a cut proportional to the stolen amount,
    /// capped; failure pays a small flat amount. An item XP boost scales
    /// the total.
    pub fn attack_xp(success: bool, stolen: i64, xp_boost_percent: f64) -> u64 {
        let base = if success {
            let amount_bonus =
                ((stolen.max(0) as u64) / 1000 * tables::XP_PER_THOUSAND_STOLEN)
                    .min(tables::XP_AMOUNT_BONUS_CAP);
            tables::XP_SUCCESS_BASE + amount_bonus
        } else {
            tables::XP_FAILURE
        };
        (base as f64 * (1.0 + xp_boost_percent.max(0.0) / 100.0)).floor() as u64
    }

    /// Validate a training request and quote its cost without recording it
    pub fn training_quote(
        &self,
        community: CommunityId,
        user: UserId,
        discipline: Discipline,
    ) -> Result<TrainingReceipt> {
        let profile = self.profile(community, user, discipline);
        Self::quote_for(&profile)
    }

    fn quote_for(profile: &SkillProfile) -> Result<TrainingReceipt> {
        let level = profile.level();
        if level >= tables::MAX_LEVEL {
            return Err(EngineError::MaxLevel);
        }
        if profile.active_training.is_some() {
            return Err(EngineError::AlreadyTraining);
        }
        if profile.trained_at_level == Some(level) {
            return Err(EngineError::AlreadyTrainedAtLevel);
        }
        let idx = level as usize;
        Ok(TrainingReceipt {
            target_level: level + 1,
            cost: tables::TRAINING_COSTS[idx],
            duration_secs: tables::TRAINING_DURATIONS_SECS[idx],
        })
    }

    /// Start a training job; the caller has already charged the quoted cost
    pub fn start_training(
        &self,
        community: CommunityId,
        user: UserId,
        discipline: Discipline,
    ) -> Result<TrainingReceipt> {
        let now = self.clock.now_ms();
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles.entry((community, user, discipline)).or_default();
        let receipt = Self::quote_for(profile)?;
        let level = profile.level();
        profile.active_training = Some(ActiveTraining {
            started_ms: now,
            ends_ms: now + receipt.duration_secs * 1000,
            xp_reward: tables::TRAINING_XP_REWARDS[level as usize],
            started_at_level: level,
        });
        profile.last_activity_ms = now;
        tracing::info!(
            user = user.0,
            discipline = %discipline,
            target_level = receipt.target_level,
            duration_secs = receipt.duration_secs,
            "training started"
        );
        Ok(receipt)
    }

    /// Idempotent poll: grants the recorded reward exactly once after the
    /// end time, stamping `trained_at_level` with the level the job started
    /// at rather than the possibly-higher current level
    pub fn check_training_complete(
        &self,
        community: CommunityId,
        user: UserId,
        discipline: Discipline,
    ) -> TrainingStatus {
        let now = self.clock.now_ms();
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles.entry((community, user, discipline)).or_default();
        let Some(training) = profile.active_training else {
            return TrainingStatus::Idle;
        };
        if now < training.ends_ms {
            return TrainingStatus::InProgress {
                remaining_secs: (training.ends_ms - now).div_ceil(1000),
            };
        }
        let before = profile.level();
        profile.xp += training.xp_reward;
        profile.trained_at_level = Some(training.started_at_level);
        profile.active_training = None;
        profile.last_activity_ms = now;
        let level_up = profile.level() > before;
        tracing::info!(
            user = user.0,
            discipline = %discipline,
            xp = training.xp_reward,
            level_up,
            "training complete"
        );
        TrainingStatus::Completed {
            xp_gained: training.xp_reward,
            level_up,
        }
    }

    /// Apply the inactivity decay policy to one community
    ///
    /// Profiles idle past the horizon lose a fixed fraction of XP, floored
    /// at their current level's threshold so decay never demotes. Returns
    /// how many profiles were touched.
    pub fn apply_decay(&self, community: CommunityId) -> usize {
        let now = self.clock.now_ms();
        let mut decayed = 0;
        let mut profiles = self.profiles.lock().unwrap();
        for ((c, _, _), profile) in profiles.iter_mut() {
            if *c != community || profile.xp == 0 {
                continue;
            }
            if now.saturating_sub(profile.last_activity_ms) < tables::DECAY_IDLE_MS {
                continue;
            }
            let floor = tables::XP_THRESHOLDS[profile.level() as usize];
            let reduced = (profile.xp as f64 * (1.0 - tables::DECAY_PERCENT / 100.0)) as u64;
            profile.xp = reduced.max(floor);
            profile.last_activity_ms = now;
            decayed += 1;
        }
        decayed
    }
}
