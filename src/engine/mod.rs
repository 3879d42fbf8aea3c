//! The adversarial-interaction engine
//!
//! Wires the eligibility gates, outcome math, operation registry and skill
//! progression into the two attack lifecycles. Each attack runs as its own
//! task racing player input against timers; everything the presentation
//! layer sees flows out through the event stream.

pub mod events;
mod hack;
mod rob;

use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::broadcast;

use crate::core::{
    Clock, CommunityId, Discipline, EngineError, OperationId, Result, SystemClock, UserId,
};
use crate::eligibility::{AttackGate, EligibilityTracker, FarmingVerdict, TargetGate, TargetLog};
use crate::history::HistoryStore;
use crate::items::{EffectKind, ModifierSource};
use crate::ledger::{Balance, Ledger};
use crate::ops::{ActiveOps, DecisionInput, DecisionKind, DecisionSlots};
use crate::outcome::{self, AttackOutcome, DefenseChoice};
use crate::settings::{CommunitySettings, SettingsRepository, SettingsStore};
use crate::skills::{SkillBonuses, SkillEngine, TrainingReceipt, TrainingStatus};

pub use events::EngineEvent;

/// Progress gained per hack tick
pub const PROGRESS_PER_TICK: u8 = 10;

/// Event channel depth; slow consumers lag rather than block the engine
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// External collaborators handed to the engine at construction
pub struct EngineDeps {
    pub ledger: Arc<dyn Ledger>,
    pub modifiers: Arc<dyn ModifierSource>,
    pub history: Arc<dyn HistoryStore>,
    pub settings: Arc<dyn SettingsRepository>,
    pub clock: Arc<dyn Clock>,
    /// Fixed seed for deterministic runs; None draws from the OS
    pub rng_seed: Option<u64>,
}

impl EngineDeps {
    /// Default clock and OS-seeded randomness
    pub fn new(
        ledger: Arc<dyn Ledger>,
        modifiers: Arc<dyn ModifierSource>,
        history: Arc<dyn HistoryStore>,
        settings: Arc<dyn SettingsRepository>,
    ) -> Self {
        Self {
            ledger,
            modifiers,
            history,
            settings,
            clock: Arc::new(SystemClock),
            rng_seed: None,
        }
    }
}

/// What the attacker learns the moment their attack is accepted
#[derive(Debug, Clone, Copy)]
pub struct AttackTicket {
    pub op: OperationId,
    /// Pre-computed success rate shown to the attacker
    pub success_rate: f64,
    /// Whether this attack will pay XP, and if not how many distinct
    /// targets are still needed
    pub farming: FarmingVerdict,
}

/// Everything an attack task needs, captured at gate time
pub(crate) struct AttackContext {
    pub community: CommunityId,
    pub op: OperationId,
    pub attacker: UserId,
    pub target: UserId,
    pub settings: Arc<CommunitySettings>,
    pub attacker_bonuses: SkillBonuses,
    pub success_rate: f64,
    pub farming: FarmingVerdict,
    /// Balances read at gate time; resolution re-reads and falls back to
    /// these if the ledger is unreachable mid-flight
    pub attacker_balance: Balance,
    pub target_balance: Balance,
}

pub struct Engine {
    pub(crate) settings: SettingsStore,
    pub(crate) skills: SkillEngine,
    pub(crate) eligibility: EligibilityTracker,
    pub(crate) target_log: TargetLog,
    pub(crate) active_ops: ActiveOps,
    pub(crate) decisions: DecisionSlots,
    pub(crate) ledger: Arc<dyn Ledger>,
    pub(crate) modifiers: Arc<dyn ModifierSource>,
    pub(crate) history: Arc<dyn HistoryStore>,
    pub(crate) clock: Arc<dyn Clock>,
    events: broadcast::Sender<EngineEvent>,
    rng: Mutex<ChaCha8Rng>,
}

impl Engine {
    pub fn new(deps: EngineDeps) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let rng = match deps.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Arc::new(Self {
            settings: SettingsStore::new(deps.settings),
            skills: SkillEngine::new(Arc::clone(&deps.clock)),
            eligibility: EligibilityTracker::new(Arc::clone(&deps.clock)),
            target_log: TargetLog::new(),
            active_ops: ActiveOps::new(),
            decisions: DecisionSlots::new(),
            ledger: deps.ledger,
            modifiers: deps.modifiers,
            history: deps.history,
            clock: deps.clock,
            events,
            rng: Mutex::new(rng),
        })
    }

    /// Subscribe to the engine's state-transition events
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Settings access for the administrative layer
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Skill progression access for profile rendering
    pub fn skills(&self) -> &SkillEngine {
        &self.skills
    }

    // === Player intents ===

    /// The rob target picks a defense within the decision window
    pub fn submit_rob_defense(
        &self,
        community: CommunityId,
        target: UserId,
        choice: DefenseChoice,
    ) -> Result<()> {
        self.decisions.submit(
            community,
            target,
            DecisionKind::RobDefense,
            DecisionInput::Defense(choice),
        )
    }

    /// The hack target launches a counter-virus
    ///
    /// Rejected outright once the attack has passed the counter cutoff.
    pub fn submit_hack_counter(&self, community: CommunityId, target: UserId) -> Result<()> {
        let op = self
            .active_ops
            .get(community, target)
            .ok_or(EngineError::NoPendingDecision)?;
        if op.progress() >= outcome::COUNTER_CUTOFF_PROGRESS {
            return Err(EngineError::TooLate);
        }
        self.decisions
            .submit(community, target, DecisionKind::HackCounter, DecisionInput::Counter)
    }

    /// The hack target attempts a trace-back within its window
    pub fn submit_trace(&self, community: CommunityId, target: UserId) -> Result<()> {
        self.decisions
            .submit(community, target, DecisionKind::Trace, DecisionInput::Trace)
    }

    // === Training ===

    /// Start a training job, charging its quoted cost up front
    pub fn start_training(
        &self,
        community: CommunityId,
        user: UserId,
        discipline: Discipline,
    ) -> Result<TrainingReceipt> {
        let quote = self.skills.training_quote(community, user, discipline)?;
        let reason = format!("{}.training.level{}", discipline, quote.target_level);
        if !self.ledger.debit(community, user, quote.cost, &reason)? {
            return Err(EngineError::InsufficientFunds { needed: quote.cost });
        }
        self.skills.start_training(community, user, discipline)
    }

    /// Poll a training job; grants the reward exactly once after it ends
    pub fn check_training(
        &self,
        community: CommunityId,
        user: UserId,
        discipline: Discipline,
    ) -> TrainingStatus {
        self.skills.check_training_complete(community, user, discipline)
    }

    // === Shared attack plumbing ===

    pub(crate) fn emit(&self, event: EngineEvent) {
        // No receivers is fine; resolution never depends on delivery
        let _ = self.events.send(event);
    }

    pub(crate) fn roll(&self, rate: f64) -> bool {
        outcome::roll_success(&mut *self.rng.lock().unwrap(), rate)
    }

    pub(crate) fn with_rng<T>(&self, f: impl FnOnce(&mut ChaCha8Rng) -> T) -> T {
        f(&mut self.rng.lock().unwrap())
    }

    pub(crate) fn item_bonus(&self, community: CommunityId, user: UserId, kind: EffectKind) -> f64 {
        self.modifiers.modifier(community, user, kind)
    }

    /// Gate checks shared by both disciplines, through the pre-computed
    /// success rate; the attacker cooldown is NOT stamped here
    fn prepare(
        &self,
        community: CommunityId,
        attacker: UserId,
        target: UserId,
        discipline: Discipline,
    ) -> Result<AttackContext> {
        let settings = self.settings.get(community)?;
        if !settings.enabled {
            return Err(EngineError::Disabled);
        }
        if attacker == target {
            return Err(EngineError::SelfTarget);
        }

        let (cooldown_secs, protection_secs) = match discipline {
            Discipline::Rob => (settings.rob.cooldown_secs, settings.rob.protection_secs),
            Discipline::Hack => (settings.hack.cooldown_secs, settings.hack.protection_secs),
        };

        let attacker_bonuses = self.skills.bonuses(community, attacker, discipline);
        match self.eligibility.can_attack(
            community,
            attacker,
            discipline,
            cooldown_secs,
            attacker_bonuses.cooldown_reduction,
        ) {
            AttackGate::Ready => {}
            AttackGate::CoolingDown { remaining_secs } => {
                return Err(EngineError::CooldownActive { remaining_secs });
            }
        }
        match self
            .eligibility
            .can_be_targeted(community, target, discipline, protection_secs)
        {
            TargetGate::Open => {}
            TargetGate::Protected { remaining_secs } => {
                return Err(EngineError::TargetProtected { remaining_secs });
            }
        }

        let attacker_balance = self.ledger.balance(community, attacker)?;
        let target_balance = self.ledger.balance(community, target)?;
        let item_bonus = self.item_bonus(community, attacker, EffectKind::SuccessBoost);
        let success_rate = match discipline {
            Discipline::Rob => {
                if target_balance.liquid <= 0 {
                    return Err(EngineError::TargetBroke);
                }
                outcome::rob_success_rate(
                    target_balance.liquid,
                    attacker_balance.total(),
                    attacker_bonuses.success_rate,
                    item_bonus,
                )
            }
            Discipline::Hack => {
                if target_balance.reserve <= 0 {
                    return Err(EngineError::TargetBroke);
                }
                outcome::hack_success_rate(
                    target_balance.reserve,
                    attacker_balance.reserve,
                    attacker_bonuses.success_rate,
                    item_bonus,
                )
            }
        };

        let farming = self.target_log.check(
            community,
            discipline,
            attacker,
            target,
            settings.unique_targets_required,
        );

        Ok(AttackContext {
            community,
            op: OperationId::new(),
            attacker,
            target,
            settings,
            attacker_bonuses,
            success_rate,
            farming,
            attacker_balance,
            target_balance,
        })
    }

    /// Begin a rob; returns once the attack is announced and racing
    pub fn begin_rob(
        self: &Arc<Self>,
        community: CommunityId,
        attacker: UserId,
        target: UserId,
    ) -> Result<AttackTicket> {
        let ctx = self.prepare(community, attacker, target, Discipline::Rob)?;
        let ticket = AttackTicket {
            op: ctx.op,
            success_rate: ctx.success_rate,
            farming: ctx.farming,
        };

        // Cooldown starts ticking now, interactive phase or not
        self.eligibility
            .record_attack_start(community, attacker, Discipline::Rob);
        tracing::info!(
            community = community.0,
            attacker = attacker.0,
            target = target.0,
            success_rate = ctx.success_rate,
            "rob announced"
        );

        let engine = Arc::clone(self);
        tokio::spawn(async move {
            engine.run_rob(ctx).await;
        });
        Ok(ticket)
    }

    /// Begin a hack; claims the target, then returns while the attack ticks
    pub fn begin_hack(
        self: &Arc<Self>,
        community: CommunityId,
        attacker: UserId,
        target: UserId,
    ) -> Result<AttackTicket> {
        let ctx = self.prepare(community, attacker, target, Discipline::Hack)?;
        let op = crate::ops::ActiveOp::new(
            ctx.op,
            attacker,
            Discipline::Hack,
            self.clock.now_ms(),
        );
        // Claim before the cooldown stamp: a refused claim must not burn
        // the attacker's cooldown
        if !self.active_ops.try_claim(community, target, op.clone()) {
            return Err(EngineError::TargetBusy);
        }
        let ticket = AttackTicket {
            op: ctx.op,
            success_rate: ctx.success_rate,
            farming: ctx.farming,
        };
        self.eligibility
            .record_attack_start(community, attacker, Discipline::Hack);
        tracing::info!(
            community = community.0,
            attacker = attacker.0,
            target = target.0,
            success_rate = ctx.success_rate,
            "hack started"
        );

        let engine = Arc::clone(self);
        tokio::spawn(async move {
            engine.run_hack(ctx, op).await;
        });
        Ok(ticket)
    }

    /// Log-and-continue for settlement-time ledger failures: the operation
    /// still reaches its terminal state deterministically
    pub(crate) fn settle(&self, result: Result<()>, what: &'static str) {
        if let Err(e) = result {
            tracing::error!(error = %e, what, "ledger settlement failed");
        }
    }

    /// Common tail of every resolution: exactly one history row, the
    /// anti-farming log entry, XP if permitted, and the Resolved event
    pub(crate) fn finish(&self, ctx: &AttackContext, outcome: AttackOutcome) {
        self.target_log.record(
            ctx.community,
            outcome.discipline,
            crate::eligibility::AttackRecord {
                attacker: outcome.attacker,
                target: outcome.target,
                timestamp_ms: outcome.timestamp_ms,
                success: outcome.success,
            },
        );
        if let Err(e) = self.history.append(ctx.community, &outcome) {
            tracing::warn!(error = %e, "history append failed");
        }

        let (xp_awarded, level_up) = if outcome.awards_xp {
            let boost = self.item_bonus(ctx.community, ctx.attacker, EffectKind::XpBoost);
            let stolen = if outcome.success { outcome.amount } else { 0 };
            let xp = SkillEngine::attack_xp(outcome.success, stolen, boost);
            let level_up = self.skills.add_xp(ctx.community, ctx.attacker, outcome.discipline, xp);
            (xp, level_up)
        } else {
            (0, false)
        };

        tracing::info!(
            community = ctx.community.0,
            attacker = ctx.attacker.0,
            target = ctx.target.0,
            discipline = %outcome.discipline,
            success = outcome.success,
            defended = outcome.defended,
            amount = outcome.amount,
            xp_awarded,
            "attack resolved"
        );
        self.emit(EngineEvent::Resolved {
            community: ctx.community,
            op: ctx.op,
            outcome,
            xp_awarded,
            level_up,
        });
    }
}
