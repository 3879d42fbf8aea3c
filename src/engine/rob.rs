//! Rob lifecycle: announce, race the defense window, resolve
//!
//! A rob is one interactive round: the target gets a single decision window
//! to pick a defense, the pick races the window timeout, and whichever
//! fires first settles the attack. A failed defense does not hand the
//! attacker a win - the underlying success roll still runs.

use std::sync::Arc;
use std::time::Duration;

use crate::core::Discipline;
use crate::items::EffectKind;
use crate::ops::{DecisionInput, DecisionKind};
use crate::outcome::{self, AttackOutcome, DefenseChoice};

use super::{AttackContext, Engine, EngineEvent};

impl Engine {
    pub(crate) async fn run_rob(self: Arc<Self>, ctx: AttackContext) {
        let window_ms = ctx.settings.rob.decision_window_ms;
        let rx = self
            .decisions
            .open(ctx.community, ctx.target, DecisionKind::RobDefense);
        self.emit(EngineEvent::RobAnnounced {
            community: ctx.community,
            op: ctx.op,
            attacker: ctx.attacker,
            target: ctx.target,
            window_ms,
        });

        let started = tokio::time::Instant::now();
        let decision = tokio::select! {
            input = rx => input.ok(),
            _ = tokio::time::sleep(Duration::from_millis(window_ms)) => None,
        };
        // Whichever side won, the slot is dead; late clicks get an error
        self.decisions
            .close(ctx.community, ctx.target, DecisionKind::RobDefense);

        let mut defended = false;
        if let Some(DecisionInput::Defense(choice)) = decision {
            defended = self.resolve_defense(&ctx, choice, started.elapsed(), window_ms);
        }
        self.resolve_rob(&ctx, defended);
    }

    /// Roll the chosen defense against its time-decayed rate; a success on
    /// a fight or alarm defense mints a consolation for the target
    fn resolve_defense(
        &self,
        ctx: &AttackContext,
        choice: DefenseChoice,
        reaction: Duration,
        window_ms: u64,
    ) -> bool {
        let rate = outcome::decayed_defense_rate(
            ctx.settings.rob.base_defense_rate(choice),
            reaction.as_millis() as u64,
            window_ms,
        );
        let success = self.roll(rate);
        let mut consolation = 0;
        if success && choice.pays_consolation() {
            let cash = self
                .ledger
                .balance(ctx.community, ctx.target)
                .map(|b| b.liquid)
                .unwrap_or(ctx.target_balance.liquid);
            let would_be = self.with_rng(|rng| {
                outcome::roll_rob_steal(
                    rng,
                    cash,
                    ctx.settings.rob.min_steal_percent,
                    ctx.settings.rob.max_steal_percent,
                    ctx.attacker_bonuses.steal_min,
                    ctx.attacker_bonuses.steal_max,
                    self.item_bonus(ctx.community, ctx.target, EffectKind::Protection),
                )
            });
            consolation =
                (would_be as f64 * ctx.settings.rob.consolation_percent / 100.0).floor() as i64;
            if consolation > 0 {
                let reason = format!("rob.consolation.{}", choice);
                self.settle(
                    self.ledger
                        .credit(ctx.community, ctx.target, consolation, &reason),
                    "rob consolation",
                );
            }
        }
        self.emit(EngineEvent::DefenseOutcome {
            community: ctx.community,
            op: ctx.op,
            target: ctx.target,
            choice: Some(choice),
            success,
            consolation,
        });
        success
    }

    fn resolve_rob(&self, ctx: &AttackContext, defended: bool) {
        let now = self.clock.now_ms();
        let mut success = false;
        let mut amount = 0;

        if !defended {
            success = self.roll(ctx.success_rate);
            if success {
                // Re-read the target's pocket: the window is long and the
                // balance may have moved underneath us
                let cash = self
                    .ledger
                    .balance(ctx.community, ctx.target)
                    .map(|b| b.liquid)
                    .unwrap_or(ctx.target_balance.liquid);
                amount = self.with_rng(|rng| {
                    outcome::roll_rob_steal(
                        rng,
                        cash,
                        ctx.settings.rob.min_steal_percent,
                        ctx.settings.rob.max_steal_percent,
                        ctx.attacker_bonuses.steal_min,
                        ctx.attacker_bonuses.steal_max,
                        self.item_bonus(ctx.community, ctx.target, EffectKind::Protection),
                    )
                });
                if amount > 0 {
                    let reason = format!("rob.steal.{}", ctx.op.0);
                    self.settle(
                        self.ledger
                            .force_debit(ctx.community, ctx.target, amount, &reason),
                        "rob steal debit",
                    );
                    self.settle(
                        self.ledger
                            .credit(ctx.community, ctx.attacker, amount, &reason),
                        "rob steal credit",
                    );
                }
            } else {
                let total = self
                    .ledger
                    .balance(ctx.community, ctx.attacker)
                    .map(|b| b.total())
                    .unwrap_or(ctx.attacker_balance.total());
                let reduction = ctx.attacker_bonuses.fine_reduction
                    + self.item_bonus(ctx.community, ctx.attacker, EffectKind::FineReduction);
                amount = self.with_rng(|rng| {
                    outcome::roll_fine(
                        rng,
                        total,
                        ctx.settings.rob.min_fine_percent,
                        ctx.settings.rob.max_fine_percent,
                        reduction,
                    )
                });
                if amount > 0 {
                    let reason = format!("rob.fine.{}", ctx.op.0);
                    self.settle(
                        self.ledger
                            .force_debit(ctx.community, ctx.attacker, amount, &reason),
                        "rob fine",
                    );
                }
            }
        }

        // A robbed target is protected no matter how the attempt went
        self.eligibility
            .record_target_protection(ctx.community, ctx.target, Discipline::Rob);

        self.finish(
            ctx,
            AttackOutcome {
                discipline: Discipline::Rob,
                attacker: ctx.attacker,
                target: ctx.target,
                success,
                amount,
                defended,
                awards_xp: ctx.farming.awards_xp(),
                timestamp_ms: now,
            },
        );
    }
}
