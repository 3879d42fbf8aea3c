//! Hack lifecycle: progress ticks racing a counter-virus, then trace-back
//!
//! The attack advances on a fixed cadence while the target may fire one
//! counter-virus. Countering early is a strong but double-edged play: the
//! counter chance is high at low progress, but a failed counter resolves
//! the theft immediately - at a progress-scaled, smaller magnitude. Past
//! the cutoff the hack can no longer be countered at all. A failed or
//! defended hack leaves a trace window for the target to claw money back.

use std::sync::Arc;
use std::time::Duration;

use crate::core::Discipline;
use crate::items::EffectKind;
use crate::ops::{ActiveOp, DecisionInput, DecisionKind};
use crate::outcome::{self, AttackOutcome};

use super::{AttackContext, Engine, EngineEvent, PROGRESS_PER_TICK};

/// How the interactive phase ended
enum HackEnd {
    /// Progress reached 100 with no counter
    Ran,
    /// Counter-virus succeeded
    Defended,
    /// Counter-virus failed; the theft resolves at current progress
    CounterFailed,
    /// The decision slot died under us; resolve from the last known state
    Aborted,
}

impl Engine {
    pub(crate) async fn run_hack(self: Arc<Self>, ctx: AttackContext, op: ActiveOp) {
        self.emit(EngineEvent::HackStarted {
            community: ctx.community,
            op: ctx.op,
            attacker: ctx.attacker,
            target: ctx.target,
            tick_interval_ms: ctx.settings.hack.tick_interval_ms,
        });

        let mut rx = self
            .decisions
            .open(ctx.community, ctx.target, DecisionKind::HackCounter);
        let tick = Duration::from_millis(ctx.settings.hack.tick_interval_ms);
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + tick, tick);

        let mut progress: u8 = 0;
        let end = loop {
            tokio::select! {
                _ = ticker.tick() => {
                    progress = (progress + PROGRESS_PER_TICK).min(100);
                    op.set_progress(progress);
                    self.emit(EngineEvent::HackProgress {
                        community: ctx.community,
                        op: ctx.op,
                        target: ctx.target,
                        progress,
                        counter_chance: outcome::counter_chance_at(progress),
                    });
                    if progress >= 100 {
                        break HackEnd::Ran;
                    }
                }
                input = &mut rx => {
                    match input {
                        Ok(DecisionInput::Counter) => {
                            let chance = outcome::counter_chance_at(progress);
                            let success = self.roll(chance);
                            self.emit(EngineEvent::DefenseOutcome {
                                community: ctx.community,
                                op: ctx.op,
                                target: ctx.target,
                                choice: None,
                                success,
                                consolation: 0,
                            });
                            break if success { HackEnd::Defended } else { HackEnd::CounterFailed };
                        }
                        _ => break HackEnd::Aborted,
                    }
                }
            }
        };
        self.decisions
            .close(ctx.community, ctx.target, DecisionKind::HackCounter);

        let trace_basis = self.resolve_hack(&ctx, end, progress);
        self.active_ops.release(ctx.community, ctx.target);

        if let Some(would_be) = trace_basis {
            self.run_trace(&ctx, would_be).await;
        }
    }

    /// Settle the hack; returns the would-be steal amount when the outcome
    /// leaves a trace window open
    fn resolve_hack(&self, ctx: &AttackContext, end: HackEnd, progress: u8) -> Option<i64> {
        let now = self.clock.now_ms();
        let bank = self
            .ledger
            .balance(ctx.community, ctx.target)
            .map(|b| b.reserve)
            .unwrap_or(ctx.target_balance.reserve);
        // Linear in progress: an early stop nets proportionally less
        let would_be = outcome::hack_steal_at_progress(
            bank,
            ctx.settings.hack.max_steal_percent,
            ctx.attacker_bonuses.steal_max,
            progress,
        );

        let defended = matches!(end, HackEnd::Defended);
        let success = if defended {
            false
        } else {
            // A failed counter only removes the pre-emption; the attack
            // still has to land on its own roll
            self.roll(ctx.success_rate)
        };

        let amount = if success {
            if would_be > 0 {
                let reason = format!("hack.steal.{}", ctx.op.0);
                self.settle(
                    self.ledger
                        .debit_from_total(ctx.community, ctx.target, would_be, &reason),
                    "hack steal debit",
                );
                self.settle(
                    self.ledger
                        .credit(ctx.community, ctx.attacker, would_be, &reason),
                    "hack steal credit",
                );
            }
            // Only a successful theft grants the target protection
            self.eligibility
                .record_target_protection(ctx.community, ctx.target, Discipline::Hack);
            would_be
        } else {
            // An unsuccessful hack must not shield its target
            self.eligibility
                .clear_target_protection(ctx.community, ctx.target, Discipline::Hack);
            let total = self
                .ledger
                .balance(ctx.community, ctx.attacker)
                .map(|b| b.total())
                .unwrap_or(ctx.attacker_balance.total());
            let reduction = ctx.attacker_bonuses.fine_reduction
                + self.item_bonus(ctx.community, ctx.attacker, EffectKind::FineReduction);
            let fine = self.with_rng(|rng| {
                outcome::roll_fine(
                    rng,
                    total,
                    ctx.settings.hack.min_fine_percent,
                    ctx.settings.hack.max_fine_percent,
                    reduction,
                )
            });
            if fine > 0 {
                let reason = format!("hack.fine.{}", ctx.op.0);
                self.settle(
                    self.ledger
                        .force_debit(ctx.community, ctx.attacker, fine, &reason),
                    "hack fine",
                );
            }
            fine
        };

        self.finish(
            ctx,
            AttackOutcome {
                discipline: Discipline::Hack,
                attacker: ctx.attacker,
                target: ctx.target,
                success,
                amount,
                defended,
                awards_xp: ctx.farming.awards_xp(),
                timestamp_ms: now,
            },
        );

        (!success).then_some(would_be)
    }

    /// Post-resolution trace-back window after a failed or defended hack
    async fn run_trace(&self, ctx: &AttackContext, would_be: i64) {
        let window_ms = ctx.settings.hack.trace_window_ms;
        let rx = self
            .decisions
            .open(ctx.community, ctx.target, DecisionKind::Trace);
        self.emit(EngineEvent::TraceWindowOpened {
            community: ctx.community,
            op: ctx.op,
            target: ctx.target,
            window_ms,
        });

        let attempt = tokio::select! {
            input = rx => input.ok(),
            _ = tokio::time::sleep(Duration::from_millis(window_ms)) => None,
        };
        self.decisions
            .close(ctx.community, ctx.target, DecisionKind::Trace);
        let Some(DecisionInput::Trace) = attempt else {
            return;
        };

        let reduction = ctx.attacker_bonuses.trace_reduction
            + self.item_bonus(ctx.community, ctx.attacker, EffectKind::TraceReduction);
        let success = self.roll(outcome::trace_chance(reduction));
        let mut recovered = 0;
        if success {
            recovered = self.with_rng(|rng| outcome::roll_trace_recovery(rng, would_be));
            if recovered > 0 {
                let reason = format!("hack.trace.{}", ctx.op.0);
                self.settle(
                    self.ledger
                        .force_debit(ctx.community, ctx.attacker, recovered, &reason),
                    "trace recovery debit",
                );
                self.settle(
                    self.ledger
                        .credit(ctx.community, ctx.target, recovered, &reason),
                    "trace recovery credit",
                );
            }
        }
        tracing::info!(
            community = ctx.community.0,
            target = ctx.target.0,
            success,
            recovered,
            "trace resolved"
        );
        self.emit(EngineEvent::TraceResolved {
            community: ctx.community,
            op: ctx.op,
            target: ctx.target,
            success,
            recovered,
        });
    }
}
