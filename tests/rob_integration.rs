//! Integration tests for the rob lifecycle: eligibility gates, the defense
//! window race, settlement and anti-farming

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use vaultbreak::core::{CommunityId, Discipline, EngineError, ManualClock, UserId};
use vaultbreak::eligibility::FarmingVerdict;
use vaultbreak::engine::{Engine, EngineDeps, EngineEvent};
use vaultbreak::history::MemoryHistory;
use vaultbreak::items::{EffectKind, MemoryModifiers};
use vaultbreak::ledger::{Balance, Ledger, MemoryLedger};
use vaultbreak::outcome::DefenseChoice;
use vaultbreak::settings::MemorySettingsRepository;

const C: CommunityId = CommunityId(1);
const ATTACKER: UserId = UserId(10);
const TARGET: UserId = UserId(20);

struct Harness {
    engine: Arc<Engine>,
    ledger: Arc<MemoryLedger>,
    history: Arc<MemoryHistory>,
    modifiers: Arc<MemoryModifiers>,
    clock: Arc<ManualClock>,
}

fn harness(seed: u64) -> Harness {
    let ledger = Arc::new(MemoryLedger::new());
    let history = Arc::new(MemoryHistory::new());
    let modifiers = Arc::new(MemoryModifiers::new());
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let engine = Engine::new(EngineDeps {
        ledger: ledger.clone(),
        modifiers: modifiers.clone(),
        history: history.clone(),
        settings: Arc::new(MemorySettingsRepository::new()),
        clock: clock.clone(),
        rng_seed: Some(seed),
    });
    // Shrink the interactive window so tests move quickly
    engine
        .settings()
        .update(C, |s| s.rob.decision_window_ms = 60)
        .unwrap();
    Harness {
        engine,
        ledger,
        history,
        modifiers,
        clock,
    }
}

async fn wait_for(
    rx: &mut broadcast::Receiver<EngineEvent>,
    pred: impl Fn(&EngineEvent) -> bool,
) -> EngineEvent {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = rx.recv().await.expect("event stream closed");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

/// Test 1: successful undefended rob transfers exactly the rolled amount
#[tokio::test]
async fn test_successful_rob_without_defense() {
    let h = harness(1);
    // Attacker worth nothing: success rate is a guaranteed 100.
    // Degenerate 50..50 steal bounds pin the roll at exactly 50%.
    h.ledger.open_account(C, TARGET, Balance::new(10_000, 0));
    h.engine
        .settings()
        .update(C, |s| {
            s.rob.min_steal_percent = 50.0;
            s.rob.max_steal_percent = 50.0;
        })
        .unwrap();

    let mut events = h.engine.subscribe();
    let ticket = h.engine.begin_rob(C, ATTACKER, TARGET).unwrap();
    assert_eq!(ticket.success_rate, 100.0);

    let resolved = wait_for(&mut events, |e| matches!(e, EngineEvent::Resolved { .. })).await;
    let EngineEvent::Resolved {
        outcome,
        xp_awarded,
        ..
    } = resolved
    else {
        unreachable!()
    };
    assert!(outcome.success);
    assert!(!outcome.defended);
    assert_eq!(outcome.amount, 5_000);
    assert_eq!(xp_awarded, 30); // 25 base + 5000/1000

    // Conservation: attacker gained exactly what the target lost
    assert_eq!(h.ledger.balance(C, ATTACKER).unwrap().liquid, 5_000);
    assert_eq!(h.ledger.balance(C, TARGET).unwrap().liquid, 5_000);
    assert_eq!(h.history.rows(C).len(), 1);
}

/// Test 2: the target's protection modifier scales both sides of the
/// transfer down consistently
#[tokio::test]
async fn test_protection_modifier_scales_transfer() {
    let h = harness(1);
    h.ledger.open_account(C, TARGET, Balance::new(10_000, 0));
    h.modifiers.set(C, TARGET, EffectKind::Protection, 25.0);
    h.engine
        .settings()
        .update(C, |s| {
            s.rob.min_steal_percent = 50.0;
            s.rob.max_steal_percent = 50.0;
        })
        .unwrap();

    let mut events = h.engine.subscribe();
    h.engine.begin_rob(C, ATTACKER, TARGET).unwrap();
    let resolved = wait_for(&mut events, |e| matches!(e, EngineEvent::Resolved { .. })).await;
    let EngineEvent::Resolved { outcome, .. } = resolved else {
        unreachable!()
    };
    assert_eq!(outcome.amount, 3_750);
    assert_eq!(h.ledger.balance(C, ATTACKER).unwrap().liquid, 3_750);
    assert_eq!(h.ledger.balance(C, TARGET).unwrap().liquid, 6_250);
}

/// Test 3: a fine can drive the attacker's balance negative without
/// raising an error
#[tokio::test]
async fn test_fine_drives_balance_negative() {
    let h = harness(2);
    h.ledger.open_account(C, ATTACKER, Balance::new(200, 0));
    h.ledger.open_account(C, TARGET, Balance::new(50_000, 0));
    // A cursed attacker: the modifier wipes out the whole success rate
    h.modifiers
        .set(C, ATTACKER, EffectKind::SuccessBoost, -1_000.0);
    h.engine
        .settings()
        .update(C, |s| {
            s.rob.min_fine_percent = 250.0;
            s.rob.max_fine_percent = 250.0;
        })
        .unwrap();

    let mut events = h.engine.subscribe();
    let ticket = h.engine.begin_rob(C, ATTACKER, TARGET).unwrap();
    assert_eq!(ticket.success_rate, 0.0);

    let resolved = wait_for(&mut events, |e| matches!(e, EngineEvent::Resolved { .. })).await;
    let EngineEvent::Resolved { outcome, .. } = resolved else {
        unreachable!()
    };
    assert!(!outcome.success);
    assert_eq!(outcome.amount, 500); // 250% of 200
    assert_eq!(h.ledger.balance(C, ATTACKER).unwrap().liquid, -300);
    // The target kept everything
    assert_eq!(h.ledger.balance(C, TARGET).unwrap().liquid, 50_000);
}

/// Test 4: a fast flee defense at full rate pre-empts the attack entirely
#[tokio::test]
async fn test_successful_defense_moves_no_funds() {
    let h = harness(3);
    h.ledger.open_account(C, ATTACKER, Balance::new(1_000, 0));
    h.ledger.open_account(C, TARGET, Balance::new(10_000, 0));
    h.engine
        .settings()
        .update(C, |s| {
            s.rob.decision_window_ms = 5_000;
            s.rob.flee_success_rate = 100.0;
        })
        .unwrap();

    let mut events = h.engine.subscribe();
    h.engine.begin_rob(C, ATTACKER, TARGET).unwrap();
    wait_for(&mut events, |e| matches!(e, EngineEvent::RobAnnounced { .. })).await;

    // Immediate reaction lands in the first decay band: full 100% rate
    h.engine
        .submit_rob_defense(C, TARGET, DefenseChoice::Flee)
        .unwrap();

    let defense = wait_for(&mut events, |e| {
        matches!(e, EngineEvent::DefenseOutcome { .. })
    })
    .await;
    let EngineEvent::DefenseOutcome {
        success,
        consolation,
        ..
    } = defense
    else {
        unreachable!()
    };
    assert!(success);
    // Flee pays nothing; it is the safe choice
    assert_eq!(consolation, 0);

    let resolved = wait_for(&mut events, |e| matches!(e, EngineEvent::Resolved { .. })).await;
    let EngineEvent::Resolved { outcome, .. } = resolved else {
        unreachable!()
    };
    assert!(outcome.defended);
    assert!(!outcome.success);
    assert_eq!(outcome.amount, 0);
    assert_eq!(h.ledger.balance(C, ATTACKER).unwrap().liquid, 1_000);
    assert_eq!(h.ledger.balance(C, TARGET).unwrap().liquid, 10_000);
}

/// Test 5: a late duplicate defense is rejected after the first submission
#[tokio::test]
async fn test_second_defense_submission_rejected() {
    let h = harness(4);
    h.ledger.open_account(C, TARGET, Balance::new(10_000, 0));
    h.engine
        .settings()
        .update(C, |s| s.rob.decision_window_ms = 5_000)
        .unwrap();

    let mut events = h.engine.subscribe();
    h.engine.begin_rob(C, ATTACKER, TARGET).unwrap();
    wait_for(&mut events, |e| matches!(e, EngineEvent::RobAnnounced { .. })).await;

    h.engine
        .submit_rob_defense(C, TARGET, DefenseChoice::Flee)
        .unwrap();
    assert!(matches!(
        h.engine.submit_rob_defense(C, TARGET, DefenseChoice::Fight),
        Err(EngineError::NoPendingDecision)
    ));
}

/// Test 6: the attacker cooldown is stamped at attack start and releases
/// only after the effective cooldown elapses
#[tokio::test]
async fn test_cooldown_starts_at_attack_begin() {
    let h = harness(5);
    h.ledger.open_account(C, TARGET, Balance::new(10_000, 0));
    h.ledger.open_account(C, UserId(21), Balance::new(10_000, 0));
    h.engine
        .settings()
        .update(C, |s| s.rob.cooldown_secs = 3_600)
        .unwrap();

    let mut events = h.engine.subscribe();
    h.engine.begin_rob(C, ATTACKER, TARGET).unwrap();

    // Immediately blocked, even though the defense window is still open
    assert!(matches!(
        h.engine.begin_rob(C, ATTACKER, UserId(21)),
        Err(EngineError::CooldownActive { .. })
    ));

    wait_for(&mut events, |e| matches!(e, EngineEvent::Resolved { .. })).await;
    h.clock.advance_secs(3_600);
    assert!(h.engine.begin_rob(C, ATTACKER, UserId(21)).is_ok());
}

/// Test 7: a robbed target is protected regardless of the outcome
#[tokio::test]
async fn test_target_protection_after_resolution() {
    let h = harness(6);
    h.ledger.open_account(C, TARGET, Balance::new(10_000, 0));
    h.engine
        .settings()
        .update(C, |s| s.rob.protection_secs = 1_800)
        .unwrap();

    let mut events = h.engine.subscribe();
    h.engine.begin_rob(C, ATTACKER, TARGET).unwrap();
    wait_for(&mut events, |e| matches!(e, EngineEvent::Resolved { .. })).await;

    assert!(matches!(
        h.engine.begin_rob(C, UserId(11), TARGET),
        Err(EngineError::TargetProtected { .. })
    ));
    h.clock.advance_secs(1_800);
    assert!(h.engine.begin_rob(C, UserId(11), TARGET).is_ok());
}

/// Test 8: farming the same victim still runs the attack but stops paying XP
#[tokio::test]
async fn test_anti_farming_suppresses_xp_only() {
    let h = harness(7);
    h.ledger.open_account(C, TARGET, Balance::new(100_000, 0));
    h.engine
        .settings()
        .update(C, |s| {
            s.rob.cooldown_secs = 0;
            s.rob.protection_secs = 0;
        })
        .unwrap();

    let mut events = h.engine.subscribe();
    let first = h.engine.begin_rob(C, ATTACKER, TARGET).unwrap();
    assert_eq!(first.farming, FarmingVerdict::Fresh);
    wait_for(&mut events, |e| matches!(e, EngineEvent::Resolved { .. })).await;
    let xp_after_first = h.engine.skills().profile(C, ATTACKER, Discipline::Rob).xp;

    // Second attack on the same victim: allowed, but unrewarded
    let second = h.engine.begin_rob(C, ATTACKER, TARGET).unwrap();
    assert_eq!(
        second.farming,
        FarmingVerdict::Farmed {
            targets_still_needed: 3
        }
    );
    let resolved = wait_for(&mut events, |e| matches!(e, EngineEvent::Resolved { .. })).await;
    let EngineEvent::Resolved {
        outcome,
        xp_awarded,
        ..
    } = resolved
    else {
        unreachable!()
    };
    assert!(!outcome.awards_xp);
    assert_eq!(xp_awarded, 0);
    assert_eq!(
        h.engine.skills().profile(C, ATTACKER, Discipline::Rob).xp,
        xp_after_first
    );
}

/// Test 9: ineligibility is reported synchronously with no side effects
#[tokio::test]
async fn test_ineligibility_reports_before_any_mutation() {
    let h = harness(8);
    h.ledger.open_account(C, ATTACKER, Balance::new(1_000, 0));

    // Self-target
    assert!(matches!(
        h.engine.begin_rob(C, ATTACKER, ATTACKER),
        Err(EngineError::SelfTarget)
    ));
    // Broke target
    assert!(matches!(
        h.engine.begin_rob(C, ATTACKER, TARGET),
        Err(EngineError::TargetBroke)
    ));
    // Disabled community
    h.engine.settings().update(C, |s| s.enabled = false).unwrap();
    assert!(matches!(
        h.engine.begin_rob(C, ATTACKER, TARGET),
        Err(EngineError::Disabled)
    ));

    // None of the refusals burned the attacker's cooldown
    h.engine.settings().update(C, |s| s.enabled = true).unwrap();
    h.ledger.open_account(C, TARGET, Balance::new(5_000, 0));
    assert!(h.engine.begin_rob(C, ATTACKER, TARGET).is_ok());
    assert_eq!(h.history.rows(C).len(), 0);
}
