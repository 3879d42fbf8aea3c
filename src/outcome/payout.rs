//! Steal and fine magnitudes

use rand::Rng;

/// Draw a success/failure outcome against a 0-100 rate
pub fn roll_success(rng: &mut impl Rng, rate: f64) -> bool {
    rng.gen_range(0.0..100.0) < rate
}

/// Skill-widened steal bounds for a rob, upper bound capped at 100
pub fn rob_steal_bounds(
    min_steal_percent: f64,
    max_steal_percent: f64,
    skill_min_bonus: f64,
    skill_max_bonus: f64,
) -> (f64, f64) {
    let min = min_steal_percent + skill_min_bonus;
    let max = (max_steal_percent + skill_max_bonus).min(100.0);
    (min.min(max), max)
}

/// Amount taken by a rob at a given rolled percentage
///
/// The target's protection modifier (0-100) linearly scales the loss down.
pub fn rob_steal_amount(target_cash: i64, percent: f64, protection_percent: f64) -> i64 {
    let raw = (target_cash.max(0) as f64 * percent / 100.0).floor();
    let kept = (100.0 - protection_percent.clamp(0.0, 100.0)) / 100.0;
    (raw * kept).floor() as i64
}

/// Roll a rob steal: uniform percentage inside the widened bounds
pub fn roll_rob_steal(
    rng: &mut impl Rng,
    target_cash: i64,
    min_steal_percent: f64,
    max_steal_percent: f64,
    skill_min_bonus: f64,
    skill_max_bonus: f64,
    protection_percent: f64,
) -> i64 {
    let (min, max) = rob_steal_bounds(
        min_steal_percent,
        max_steal_percent,
        skill_min_bonus,
        skill_max_bonus,
    );
    let percent = if max > min { rng.gen_range(min..=max) } else { max };
    rob_steal_amount(target_cash, percent, protection_percent)
}

/// Hack steal: linear in attack progress, never random
///
/// An attack stopped at 40% progress nets 40% of the ceiling, which is what
/// gives an early counter-virus its leverage.
pub fn hack_steal_at_progress(
    target_bank: i64,
    max_steal_percent: f64,
    skill_max_bonus: f64,
    progress: u8,
) -> i64 {
    let ceiling = (max_steal_percent + skill_max_bonus).min(100.0);
    let percent = ceiling * (progress.min(100) as f64 / 100.0);
    (target_bank.max(0) as f64 * percent / 100.0).floor() as i64
}

/// Fine for a failed attack: uniform percentage of the attacker's total
/// balance, scaled down by fine-reduction bonuses
///
/// Minimum 1 unit while the attacker has anything at all; an attacker
/// already at or below zero is not fined further.
pub fn roll_fine(
    rng: &mut impl Rng,
    attacker_total: i64,
    min_fine_percent: f64,
    max_fine_percent: f64,
    reduction_percent: f64,
) -> i64 {
    if attacker_total <= 0 {
        return 0;
    }
    let percent = if max_fine_percent > min_fine_percent {
        rng.gen_range(min_fine_percent..=max_fine_percent)
    } else {
        max_fine_percent
    };
    let factor = (1.0 - reduction_percent.clamp(0.0, 100.0) / 100.0).max(0.0);
    let fine = (attacker_total as f64 * percent / 100.0 * factor).floor() as i64;
    fine.max(1)
}
