//! Success-rate formulas
//!
//! Rates are pure functions of current balances plus skill and item
//! bonuses, clamped to [0, 100]. A target with nothing to take yields a
//! flat zero rather than a divide-by-zero.

/// Rob success rate
///
/// The richer the target's pocket relative to the attacker's whole worth,
/// the better the odds: `targetCash / (targetCash + attackerTotal) * 100`.
pub fn rob_success_rate(
    target_cash: i64,
    attacker_total: i64,
    skill_bonus: f64,
    item_bonus: f64,
) -> f64 {
    let cash = target_cash.max(0) as f64;
    if cash <= 0.0 {
        return 0.0;
    }
    let total = attacker_total.max(0) as f64;
    let base = cash / (cash + total) * 100.0;
    (base + skill_bonus + item_bonus).clamp(0.0, 100.0)
}

/// Hack success rate
///
/// Bank holdings are harder to reach, so the target's bank weighs in at
/// 1/2.5 of its size: `(targetBank / 2.5) / (attackerBank + targetBank) * 100`.
pub fn hack_success_rate(
    target_bank: i64,
    attacker_bank: i64,
    skill_bonus: f64,
    item_bonus: f64,
) -> f64 {
    let bank = target_bank.max(0) as f64;
    if bank <= 0.0 {
        return 0.0;
    }
    let attacker = attacker_bank.max(0) as f64;
    let base = (bank / 2.5) / (attacker + bank) * 100.0;
    (base + skill_bonus + item_bonus).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rob_rate_balance_ratio() {
        // 10k cash vs 5k total worth: 10/15 ~ 66.7%
        let rate = rob_success_rate(10_000, 5_000, 0.0, 0.0);
        assert!((rate - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_rob_rate_zero_when_target_broke() {
        assert_eq!(rob_success_rate(0, 5_000, 50.0, 50.0), 0.0);
        assert_eq!(rob_success_rate(-200, 5_000, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_rob_rate_clamps() {
        assert_eq!(rob_success_rate(10_000, 0, 50.0, 0.0), 100.0);
        assert_eq!(rob_success_rate(1, 1_000_000, -50.0, 0.0), 0.0);
    }

    #[test]
    fn test_hack_rate_caps_at_forty_unboosted() {
        // With no attacker bank the base tops out at 100/2.5 = 40
        let rate = hack_success_rate(10_000, 0, 0.0, 0.0);
        assert!((rate - 40.0).abs() < 1e-9);
        assert!(hack_success_rate(10_000, 10_000, 0.0, 0.0) < 40.0);
    }

    #[test]
    fn test_hack_rate_zero_when_bank_empty() {
        assert_eq!(hack_success_rate(0, 0, 99.0, 0.0), 0.0);
    }
}
