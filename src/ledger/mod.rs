//! Currency ledger boundary
//!
//! The persistent balance store is an external collaborator; the engine only
//! sees these atomic mutation primitives. Every mutation carries a `reason`
//! string so the audit trail can attribute it. Theft and fines go through
//! `force_debit`/`debit_from_total`, which always succeed and may drive a
//! balance negative - the application layer never does read-modify-write.

use std::sync::Mutex;

use ahash::AHashMap;

use crate::core::{CommunityId, Result, UserId};

/// A user's holdings: liquid cash plus banked reserve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Balance {
    pub liquid: i64,
    pub reserve: i64,
}

impl Balance {
    pub fn new(liquid: i64, reserve: i64) -> Self {
        Self { liquid, reserve }
    }

    pub fn total(&self) -> i64 {
        self.liquid + self.reserve
    }
}

pub trait Ledger: Send + Sync {
    fn balance(&self, community: CommunityId, user: UserId) -> Result<Balance>;

    /// Add to the user's liquid cash
    fn credit(&self, community: CommunityId, user: UserId, amount: i64, reason: &str)
        -> Result<()>;

    /// Voluntary spend from liquid cash; returns false if insufficient
    fn debit(&self, community: CommunityId, user: UserId, amount: i64, reason: &str)
        -> Result<bool>;

    /// Remove from liquid cash unconditionally; may drive the balance negative
    fn force_debit(
        &self,
        community: CommunityId,
        user: UserId,
        amount: i64,
        reason: &str,
    ) -> Result<()>;

    /// Remove drawing from liquid first, then reserve; the reserve side may
    /// go negative to cover any remainder
    fn debit_from_total(
        &self,
        community: CommunityId,
        user: UserId,
        amount: i64,
        reason: &str,
    ) -> Result<()>;
}

/// In-process ledger used by tests and the demo binary
///
/// All mutation happens under one lock per call, mirroring the atomic
/// increment/decrement contract of the real store.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    accounts: Mutex<AHashMap<(CommunityId, UserId), Balance>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account with a starting balance
    pub fn open_account(&self, community: CommunityId, user: UserId, balance: Balance) {
        self.accounts.lock().unwrap().insert((community, user), balance);
    }
}

impl Ledger for MemoryLedger {
    fn balance(&self, community: CommunityId, user: UserId) -> Result<Balance> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(&(community, user))
            .copied()
            .unwrap_or_default())
    }

    fn credit(
        &self,
        community: CommunityId,
        user: UserId,
        amount: i64,
        reason: &str,
    ) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        let entry = accounts.entry((community, user)).or_default();
        entry.liquid += amount;
        tracing::debug!(user = user.0, amount, reason, "credit");
        Ok(())
    }

    fn debit(
        &self,
        community: CommunityId,
        user: UserId,
        amount: i64,
        reason: &str,
    ) -> Result<bool> {
        let mut accounts = self.accounts.lock().unwrap();
        let entry = accounts.entry((community, user)).or_default();
        if entry.liquid < amount {
            return Ok(false);
        }
        entry.liquid -= amount;
        tracing::debug!(user = user.0, amount, reason, "debit");
        Ok(true)
    }

    fn force_debit(
        &self,
        community: CommunityId,
        user: UserId,
        amount: i64,
        reason: &str,
    ) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        let entry = accounts.entry((community, user)).or_default();
        entry.liquid -= amount;
        tracing::debug!(user = user.0, amount, reason, "force_debit");
        Ok(())
    }

    fn debit_from_total(
        &self,
        community: CommunityId,
        user: UserId,
        amount: i64,
        reason: &str,
    ) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        let entry = accounts.entry((community, user)).or_default();
        let from_liquid = amount.min(entry.liquid.max(0));
        entry.liquid -= from_liquid;
        entry.reserve -= amount - from_liquid;
        tracing::debug!(user = user.0, amount, reason, "debit_from_total");
        Ok(())
    }
}
