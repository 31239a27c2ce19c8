//! # Domain Entities
//!
//! The will aggregate: beneficiary ledger, vault pair, timer fields, and the
//! execution guards. Membership and guardian lookups are map-backed, so the
//! "is beneficiary" / "is guardian" checks the phase rule relies on are O(1).

use crate::domain::errors::WillError;
use crate::domain::phase::ExecutionPhase;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use testament_types::{Address, Amount, ContentHash, Timestamp};
use testament_events::Payout;

/// One beneficiary entry, owned by exactly one will.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
    /// Receiving wallet.
    pub wallet: Address,
    /// Percentage share, 1..=100.
    pub share: u8,
    /// Whether this entry holds the guardian designation.
    pub guardian: bool,
}

/// Ordered beneficiary entries with a wallet index and the derived guardian.
///
/// Invariants: one entry per wallet, sum of shares <= 100, at most one entry
/// flagged guardian.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeneficiaryLedger {
    entries: Vec<Beneficiary>,
    #[serde(skip)]
    index: HashMap<Address, usize>,
    guardian_wallet: Option<Address>,
}

impl BeneficiaryLedger {
    /// Empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[Beneficiary] {
        &self.entries
    }

    /// Sum of all shares.
    #[must_use]
    pub fn total_shares(&self) -> u32 {
        self.entries.iter().map(|b| u32::from(b.share)).sum()
    }

    /// Whether `wallet` is a listed beneficiary.
    #[must_use]
    pub fn contains(&self, wallet: &Address) -> bool {
        self.index.contains_key(wallet)
    }

    /// The entry for `wallet`, if present.
    #[must_use]
    pub fn get(&self, wallet: &Address) -> Option<&Beneficiary> {
        self.index.get(wallet).map(|&i| &self.entries[i])
    }

    /// The wallet holding the guardian designation, if any.
    #[must_use]
    pub fn guardian_wallet(&self) -> Option<Address> {
        self.guardian_wallet
    }

    /// Append an entry.
    pub fn add(&mut self, wallet: Address, share: u8, guardian: bool) -> Result<(), WillError> {
        if self.index.contains_key(&wallet) {
            return Err(WillError::DuplicateBeneficiary(wallet));
        }
        if guardian && self.guardian_wallet.is_some() {
            return Err(WillError::GuardianConflict);
        }
        let total = self.total_shares() + u32::from(share);
        if total > 100 {
            return Err(WillError::ShareOverflow { total });
        }

        self.index.insert(wallet, self.entries.len());
        self.entries.push(Beneficiary {
            wallet,
            share,
            guardian,
        });
        if guardian {
            self.guardian_wallet = Some(wallet);
        }
        Ok(())
    }

    /// Replace share and guardian flag atomically.
    pub fn update(&mut self, wallet: Address, share: u8, guardian: bool) -> Result<(), WillError> {
        let pos = *self
            .index
            .get(&wallet)
            .ok_or_else(|| WillError::NotFound(format!("beneficiary {wallet}")))?;

        let old_share = u32::from(self.entries[pos].share);
        let total = self.total_shares() - old_share + u32::from(share);
        if total > 100 {
            return Err(WillError::ShareOverflow { total });
        }
        if guardian {
            if let Some(existing) = self.guardian_wallet {
                if existing != wallet {
                    return Err(WillError::GuardianConflict);
                }
            }
        }

        self.entries[pos].share = share;
        self.entries[pos].guardian = guardian;
        if guardian {
            self.guardian_wallet = Some(wallet);
        } else if self.guardian_wallet == Some(wallet) {
            self.guardian_wallet = None;
        }
        Ok(())
    }

    /// Remove an entry, clearing the guardian designation if it held it.
    pub fn remove(&mut self, wallet: Address) -> Result<(), WillError> {
        let pos = self
            .index
            .remove(&wallet)
            .ok_or_else(|| WillError::NotFound(format!("beneficiary {wallet}")))?;

        self.entries.remove(pos);
        for entry in &self.entries[pos..] {
            if let Some(i) = self.index.get_mut(&entry.wallet) {
                *i -= 1;
            }
        }
        if self.guardian_wallet == Some(wallet) {
            self.guardian_wallet = None;
        }
        Ok(())
    }

    /// Rebuild the wallet index after deserialization.
    pub fn rebuild_index(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, b)| (b.wallet, i))
            .collect();
    }
}

/// The two custody balances of one will.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultPair {
    /// Deposits only; never withdrawable by the testator.
    pub locked: Amount,
    /// Deposits and pre-execution withdrawals by the testator.
    pub flexible: Amount,
}

impl VaultPair {
    /// Combined balance across both vaults.
    #[must_use]
    pub fn total(&self) -> Amount {
        self.locked + self.flexible
    }

    /// Credit the locked vault. Returns the new balance.
    pub fn deposit_locked(&mut self, amount: Amount) -> Result<Amount, WillError> {
        if amount == 0 {
            return Err(WillError::InvalidAmount);
        }
        self.locked = self
            .locked
            .checked_add(amount)
            .ok_or(WillError::InvalidAmount)?;
        Ok(self.locked)
    }

    /// Credit the flexible vault. Returns the new balance.
    pub fn deposit_flexible(&mut self, amount: Amount) -> Result<Amount, WillError> {
        if amount == 0 {
            return Err(WillError::InvalidAmount);
        }
        self.flexible = self
            .flexible
            .checked_add(amount)
            .ok_or(WillError::InvalidAmount)?;
        Ok(self.flexible)
    }

    /// Debit the flexible vault. Returns the new balance.
    ///
    /// There is deliberately no debit path for the locked vault.
    pub fn withdraw_flexible(&mut self, amount: Amount) -> Result<Amount, WillError> {
        if amount == 0 {
            return Err(WillError::InvalidAmount);
        }
        if amount > self.flexible {
            return Err(WillError::InsufficientBalance {
                requested: amount,
                available: self.flexible,
            });
        }
        self.flexible -= amount;
        Ok(self.flexible)
    }

    /// Zero both balances. Only execution does this.
    pub fn zero(&mut self) {
        self.locked = 0;
        self.flexible = 0;
    }
}

/// Attachment metadata owned by a will. Independent of vault and share
/// invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Content hash of the pinned attachment.
    pub hash: ContentHash,
    /// Display name.
    pub name: String,
    /// Category label.
    pub category: String,
    /// Upload timestamp.
    pub uploaded_at: Timestamp,
}

/// One will per testator identity; the testator address is the will's key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Will {
    /// Owner, and the will's identity.
    pub testator: Address,
    /// Beneficiary ledger.
    pub beneficiaries: BeneficiaryLedger,
    /// Custody balances.
    pub vaults: VaultPair,
    /// Last dead-man's-switch renewal.
    pub last_check_in: Timestamp,
    /// Seconds the testator has between check-ins.
    pub check_in_period: u64,
    /// Seconds of guardian-only execution after the deadline.
    pub dispute_period: u64,
    /// Terminal flag; no mutation is permitted once set.
    pub executed: bool,
    /// Attached document references.
    pub documents: Vec<DocumentRef>,
}

impl Will {
    /// Create an active will with zero vaults and no beneficiaries.
    #[must_use]
    pub fn new(
        testator: Address,
        check_in_period: u64,
        dispute_period: u64,
        now: Timestamp,
    ) -> Self {
        Self {
            testator,
            beneficiaries: BeneficiaryLedger::new(),
            vaults: VaultPair::default(),
            last_check_in: now,
            check_in_period,
            dispute_period,
            executed: false,
            documents: Vec::new(),
        }
    }

    /// `last_check_in + check_in_period`.
    #[must_use]
    pub fn deadline(&self) -> Timestamp {
        self.last_check_in.saturating_add(self.check_in_period)
    }

    /// `deadline + dispute_period`.
    #[must_use]
    pub fn dispute_end(&self) -> Timestamp {
        self.deadline().saturating_add(self.dispute_period)
    }

    /// Phase of the phased-authorization rule at time `now`.
    #[must_use]
    pub fn phase(&self, now: Timestamp) -> ExecutionPhase {
        if now <= self.deadline() {
            ExecutionPhase::Locked
        } else if now <= self.dispute_end() {
            ExecutionPhase::Dispute
        } else {
            ExecutionPhase::Open
        }
    }

    fn ensure_not_executed(&self) -> Result<(), WillError> {
        if self.executed {
            return Err(WillError::WillExecuted);
        }
        Ok(())
    }

    /// Renew the dead-man's-switch timer.
    pub fn check_in(&mut self, now: Timestamp) -> Result<(), WillError> {
        self.ensure_not_executed()?;
        self.last_check_in = now;
        Ok(())
    }

    /// Append a beneficiary entry.
    pub fn add_beneficiary(
        &mut self,
        wallet: Address,
        share: u8,
        guardian: bool,
    ) -> Result<(), WillError> {
        self.ensure_not_executed()?;
        self.validate_wallet_and_share(&wallet, share)?;
        self.beneficiaries.add(wallet, share, guardian)
    }

    /// Replace a beneficiary's share and guardian flag.
    pub fn update_beneficiary(
        &mut self,
        wallet: Address,
        share: u8,
        guardian: bool,
    ) -> Result<(), WillError> {
        self.ensure_not_executed()?;
        self.validate_wallet_and_share(&wallet, share)?;
        self.beneficiaries.update(wallet, share, guardian)
    }

    /// Remove a beneficiary entry.
    pub fn remove_beneficiary(&mut self, wallet: Address) -> Result<(), WillError> {
        self.ensure_not_executed()?;
        self.beneficiaries.remove(wallet)
    }

    fn validate_wallet_and_share(&self, wallet: &Address, share: u8) -> Result<(), WillError> {
        if wallet.is_zero() {
            return Err(WillError::InvalidInput("zero identity".to_string()));
        }
        if *wallet == self.testator {
            return Err(WillError::InvalidInput(
                "testator cannot be a beneficiary".to_string(),
            ));
        }
        if !(1..=100).contains(&share) {
            return Err(WillError::InvalidInput(format!(
                "share {share} outside 1..=100"
            )));
        }
        Ok(())
    }

    /// Credit the locked vault. Returns the new balance.
    pub fn deposit_locked(&mut self, amount: Amount) -> Result<Amount, WillError> {
        self.ensure_not_executed()?;
        self.vaults.deposit_locked(amount)
    }

    /// Credit the flexible vault. Returns the new balance.
    pub fn deposit_flexible(&mut self, amount: Amount) -> Result<Amount, WillError> {
        self.ensure_not_executed()?;
        self.vaults.deposit_flexible(amount)
    }

    /// Debit the flexible vault. Returns the new balance.
    pub fn withdraw_flexible(&mut self, amount: Amount) -> Result<Amount, WillError> {
        self.ensure_not_executed()?;
        self.vaults.withdraw_flexible(amount)
    }

    /// Attach a document reference.
    pub fn add_document(
        &mut self,
        hash: ContentHash,
        name: String,
        category: String,
        now: Timestamp,
    ) -> Result<(), WillError> {
        self.ensure_not_executed()?;
        if self.documents.iter().any(|d| d.hash == hash) {
            return Err(WillError::InvalidInput(format!(
                "document {hash} already attached"
            )));
        }
        self.documents.push(DocumentRef {
            hash,
            name,
            category,
            uploaded_at: now,
        });
        Ok(())
    }

    /// Detach a document reference.
    pub fn remove_document(&mut self, hash: ContentHash) -> Result<(), WillError> {
        self.ensure_not_executed()?;
        let pos = self
            .documents
            .iter()
            .position(|d| d.hash == hash)
            .ok_or_else(|| WillError::NotFound(format!("document {hash}")))?;
        self.documents.remove(pos);
        Ok(())
    }

    /// Decide whether `caller` may execute at time `now`, per the phase
    /// table. Returns the phase the authorization was granted in.
    pub fn authorize_execution(
        &self,
        caller: &Address,
        now: Timestamp,
    ) -> Result<ExecutionPhase, WillError> {
        self.ensure_not_executed()?;
        match self.phase(now) {
            ExecutionPhase::Locked => Err(WillError::PhaseNotElapsed),
            ExecutionPhase::Dispute => {
                if self.beneficiaries.guardian_wallet() == Some(*caller) {
                    Ok(ExecutionPhase::Dispute)
                } else {
                    Err(WillError::Unauthorized(*caller))
                }
            }
            ExecutionPhase::Open => {
                if self.beneficiaries.contains(caller) {
                    Ok(ExecutionPhase::Open)
                } else {
                    Err(WillError::Unauthorized(*caller))
                }
            }
        }
    }

    /// Compute the payout plan: `floor(total * share / 100)` per entry.
    ///
    /// The remainder of the floor division across all entries is neither
    /// tracked nor redistributed (accepted dust). Fails `NoFunds` on empty
    /// vaults and `SharesIncomplete` unless shares sum to exactly 100.
    pub fn distribution(&self) -> Result<(Amount, Vec<Payout>), WillError> {
        let total = self.vaults.total();
        if total == 0 {
            return Err(WillError::NoFunds);
        }
        let shares = self.beneficiaries.total_shares();
        if shares != 100 {
            return Err(WillError::SharesIncomplete { total: shares });
        }

        let payouts: Vec<Payout> = self
            .beneficiaries
            .entries()
            .iter()
            .map(|b| Payout {
                wallet: b.wallet,
                amount: total * Amount::from(b.share) / 100,
            })
            .collect();
        let distributed = payouts.iter().map(|p| p.amount).sum();
        Ok((distributed, payouts))
    }

    /// Enter the terminal state: flag executed and zero both vaults.
    pub fn mark_executed(&mut self) {
        self.executed = true;
        self.vaults.zero();
    }
}
