//! Balance ledger
//!
//! Maps participant identity to a signed balance. The ledger is an
//! accumulator over mined blocks: it is mutated only by [`Ledger::apply_block`]
//! (plus the eager mining-reward credit, see the mining module) and can be
//! rebuilt from scratch by replaying the chain.

use crate::core::block::Block;
use crate::core::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identity -> balance mapping. Keys are created on first reference; an
/// absent key implies balance 0. Balances are signed: the submission-time
/// affordability check does not see other pending transactions from the same
/// sender, so a batch can legitimately overdraw an account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    balances: HashMap<String, i64>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of an identity, 0 if never referenced
    pub fn balance_of(&self, identity: &str) -> i64 {
        self.balances.get(identity).copied().unwrap_or(0)
    }

    /// Credit an identity. Also used to seed simulation balances.
    pub fn credit(&mut self, identity: &str, amount: u64) {
        *self.balances.entry(identity.to_string()).or_insert(0) += amount as i64;
    }

    /// Debit an identity. May drive the balance negative.
    pub fn debit(&mut self, identity: &str, amount: u64) {
        *self.balances.entry(identity.to_string()).or_insert(0) -= amount as i64;
    }

    /// Apply a single transaction: debit the sender (unless it is the
    /// system identity), credit the receiver.
    pub fn apply(&mut self, tx: &Transaction) {
        if !tx.is_system() {
            self.debit(&tx.sender, tx.amount);
        }
        self.credit(&tx.receiver, tx.amount);
    }

    /// Apply every transaction of a mined block, in sequence order.
    /// Irreversible; there is no compensating rollback.
    pub fn apply_block(&mut self, block: &Block) {
        for tx in &block.transactions {
            self.apply(tx);
        }
    }

    /// Rebuild a ledger by replaying a chain of blocks in order
    pub fn replay<'a, I: IntoIterator<Item = &'a Block>>(blocks: I) -> Self {
        let mut ledger = Self::new();
        for block in blocks {
            ledger.apply_block(block);
        }
        ledger
    }

    /// All known identities with their balances
    pub fn balances(&self) -> &HashMap<String, i64> {
        &self.balances
    }
}
