//! Block implementation for the ledger chain
//!
//! A block carries an ordered batch of transactions plus the linkage and
//! proof-of-work fields. Its hash is a SHA-256 digest over a canonical JSON
//! serialization of the core fields, so the same logical content always
//! yields the same digest regardless of construction order.

use crate::core::transaction::Transaction;
use crate::crypto::{meets_difficulty, sha256_hex};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Previous-hash sentinel carried by the genesis block
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// A block in the chain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Block {
    /// Block index (position in the chain)
    pub index: u64,
    /// Ordered transactions; ledger effects apply in sequence order
    pub transactions: Vec<Transaction>,
    /// Block creation timestamp (epoch seconds)
    pub timestamp: i64,
    /// Hash of the previous block
    pub previous_hash: String,
    /// Nonce found by the proof-of-work search
    pub nonce: u64,
    /// Block hash (cached, fixed once sealed)
    pub hash: String,
}

/// Canonical digest over a block's core fields.
///
/// The fields are assembled into a JSON object and serialized with object
/// keys in sorted order at every nesting level (serde_json's default map is
/// a BTreeMap), then hashed with SHA-256 and hex-encoded. Pure and stable
/// across process restarts.
pub fn digest(
    index: u64,
    transactions: &[Transaction],
    timestamp: i64,
    previous_hash: &str,
    nonce: u64,
) -> String {
    let payload = json!({
        "index": index,
        "transactions": transactions,
        "timestamp": timestamp,
        "previous_hash": previous_hash,
        "nonce": nonce,
    });
    sha256_hex(payload.to_string().as_bytes())
}

impl Block {
    /// Create a new unsealed block stamped with the current time.
    /// The hash is computed for the initial nonce of 0.
    pub fn new(index: u64, previous_hash: String, transactions: Vec<Transaction>) -> Self {
        let timestamp = Utc::now().timestamp();
        let hash = digest(index, &transactions, timestamp, &previous_hash, 0);
        Self {
            index,
            transactions,
            timestamp,
            previous_hash,
            nonce: 0,
            hash,
        }
    }

    /// Create the genesis block: index 0, no transactions, sentinel
    /// previous hash. Exempt from the proof-of-work target.
    pub fn genesis() -> Self {
        Self::new(0, GENESIS_PREVIOUS_HASH.to_string(), Vec::new())
    }

    /// Recompute the digest from the block's current fields
    pub fn compute_hash(&self) -> String {
        digest(
            self.index,
            &self.transactions,
            self.timestamp,
            &self.previous_hash,
            self.nonce,
        )
    }

    /// Seal the block: starting from nonce 0, recompute the hash while
    /// incrementing the nonce until the first `difficulty` hex digits are
    /// all `'0'`. Returns the number of hash attempts.
    ///
    /// Unbounded and blocking; for a cancellable variant see
    /// [`crate::mining::seal_with_cancel`].
    pub fn seal(&mut self, difficulty: u32) -> u64 {
        self.nonce = 0;
        self.hash = self.compute_hash();

        let mut attempts = 1u64;
        while !meets_difficulty(&self.hash, difficulty) {
            self.nonce += 1;
            self.hash = self.compute_hash();
            attempts += 1;
        }
        attempts
    }

    /// Check whether the stored hash matches a recomputation from the
    /// current fields
    pub fn verify_hash(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Check whether the stored hash satisfies the difficulty target
    pub fn satisfies_difficulty(&self, difficulty: u32) -> bool {
        meets_difficulty(&self.hash, difficulty)
    }

    /// Number of transactions in this block
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }
}
