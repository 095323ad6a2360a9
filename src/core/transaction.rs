//! Transaction handling for the ledger
//!
//! Transactions are plain transfer records: a sender, a receiver, an opaque
//! payload and a non-negative amount. There are no signatures; this is a
//! closed, single-writer simulation and authorship is taken on trust.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The distinguished system identity. It mints value (mining rewards) and is
/// never debited when a transaction is applied.
pub const SYSTEM_IDENTITY: &str = "SYSTEM";

/// Submission errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SubmitError {
    #[error("insufficient balance: {sender} has {balance}, needs {amount}")]
    InsufficientBalance {
        sender: String,
        balance: i64,
        amount: u64,
    },
}

/// A transfer record. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Sender identity
    pub sender: String,
    /// Receiver identity
    pub receiver: String,
    /// Opaque payload, not interpreted by the core
    pub data: Value,
    /// Transfer amount
    pub amount: u64,
    /// Creation time (epoch seconds)
    pub timestamp: i64,
}

impl Transaction {
    /// Create a new transaction stamped with the current time
    pub fn new(sender: &str, receiver: &str, data: Value, amount: u64) -> Self {
        Self {
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            data,
            amount,
            timestamp: Utc::now().timestamp(),
        }
    }

    /// Create a mining-reward transaction (SYSTEM -> miner)
    pub fn reward(miner: &str, amount: u64) -> Self {
        Self::new(SYSTEM_IDENTITY, miner, Value::from("Mining Reward"), amount)
    }

    /// Check whether the sender is the system identity
    pub fn is_system(&self) -> bool {
        self.sender == SYSTEM_IDENTITY
    }
}
