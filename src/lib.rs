//! Hashledger: a single-node proof-of-work transaction ledger
//!
//! A hash-chained ledger simulation: participants submit transfer records,
//! records are batched into blocks, each block is sealed by a proof-of-work
//! nonce search and linked to its predecessor by hash, and a validator
//! re-derives every hash to detect tampering. Features:
//! - Canonical SHA-256 block digests over sorted-key JSON
//! - Proof-of-work sealing with a leading-zero-hex-digit target
//! - Balance ledger derived from mined transactions
//! - Chain validation with per-block failure reporting
//! - JSON persistence with opt-in verification on load
//!
//! # Example
//!
//! ```rust
//! use hashledger::core::Blockchain;
//! use hashledger::mining::Miner;
//! use serde_json::json;
//!
//! // Create a chain and seed a balance
//! let mut chain = Blockchain::with_difficulty(1);
//! chain.ledger.credit("alice", 100);
//!
//! // Submit a transfer and mine it into a block
//! chain.submit("alice", "bob", json!("invoice #42"), 10).unwrap();
//! let miner = Miner::new("pool-1");
//! let (block, stats) = miner.mine_pending(&mut chain).unwrap().unwrap();
//! println!("Sealed block {} in {}ms", block.index, stats.time_ms);
//!
//! assert_eq!(chain.balance_of("alice"), 90);
//! assert_eq!(chain.balance_of("bob"), 10);
//! assert!(chain.validate().is_ok());
//! ```

pub mod cli;
pub mod core;
pub mod crypto;
pub mod mining;
pub mod storage;

// Re-export commonly used types
pub use crate::core::{
    Block, Blockchain, ChainConfig, ChainError, Ledger, SubmitError, Transaction,
    DEFAULT_DIFFICULTY, SYSTEM_IDENTITY,
};
pub use crate::mining::{Mempool, Miner, MinerError, MiningStats};
pub use crate::storage::{Storage, StorageConfig, StorageError};
