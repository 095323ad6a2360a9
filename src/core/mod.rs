//! Core ledger components
//!
//! This module contains the fundamental building blocks:
//! - Transactions (plain transfer records)
//! - Blocks (canonical digest and proof-of-work seal)
//! - Ledger (identity -> balance accumulator)
//! - Blockchain (chain management and validation)

pub mod block;
pub mod blockchain;
pub mod ledger;
pub mod transaction;

pub use block::{digest, Block, GENESIS_PREVIOUS_HASH};
pub use blockchain::{
    Blockchain, ChainConfig, ChainError, DEFAULT_DIFFICULTY, DEFAULT_MAX_BLOCK_TXS, MINING_REWARD,
};
pub use ledger::Ledger;
pub use transaction::{SubmitError, Transaction, SYSTEM_IDENTITY};
