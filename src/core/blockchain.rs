//! Blockchain implementation
//!
//! The main chain aggregate: an append-only sequence of blocks plus the
//! balance ledger derived from them. There is exactly one mutator, since
//! this is a closed, single-writer simulation, so no locking is involved.

use crate::core::block::Block;
use crate::core::ledger::Ledger;
use crate::core::transaction::{SubmitError, Transaction, SYSTEM_IDENTITY};
use crate::mining::Mempool;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Default proof-of-work difficulty (leading zero hex digits)
pub const DEFAULT_DIFFICULTY: u32 = 3;

/// Default maximum transactions per block
pub const DEFAULT_MAX_BLOCK_TXS: usize = 5;

/// Fixed mining reward per sealed block
pub const MINING_REWARD: u64 = 10;

/// Chain-related errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChainError {
    #[error("block index {got} does not follow tip index {tip}")]
    IndexMismatch { tip: u64, got: u64 },
    #[error("previous-hash link mismatch at block {0}")]
    LinkMismatch(u64),
    #[error("hash mismatch at block {0}")]
    HashMismatch(u64),
}

/// Chain configuration
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Required number of leading zero hex digits in a sealed block's hash
    pub difficulty: u32,
    /// Maximum number of pending transactions batched into one block
    pub max_block_txs: usize,
    /// Reward credited to the miner per sealed block
    pub mining_reward: u64,
    /// Recheck running balances transaction-by-transaction when building a
    /// batch, dropping transactions that would overdraw the sender. Off by
    /// default: the stock behavior knowingly admits batch overdrafts.
    pub strict_spend: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            max_block_txs: DEFAULT_MAX_BLOCK_TXS,
            mining_reward: MINING_REWARD,
            strict_spend: false,
        }
    }
}

/// The chain aggregate: blocks plus the ledger accumulated from them
#[derive(Debug, Clone)]
pub struct Blockchain {
    /// The chain of blocks; the first element is always the genesis block
    pub blocks: Vec<Block>,
    /// Chain configuration
    pub config: ChainConfig,
    /// Balance ledger, mutated only by applying mined blocks (plus the
    /// eager mining-reward credit)
    pub ledger: Ledger,
    /// Transactions accepted but not yet mined, in arrival order
    pub pending: Mempool,
}

impl Blockchain {
    /// Create a new chain holding only the genesis block
    pub fn new() -> Self {
        Self::with_config(ChainConfig::default())
    }

    /// Create a chain with a custom difficulty
    pub fn with_difficulty(difficulty: u32) -> Self {
        Self::with_config(ChainConfig {
            difficulty,
            ..ChainConfig::default()
        })
    }

    /// Create a chain with a full custom configuration
    pub fn with_config(config: ChainConfig) -> Self {
        Self {
            blocks: vec![Block::genesis()],
            config,
            ledger: Ledger::new(),
            pending: Mempool::new(),
        }
    }

    /// Reassemble a chain from previously persisted parts. The ledger must
    /// already reflect the given blocks (see [`Ledger::replay`]); the pending
    /// queue starts empty, it is not persisted.
    pub fn from_parts(blocks: Vec<Block>, config: ChainConfig, ledger: Ledger) -> Self {
        Self {
            blocks,
            config,
            ledger,
            pending: Mempool::new(),
        }
    }

    /// The latest block
    pub fn latest_block(&self) -> &Block {
        self.blocks
            .last()
            .expect("chain always holds at least the genesis block")
    }

    /// Chain height (genesis is height 0)
    pub fn height(&self) -> u64 {
        self.blocks.len() as u64 - 1
    }

    /// Get a block by index
    pub fn get_block(&self, index: u64) -> Option<&Block> {
        self.blocks.get(index as usize)
    }

    /// Balance of an identity, 0 if never referenced
    pub fn balance_of(&self, identity: &str) -> i64 {
        self.ledger.balance_of(identity)
    }

    /// Number of transactions waiting to be mined
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Submit a transfer for inclusion in a future block.
    ///
    /// This is the only affordability gate. The check runs against the
    /// ledger as it stands right now and the ledger itself is never touched
    /// here; transactions already pending from the same sender are invisible
    /// to it, so a batch can jointly overdraw an account once mined. A
    /// rejection is terminal for this call.
    pub fn submit(
        &mut self,
        sender: &str,
        receiver: &str,
        data: Value,
        amount: u64,
    ) -> Result<(), SubmitError> {
        if amount > 0 && sender != SYSTEM_IDENTITY {
            let balance = self.ledger.balance_of(sender);
            if balance < amount as i64 {
                log::warn!(
                    "rejected transfer {} -> {}: balance {} < amount {}",
                    sender,
                    receiver,
                    balance,
                    amount
                );
                return Err(SubmitError::InsufficientBalance {
                    sender: sender.to_string(),
                    balance,
                    amount,
                });
            }
        }

        let tx = Transaction::new(sender, receiver, data, amount);
        log::info!("queued transfer {} -> {} ({})", sender, receiver, amount);
        self.pending.push(tx);
        Ok(())
    }

    /// Queue a transaction directly, skipping the affordability gate.
    /// Used for system-minted reward transactions.
    pub fn enqueue(&mut self, tx: Transaction) {
        self.pending.push(tx);
    }

    /// Drain up to `max_block_txs` transactions from the pending queue, in
    /// arrival order, for inclusion in the next block.
    ///
    /// With `strict_spend` enabled, a running balance per identity is kept
    /// across the batch and any transaction that would overdraw its sender
    /// is dropped from both the batch and the queue.
    pub fn take_batch(&mut self) -> Vec<Transaction> {
        let mut batch = Vec::with_capacity(self.config.max_block_txs);
        let mut running: HashMap<String, i64> = HashMap::new();

        while batch.len() < self.config.max_block_txs {
            let tx = match self.pending.pop() {
                Some(tx) => tx,
                None => break,
            };

            if self.config.strict_spend {
                if !tx.is_system() && tx.amount > 0 {
                    let balance = *running
                        .entry(tx.sender.clone())
                        .or_insert_with(|| self.ledger.balance_of(&tx.sender));
                    if balance < tx.amount as i64 {
                        log::warn!(
                            "dropped transfer {} -> {}: amount {} would overdraw batch balance {}",
                            tx.sender,
                            tx.receiver,
                            tx.amount,
                            balance
                        );
                        continue;
                    }
                }
                if !tx.is_system() {
                    *running
                        .entry(tx.sender.clone())
                        .or_insert_with(|| self.ledger.balance_of(&tx.sender)) -= tx.amount as i64;
                }
                *running
                    .entry(tx.receiver.clone())
                    .or_insert_with(|| self.ledger.balance_of(&tx.receiver)) += tx.amount as i64;
            }

            batch.push(tx);
        }
        batch
    }

    /// Append a sealed block. The block must extend the current tip; the
    /// ledger is deliberately NOT touched here; callers invoke
    /// `ledger.apply_block` themselves (the miner does both).
    pub fn append(&mut self, block: Block) -> Result<(), ChainError> {
        let tip = self.latest_block();

        if block.index != tip.index + 1 {
            return Err(ChainError::IndexMismatch {
                tip: tip.index,
                got: block.index,
            });
        }
        if block.previous_hash != tip.hash {
            return Err(ChainError::LinkMismatch(block.index));
        }

        log::debug!("appending block {} ({})", block.index, block.hash);
        self.blocks.push(block);
        Ok(())
    }

    /// Validate the whole chain. Walks from index 1; for each block first
    /// recomputes the hash against the stored one, then checks the link to
    /// the predecessor. Short-circuits on the first failure, reporting its
    /// index and kind. Read-only; the genesis block is never checked
    /// against a predecessor.
    pub fn validate(&self) -> Result<(), ChainError> {
        for i in 1..self.blocks.len() {
            let current = &self.blocks[i];
            let previous = &self.blocks[i - 1];

            if !current.verify_hash() {
                return Err(ChainError::HashMismatch(current.index));
            }
            if current.previous_hash != previous.hash {
                return Err(ChainError::LinkMismatch(current.index));
            }
        }
        Ok(())
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}
