//! CLI commands for the ledger
//!
//! Implements the command handlers for the CLI binary. Console output is a
//! side channel; all state changes go through the chain aggregate and the
//! storage gateway.

use crate::core::{Blockchain, ChainError};
use crate::mining::Miner;
use crate::storage::{Storage, StorageConfig};
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub chain: Blockchain,
    pub storage: Storage,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize application state, loading the saved chain or creating a
    /// fresh one
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage_config = StorageConfig {
            data_dir: data_dir.clone(),
            ..Default::default()
        };
        let storage = Storage::new(storage_config)?;

        let chain = if storage.exists() {
            println!("📂 Loading existing chain...");
            storage.load()?
        } else {
            println!("🆕 Creating new chain...");
            let chain = Blockchain::new();
            storage.save(&chain)?;
            chain
        };

        Ok(Self {
            chain,
            storage,
            data_dir,
        })
    }

    /// Save the current chain
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.chain)?;
        Ok(())
    }
}

/// Initialize a new chain
pub fn cmd_init(data_dir: &Path, difficulty: Option<u32>) -> CliResult<()> {
    let storage_config = StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    };
    let storage = Storage::new(storage_config)?;

    if storage.exists() {
        println!("⚠️  Chain already exists at {:?}", data_dir);
        println!("   Delete the data directory to reinitialize.");
        return Ok(());
    }

    let chain = match difficulty {
        Some(d) => Blockchain::with_difficulty(d),
        None => Blockchain::new(),
    };
    storage.save(&chain)?;

    println!("✅ Chain initialized!");
    println!("   📁 Data directory: {:?}", data_dir);
    println!("   🔧 Difficulty: {}", chain.config.difficulty);
    println!("   🧱 Genesis block hash: {}", chain.latest_block().hash);

    Ok(())
}

/// Run the seeded end-to-end scenario and save the resulting chain
pub fn cmd_demo(state: &mut AppState) -> CliResult<()> {
    let chain = &mut state.chain;
    let miner = Miner::new("pool-1");

    println!("🌱 Seeding balances: alice 100, bob 50");
    chain.ledger.credit("alice", 100);
    chain.ledger.credit("bob", 50);

    chain.submit("alice", "carol", json!("invoice #1001"), 10)?;
    chain.submit("alice", "dave", json!("invoice #1002"), 5)?;

    println!("⛏️  Mining first batch...");
    mine_and_report(&miner, chain)?;

    chain.submit("bob", "carol", json!("invoice #1003"), 15)?;

    println!("⛏️  Mining second batch...");
    mine_and_report(&miner, chain)?;

    println!("\n💰 Balances:");
    let mut balances: Vec<_> = chain.ledger.balances().iter().collect();
    balances.sort();
    for (identity, balance) in balances {
        println!("   {:10} {}", identity, balance);
    }

    match chain.validate() {
        Ok(()) => println!("\n🔒 Chain valid: true"),
        Err(e) => println!("\n🔒 Chain valid: false ({})", e),
    }

    state.save()?;
    println!("💾 Chain saved to {:?}", state.data_dir);
    Ok(())
}

fn mine_and_report(miner: &Miner, chain: &mut Blockchain) -> Result<(), ChainError> {
    if let Some((block, stats)) = miner.mine_pending(chain)? {
        println!(
            "   Block {} sealed: {} txs, {} attempts, {}ms",
            block.index,
            block.tx_count(),
            stats.hash_attempts,
            stats.time_ms
        );
    } else {
        println!("   Nothing to mine.");
    }
    Ok(())
}

/// Display the chain block by block
pub fn cmd_show(state: &AppState) -> CliResult<()> {
    println!("🧱 Chain height: {}", state.chain.height());
    for block in &state.chain.blocks {
        let when = Utc
            .timestamp_opt(block.timestamp, 0)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| block.timestamp.to_string());

        println!("\n   Block {}", block.index);
        println!("   ├─ Hash: {}", block.hash);
        println!("   ├─ Previous: {}", block.previous_hash);
        println!("   ├─ Time: {}", when);
        println!("   ├─ Nonce: {}", block.nonce);
        println!("   └─ Transactions: {}", block.tx_count());
        for tx in &block.transactions {
            println!("      └─ {} -> {} ({})", tx.sender, tx.receiver, tx.amount);
        }
    }
    Ok(())
}

/// Show the balance of an identity
pub fn cmd_balance(state: &AppState, identity: &str) -> CliResult<()> {
    println!("💰 Balance for {}: {}", identity, state.chain.balance_of(identity));
    Ok(())
}

/// Validate the chain and report the result
pub fn cmd_validate(state: &AppState) -> CliResult<()> {
    match state.chain.validate() {
        Ok(()) => println!("✅ Chain is valid ({} blocks)", state.chain.blocks.len()),
        Err(e) => println!("❌ Chain is invalid: {}", e),
    }
    Ok(())
}
