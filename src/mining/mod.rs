//! Mining module: the pending-transaction queue and mining orchestration

pub mod mempool;
pub mod miner;

pub use mempool::Mempool;
pub use miner::{seal_with_cancel, Miner, MinerError, MiningStats};
