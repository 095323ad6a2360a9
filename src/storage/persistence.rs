//! Chain persistence gateway
//!
//! Saves the chain as a versioned JSON document and loads it back. Loading
//! trusts the stored hash of every block verbatim and never recomputes it, so
//! a tampered file loads without complaint; [`Storage::load_verified`] runs
//! validation up front for callers that want integrity checked at load time.

use crate::core::{Block, Blockchain, ChainConfig, ChainError, Ledger};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current persisted-document version
pub const STORAGE_VERSION: u32 = 1;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed chain document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported chain document version {0}")]
    UnsupportedVersion(u32),
    #[error("persisted chain fails validation: {0}")]
    CorruptChain(#[from] ChainError),
    #[error("no saved chain at {0}")]
    NotFound(PathBuf),
}

/// On-disk layout of a persisted chain.
///
/// Every field is required; a document missing any of them fails to load
/// rather than being filled with defaults. The version field is reserved for
/// forward compatibility.
#[derive(Debug, Serialize, Deserialize)]
struct ChainDocument {
    version: u32,
    difficulty: u32,
    blocks: Vec<Block>,
}

impl ChainDocument {
    fn from_chain(chain: &Blockchain) -> Self {
        Self {
            version: STORAGE_VERSION,
            difficulty: chain.config.difficulty,
            blocks: chain.blocks.clone(),
        }
    }

    /// Rebuild the chain aggregate. Stored hashes are taken verbatim; the
    /// ledger is derived by replaying the blocks and the pending queue
    /// starts empty.
    fn into_chain(self) -> Result<Blockchain, StorageError> {
        if self.version != STORAGE_VERSION {
            return Err(StorageError::UnsupportedVersion(self.version));
        }
        let ledger = Ledger::replay(&self.blocks);
        let config = ChainConfig {
            difficulty: self.difficulty,
            ..ChainConfig::default()
        };
        Ok(Blockchain::from_parts(self.blocks, config, ledger))
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub chain_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".hashledger_data"),
            chain_file: "chain.json".to_string(),
        }
    }
}

/// Chain storage manager
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager, creating the data directory if needed
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    /// Create with default configuration
    pub fn with_defaults() -> Result<Self, StorageError> {
        Self::new(StorageConfig::default())
    }

    fn chain_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.chain_file)
    }

    /// Save the chain to disk. Writes to a temporary file first, then
    /// renames it over the target.
    pub fn save(&self, chain: &Blockchain) -> Result<(), StorageError> {
        let temp_path = self.config.data_dir.join("chain.tmp");
        let file = fs::File::create(&temp_path)?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, &ChainDocument::from_chain(chain))?;
        fs::rename(&temp_path, self.chain_path())?;
        Ok(())
    }

    /// Load the chain from disk, trusting stored hashes verbatim
    pub fn load(&self) -> Result<Blockchain, StorageError> {
        let path = self.chain_path();
        if !path.exists() {
            return Err(StorageError::NotFound(path));
        }

        let file = fs::File::open(&path)?;
        let reader = BufReader::new(file);
        let document: ChainDocument = serde_json::from_reader(reader)?;
        document.into_chain()
    }

    /// Load the chain and validate it before handing it out. Rejects files
    /// that plain [`Storage::load`] would accept.
    pub fn load_verified(&self) -> Result<Blockchain, StorageError> {
        let chain = self.load()?;
        chain.validate()?;
        Ok(chain)
    }

    /// Check if a saved chain exists
    pub fn exists(&self) -> bool {
        self.chain_path().exists()
    }

    /// Delete the saved chain
    pub fn delete(&self) -> Result<(), StorageError> {
        let path = self.chain_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Save a chain to a specific file path
pub fn save_to_file(chain: &Blockchain, path: &Path) -> Result<(), StorageError> {
    let file = fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &ChainDocument::from_chain(chain))?;
    Ok(())
}

/// Load a chain from a specific file path
pub fn load_from_file(path: &Path) -> Result<Blockchain, StorageError> {
    if !path.exists() {
        return Err(StorageError::NotFound(path.to_path_buf()));
    }
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    let document: ChainDocument = serde_json::from_reader(reader)?;
    document.into_chain()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mining::Miner;
    use serde_json::json;

    fn mined_chain() -> Blockchain {
        let mut chain = Blockchain::with_difficulty(1);
        chain.ledger.credit("alice", 100);
        chain.submit("alice", "bob", json!("x"), 10).unwrap();
        Miner::new("m").mine_pending(&mut chain).unwrap().unwrap();
        chain
    }

    fn test_storage(dir: &Path) -> Storage {
        Storage::new(StorageConfig {
            data_dir: dir.to_path_buf(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_round_trip_preserves_every_field() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(temp_dir.path());
        let chain = mined_chain();

        storage.save(&chain).unwrap();
        assert!(storage.exists());

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.blocks, chain.blocks);
        assert_eq!(loaded.config.difficulty, chain.config.difficulty);
    }

    #[test]
    fn test_load_rebuilds_ledger_from_blocks() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(temp_dir.path());
        let chain = mined_chain();
        storage.save(&chain).unwrap();

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.balance_of("alice"), -10);
        assert_eq!(loaded.balance_of("bob"), 10);
        // the eager reward credit and the queued reward transaction live
        // outside the chain, so neither survives a reload
        assert_eq!(loaded.balance_of("m"), 0);
        assert_eq!(loaded.pending_count(), 0);
    }

    #[test]
    fn test_plain_load_trusts_tampered_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(temp_dir.path());
        storage.save(&mined_chain()).unwrap();

        let path = temp_dir.path().join("chain.json");
        let mut doc: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        doc["blocks"][1]["transactions"][0]["amount"] = json!(9_999);
        fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.blocks[1].transactions[0].amount, 9_999);

        assert!(matches!(
            storage.load_verified(),
            Err(StorageError::CorruptChain(ChainError::HashMismatch(1)))
        ));
    }

    #[test]
    fn test_load_verified_accepts_untampered_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(temp_dir.path());
        storage.save(&mined_chain()).unwrap();

        assert!(storage.load_verified().is_ok());
    }

    #[test]
    fn test_missing_field_fails_loudly() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(temp_dir.path());

        let path = temp_dir.path().join("chain.json");
        fs::write(
            &path,
            r#"{"version":1,"difficulty":1,"blocks":[{"index":0}]}"#,
        )
        .unwrap();

        assert!(matches!(storage.load(), Err(StorageError::Malformed(_))));
    }

    #[test]
    fn test_unsupported_version_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(temp_dir.path());
        storage.save(&mined_chain()).unwrap();

        let path = temp_dir.path().join("chain.json");
        let mut doc: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        doc["version"] = json!(99);
        fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();

        assert!(matches!(
            storage.load(),
            Err(StorageError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn test_load_without_file_is_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(temp_dir.path());

        assert!(!storage.exists());
        assert!(matches!(storage.load(), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_level_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("export.json");
        let chain = mined_chain();

        save_to_file(&chain, &path).unwrap();
        let loaded = load_from_file(&path).unwrap();
        assert_eq!(loaded.blocks, chain.blocks);
    }
}
