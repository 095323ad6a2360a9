//! Storage module for chain persistence

pub mod persistence;

pub use persistence::{
    load_from_file, save_to_file, Storage, StorageConfig, StorageError, STORAGE_VERSION,
};
