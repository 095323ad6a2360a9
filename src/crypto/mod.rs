//! Cryptographic utilities for the ledger
//!
//! This module provides:
//! - SHA-256 hashing
//! - Proof-of-work difficulty checks

pub mod hash;

pub use hash::{meets_difficulty, sha256, sha256_hex};
