//! Block construction and proof-of-work
//!
//! A block seals its fields with a SHA-256 hash that must carry
//! `difficulty` leading zero bits. Mining is a blocking nonce search;
//! the difficulty re-adjusts on every attempt from the elapsed time
//! since the predecessor, so the chain self-regulates toward the
//! configured mine rate.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::ChainConfig;
use crate::core::transaction::Transaction;
use crate::crypto::{hex_meets_difficulty, sha256_hex};

/// One link of the chain. Immutable once mined; a chain rewrite discards
/// blocks, it never edits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Creation time, milliseconds since epoch
    pub timestamp: i64,
    /// Hash of the predecessor block
    pub last_hash: String,
    /// This block's own seal over all other fields
    pub hash: String,
    /// Transactions carried by the block
    pub data: Vec<Transaction>,
    /// Proof-of-work search counter
    pub nonce: u64,
    /// Leading zero bits required of `hash`
    pub difficulty: u32,
}

impl Block {
    /// The fixed genesis block. Built from the configured literal, never
    /// mined, and exempt from the proof-of-work predicate.
    pub fn genesis(config: &ChainConfig) -> Self {
        let genesis = &config.genesis;
        Self {
            timestamp: genesis.timestamp,
            last_hash: genesis.last_hash.clone(),
            hash: genesis.hash.clone(),
            data: Vec::new(),
            nonce: genesis.nonce,
            difficulty: genesis.difficulty,
        }
    }

    /// Mine a block on top of `last_block`. Blocks until a qualifying
    /// nonce is found; expected attempts grow exponentially with
    /// difficulty.
    pub fn mine(config: &ChainConfig, last_block: &Block, data: Vec<Transaction>) -> Self {
        Self::search(config, last_block, data, u64::MAX)
            .expect("nonce space exhausted before finding a valid hash")
    }

    /// Mining with an attempt ceiling; `None` when the ceiling is
    /// reached without a qualifying hash.
    pub fn mine_bounded(
        config: &ChainConfig,
        last_block: &Block,
        data: Vec<Transaction>,
        max_attempts: u64,
    ) -> Option<Self> {
        Self::search(config, last_block, data, max_attempts)
    }

    fn search(
        config: &ChainConfig,
        last_block: &Block,
        data: Vec<Transaction>,
        max_attempts: u64,
    ) -> Option<Self> {
        let last_hash = last_block.hash.clone();
        let mut nonce: u64 = 0;

        while nonce < max_attempts {
            nonce += 1;
            // Timestamp and difficulty are live: every attempt re-reads
            // the clock and re-runs the adjustment rule against it.
            let timestamp = Utc::now().timestamp_millis();
            let difficulty = Self::adjust_difficulty(config, last_block, timestamp);
            let hash = Self::compute_hash(timestamp, &last_hash, &data, nonce, difficulty);

            if hex_meets_difficulty(&hash, difficulty) {
                return Some(Self {
                    timestamp,
                    last_hash,
                    hash,
                    data,
                    nonce,
                    difficulty,
                });
            }
        }

        None
    }

    /// Difficulty adjustment rule: floor of 1; one step down when the
    /// elapsed interval exceeds the mine rate, one step up otherwise.
    /// Reacts only to the single most recent inter-block interval.
    pub fn adjust_difficulty(config: &ChainConfig, original: &Block, timestamp: i64) -> u32 {
        let difficulty = original.difficulty;

        if difficulty < 1 {
            return 1;
        }

        if timestamp - original.timestamp > config.mine_rate_ms {
            difficulty.saturating_sub(1).max(1)
        } else {
            difficulty + 1
        }
    }

    /// SHA-256 over the order-sensitive preimage of every sealed field.
    /// Transactions are serialized deterministically as JSON.
    pub fn compute_hash(
        timestamp: i64,
        last_hash: &str,
        data: &[Transaction],
        nonce: u64,
        difficulty: u32,
    ) -> String {
        let data_json = serde_json::to_string(data).expect("serialize transactions");
        let preimage = format!("{timestamp}:{last_hash}:{data_json}:{nonce}:{difficulty}");
        sha256_hex(preimage.as_bytes())
    }

    /// Whether the sealed hash satisfies this block's own difficulty
    pub fn has_valid_proof(&self) -> bool {
        hex_meets_difficulty(&self.hash, self.difficulty)
    }
}
