//! Mining engine
//!
//! Drains the valid portion of the mempool, attaches the single miner
//! reward, performs the proof-of-work search and appends the result to
//! the chain.

use std::time::Instant;

use log::info;
use thiserror::Error;

use crate::core::block::Block;
use crate::core::blockchain::Blockchain;
use crate::core::transaction::Transaction;
use crate::mining::mempool::Mempool;
use crate::wallet::Wallet;

/// Mining errors
#[derive(Error, Debug)]
pub enum MinerError {
    #[error("Mining aborted after {0} attempts without a qualifying hash")]
    Timeout(u64),
}

/// Statistics from one mining run
#[derive(Debug, Clone)]
pub struct MiningStats {
    /// Number of hash attempts (the winning nonce)
    pub attempts: u64,
    /// Time taken in milliseconds
    pub time_ms: u128,
    /// Hash rate (hashes per second)
    pub hash_rate: f64,
}

/// Miner for assembling and sealing new blocks
#[derive(Debug, Default)]
pub struct Miner {
    /// Optional ceiling on hash attempts; `None` searches until success
    max_attempts: Option<u64>,
}

impl Miner {
    /// A miner running the unbounded consensus search
    pub fn new() -> Self {
        Self::default()
    }

    /// A miner that gives up with `MinerError::Timeout` after
    /// `max_attempts` hashes
    pub fn with_attempt_limit(max_attempts: u64) -> Self {
        Self {
            max_attempts: Some(max_attempts),
        }
    }

    /// Mine the pool's valid transactions plus one reward for `wallet`
    /// into a new block on `blockchain`'s tip, then clear the pool.
    pub fn mine_transactions(
        &self,
        blockchain: &mut Blockchain,
        mempool: &mut Mempool,
        wallet: &Wallet,
    ) -> Result<(Block, MiningStats), MinerError> {
        let config = blockchain.config().clone();

        let mut data = mempool.valid_transactions();
        data.push(Transaction::reward(&config, &wallet.public_key()));

        info!(
            "Mining block {} with {} transactions...",
            blockchain.len(),
            data.len()
        );
        let start = Instant::now();

        let block = match self.max_attempts {
            Some(limit) => {
                let mined = Block::mine_bounded(&config, blockchain.last_block(), data, limit)
                    .ok_or(MinerError::Timeout(limit))?;
                blockchain.chain.push(mined);
                blockchain.last_block().clone()
            }
            None => blockchain.add_block(data).clone(),
        };

        let elapsed = start.elapsed().as_millis();
        let attempts = block.nonce;
        let hash_rate = if elapsed > 0 {
            (attempts as f64) / (elapsed as f64 / 1000.0)
        } else {
            attempts as f64
        };

        info!(
            "Block mined in {}ms ({} attempts, {:.2} H/s) at difficulty {}",
            elapsed, attempts, hash_rate, block.difficulty
        );

        mempool.clear();

        Ok((
            block,
            MiningStats {
                attempts,
                time_ms: elapsed,
                hash_rate,
            },
        ))
    }
}
