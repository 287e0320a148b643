//! The chain aggregate
//!
//! Owns the ordered block sequence, mines new blocks onto the tip, and
//! decides whether a competing chain may replace the local one:
//! structural validation (linkage, hash recompute, difficulty
//! continuity) followed by economic validation of every carried
//! transaction (single reward, conserved balances, signatures, no
//! duplicates).

use std::collections::HashSet;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::ChainConfig;
use crate::core::block::Block;
use crate::core::transaction::{Transaction, TransactionError};
use crate::wallet::Wallet;

/// Every distinguished way a candidate chain can be rejected
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Incoming chain must be longer than the current chain")]
    ChainNotLonger,
    #[error("First block does not match the genesis literal")]
    GenesisMismatch,
    #[error("Block {index} does not reference its predecessor's hash")]
    HashLinkageBroken { index: usize },
    #[error("Block {index} hash does not match its declared fields")]
    HashRecomputeMismatch { index: usize },
    #[error("Difficulty jumps by more than 1 at block {index}")]
    DifficultyJumpTooLarge { index: usize },
    #[error("Block {index} carries more than one miner reward")]
    MultipleRewards { index: usize },
    #[error("Block {index} carries a miner reward with an invalid amount")]
    BadRewardAmount { index: usize },
    #[error("Block {index} carries an invalid transaction")]
    InvalidTransaction {
        index: usize,
        #[source]
        source: TransactionError,
    },
    #[error("Transaction from {address} claims a balance of {claimed}, history shows {actual}")]
    BalanceMismatch {
        address: String,
        claimed: u64,
        actual: u64,
    },
    #[error("Transaction {id} appears more than once in block {index}")]
    DuplicateTransaction { index: usize, id: Uuid },
}

/// An append-only proof-of-work ledger rooted at the genesis block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blockchain {
    /// The block sequence; index 0 is always the genesis block
    pub chain: Vec<Block>,
    config: ChainConfig,
}

impl Blockchain {
    /// Create a ledger holding only the genesis block
    pub fn new(config: ChainConfig) -> Self {
        let genesis = Block::genesis(&config);
        Self {
            chain: vec![genesis],
            config,
        }
    }

    /// The configuration this ledger was built with
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// The current tip of the chain
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("chain always holds the genesis block")
    }

    /// Number of blocks, genesis included
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Blocks above genesis
    pub fn height(&self) -> usize {
        self.chain.len() - 1
    }

    /// Mine a block carrying `data` onto the tip and append it.
    ///
    /// Local data is appended unvalidated; economic checks run only when
    /// a foreign chain is offered for replacement.
    pub fn add_block(&mut self, data: Vec<Transaction>) -> &Block {
        let block = {
            let last = self.last_block();
            Block::mine(&self.config, last, data)
        };

        self.chain.push(block);
        self.last_block()
    }

    /// Structural validation of an arbitrary candidate chain, independent
    /// of any ledger's current state. Fails fast on the first violated
    /// clause.
    pub fn is_valid_chain(config: &ChainConfig, chain: &[Block]) -> Result<(), ChainError> {
        match chain.first() {
            Some(first) if *first == Block::genesis(config) => {}
            _ => {
                warn!("Candidate chain does not start with the genesis block");
                return Err(ChainError::GenesisMismatch);
            }
        }

        for index in 1..chain.len() {
            let block = &chain[index];
            let previous = &chain[index - 1];

            if block.last_hash != previous.hash {
                warn!("Candidate block {index} breaks the hash linkage");
                return Err(ChainError::HashLinkageBroken { index });
            }

            // Re-deriving the seal from the declared fields catches any
            // tampering without redoing the proof-of-work search.
            let recomputed = Block::compute_hash(
                block.timestamp,
                &block.last_hash,
                &block.data,
                block.nonce,
                block.difficulty,
            );
            if recomputed != block.hash {
                warn!("Candidate block {index} hash does not recompute");
                return Err(ChainError::HashRecomputeMismatch { index });
            }

            if block.difficulty.abs_diff(previous.difficulty) > 1 {
                warn!("Candidate block {index} jumps difficulty discontinuously");
                return Err(ChainError::DifficultyJumpTooLarge { index });
            }
        }

        Ok(())
    }

    /// Economic validation of a candidate chain's transactions.
    ///
    /// Balances are reconstructed against this ledger's own history, so
    /// a sender cannot smuggle in a stale or forged balance via the
    /// candidate itself.
    pub fn valid_transaction_data(&self, chain: &[Block]) -> Result<(), ChainError> {
        for (index, block) in chain.iter().enumerate() {
            let mut seen: HashSet<Uuid> = HashSet::new();
            let mut reward_count = 0usize;

            for transaction in &block.data {
                if transaction.is_reward(&self.config) {
                    reward_count += 1;
                    if reward_count > 1 {
                        warn!("Miner rewards exceed limit in block {index}");
                        return Err(ChainError::MultipleRewards { index });
                    }

                    let sole_output = transaction.output_map.len() == 1
                        && transaction.output_map.values().next()
                            == Some(&self.config.mining_reward);
                    if !sole_output {
                        warn!("Miner reward amount is invalid in block {index}");
                        return Err(ChainError::BadRewardAmount { index });
                    }
                } else {
                    transaction.verify().map_err(|source| {
                        warn!("Invalid transaction in block {index}");
                        ChainError::InvalidTransaction { index, source }
                    })?;

                    let actual = Wallet::calculate_balance(
                        &self.config,
                        &self.chain,
                        &transaction.input.address,
                    );
                    if transaction.input.amount != actual {
                        warn!(
                            "Transaction from {} claims an invalid input amount",
                            transaction.input.address
                        );
                        return Err(ChainError::BalanceMismatch {
                            address: transaction.input.address.clone(),
                            claimed: transaction.input.amount,
                            actual,
                        });
                    }
                }

                if !seen.insert(transaction.id) {
                    warn!("Transaction {} repeats within block {index}", transaction.id);
                    return Err(ChainError::DuplicateTransaction {
                        index,
                        id: transaction.id,
                    });
                }
            }
        }

        Ok(())
    }

    /// Longest-valid-chain acceptance rule.
    ///
    /// The candidate must be strictly longer, structurally valid and,
    /// when `validate_transactions` is set, economically valid. On
    /// success `on_success` fires (hook for downstream effects such as
    /// clearing a mempool) and the chain is swapped atomically; on any
    /// rejection the ledger is untouched and the callback never runs.
    pub fn replace_chain(
        &mut self,
        chain: Vec<Block>,
        validate_transactions: bool,
        on_success: impl FnOnce(),
    ) -> Result<(), ChainError> {
        if chain.len() <= self.chain.len() {
            warn!("The incoming chain must be longer");
            return Err(ChainError::ChainNotLonger);
        }

        if let Err(error) = Self::is_valid_chain(&self.config, &chain) {
            warn!("The incoming chain must be valid: {error}");
            return Err(error);
        }

        if validate_transactions {
            if let Err(error) = self.valid_transaction_data(&chain) {
                warn!("The incoming chain has invalid transaction data: {error}");
                return Err(error);
            }
        }

        on_success();
        info!("Replacing chain with {} blocks", chain.len());
        self.chain = chain;
        Ok(())
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new(ChainConfig::default())
    }
}
