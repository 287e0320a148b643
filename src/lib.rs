//! Cryptochain: a proof-of-work account ledger
//!
//! This crate provides:
//! - Block mining with per-attempt difficulty adjustment toward a target
//!   mine rate
//! - Structural chain validation (genesis identity, hash linkage, exact
//!   hash recompute, difficulty continuity)
//! - Economic validation of carried transactions (one reward per block,
//!   balance conservation, ECDSA signatures, duplicate rejection)
//! - The longest-valid-chain replacement rule
//! - Wallets with balance reconstruction over chain history
//! - A pending-transaction pool and a mining engine with an optional
//!   attempt ceiling
//!
//! # Example
//!
//! ```rust
//! use cryptochain::config::ChainConfig;
//! use cryptochain::core::{Blockchain, Transaction};
//! use cryptochain::mining::{Mempool, Miner};
//! use cryptochain::wallet::Wallet;
//!
//! let config = ChainConfig::default();
//! let mut blockchain = Blockchain::new(config.clone());
//! let mut mempool = Mempool::new();
//!
//! // A wallet pools a payment, a miner seals it into a block
//! let mut wallet = Wallet::new(&config);
//! let miner_wallet = Wallet::new(&config);
//! let tx = wallet
//!     .create_transaction("recipient", 50, Some(&blockchain.chain), &config)
//!     .unwrap();
//! mempool.insert(tx);
//!
//! let miner = Miner::new();
//! let (block, stats) = miner
//!     .mine_transactions(&mut blockchain, &mut mempool, &miner_wallet)
//!     .unwrap();
//! println!("Mined {} in {}ms", block.hash, stats.time_ms);
//!
//! // Structural validation is pure over any candidate chain
//! assert!(Blockchain::is_valid_chain(&config, &blockchain.chain).is_ok());
//! ```

pub mod config;
pub mod core;
pub mod crypto;
pub mod mining;
pub mod wallet;

// Re-export commonly used types
pub use config::{ChainConfig, GenesisConfig};
pub use core::{Block, Blockchain, ChainError, Transaction, TransactionError, TransactionInput};
pub use crypto::KeyPair;
pub use mining::{Mempool, Miner, MinerError, MiningStats};
pub use wallet::Wallet;
