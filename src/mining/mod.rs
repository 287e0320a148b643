//! Mining
//!
//! Block assembly and the pending-transaction pool.

pub mod mempool;
pub mod miner;

pub use mempool::Mempool;
pub use miner::{Miner, MinerError, MiningStats};
