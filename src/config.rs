//! Chain configuration
//!
//! All process-wide constants (genesis literal, mine rate, reward
//! identity) travel in an explicit immutable `ChainConfig` value passed
//! to constructors, never in module-level mutable state.

use serde::{Deserialize, Serialize};

/// Default target interval between blocks, in milliseconds
pub const MINE_RATE_MS: i64 = 1000;

/// Default balance credited to a freshly created wallet
pub const STARTING_BALANCE: u64 = 1000;

/// Default reward paid to the miner of a block
pub const MINING_REWARD: u64 = 50;

/// Distinguished input address marking a miner-reward transaction
pub const REWARD_INPUT_ADDRESS: &str = "*authorized-reward*";

/// Default difficulty of the genesis block (leading zero bits)
pub const INITIAL_DIFFICULTY: u32 = 3;

/// Parameters of the fixed, unmined genesis block.
///
/// These must be byte-identical across all nodes: chain validation
/// compares a candidate's first block against the genesis literal by
/// deep equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    pub timestamp: i64,
    pub last_hash: String,
    pub hash: String,
    pub difficulty: u32,
    pub nonce: u64,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            timestamp: 1,
            last_hash: "-----".to_string(),
            hash: "hash-one".to_string(),
            difficulty: INITIAL_DIFFICULTY,
            nonce: 0,
        }
    }
}

/// Immutable configuration shared by the chain, wallets and miners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Genesis block literal
    pub genesis: GenesisConfig,
    /// Target interval between blocks, in milliseconds
    pub mine_rate_ms: i64,
    /// Balance of a wallet with no on-chain history
    pub starting_balance: u64,
    /// Fixed miner-reward amount
    pub mining_reward: u64,
    /// Input address identifying reward transactions
    pub reward_address: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            genesis: GenesisConfig::default(),
            mine_rate_ms: MINE_RATE_MS,
            starting_balance: STARTING_BALANCE,
            mining_reward: MINING_REWARD,
            reward_address: REWARD_INPUT_ADDRESS.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_genesis_is_stable() {
        // Two independently built configs must describe the same genesis,
        // otherwise nodes could never agree on a chain root.
        assert_eq!(ChainConfig::default(), ChainConfig::default());
        assert_eq!(GenesisConfig::default().timestamp, 1);
        assert_eq!(GenesisConfig::default().difficulty, INITIAL_DIFFICULTY);
    }
}
