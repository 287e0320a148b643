//! Transaction handling for the ledger
//!
//! Implements the account-style transaction model: each transaction
//! carries an output map (recipient -> amount, including the sender's
//! own change) and a signed input recording the sender's full
//! pre-transaction balance. Once a transaction is handed to mining it is
//! immutable; "updating" a pending transaction produces a new value with
//! the same id.

use std::collections::BTreeMap;

use chrono::Utc;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::ChainConfig;
use crate::crypto::verify_signature;
use crate::wallet::Wallet;

/// Transaction-related errors
#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Amount {amount} exceeds balance {balance}")]
    AmountExceedsBalance { amount: u64, balance: u64 },
    #[error("Output total does not match the input amount of {address}")]
    AmountMismatch { address: String },
    #[error("Invalid signature from {address}")]
    InvalidSignature { address: String },
    #[error("Crypto error: {0}")]
    CryptoError(#[from] crate::crypto::KeyError),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// The signed input of a transaction: who spends, their full balance at
/// signing time, and a signature over the exact output map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    /// Signing time, milliseconds since epoch
    pub timestamp: i64,
    /// Sender's entire pre-transaction balance
    pub amount: u64,
    /// Sender's public key in hex (or the reward sentinel)
    pub address: String,
    /// Hex-encoded compact ECDSA signature over the output map
    pub signature: String,
}

/// A transfer of funds, fully described by its output map and signed input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Process-assigned unique id
    pub id: Uuid,
    /// Recipient -> amount; includes the sender's change output.
    /// A BTreeMap keeps the signature payload deterministic.
    pub output_map: BTreeMap<String, u64>,
    /// Signed spending authorization
    pub input: TransactionInput,
}

impl Transaction {
    /// Create a signed transaction sending `amount` to `recipient`.
    ///
    /// The output map redistributes the sender's whole balance: the
    /// recipient's share plus the sender's change.
    pub fn new(
        sender: &Wallet,
        recipient: &str,
        amount: u64,
    ) -> Result<Self, TransactionError> {
        if amount > sender.balance {
            return Err(TransactionError::AmountExceedsBalance {
                amount,
                balance: sender.balance,
            });
        }

        let mut output_map = BTreeMap::new();
        output_map.insert(recipient.to_string(), amount);
        output_map.insert(sender.public_key(), sender.balance - amount);

        let input = Self::signed_input(sender, &output_map)?;

        Ok(Self {
            id: Uuid::new_v4(),
            output_map,
            input,
        })
    }

    /// Produce an updated transaction adding `amount` for `recipient`,
    /// drawn from the sender's change output. The original value is left
    /// untouched; the result keeps the same id and is re-signed.
    pub fn update(
        &self,
        sender: &Wallet,
        recipient: &str,
        amount: u64,
    ) -> Result<Self, TransactionError> {
        let sender_key = sender.public_key();
        let change = self.output_map.get(&sender_key).copied().unwrap_or(0);

        if amount > change {
            return Err(TransactionError::AmountExceedsBalance {
                amount,
                balance: change,
            });
        }

        let mut output_map = self.output_map.clone();
        *output_map.entry(recipient.to_string()).or_insert(0) += amount;
        output_map.insert(sender_key, change - amount);

        let input = Self::signed_input(sender, &output_map)?;

        Ok(Self {
            id: self.id,
            output_map,
            input,
        })
    }

    /// Create the miner-reward transaction for a block.
    ///
    /// Rewards are not signed; they are authorized by the distinguished
    /// input address and capped at one per block during validation.
    pub fn reward(config: &ChainConfig, miner_address: &str) -> Self {
        let mut output_map = BTreeMap::new();
        output_map.insert(miner_address.to_string(), config.mining_reward);

        Self {
            id: Uuid::new_v4(),
            output_map,
            input: TransactionInput {
                timestamp: Utc::now().timestamp_millis(),
                amount: 0,
                address: config.reward_address.clone(),
                signature: String::new(),
            },
        }
    }

    /// Whether this is a miner-reward transaction under `config`
    pub fn is_reward(&self, config: &ChainConfig) -> bool {
        self.input.address == config.reward_address
    }

    /// Validate an ordinary transaction's internal consistency: the
    /// output total must equal the declared input amount, and the
    /// signature must verify against the sender's key and the exact
    /// output map.
    pub fn verify(&self) -> Result<(), TransactionError> {
        // Widened accumulation: a crafted output map must not be able to
        // wrap the total back onto the declared input amount.
        let output_total: u128 = self.output_map.values().map(|&v| u128::from(v)).sum();

        if output_total != u128::from(self.input.amount) {
            warn!("Invalid transaction from {}", self.input.address);
            return Err(TransactionError::AmountMismatch {
                address: self.input.address.clone(),
            });
        }

        let payload = Self::signing_payload(&self.output_map)?;
        let verified = verify_signature(&self.input.address, &payload, &self.input.signature)
            .unwrap_or(false);

        if !verified {
            warn!("Invalid signature from {}", self.input.address);
            return Err(TransactionError::InvalidSignature {
                address: self.input.address.clone(),
            });
        }

        Ok(())
    }

    /// Canonical byte payload covered by the input signature
    pub fn signing_payload(
        output_map: &BTreeMap<String, u64>,
    ) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(output_map)
    }

    fn signed_input(
        sender: &Wallet,
        output_map: &BTreeMap<String, u64>,
    ) -> Result<TransactionInput, TransactionError> {
        let payload = Self::signing_payload(output_map)?;
        let signature = sender.sign(&payload)?;

        Ok(TransactionInput {
            timestamp: Utc::now().timestamp_millis(),
            amount: sender.balance,
            address: sender.public_key(),
            signature,
        })
    }
}
