//! Wallet implementation
//!
//! Holds a key pair, signs transaction output maps, and reconstructs a
//! spendable balance by replaying chain history.

use log::debug;

use crate::config::ChainConfig;
use crate::core::block::Block;
use crate::core::transaction::{Transaction, TransactionError};
use crate::crypto::{KeyError, KeyPair};

/// A key-holding account able to create and sign transactions
pub struct Wallet {
    key_pair: KeyPair,
    /// Last known spendable balance. Refreshed from chain history when a
    /// chain is supplied to `create_transaction`.
    pub balance: u64,
}

impl Wallet {
    /// Create a wallet with a fresh key pair and the configured starting
    /// balance
    pub fn new(config: &ChainConfig) -> Self {
        Self {
            key_pair: KeyPair::generate(),
            balance: config.starting_balance,
        }
    }

    /// Import a wallet from a hex private key
    pub fn from_private_key(config: &ChainConfig, private_key_hex: &str) -> Result<Self, KeyError> {
        let key_pair = KeyPair::from_private_key_hex(private_key_hex)?;
        Ok(Self {
            key_pair,
            balance: config.starting_balance,
        })
    }

    /// The wallet's public identity: its compressed public key in hex
    pub fn public_key(&self) -> String {
        self.key_pair.public_key_hex()
    }

    /// Sign an arbitrary payload, returning the hex compact signature
    pub fn sign(&self, payload: &[u8]) -> Result<String, KeyError> {
        self.key_pair.sign(payload)
    }

    /// Create a signed transaction. When `chain` is given the wallet
    /// first refreshes its balance from that history, so a stale cached
    /// balance cannot leak into the transaction input.
    pub fn create_transaction(
        &mut self,
        recipient: &str,
        amount: u64,
        chain: Option<&[Block]>,
        config: &ChainConfig,
    ) -> Result<Transaction, TransactionError> {
        if let Some(chain) = chain {
            self.balance = Self::calculate_balance(config, chain, &self.public_key());
        }

        Transaction::new(self, recipient, amount)
    }

    /// Reconstruct the spendable balance of `address` from chain history.
    ///
    /// Blocks are scanned newest to oldest, summing outputs addressed to
    /// `address`. The scan stops after the most recent block in which the
    /// address itself spent: that transaction's change output already
    /// folds in everything earlier. The starting balance applies only to
    /// addresses that never spent.
    pub fn calculate_balance(config: &ChainConfig, chain: &[Block], address: &str) -> u64 {
        let mut has_conducted_transaction = false;
        let mut outputs_total: u64 = 0;

        for block in chain.iter().skip(1).rev() {
            for transaction in &block.data {
                if transaction.input.address == address {
                    has_conducted_transaction = true;
                }

                if let Some(output) = transaction.output_map.get(address) {
                    // Saturate rather than trust a tampered chain's
                    // outputs to stay within range
                    outputs_total = outputs_total.saturating_add(*output);
                }
            }

            if has_conducted_transaction {
                break;
            }
        }

        debug!("Reconstructed balance {outputs_total} for {address}");

        if has_conducted_transaction {
            outputs_total
        } else {
            config.starting_balance.saturating_add(outputs_total)
        }
    }
}
