//! Pending-transaction pool
//!
//! Holds unconfirmed transactions until a miner folds them into a
//! block. Keyed by transaction id, so re-submitting an updated pending
//! transaction replaces the earlier version.

use std::collections::{HashMap, HashSet};

use log::debug;
use uuid::Uuid;

use crate::core::block::Block;
use crate::core::transaction::Transaction;

/// Memory pool of transactions waiting for inclusion in a block
#[derive(Debug, Default)]
pub struct Mempool {
    transactions: HashMap<Uuid, Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a pending transaction by id
    pub fn insert(&mut self, transaction: Transaction) {
        debug!("Pooling transaction {}", transaction.id);
        self.transactions.insert(transaction.id, transaction);
    }

    /// Look up a pending transaction by id
    pub fn get(&self, id: &Uuid) -> Option<&Transaction> {
        self.transactions.get(id)
    }

    /// A sender's pending transaction, if any. Wallets update this one
    /// instead of pooling a second spend of the same balance.
    pub fn existing_transaction(&self, address: &str) -> Option<&Transaction> {
        self.transactions
            .values()
            .find(|tx| tx.input.address == address)
    }

    /// The pending transactions that pass validation, oldest first
    pub fn valid_transactions(&self) -> Vec<Transaction> {
        let mut valid: Vec<Transaction> = self
            .transactions
            .values()
            .filter(|tx| tx.verify().is_ok())
            .cloned()
            .collect();

        valid.sort_by_key(|tx| (tx.input.timestamp, tx.id));
        valid
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Drop every pending transaction
    pub fn clear(&mut self) {
        self.transactions.clear();
    }

    /// Drop only the transactions already embedded in `chain`; used
    /// after adopting a foreign chain that may have confirmed a subset
    /// of the pool.
    pub fn clear_confirmed(&mut self, chain: &[Block]) {
        let confirmed: HashSet<Uuid> = chain
            .iter()
            .flat_map(|block| block.data.iter().map(|tx| tx.id))
            .collect();

        self.transactions.retain(|id, _| !confirmed.contains(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChainConfig;
    use crate::core::blockchain::Blockchain;
    use crate::wallet::Wallet;

    fn pool_with_transaction() -> (ChainConfig, Mempool, Wallet, Transaction) {
        let config = ChainConfig::default();
        let wallet = Wallet::new(&config);
        let tx = Transaction::new(&wallet, "recipient", 50).unwrap();
        let mut pool = Mempool::new();
        pool.insert(tx.clone());
        (config, pool, wallet, tx)
    }

    #[test]
    fn test_insert_and_get() {
        let (_, pool, _, tx) = pool_with_transaction();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(&tx.id), Some(&tx));
    }

    #[test]
    fn test_insert_replaces_by_id() {
        let (_, mut pool, wallet, tx) = pool_with_transaction();
        let updated = tx.update(&wallet, "next-recipient", 25).unwrap();
        pool.insert(updated.clone());

        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(&tx.id), Some(&updated));
    }

    #[test]
    fn test_existing_transaction_by_sender() {
        let (config, pool, wallet, tx) = pool_with_transaction();
        assert_eq!(pool.existing_transaction(&wallet.public_key()), Some(&tx));

        let stranger = Wallet::new(&config);
        assert!(pool.existing_transaction(&stranger.public_key()).is_none());
    }

    #[test]
    fn test_valid_transactions_filters_tampered() {
        let (config, mut pool, _, tx) = pool_with_transaction();

        let other = Wallet::new(&config);
        let mut tampered = Transaction::new(&other, "recipient", 50).unwrap();
        tampered.output_map.insert("thief".to_string(), 100_000);
        pool.insert(tampered);

        let valid = pool.valid_transactions();
        assert_eq!(valid, vec![tx]);
    }

    #[test]
    fn test_clear() {
        let (_, mut pool, _, _) = pool_with_transaction();
        pool.clear();
        assert!(pool.is_empty());
    }

    #[test]
    fn test_clear_confirmed_drops_only_mined_ids() {
        let (config, mut pool, _, tx) = pool_with_transaction();

        let other = Wallet::new(&config);
        let pending = Transaction::new(&other, "recipient", 10).unwrap();
        pool.insert(pending.clone());

        let mut blockchain = Blockchain::new(config);
        blockchain.add_block(vec![tx.clone()]);
        pool.clear_confirmed(&blockchain.chain);

        assert!(pool.get(&tx.id).is_none());
        assert_eq!(pool.get(&pending.id), Some(&pending));
    }
}
