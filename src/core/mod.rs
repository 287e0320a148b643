//! Core ledger components
//!
//! This module contains the fundamental building blocks:
//! - Transactions (account model with signed output maps)
//! - Blocks (proof-of-work with adaptive difficulty)
//! - Blockchain (chain management and the replacement rule)

pub mod block;
pub mod blockchain;
pub mod transaction;

pub use block::Block;
pub use blockchain::{Blockchain, ChainError};
pub use transaction::{Transaction, TransactionError, TransactionInput};
