//! Wallet management
//!
//! Key custody, transaction creation and balance reconstruction.

pub mod wallet;

pub use wallet::Wallet;
