#![cfg_attr(test, allow(dead_code, unused_macros, unused_imports))]

/// Module containing the chain data types
pub mod chain;

/// Module containing the coin value unit
pub mod coin;

/// Module containing error definitions
pub mod error;

/// Module containing the staking index
pub mod staking;

/// Module containing transaction types and signing helpers
pub mod transaction;

/// Module containing the unspent outputs pool
pub mod utxo_pool;
