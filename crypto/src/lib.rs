//! crypto

#![deny(rust_2018_idioms)]
#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![deny(missing_docs)]

/// Module containing hash functions
pub mod hash;
/// Module containing key handling utilities
pub mod key;
/// Module containing signature operations
pub mod signature;

pub use secp256k1;
