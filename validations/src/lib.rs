//! Validations

#![deny(rust_2018_idioms)]
#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![deny(missing_docs)]

/// Module containing the ledger context object: the state-transition function and the
/// query surface over the unspent outputs pool and the staking index
pub mod ledger;
/// Module containing validations
pub mod validations;
