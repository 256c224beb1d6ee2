//! Bookkeeping of locked stake, maintained incrementally as transactions are applied.
//!
//! The index is derived state: every entry corresponds to outputs that are live in the
//! unspent outputs pool, and the two structures are only ever mutated together.

mod errors;
mod stakes;

pub use errors::StakesError;
pub use stakes::{StakeEntry, Stakes};
