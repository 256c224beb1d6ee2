use thiserror::Error;

use crate::chain::{OutputPointer, PublicKeyHash};

/// All errors related to the staking index.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum StakesError {
    /// The outpoint is already recorded as locked, which would double-count its value.
    #[error("Output {output} is already locked")]
    AlreadyLocked {
        /// The outpoint that is already in the index
        output: OutputPointer,
    },
    /// The outpoint is not recorded under the given staking key. This signals a
    /// desynchronization between the unspent outputs pool and the staking index, not a
    /// user error.
    #[error("Output {output} is not locked under staking key {stake_key}")]
    NotLocked {
        /// The staking key the caller expected the outpoint under
        stake_key: PublicKeyHash,
        /// The outpoint that was not found
        output: OutputPointer,
    },
    /// The total locked value of an account overflows.
    #[error("Total locked value for staking key {stake_key} overflows")]
    TotalValueOverflow {
        /// The affected staking key
        stake_key: PublicKeyHash,
    },
}
