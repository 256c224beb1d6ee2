//! Error type definitions for the data structure module.

use thiserror::Error;

use crate::chain::{Hash, OutputPointer, PublicKeyHash};

/// The error type for transaction validation
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum TransactionError {
    /// The transaction has no inputs
    #[error("The transaction has no inputs")]
    NoInputs,
    /// The transaction has no outputs
    #[error("The transaction has no outputs")]
    NoOutputs,
    /// An output pointer is referenced by more than one input of the same transaction
    #[error("Output {output} is referenced by more than one input")]
    DuplicatedInput {
        /// The output pointer referenced twice
        output: OutputPointer,
    },
    /// An output carries no value
    #[error("Output at index {output_index} has zero value")]
    ZeroValueOutput {
        /// Position of the output inside the transaction
        output_index: usize,
    },
    /// A referenced output is not in the unspent outputs pool: it never existed or it was
    /// already spent
    #[error("Input {output} does not point to an unspent output")]
    UnknownInput {
        /// The dangling output pointer
        output: OutputPointer,
    },
    /// The transaction does not carry exactly one signature per input
    #[error(
        "The number of signatures ({signatures}) does not match the number of inputs ({inputs})"
    )]
    MismatchingSignaturesNumber {
        /// Number of signatures attached
        signatures: usize,
        /// Number of inputs
        inputs: usize,
    },
    /// A signature was produced by a key other than the one the spent output requires
    #[error("Public key hash {signer} does not match the required signer {expected}")]
    PublicKeyHashMismatch {
        /// The key the spent output requires
        expected: PublicKeyHash,
        /// The key that actually signed
        signer: PublicKeyHash,
    },
    /// A signature did not verify against the transaction digest
    #[error("Invalid signature for transaction {hash}: {msg}")]
    VerifySignatureFail {
        /// Id of the offending transaction
        hash: Hash,
        /// Reason reported by the crypto engine
        msg: String,
    },
    /// The sum of the consumed output values overflows
    #[error("Sum of the input values overflows")]
    InputValueOverflow,
    /// The sum of the produced output values overflows
    #[error("Sum of the output values overflows")]
    OutputValueOverflow,
    /// The outputs create more value than the inputs provide
    #[error("The output value exceeds the input value")]
    NegativeFee,
    /// A `Stake` output is below the minimum required to establish a staking position
    #[error("Stake output value {value} is below the minimum stake {minimum}")]
    StakeBelowMinimum {
        /// Value of the offending output
        value: u64,
        /// Minimum stake from the consensus constants
        minimum: u64,
    },
    /// A `StakeExtra` output appears before any `Stake` output in its transaction, so there is
    /// no staking position to attach it to
    #[error("StakeExtra output at index {output_index} has no preceding Stake output")]
    OrphanStakeExtra {
        /// Position of the output inside the transaction
        output_index: usize,
    },
}

/// Error when parsing addresses
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum AddressError {
    /// The string is not valid bech32
    #[error("Address is not valid bech32: {0}")]
    Bech32(String),
    /// The address prefix belongs to a different environment
    #[error("Address prefix \"{prefix}\" does not match the environment prefix \"{expected}\"")]
    WrongPrefix {
        /// The prefix found in the address
        prefix: String,
        /// The prefix required by the environment
        expected: String,
    },
    /// The payload is not 20 bytes long
    #[error("Address payload must be 20 bytes, got {length}")]
    InvalidLength {
        /// Actual payload length
        length: usize,
    },
}
