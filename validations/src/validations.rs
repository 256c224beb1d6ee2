use itertools::Itertools;

use stakenet_crypto::{key::CryptoEngine, signature};
use stakenet_data_structures::{
    chain::{
        ConsensusConstants, Destination, Hash, Hashable, Input, OutputPointer, PublicKeyHash,
        TransactionOutput,
    },
    error::TransactionError,
    transaction::Transaction,
    utxo_pool::UtxoDiff,
};

/// The outcome of validating a transaction against a snapshot of the unspent outputs pool:
/// everything the state transition needs in order to commit it.
#[derive(Debug, Clone)]
pub struct ValidatedTransaction {
    /// Implicit fee: input value minus output value.
    pub fee: u64,
    /// The prior outputs consumed by each input, paired with their outpoints, in input order.
    pub consumed: Vec<(OutputPointer, TransactionOutput)>,
    /// Output positions that lock value for staking, with the staking key each resolves to.
    pub locks: Vec<(usize, PublicKeyHash)>,
}

/// Check the structural rules that need no state: at least one input and one output, no
/// output pointer referenced twice, no zero-value output.
pub fn validate_transaction_structure(tx: &Transaction) -> Result<(), TransactionError> {
    if tx.body.inputs.is_empty() {
        return Err(TransactionError::NoInputs);
    }
    if tx.body.outputs.is_empty() {
        return Err(TransactionError::NoOutputs);
    }

    if let Some(output) = tx
        .body
        .inputs
        .iter()
        .map(Input::output_pointer)
        .duplicates()
        .next()
    {
        return Err(TransactionError::DuplicatedInput { output: *output });
    }

    for (output_index, output) in tx.body.outputs.iter().enumerate() {
        if output.value == 0 {
            return Err(TransactionError::ZeroValueOutput { output_index });
        }
    }

    Ok(())
}

/// Resolve each input of a transaction to the unspent output it consumes. A reference that
/// does not point to a live output fails the whole resolution.
pub fn resolve_inputs(
    tx: &Transaction,
    utxo_diff: &UtxoDiff<'_>,
) -> Result<Vec<(OutputPointer, TransactionOutput)>, TransactionError> {
    tx.body
        .inputs
        .iter()
        .map(|input| {
            let output_pointer = input.output_pointer();

            utxo_diff
                .get(output_pointer)
                .cloned()
                .map(|output| (*output_pointer, output))
                .ok_or(TransactionError::UnknownInput {
                    output: *output_pointer,
                })
        })
        .collect()
}

/// Calculate the sum of the values of the outputs consumed by a transaction.
pub fn transaction_inputs_sum(
    consumed: &[(OutputPointer, TransactionOutput)],
) -> Result<u64, TransactionError> {
    let mut total_value: u64 = 0;

    for (_, output) in consumed {
        total_value = total_value
            .checked_add(output.value)
            .ok_or(TransactionError::InputValueOverflow)?;
    }

    Ok(total_value)
}

/// Calculate the sum of the values of the outputs of a transaction.
pub fn transaction_outputs_sum(outputs: &[TransactionOutput]) -> Result<u64, TransactionError> {
    let mut total_value: u64 = 0;

    for output in outputs {
        total_value = total_value
            .checked_add(output.value)
            .ok_or(TransactionError::OutputValueOverflow)?;
    }

    Ok(total_value)
}

/// Returns the fee of a transaction.
///
/// The fee is the difference between the consumed outputs and the outputs of the
/// transaction. It is implicit: a transaction can never create value.
pub fn transaction_fee(
    tx: &Transaction,
    consumed: &[(OutputPointer, TransactionOutput)],
) -> Result<u64, TransactionError> {
    let in_value = transaction_inputs_sum(consumed)?;
    let out_value = transaction_outputs_sum(&tx.body.outputs)?;

    if out_value > in_value {
        Err(TransactionError::NegativeFee)
    } else {
        Ok(in_value - out_value)
    }
}

/// Verify that every input carries a valid signature from the key its consumed output
/// requires, over the digest that binds the transaction id to the outputs being spent.
pub fn validate_transaction_signatures(
    tx: &Transaction,
    consumed: &[(OutputPointer, TransactionOutput)],
    engine: &CryptoEngine,
) -> Result<(), TransactionError> {
    if tx.signatures.len() != tx.body.inputs.len() {
        return Err(TransactionError::MismatchingSignaturesNumber {
            signatures: tx.signatures.len(),
            inputs: tx.body.inputs.len(),
        });
    }

    let spent_outputs: Vec<TransactionOutput> =
        consumed.iter().map(|(_, output)| output.clone()).collect();
    let Hash::SHA256(digest) = tx.body.signature_data(&spent_outputs);

    let fail = |msg: String| TransactionError::VerifySignatureFail {
        hash: tx.hash(),
        msg,
    };

    for (keyed_signature, (_, output)) in tx.signatures.iter().zip(consumed) {
        let expected = output.destination.required_signer();
        let signer = keyed_signature.public_key.pkh();
        if signer != *expected {
            return Err(TransactionError::PublicKeyHashMismatch {
                expected: *expected,
                signer,
            });
        }

        let public_key = signature::PublicKey::try_from(&keyed_signature.public_key)
            .map_err(|e| fail(e.to_string()))?;
        let sig = signature::Signature::try_from(&keyed_signature.signature)
            .map_err(|e| fail(e.to_string()))?;

        signature::verify(engine, &public_key, &digest, &sig)
            .map_err(|e| fail(e.to_string()))?;
    }

    Ok(())
}

/// Resolve which outputs lock value for staking and the staking key each contributes to.
///
/// A `Stake` output establishes the position for its own staking key and must meet the
/// minimum stake. A `StakeExtra` output attaches to the nearest preceding `Stake` output of
/// the same transaction; with no preceding `Stake` output it is an orphan and the
/// transaction is rejected.
pub fn stake_lock_plan(
    outputs: &[TransactionOutput],
    constants: &ConsensusConstants,
) -> Result<Vec<(usize, PublicKeyHash)>, TransactionError> {
    let mut locks = Vec::new();
    let mut last_stake_key: Option<PublicKeyHash> = None;

    for (output_index, output) in outputs.iter().enumerate() {
        match &output.destination {
            Destination::PubKey(_) => {}
            Destination::Stake { stake_key, .. } => {
                if output.value < constants.minimum_stake {
                    return Err(TransactionError::StakeBelowMinimum {
                        value: output.value,
                        minimum: constants.minimum_stake,
                    });
                }

                last_stake_key = Some(*stake_key);
                locks.push((output_index, *stake_key));
            }
            Destination::StakeExtra { .. } => {
                let stake_key =
                    last_stake_key.ok_or(TransactionError::OrphanStakeExtra { output_index })?;

                locks.push((output_index, stake_key));
            }
        }
    }

    Ok(locks)
}

/// Validate a transaction against a snapshot of the unspent outputs pool.
///
/// The checks run in order: structure, input resolution, signatures, value conservation,
/// stake planning. The first failure rejects the transaction; nothing is mutated here.
pub fn validate_transaction(
    tx: &Transaction,
    utxo_diff: &UtxoDiff<'_>,
    engine: &CryptoEngine,
    constants: &ConsensusConstants,
) -> Result<ValidatedTransaction, TransactionError> {
    validate_transaction_structure(tx)?;

    let consumed = resolve_inputs(tx, utxo_diff)?;
    validate_transaction_signatures(tx, &consumed, engine)?;
    let fee = transaction_fee(tx, &consumed)?;
    let locks = stake_lock_plan(&tx.body.outputs, constants)?;

    Ok(ValidatedTransaction {
        fee,
        consumed,
        locks,
    })
}
