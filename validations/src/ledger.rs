use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use stakenet_crypto::key::CryptoEngine;
use stakenet_data_structures::{
    chain::{ConsensusConstants, Hashable, OutputPointer, PublicKeyHash, TransactionOutput},
    coin::Coin,
    error::TransactionError,
    staking::Stakes,
    transaction::Transaction,
    utxo_pool::{UnspentOutputsPool, UtxoDiff},
};

use crate::validations::{stake_lock_plan, validate_transaction, ValidatedTransaction};

/// The mutable chain state: the unspent outputs pool and the staking index, jointly owned
/// so they are only ever mutated together.
#[derive(Debug, Default)]
pub struct ChainState {
    /// The authoritative mapping from outpoint to unspent output.
    pub unspent_outputs_pool: UnspentOutputsPool,
    /// Locked-stake bookkeeping, derived from the pool and maintained incrementally.
    pub stakes: Stakes,
    /// Consensus-critical configuration of this ledger instance.
    pub constants: ConsensusConstants,
}

/// A UTXO ledger with native proof-of-stake bookkeeping.
///
/// Owns the chain state behind a read-write lock: transaction application is single-writer,
/// while queries run concurrently and always observe a state where the unspent outputs pool
/// and the staking index agree.
#[derive(Debug)]
pub struct Ledger {
    state: RwLock<ChainState>,
    engine: CryptoEngine,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new(constants: ConsensusConstants) -> Self {
        Ledger {
            state: RwLock::new(ChainState {
                constants,
                ..ChainState::default()
            }),
            engine: CryptoEngine::new(),
        }
    }

    /// Create a ledger bootstrapped from a list of genesis outputs.
    ///
    /// The outputs become the initial unspent outputs pool, consuming nothing and requiring
    /// no signatures; genesis outputs with staking destinations are registered in the
    /// staking index, which is how accounts can be staking from the very first block.
    pub fn with_genesis(
        constants: ConsensusConstants,
        genesis_outputs: Vec<TransactionOutput>,
    ) -> Result<Self, TransactionError> {
        let ledger = Self::new(constants);

        {
            let mut state = ledger.write_state();
            let genesis = Transaction::genesis(genesis_outputs);

            for (output_index, output) in genesis.body.outputs.iter().enumerate() {
                if output.value == 0 {
                    return Err(TransactionError::ZeroValueOutput { output_index });
                }
            }
            let locks = stake_lock_plan(&genesis.body.outputs, &state.constants)?;

            commit(
                &mut state,
                &genesis,
                &ValidatedTransaction {
                    fee: 0,
                    consumed: vec![],
                    locks,
                },
            );
        }

        Ok(ledger)
    }

    /// Validate `tx` and, if it is valid, atomically consume its inputs and insert its
    /// outputs, keeping the staking index in step with the pool.
    ///
    /// On rejection the state is untouched and the typed error says why; on success the
    /// implicit fee (input value minus output value) is returned.
    pub fn apply(&self, tx: &Transaction) -> Result<u64, TransactionError> {
        let mut state = self.write_state();

        let validated = {
            let utxo_diff = UtxoDiff::new(&state.unspent_outputs_pool);

            validate_transaction(tx, &utxo_diff, &self.engine, &state.constants)?
        };

        commit(&mut state, tx, &validated);

        log::debug!(
            "applied transaction {}: {} inputs consumed, {} outputs produced, fee {}",
            tx.hash(),
            validated.consumed.len(),
            tx.body.outputs.len(),
            validated.fee,
        );

        Ok(validated.fee)
    }

    /// The unspent output referenced by `output_pointer`, if it is currently live.
    pub fn get(&self, output_pointer: &OutputPointer) -> Option<TransactionOutput> {
        self.read_state()
            .unspent_outputs_pool
            .get(output_pointer)
            .cloned()
    }

    /// All currently unspent outputs.
    pub fn utxos(&self) -> Vec<(OutputPointer, TransactionOutput)> {
        self.read_state()
            .unspent_outputs_pool
            .iter()
            .map(|(output_pointer, output)| (*output_pointer, output.clone()))
            .collect()
    }

    /// The unspent outputs whose required signer is `pkh`, locked ones included.
    pub fn utxos_for(&self, pkh: &PublicKeyHash) -> Vec<(OutputPointer, TransactionOutput)> {
        self.read_state()
            .unspent_outputs_pool
            .iter()
            .filter(|(_, output)| output.destination.required_signer() == pkh)
            .map(|(output_pointer, output)| (*output_pointer, output.clone()))
            .collect()
    }

    /// The unspent outputs that are currently locked for staking, regardless of owner.
    pub fn locked_utxos(&self) -> Vec<(OutputPointer, TransactionOutput)> {
        self.read_state()
            .unspent_outputs_pool
            .iter_locked()
            .map(|(output_pointer, output)| (*output_pointer, output.clone()))
            .collect()
    }

    /// Every staking account with its locked outpoint count and total locked value, in
    /// account creation order.
    pub fn staking_count(&self) -> Vec<(PublicKeyHash, (u64, Coin))> {
        self.read_state()
            .stakes
            .iter()
            .map(|(stake_key, entry)| {
                (*stake_key, (entry.locked_count(), entry.total_locked()))
            })
            .collect()
    }

    /// Locked outpoint count and total locked value of one staking account, if it has any
    /// locked outpoints.
    pub fn account_summary(&self, stake_key: &PublicKeyHash) -> Option<(u64, Coin)> {
        self.read_state().stakes.account_summary(stake_key)
    }

    /// The staking account a locked unspent output is attributed to, if any.
    pub fn staking_key_of(&self, output_pointer: &OutputPointer) -> Option<PublicKeyHash> {
        self.read_state()
            .stakes
            .staking_key_of(output_pointer)
            .copied()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, ChainState> {
        self.state
            .read()
            .expect("read locks should only fail if poisoned")
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ChainState> {
        self.state
            .write()
            .expect("write locks should only fail if poisoned")
    }
}

/// Commit a validated transaction: remove the consumed outpoints and their staking effects,
/// then insert the produced outputs and register the new locks.
///
/// The pool and the staking index commit together or not at all. A failure at this point
/// means validation and the stores went out of step, which would leave the two structures
/// disagreeing about locked value, so it aborts the process instead of returning.
fn commit(state: &mut ChainState, tx: &Transaction, validated: &ValidatedTransaction) {
    let transaction_id = tx.hash();

    let mut utxo_diff = UtxoDiff::new(&state.unspent_outputs_pool);
    for (output_pointer, _) in &validated.consumed {
        utxo_diff.remove_utxo(*output_pointer);
    }
    for (output_index, output) in tx.body.outputs.iter().enumerate() {
        let output_pointer = OutputPointer {
            transaction_id,
            output_index: to_output_index(output_index),
        };

        utxo_diff.insert_utxo(output_pointer, output.clone());
    }

    utxo_diff
        .take_diff()
        .apply(&mut state.unspent_outputs_pool)
        .expect("the unspent outputs pool and the validated transaction went out of step");

    for (output_pointer, output) in &validated.consumed {
        if output.destination.is_staking() {
            let stake_key = *state
                .stakes
                .staking_key_of(output_pointer)
                .expect("consumed locked output is missing from the staking index");

            state
                .stakes
                .remove_locked(&stake_key, output_pointer)
                .expect("consumed locked output is missing from the staking index");
        }
    }

    for (output_index, stake_key) in &validated.locks {
        let output = &tx.body.outputs[*output_index];
        let output_pointer = OutputPointer {
            transaction_id,
            output_index: to_output_index(*output_index),
        };

        state
            .stakes
            .add_locked(*stake_key, output_pointer, output.value)
            .expect("freshly created outpoint is already in the staking index");
    }
}

fn to_output_index(output_index: usize) -> u32 {
    u32::try_from(output_index).expect("the output count fits in u32")
}
