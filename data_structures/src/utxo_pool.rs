use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::{OutputPointer, TransactionOutput};

/// Errors while applying a [`Diff`](Diff) to the unspent outputs pool
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum UtxoError {
    /// A consumed outpoint is not in the pool: it was already spent or never existed
    #[error("Output {output} is not in the unspent outputs pool")]
    DoubleSpend {
        /// The missing output pointer
        output: OutputPointer,
    },
    /// A produced outpoint is already in the pool, which means a transaction id hash collision
    #[error("Output {output} already exists in the unspent outputs pool")]
    DuplicateOutpoint {
        /// The colliding output pointer
        output: OutputPointer,
    },
}

/// Unspent Outputs Pool
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct UnspentOutputsPool {
    /// Map of output pointer to unspent output
    map: HashMap<OutputPointer, TransactionOutput>,
}

impl UnspentOutputsPool {
    pub fn get(&self, k: &OutputPointer) -> Option<&TransactionOutput> {
        self.map.get(k)
    }

    pub fn contains_key(&self, k: &OutputPointer) -> bool {
        self.map.contains_key(k)
    }

    pub fn insert(
        &mut self,
        k: OutputPointer,
        v: TransactionOutput,
    ) -> Option<TransactionOutput> {
        self.map.insert(k, v)
    }

    pub fn remove(&mut self, k: &OutputPointer) -> Option<TransactionOutput> {
        self.map.remove(k)
    }

    pub fn iter(&self) -> std::collections::hash_map::Iter<'_, OutputPointer, TransactionOutput> {
        self.map.iter()
    }

    /// Iterator over the entries whose destination locks the value for staking
    pub fn iter_locked(
        &self,
    ) -> impl Iterator<Item = (&OutputPointer, &TransactionOutput)> {
        self.map
            .iter()
            .filter(|(_, output)| output.destination.is_staking())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Diffs to apply to an utxo set. This type does not contain a
/// reference to the original utxo set.
#[derive(Debug, Default)]
pub struct Diff {
    utxos_to_add: HashMap<OutputPointer, TransactionOutput>,
    utxos_to_remove: HashSet<OutputPointer>,
}

impl Diff {
    /// Apply the recorded deletions and insertions, all or nothing: the pool is left untouched
    /// if any consumed outpoint is missing or any produced outpoint already exists.
    pub fn apply(self, utxo_set: &mut UnspentOutputsPool) -> Result<(), UtxoError> {
        for output_pointer in &self.utxos_to_remove {
            if !utxo_set.contains_key(output_pointer) {
                return Err(UtxoError::DoubleSpend {
                    output: *output_pointer,
                });
            }
        }

        for output_pointer in self.utxos_to_add.keys() {
            if utxo_set.contains_key(output_pointer) {
                return Err(UtxoError::DuplicateOutpoint {
                    output: *output_pointer,
                });
            }
        }

        for output_pointer in self.utxos_to_remove.iter() {
            log::debug!("removing {} from the unspent outputs pool", output_pointer);
            utxo_set.remove(output_pointer);
        }

        for (output_pointer, output) in self.utxos_to_add {
            log::debug!("inserting {} into the unspent outputs pool", output_pointer);
            utxo_set.insert(output_pointer, output);
        }

        Ok(())
    }
}

/// Contains a reference to an UnspentOutputsPool plus subsequent
/// insertions and deletions to performed on that pool.
/// Use `.take_diff()` to obtain an instance of the `Diff` type.
pub struct UtxoDiff<'a> {
    diff: Diff,
    utxo_set: &'a UnspentOutputsPool,
}

impl<'a> UtxoDiff<'a> {
    /// Create a new UtxoDiff without additional insertions or deletions
    pub fn new(utxo_set: &'a UnspentOutputsPool) -> Self {
        UtxoDiff {
            utxo_set,
            diff: Diff::default(),
        }
    }

    /// Record an insertion to perform on the utxo set
    pub fn insert_utxo(&mut self, output_pointer: OutputPointer, output: TransactionOutput) {
        self.diff.utxos_to_add.insert(output_pointer, output);
    }

    /// Record a deletion to perform on the utxo set
    pub fn remove_utxo(&mut self, output_pointer: OutputPointer) {
        if self.diff.utxos_to_add.remove(&output_pointer).is_none() {
            self.diff.utxos_to_remove.insert(output_pointer);
        }
    }

    /// Get an utxo from the original utxo set or one that has been
    /// recorded as inserted later. If the same utxo has been recorded
    /// as removed, None will be returned.
    pub fn get(&self, output_pointer: &OutputPointer) -> Option<&TransactionOutput> {
        self.utxo_set
            .get(output_pointer)
            .or_else(|| self.diff.utxos_to_add.get(output_pointer))
            .and_then(|output| {
                if self.diff.utxos_to_remove.contains(output_pointer) {
                    None
                } else {
                    Some(output)
                }
            })
    }

    /// Consumes the UtxoDiff and returns only the diffs, without the
    /// reference to the utxo set.
    pub fn take_diff(self) -> Diff {
        self.diff
    }
}
