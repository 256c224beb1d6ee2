use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::chain::{OutputPointer, PublicKeyHash};
use crate::coin::Coin;
use crate::staking::StakesError;

/// The locked outpoints of one staking account and their total value.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct StakeEntry {
    /// Locked outpoints with the value each contributes.
    locked: BTreeMap<OutputPointer, u64>,
    /// Cached sum of the locked values.
    total: Coin,
}

impl StakeEntry {
    /// How many outpoints are currently locked for this account
    pub fn locked_count(&self) -> u64 {
        self.locked.len() as u64
    }

    /// Total locked value of this account
    pub fn total_locked(&self) -> Coin {
        self.total
    }

    /// Iterate over the locked outpoints and the value each contributes
    pub fn iter(&self) -> impl Iterator<Item = (&OutputPointer, &u64)> {
        self.locked.iter()
    }
}

/// The staking index: tracks, per staking account, which unspent outputs are locked and how
/// much value they add up to.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Stakes {
    /// The stake entries of all accounts with at least one locked outpoint.
    entries: BTreeMap<PublicKeyHash, StakeEntry>,
    /// Which staking key each locked outpoint is attributed to.
    by_outpoint: HashMap<OutputPointer, PublicKeyHash>,
    /// Staking keys in the order their accounts were created, for stable enumeration.
    insertion_order: Vec<PublicKeyHash>,
}

impl Stakes {
    /// Record `output` as locked under `stake_key`, creating the account on its first lock.
    pub fn add_locked(
        &mut self,
        stake_key: PublicKeyHash,
        output: OutputPointer,
        value: u64,
    ) -> Result<(), StakesError> {
        if self.by_outpoint.contains_key(&output) {
            return Err(StakesError::AlreadyLocked { output });
        }

        let entry = match self.entries.entry(stake_key) {
            Entry::Vacant(vacant) => {
                self.insertion_order.push(stake_key);
                vacant.insert(StakeEntry::default())
            }
            Entry::Occupied(occupied) => occupied.into_mut(),
        };

        entry.total = entry
            .total
            .checked_add(Coin::from_units(value))
            .ok_or(StakesError::TotalValueOverflow { stake_key })?;
        entry.locked.insert(output, value);
        self.by_outpoint.insert(output, stake_key);

        log::debug!(
            "locking {} ({} units) under staking key {}",
            output,
            value,
            stake_key
        );

        Ok(())
    }

    /// Remove `output` from the record of `stake_key` and subtract its value.
    ///
    /// The account is dropped once its last locked outpoint is removed; locking again later
    /// re-creates it at the end of the enumeration order.
    pub fn remove_locked(
        &mut self,
        stake_key: &PublicKeyHash,
        output: &OutputPointer,
    ) -> Result<u64, StakesError> {
        let not_locked = StakesError::NotLocked {
            stake_key: *stake_key,
            output: *output,
        };

        let entry = self.entries.get_mut(stake_key).ok_or(not_locked.clone())?;
        let value = entry.locked.remove(output).ok_or(not_locked)?;

        entry.total = entry.total - Coin::from_units(value);
        self.by_outpoint.remove(output);

        if entry.locked.is_empty() {
            self.entries.remove(stake_key);
            self.insertion_order.retain(|key| key != stake_key);
        }

        log::debug!(
            "unlocking {} ({} units) from staking key {}",
            output,
            value,
            stake_key
        );

        Ok(value)
    }

    /// The staking key a locked outpoint is attributed to, if any.
    pub fn staking_key_of(&self, output: &OutputPointer) -> Option<&PublicKeyHash> {
        self.by_outpoint.get(output)
    }

    /// Locked outpoint count and total locked value of one account.
    pub fn account_summary(&self, stake_key: &PublicKeyHash) -> Option<(u64, Coin)> {
        self.entries
            .get(stake_key)
            .map(|entry| (entry.locked_count(), entry.total_locked()))
    }

    /// How many accounts have at least one locked outpoint.
    pub fn stakes_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether no account has any locked outpoint.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the accounts in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (&PublicKeyHash, &StakeEntry)> {
        self.insertion_order.iter().map(move |key| {
            let entry = self
                .entries
                .get(key)
                .expect("the enumeration order only lists live accounts");

            (key, entry)
        })
    }
}
