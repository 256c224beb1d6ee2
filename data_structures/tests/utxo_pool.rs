use stakenet_data_structures::chain::{Hash, OutputPointer, PublicKeyHash, TransactionOutput};
use stakenet_data_structures::utxo_pool::{UnspentOutputsPool, UtxoDiff, UtxoError};

fn pkh(seed: u8) -> PublicKeyHash {
    PublicKeyHash::from_bytes(&[seed; 20]).unwrap()
}

fn outpoint(seed: u8, output_index: u32) -> OutputPointer {
    OutputPointer {
        transaction_id: Hash::SHA256([seed; 32]),
        output_index,
    }
}

#[test]
fn utxo_pool_insert_get_remove() {
    let mut pool = UnspentOutputsPool::default();
    let output = TransactionOutput::new_pubkey(1_000, pkh(1));

    assert!(pool.is_empty());
    assert_eq!(pool.insert(outpoint(1, 0), output.clone()), None);
    assert_eq!(pool.len(), 1);
    assert!(pool.contains_key(&outpoint(1, 0)));
    assert_eq!(pool.get(&outpoint(1, 0)), Some(&output));

    assert_eq!(pool.remove(&outpoint(1, 0)), Some(output));
    assert!(pool.is_empty());
    assert_eq!(pool.get(&outpoint(1, 0)), None);
}

#[test]
fn utxo_pool_iter_locked_filters_staking_destinations() {
    let mut pool = UnspentOutputsPool::default();
    pool.insert(outpoint(1, 0), TransactionOutput::new_pubkey(1_000, pkh(1)));
    pool.insert(
        outpoint(1, 1),
        TransactionOutput::new_stake(2_000, pkh(2), pkh(1), vec![0xaa]),
    );
    pool.insert(
        outpoint(1, 2),
        TransactionOutput::new_stake_extra(3_000, pkh(1)),
    );

    let mut locked: Vec<_> = pool.iter_locked().map(|(o, _)| *o).collect();
    locked.sort();

    assert_eq!(locked, vec![outpoint(1, 1), outpoint(1, 2)]);
}

#[test]
fn utxo_diff_get_sees_insertions_and_hides_removals() {
    let mut pool = UnspentOutputsPool::default();
    let existing = TransactionOutput::new_pubkey(1_000, pkh(1));
    pool.insert(outpoint(1, 0), existing.clone());

    let mut utxo_diff = UtxoDiff::new(&pool);
    assert_eq!(utxo_diff.get(&outpoint(1, 0)), Some(&existing));

    let produced = TransactionOutput::new_pubkey(900, pkh(2));
    utxo_diff.insert_utxo(outpoint(2, 0), produced.clone());
    assert_eq!(utxo_diff.get(&outpoint(2, 0)), Some(&produced));

    utxo_diff.remove_utxo(outpoint(1, 0));
    assert_eq!(utxo_diff.get(&outpoint(1, 0)), None);

    // Removing a pending insertion cancels it instead of touching the pool
    utxo_diff.remove_utxo(outpoint(2, 0));
    assert_eq!(utxo_diff.get(&outpoint(2, 0)), None);

    let diff = utxo_diff.take_diff();
    diff.apply(&mut pool).unwrap();
    assert!(pool.is_empty());
}

#[test]
fn diff_apply_consumes_and_produces() {
    let mut pool = UnspentOutputsPool::default();
    pool.insert(outpoint(1, 0), TransactionOutput::new_pubkey(1_000, pkh(1)));

    let mut utxo_diff = UtxoDiff::new(&pool);
    utxo_diff.remove_utxo(outpoint(1, 0));
    utxo_diff.insert_utxo(outpoint(2, 0), TransactionOutput::new_pubkey(900, pkh(2)));
    utxo_diff.insert_utxo(outpoint(2, 1), TransactionOutput::new_pubkey(100, pkh(1)));

    utxo_diff.take_diff().apply(&mut pool).unwrap();

    assert_eq!(pool.len(), 2);
    assert!(!pool.contains_key(&outpoint(1, 0)));
    assert!(pool.contains_key(&outpoint(2, 0)));
    assert!(pool.contains_key(&outpoint(2, 1)));
}

#[test]
fn diff_apply_is_atomic_on_double_spend() {
    let mut pool = UnspentOutputsPool::default();
    pool.insert(outpoint(1, 0), TransactionOutput::new_pubkey(1_000, pkh(1)));
    let snapshot = pool.clone();

    let mut utxo_diff = UtxoDiff::new(&pool);
    utxo_diff.remove_utxo(outpoint(1, 0));
    utxo_diff.remove_utxo(outpoint(9, 0));
    utxo_diff.insert_utxo(outpoint(2, 0), TransactionOutput::new_pubkey(900, pkh(2)));

    let error = utxo_diff.take_diff().apply(&mut pool).unwrap_err();

    assert_eq!(
        error,
        UtxoError::DoubleSpend {
            output: outpoint(9, 0)
        }
    );
    // Nothing was removed and nothing was inserted
    assert_eq!(pool, snapshot);
}

#[test]
fn diff_apply_is_atomic_on_duplicate_outpoint() {
    let mut pool = UnspentOutputsPool::default();
    pool.insert(outpoint(1, 0), TransactionOutput::new_pubkey(1_000, pkh(1)));
    pool.insert(outpoint(2, 0), TransactionOutput::new_pubkey(500, pkh(2)));
    let snapshot = pool.clone();

    let mut utxo_diff = UtxoDiff::new(&pool);
    utxo_diff.remove_utxo(outpoint(1, 0));
    utxo_diff.insert_utxo(outpoint(2, 0), TransactionOutput::new_pubkey(900, pkh(2)));

    let error = utxo_diff.take_diff().apply(&mut pool).unwrap_err();

    assert_eq!(
        error,
        UtxoError::DuplicateOutpoint {
            output: outpoint(2, 0)
        }
    );
    assert_eq!(pool, snapshot);
}
