use serde::{Deserialize, Serialize};

use stakenet_crypto::{
    hash::calculate_sha256,
    key::CryptoEngine,
    secp256k1::{self, SecretKey},
    signature,
};

use crate::chain::{Hash, Hashable, Input, KeyedSignature, TransactionOutput};

/// Transaction data structure: a signed body
#[derive(Debug, Default, Eq, PartialEq, Clone, Serialize, Deserialize, Hash)]
pub struct Transaction {
    /// Inputs and outputs; determines the transaction id
    pub body: TransactionBody,
    /// One signature per input, over the digest returned by
    /// [`TransactionBody::signature_data`](TransactionBody::signature_data)
    pub signatures: Vec<KeyedSignature>,
}

impl Transaction {
    /// Creates a new transaction from its body and matching signatures
    pub fn new(body: TransactionBody, signatures: Vec<KeyedSignature>) -> Self {
        Transaction { body, signatures }
    }

    /// Create a special transaction that is only valid while bootstrapping the ledger, because
    /// it has no inputs and therefore creates value.
    ///
    /// Note that in order to be valid:
    /// * The transaction must have at least one output
    /// * All the outputs must have some value (value cannot be 0)
    pub fn genesis(outputs: Vec<TransactionOutput>) -> Self {
        Self::new(TransactionBody::new(vec![], outputs), vec![])
    }

    /// Serialize into the canonical byte encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        canonical_bytes(self)
    }

    /// Deserialize from the canonical byte encoding.
    ///
    /// Malformed bytes, including unknown destination variants, are a decode error: the
    /// submission that carried them is rejected before any state is touched.
    pub fn from_bytes(bytes: &[u8]) -> bincode::Result<Self> {
        bincode::deserialize(bytes)
    }
}

impl AsRef<Transaction> for Transaction {
    fn as_ref(&self) -> &Self {
        self
    }
}

/// The signature-free part of a transaction. Its hash is the transaction id, which input
/// signatures can therefore reference without invalidating themselves.
#[derive(Debug, Default, Eq, PartialEq, Clone, Serialize, Deserialize, Hash)]
pub struct TransactionBody {
    /// References to the unspent outputs being consumed, unique within the transaction
    pub inputs: Vec<Input>,
    /// The outputs being produced
    pub outputs: Vec<TransactionOutput>,
}

impl TransactionBody {
    /// Creates a new transaction body.
    pub fn new(inputs: Vec<Input>, outputs: Vec<TransactionOutput>) -> Self {
        TransactionBody { inputs, outputs }
    }

    /// Digest signed by every input: binds the transaction id to the exact outputs being
    /// spent, so a signature cannot be replayed against substituted prior outputs.
    pub fn signature_data(&self, spent_outputs: &[TransactionOutput]) -> Hash {
        let Hash::SHA256(id) = self.hash();
        let Hash::SHA256(spent) = Hash::from(calculate_sha256(&canonical_bytes(&spent_outputs)));

        let mut data = Vec::with_capacity(64);
        data.extend_from_slice(&id);
        data.extend_from_slice(&spent);

        calculate_sha256(&data).into()
    }
}

/// Deterministic canonical encoding used for hashing
fn canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    bincode::serialize(value).expect("serializing in-memory chain types cannot fail")
}

impl Hashable for TransactionBody {
    fn hash(&self) -> Hash {
        calculate_sha256(&canonical_bytes(self)).into()
    }
}

/// The transaction id is the hash of the body: attaching signatures does not change it
impl Hashable for Transaction {
    fn hash(&self) -> Hash {
        self.body.hash()
    }
}

/// Sign one input of a transaction: produces the [`KeyedSignature`](KeyedSignature) of
/// `secret_key` over the body's signature data.
pub fn sign(
    engine: &CryptoEngine,
    body: &TransactionBody,
    spent_outputs: &[TransactionOutput],
    secret_key: &SecretKey,
) -> Result<KeyedSignature, secp256k1::Error> {
    let Hash::SHA256(digest) = body.signature_data(spent_outputs);
    let signature = signature::sign(engine, *secret_key, &digest)?;
    let public_key = signature::PublicKey::from_secret_key(engine, secret_key);

    Ok(KeyedSignature {
        signature: signature.into(),
        public_key: public_key.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{OutputPointer, PublicKey, PublicKeyHash};
    use std::convert::TryFrom;

    fn keypair(seed: u8) -> (SecretKey, PublicKeyHash) {
        let engine = CryptoEngine::new();
        let secret_key = SecretKey::from_slice(&[seed; 32]).unwrap();
        let public_key: PublicKey =
            signature::PublicKey::from_secret_key(&engine, &secret_key).into();

        (secret_key, public_key.pkh())
    }

    fn sample_body() -> TransactionBody {
        let (_, pkh) = keypair(0x11);
        let input = Input::new(OutputPointer {
            transaction_id: Hash::SHA256([1; 32]),
            output_index: 0,
        });

        TransactionBody::new(vec![input], vec![TransactionOutput::new_pubkey(1_000, pkh)])
    }

    #[test]
    fn test_transaction_id_excludes_signatures() {
        let engine = CryptoEngine::new();
        let (secret_key, pkh) = keypair(0x22);
        let body = sample_body();
        let spent = vec![TransactionOutput::new_pubkey(2_000, pkh)];

        let unsigned = Transaction::new(body.clone(), vec![]);
        let keyed_signature = sign(&engine, &body, &spent, &secret_key).unwrap();
        let signed = Transaction::new(body, vec![keyed_signature]);

        assert_eq!(unsigned.hash(), signed.hash());
    }

    #[test]
    fn test_transaction_id_covers_outputs() {
        let mut body = sample_body();
        let id = body.hash();

        body.outputs[0].value += 1;
        assert_ne!(body.hash(), id);
    }

    #[test]
    fn test_signature_data_covers_spent_outputs() {
        let (_, pkh) = keypair(0x33);
        let body = sample_body();

        let spent_a = vec![TransactionOutput::new_pubkey(2_000, pkh)];
        let spent_b = vec![TransactionOutput::new_pubkey(2_001, pkh)];

        // Substituting the output being spent must change what was signed
        assert_ne!(body.signature_data(&spent_a), body.signature_data(&spent_b));
        assert_eq!(body.signature_data(&spent_a), body.signature_data(&spent_a));
    }

    #[test]
    fn test_sign_produces_verifiable_signature() {
        let engine = CryptoEngine::new();
        let (secret_key, pkh) = keypair(0x44);
        let body = sample_body();
        let spent = vec![TransactionOutput::new_pubkey(2_000, pkh)];

        let keyed_signature = sign(&engine, &body, &spent, &secret_key).unwrap();
        assert_eq!(keyed_signature.public_key.pkh(), pkh);

        let Hash::SHA256(digest) = body.signature_data(&spent);
        let public_key = signature::PublicKey::try_from(&keyed_signature.public_key).unwrap();
        let signature = signature::Signature::try_from(&keyed_signature.signature).unwrap();

        assert!(signature::verify(&engine, &public_key, &digest, &signature).is_ok());
    }

    #[test]
    fn test_canonical_encoding_roundtrip() {
        let engine = CryptoEngine::new();
        let (secret_key, pkh) = keypair(0x66);
        let body = sample_body();
        let spent = vec![TransactionOutput::new_pubkey(2_000, pkh)];
        let keyed_signature = sign(&engine, &body, &spent, &secret_key).unwrap();
        let transaction = Transaction::new(body, vec![keyed_signature]);

        let bytes = transaction.to_bytes();
        assert_eq!(Transaction::from_bytes(&bytes).unwrap(), transaction);
    }

    #[test]
    fn test_malformed_bytes_are_a_decode_error() {
        let transaction = Transaction::new(sample_body(), vec![]);
        let mut bytes = transaction.to_bytes();

        // Truncated input
        assert!(Transaction::from_bytes(&bytes[..bytes.len() - 1]).is_err());

        // Unknown destination variant: the tag of the only output's destination sits before
        // its 20-byte key hash and the trailing 8-byte signatures length
        let tag = bytes.len() - 32;
        bytes[tag] = 0xff;
        assert!(Transaction::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_genesis_has_no_inputs() {
        let (_, pkh) = keypair(0x55);
        let genesis = Transaction::genesis(vec![TransactionOutput::new_pubkey(1_000, pkh)]);

        assert!(genesis.body.inputs.is_empty());
        assert!(genesis.signatures.is_empty());
        assert_eq!(genesis.body.outputs.len(), 1);
    }
}
