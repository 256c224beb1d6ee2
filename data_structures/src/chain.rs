use std::fmt;

use serde::{Deserialize, Serialize};

use stakenet_crypto::hash::{calculate_sha256, Sha256};
use stakenet_crypto::signature;

use crate::coin::UNITS_PER_COIN;
use crate::error::AddressError;

pub trait Hashable {
    fn hash(&self) -> Hash;
}

/// Any reference to a Hashable type is also Hashable
impl<'a, T: Hashable> Hashable for &'a T {
    fn hash(&self) -> Hash {
        (*self).hash()
    }
}

/// Possible values for the "environment" configuration param.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Eq, PartialEq)]
pub enum Environment {
    /// "mainnet" environment
    #[serde(rename = "mainnet")]
    Mainnet,
    /// "testnet" environment
    #[serde(rename = "testnet")]
    Testnet,
}

impl Default for Environment {
    fn default() -> Environment {
        Environment::Testnet
    }
}

impl Environment {
    /// Bech32 human-readable part used by addresses in this environment
    pub fn bech32_prefix(self) -> &'static str {
        match self {
            Environment::Mainnet => "stk",
            Environment::Testnet => "tstk",
        }
    }
}

/// Consensus-critical configuration
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConsensusConstants {
    /// Minimum value, in base units, that a `Stake` output needs in order to establish a
    /// staking position. `StakeExtra` contributions only need to be non-zero.
    pub minimum_stake: u64,
}

impl Default for ConsensusConstants {
    fn default() -> ConsensusConstants {
        ConsensusConstants {
            minimum_stake: 100 * UNITS_PER_COIN,
        }
    }
}

/// SHA-256 Hash
pub type SHA256 = [u8; 32];

/// Hash
#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Serialize, Deserialize, Hash)]
pub enum Hash {
    /// SHA-256 Hash
    SHA256(SHA256),
}

impl Default for Hash {
    fn default() -> Hash {
        Hash::SHA256([0; 32])
    }
}

/// Conversion between stakenet_crypto::Sha256 and stakenet_data_structures::Hash
impl From<Sha256> for Hash {
    fn from(x: Sha256) -> Self {
        Hash::SHA256(x.0)
    }
}

impl Hash {
    /// The raw digest bytes
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Hash::SHA256(bytes) => bytes,
        }
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hash::SHA256(h) => f.write_str(&hex::encode(h)),
        }
    }
}

/// Public Key Hash: slice of the digest of a public key (20 bytes).
///
/// It is the identity of both ordinary output owners and staking accounts.
#[derive(
    Debug, Default, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Serialize, Deserialize, Hash,
)]
pub struct PublicKeyHash {
    hash: [u8; 20],
}

impl fmt::Display for PublicKeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.hash))
    }
}

impl PublicKeyHash {
    /// The raw 20 bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.hash
    }

    /// Calculate the hash of the provided public key
    pub fn from_public_key(pk: &PublicKey) -> Self {
        let mut pkh = [0; 20];
        let Sha256(h) = calculate_sha256(&pk.to_bytes());
        pkh.copy_from_slice(&h[..20]);

        Self { hash: pkh }
    }

    /// Create from a 20-byte slice
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        let len = bytes.len();

        if len != 20 {
            Err(AddressError::InvalidLength { length: len })
        } else {
            let mut pkh = [0; 20];
            pkh.copy_from_slice(bytes);

            Ok(Self { hash: pkh })
        }
    }

    /// Serialize the public key hash as a bech32 address
    pub fn bech32(&self, environment: Environment) -> String {
        let hrp = bech32::Hrp::parse_unchecked(environment.bech32_prefix());

        // The data is always 20 bytes long, encoding cannot fail
        bech32::encode::<bech32::Bech32>(hrp, &self.hash)
            .expect("20-byte payloads are always encodable")
    }

    /// Deserialize a public key hash from a bech32 address
    pub fn from_bech32(environment: Environment, address: &str) -> Result<Self, AddressError> {
        let (hrp, data) =
            bech32::decode(address).map_err(|e| AddressError::Bech32(e.to_string()))?;

        let expected = environment.bech32_prefix();
        let prefix = hrp.to_lowercase();
        if prefix != expected {
            return Err(AddressError::WrongPrefix {
                prefix,
                expected: expected.to_string(),
            });
        }

        Self::from_bytes(&data)
    }
}

/// Compressed secp256k1 public key: one parity byte plus the 32-byte x coordinate
#[derive(Debug, Default, Eq, PartialEq, Ord, PartialOrd, Clone, Serialize, Deserialize, Hash)]
pub struct PublicKey {
    /// Byte indicating how to decompress the public key
    pub compressed: u8,
    /// Public key bytes
    pub bytes: [u8; 32],
}

impl PublicKey {
    /// Serialize the compressed form (33 bytes)
    pub fn to_bytes(&self) -> [u8; 33] {
        let mut serialized = [0; 33];
        serialized[0] = self.compressed;
        serialized[1..].copy_from_slice(&self.bytes);

        serialized
    }

    /// Shortcut for the hash of this public key
    pub fn pkh(&self) -> PublicKeyHash {
        PublicKeyHash::from_public_key(self)
    }
}

impl From<signature::PublicKey> for PublicKey {
    fn from(pk: signature::PublicKey) -> Self {
        let serialized = pk.serialize();
        let mut bytes = [0; 32];
        bytes.copy_from_slice(&serialized[1..]);

        PublicKey {
            compressed: serialized[0],
            bytes,
        }
    }
}

impl TryFrom<&PublicKey> for signature::PublicKey {
    type Error = stakenet_crypto::secp256k1::Error;

    fn try_from(pk: &PublicKey) -> Result<Self, Self::Error> {
        signature::PublicKey::from_slice(&pk.to_bytes())
    }
}

/// Digital signatures structure (based on supported cryptosystems)
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize, Hash)]
pub enum Signature {
    /// ECDSA over secp256k1
    Secp256k1(Secp256k1Signature),
}

/// ECDSA (over secp256k1) signature
#[derive(Debug, Default, Eq, PartialEq, Clone, Serialize, Deserialize, Hash)]
pub struct Secp256k1Signature {
    /// The DER serialized signature
    pub der: Vec<u8>,
}

impl From<signature::Signature> for Signature {
    fn from(sig: signature::Signature) -> Self {
        Signature::Secp256k1(Secp256k1Signature {
            der: sig.serialize_der().to_vec(),
        })
    }
}

impl TryFrom<&Signature> for signature::Signature {
    type Error = stakenet_crypto::secp256k1::Error;

    fn try_from(sig: &Signature) -> Result<Self, Self::Error> {
        let Signature::Secp256k1(Secp256k1Signature { der }) = sig;

        signature::Signature::from_der(der)
    }
}

/// Keyed signature data structure
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize, Hash)]
pub struct KeyedSignature {
    /// Signature
    pub signature: Signature,
    /// Public key that produced the signature
    pub public_key: PublicKey,
}

/// Unspent output data structure (equivalent of Bitcoin's UTXO)
/// It is used to locate the output by the id of the transaction that created it and its
/// position in that transaction's output list
#[derive(
    Debug, Default, Hash, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct OutputPointer {
    /// Id of the transaction that created the output
    pub transaction_id: Hash,
    /// Position of the output inside the transaction
    pub output_index: u32,
}

impl fmt::Display for OutputPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.output_index)
    }
}

/// Transaction input: a reference to the unspent output being consumed
#[derive(Debug, Default, Eq, PartialEq, Copy, Clone, Serialize, Deserialize, Hash)]
pub struct Input {
    output_pointer: OutputPointer,
}

impl Input {
    /// Create a new Input from an OutputPointer
    pub fn new(output_pointer: OutputPointer) -> Self {
        Self { output_pointer }
    }

    /// Return the [`OutputPointer`](OutputPointer) of the output this input spends
    pub fn output_pointer(&self) -> &OutputPointer {
        &self.output_pointer
    }
}

/// Destination specifies the spending conditions of an output.
///
/// This is a closed set: adding a variant is a deliberate schema change, not a runtime
/// extension point.
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize, Hash)]
pub enum Destination {
    /// Plain pay-to-public-key-hash
    PubKey(PublicKeyHash),
    /// While unspent, the value is locked and attributed to the staking weight of `stake_key`
    Stake {
        /// Staking account the value is attributed to
        stake_key: PublicKeyHash,
        /// Key allowed to spend the output
        owner: PublicKeyHash,
        /// Opaque consensus key material, carried through unvalidated at this layer
        session_key: Vec<u8>,
    },
    /// Auxiliary locked contribution to the staking position established by the nearest
    /// preceding `Stake` output of the same transaction
    StakeExtra {
        /// Key allowed to spend the output
        owner: PublicKeyHash,
    },
}

impl Destination {
    /// The key whose signature authorizes spending an output with this destination.
    ///
    /// For the staking variants this is the owner key, not the staking account key.
    pub fn required_signer(&self) -> &PublicKeyHash {
        match self {
            Destination::PubKey(pkh) => pkh,
            Destination::Stake { owner, .. } => owner,
            Destination::StakeExtra { owner } => owner,
        }
    }

    /// The staking account this output establishes a position for, if any.
    ///
    /// `StakeExtra` outputs return `None` here: their account is resolved from the
    /// transaction they appear in.
    pub fn staking_key(&self) -> Option<&PublicKeyHash> {
        match self {
            Destination::Stake { stake_key, .. } => Some(stake_key),
            _ => None,
        }
    }

    /// Whether an unspent output with this destination is locked for staking
    pub fn is_staking(&self) -> bool {
        matches!(
            self,
            Destination::Stake { .. } | Destination::StakeExtra { .. }
        )
    }
}

/// Output of a transaction
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize, Hash)]
pub struct TransactionOutput {
    /// Amount of value carried, in base units; must be greater than zero
    pub value: u64,
    /// Reserved metadata tag for future output features; opaque at this layer
    pub header: u32,
    /// Spending conditions attached to the value
    pub destination: Destination,
}

impl TransactionOutput {
    /// Create a new pay-to-public-key-hash output
    pub fn new_pubkey(value: u64, pkh: PublicKeyHash) -> Self {
        Self {
            value,
            header: 0,
            destination: Destination::PubKey(pkh),
        }
    }

    /// Create a new output that locks the value as stake for `stake_key`
    pub fn new_stake(
        value: u64,
        stake_key: PublicKeyHash,
        owner: PublicKeyHash,
        session_key: Vec<u8>,
    ) -> Self {
        Self {
            value,
            header: 0,
            destination: Destination::Stake {
                stake_key,
                owner,
                session_key,
            },
        }
    }

    /// Create a new output that adds locked value to the staking position established by the
    /// nearest preceding `Stake` output of the same transaction
    pub fn new_stake_extra(value: u64, owner: PublicKeyHash) -> Self {
        Self {
            value,
            header: 0,
            destination: Destination::StakeExtra { owner },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakenet_crypto::key::CryptoEngine;
    use stakenet_crypto::secp256k1::SecretKey;

    fn test_public_key(seed: u8) -> PublicKey {
        let engine = CryptoEngine::new();
        let secret_key = SecretKey::from_slice(&[seed; 32]).unwrap();

        signature::PublicKey::from_secret_key(&engine, &secret_key).into()
    }

    #[test]
    fn test_public_key_roundtrip() {
        let pk = test_public_key(0x11);
        let secp_pk = signature::PublicKey::try_from(&pk).unwrap();

        assert_eq!(PublicKey::from(secp_pk), pk);
    }

    #[test]
    fn test_pkh_is_deterministic() {
        let pk = test_public_key(0x22);

        assert_eq!(pk.pkh(), pk.pkh());
        assert_ne!(pk.pkh(), test_public_key(0x33).pkh());
    }

    #[test]
    fn test_bech32_roundtrip() {
        let pkh = test_public_key(0x44).pkh();
        let address = pkh.bech32(Environment::Mainnet);

        assert!(address.starts_with("stk1"));
        assert_eq!(
            PublicKeyHash::from_bech32(Environment::Mainnet, &address).unwrap(),
            pkh
        );
    }

    #[test]
    fn test_bech32_wrong_environment() {
        let pkh = test_public_key(0x44).pkh();
        let address = pkh.bech32(Environment::Testnet);

        let error = PublicKeyHash::from_bech32(Environment::Mainnet, &address).unwrap_err();
        assert_eq!(
            error,
            AddressError::WrongPrefix {
                prefix: "tstk".to_string(),
                expected: "stk".to_string(),
            }
        );
    }

    #[test]
    fn test_required_signer() {
        let owner = test_public_key(0x55).pkh();
        let stake_key = test_public_key(0x66).pkh();

        assert_eq!(*Destination::PubKey(owner).required_signer(), owner);

        let stake = Destination::Stake {
            stake_key,
            owner,
            session_key: vec![1, 2, 3],
        };
        // The owner key spends a stake output, not the staking account key
        assert_eq!(*stake.required_signer(), owner);
        assert_eq!(stake.staking_key(), Some(&stake_key));
        assert!(stake.is_staking());

        let extra = Destination::StakeExtra { owner };
        assert_eq!(*extra.required_signer(), owner);
        assert_eq!(extra.staking_key(), None);
        assert!(extra.is_staking());

        assert!(!Destination::PubKey(owner).is_staking());
        assert_eq!(Destination::PubKey(owner).staking_key(), None);
    }

    #[test]
    fn test_output_pointer_display() {
        let output_pointer = OutputPointer {
            transaction_id: Hash::SHA256([0xff; 32]),
            output_index: 2,
        };

        assert_eq!(
            output_pointer.to_string(),
            format!("{}:2", "ff".repeat(32))
        );
    }
}
