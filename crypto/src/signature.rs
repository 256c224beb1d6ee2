//! Signature module

use crate::key::CryptoEngine;
use secp256k1::{Error, Message, SecretKey};

/// Signature
pub type Signature = secp256k1::ecdsa::Signature;

/// PublicKey
pub type PublicKey = secp256k1::PublicKey;

/// Sign `data` with provided secret key. `data` must be the 32-byte output of a cryptographically
/// secure hash function, otherwise this function is not secure.
/// - Returns an Error if data is not a 32-byte array
pub fn sign(secp: &CryptoEngine, secret_key: SecretKey, data: &[u8]) -> Result<Signature, Error> {
    let msg = Message::from_digest_slice(data)?;

    Ok(secp.sign_ecdsa(&msg, &secret_key))
}

/// Verify signature with a provided public key.
/// - Returns an Error if data is not a 32-byte array
pub fn verify(
    secp: &CryptoEngine,
    public_key: &PublicKey,
    data: &[u8],
    sig: &Signature,
) -> Result<(), Error> {
    let msg = Message::from_digest_slice(data)?;

    secp.verify_ecdsa(&msg, sig, public_key)
}
