//! Signing key management

use secp256k1::{All, PublicKey, Secp256k1, SecretKey};

/// Context for secp256k1 cryptographic operations
pub type CryptoEngine = Secp256k1<All>;

/// Derive the public key corresponding to a secret key
pub fn public_key(engine: &CryptoEngine, secret_key: &SecretKey) -> PublicKey {
    PublicKey::from_secret_key(engine, secret_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_key_derivation_is_deterministic() {
        let engine = CryptoEngine::new();
        let secret_key =
            SecretKey::from_slice(&[0xcd; 32]).expect("32 bytes, within curve order");

        assert_eq!(
            public_key(&engine, &secret_key),
            public_key(&engine, &secret_key)
        );
    }
}
