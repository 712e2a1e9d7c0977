//! Deterministic taproot key derivation from a wallet signature.
//!
//! The signature bytes are hashed with keccak256 (the hash of the chain the
//! signature came from) into a BIP32 master seed, and the key is taken at the
//! standard single-key taproot path. Signers disagree on how the trailing
//! recovery byte is encoded (`{0,1}` versus `{27,28}`), so when the byte is
//! ambiguous a second candidate is derived from the normalized signature;
//! the caller checks which of the two keys their funds landed on.

use core::str::FromStr;

use bitcoin::bip32::{DerivationPath, Xpriv};
use bitcoin::hex::DisplayHex;
use bitcoin::secp256k1::Secp256k1;
use bitcoin::{NetworkKind, PrivateKey};
use sha3::{Digest, Keccak256};

use crate::descriptor;
use crate::signature::Signature;

/// BIP86 single-key taproot path the key is recovered at.
pub const DERIVATION_PATH: &str = "m/86'/0'/0'/0/0";

/// A private key recovered from a wallet signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveredKey {
    secret: [u8; 32],
}

impl RecoveredKey {
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret
    }

    /// Lowercase hex of the 32 raw key bytes.
    pub fn to_hex(&self) -> String {
        self.secret.to_lower_hex_string()
    }

    /// Mainnet compressed-key WIF encoding.
    pub fn to_wif(&self) -> String {
        PrivateKey::from_slice(&self.secret, NetworkKind::Main)
            .expect("bip32 child key is a valid scalar")
            .to_wif()
    }

    /// `tr(<wif>)` descriptor with its checksum appended.
    pub fn descriptor(&self) -> String {
        descriptor::checked(&format!("tr({})", self.to_wif()))
            .expect("wif is base58 which is within the descriptor character set")
    }
}

/// The one or two candidate keys a signature derives to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCandidates {
    /// Key derived from the signature exactly as the signer returned it.
    pub primary: RecoveredKey,
    /// Key derived after recovery-byte normalization. `None` when the
    /// recovery byte was already in `{0, 1}` and normalization would repeat
    /// the primary derivation.
    pub alternate: Option<RecoveredKey>,
}

impl KeyCandidates {
    pub fn iter(&self) -> impl Iterator<Item = &RecoveredKey> {
        core::iter::once(&self.primary).chain(self.alternate.as_ref())
    }
}

/// Derive the candidate keys for a signature. Pure: the same signature always
/// yields the same candidates.
pub fn derive_candidates(signature: &Signature) -> KeyCandidates {
    KeyCandidates {
        primary: derive_key(signature.as_bytes()),
        alternate: signature
            .normalized_recovery()
            .map(|normalized| derive_key(normalized.as_bytes())),
    }
}

fn derive_key(signature_bytes: &[u8]) -> RecoveredKey {
    let seed: [u8; 32] = Keccak256::digest(signature_bytes).into();
    let master =
        Xpriv::new_master(NetworkKind::Main, &seed).expect("32 byte seed is a valid bip32 seed");
    let secp = Secp256k1::new();
    let path = DerivationPath::from_str(DERIVATION_PATH).expect("constant path is well formed");
    let child = master
        .derive_priv(&secp, &path)
        .expect("computationally unreachable");
    RecoveredKey {
        secret: child.private_key.secret_bytes(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_signature(recovery_byte: u8) -> Signature {
        let mut bytes: Vec<u8> = (1..=64).collect();
        bytes.push(recovery_byte);
        Signature::new(bytes)
    }

    #[test]
    fn derivation_is_deterministic() {
        let sig = test_signature(0x1c);
        assert_eq!(derive_candidates(&sig), derive_candidates(&sig));
    }

    #[test]
    fn offset_recovery_byte_yields_two_distinct_candidates() {
        let candidates = derive_candidates(&test_signature(0x1c));
        let alternate = candidates.alternate.expect("0x1c > 1");
        assert_ne!(candidates.primary, alternate);
        assert_eq!(candidates.iter().count(), 2);
    }

    #[test]
    fn normalized_recovery_byte_yields_one_candidate() {
        let candidates = derive_candidates(&test_signature(0x01));
        assert_eq!(candidates.alternate, None);
        assert_eq!(candidates.iter().count(), 1);
    }

    #[test]
    fn alternate_matches_pre_normalized_signature() {
        // signing with {27,28} or with {0,1} must land on the same key via
        // the alternate/primary pair
        let offset = derive_candidates(&test_signature(0x1c));
        let plain = derive_candidates(&test_signature(0x01));
        assert_eq!(offset.alternate, Some(plain.primary));
    }

    #[test]
    fn hex_encoding_is_64_lowercase_chars() {
        let key = derive_candidates(&test_signature(0x00)).primary;
        let hex = key.to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
    }

    #[test]
    fn wif_round_trips_through_rust_bitcoin() {
        let key = derive_candidates(&test_signature(0x1b)).primary;
        let parsed = PrivateKey::from_wif(&key.to_wif()).unwrap();
        assert_eq!(parsed.inner.secret_bytes(), key.secret_bytes());
        assert!(parsed.compressed);
        assert_eq!(parsed.network, NetworkKind::Main);
    }

    #[test]
    fn descriptor_wraps_wif_and_carries_valid_checksum() {
        let key = derive_candidates(&test_signature(0x1c)).primary;
        let desc = key.descriptor();
        assert!(desc.starts_with(&format!("tr({})#", key.to_wif())));
        assert_eq!(descriptor::checked(&desc).unwrap(), desc);
    }
}
