//! Recover a deterministic Bitcoin Taproot private key from a wallet
//! signature.
//!
//! Some marketplaces derived their users' taproot keys inside the browser by
//! asking the connected Ethereum wallet to `personal_sign` a fixed message
//! and hashing the signature into a BIP32 seed. This crate reproduces that
//! derivation so the key can be exported into a real wallet: it turns the
//! signature into one or two candidate keys (the recovery byte is encoded
//! differently across signers) and renders each as raw hex, mainnet WIF and
//! a `tr(...)` descriptor with its checksum.
//!
//! The wallet itself is behind the [`Signer`] trait and whatever presents the
//! result is behind [`KeyDisplay`]; both are injected.

pub mod derive;
pub mod descriptor;
mod error;
pub mod signature;

pub use derive::{derive_candidates, KeyCandidates, RecoveredKey, DERIVATION_PATH};
pub use error::DescriptorError;
pub use signature::Signature;

use bitcoin::hex::DisplayHex;
use serde::Serialize;
use tracing::{event, Level};

/// Message the wallet is asked to sign. Must stay ASCII: the personal_sign
/// payload encodes one byte per character.
pub const SIGNING_MESSAGE: &str = "Sign this message to generate your Bitcoin Taproot key. This key will be used for your ordswap.io transactions.";

/// The bytes the signer is asked to sign over.
pub fn signing_message_bytes() -> &'static [u8] {
    debug_assert!(SIGNING_MESSAGE.is_ascii());
    SIGNING_MESSAGE.as_bytes()
}

/// The `personal_sign` request payload for [`SIGNING_MESSAGE`] (`0x` + hex
/// of the message bytes), for reproducing the signature in an Ethereum
/// wallet.
pub fn personal_sign_payload() -> String {
    format!("0x{}", signing_message_bytes().to_lower_hex_string())
}

/// Produces a signature over a message, or declines.
///
/// A real implementation sits in front of a wallet and may take arbitrarily
/// long or be rejected by the user; both surface here as `None`.
pub trait Signer {
    fn request_signature(&mut self, message: &[u8]) -> Option<Signature>;
}

/// Receives recovered keys, or the no-key state, for presentation.
pub trait KeyDisplay {
    fn show_key(&mut self, key: &KeyEntry);
    fn reset(&mut self);
}

/// The encodings handed to the display per candidate key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyEntry {
    /// Lowercase hex of the 32 key bytes
    pub hex: String,
    /// Mainnet compressed-key WIF
    pub wif: String,
    /// `tr(<wif>)#<checksum>`
    pub descriptor: String,
}

impl KeyEntry {
    pub fn from_key(key: &RecoveredKey) -> Self {
        KeyEntry {
            hex: key.to_hex(),
            wif: key.to_wif(),
            descriptor: key.descriptor(),
        }
    }
}

/// Outcome of one recovery round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverOutcome {
    /// The signer declined or produced nothing; the display was reset.
    NoSignature,
    /// Keys were derived and handed to the display.
    Recovered(KeyCandidates),
}

/// Run one recovery round: ask the signer for a signature over
/// [`SIGNING_MESSAGE`], derive the candidate keys and hand the encoding
/// triple for each one to the display.
pub fn recover_keys(signer: &mut impl Signer, display: &mut impl KeyDisplay) -> RecoverOutcome {
    let signature = match signer.request_signature(signing_message_bytes()) {
        Some(signature) if !signature.is_empty() => signature,
        _ => {
            event!(Level::INFO, "signer produced no signature");
            display.reset();
            return RecoverOutcome::NoSignature;
        }
    };

    let candidates = derive_candidates(&signature);
    event!(
        Level::DEBUG,
        signature_len = signature.len(),
        candidates = 1 + candidates.alternate.is_some() as usize,
        "derived candidate keys"
    );
    for key in candidates.iter() {
        display.show_key(&KeyEntry::from_key(key));
    }
    RecoverOutcome::Recovered(candidates)
}
