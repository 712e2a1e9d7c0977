//! Wallet signature bytes and recovery-byte normalization.

/// A signature handed back by an external wallet signer.
///
/// Conventionally 65 bytes (32-byte `r`, 32-byte `s`, 1-byte recovery value)
/// but whatever length the signer produces is accepted; derivation hashes the
/// bytes as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The trailing recovery/v byte, if any.
    pub fn recovery_byte(&self) -> Option<u8> {
        self.0.last().copied()
    }

    /// Copy of the signature with the final byte replaced. The original is
    /// left untouched so both derivation attempts see exactly the bytes they
    /// expect.
    pub fn with_last_byte_replaced(&self, byte: u8) -> Self {
        let mut bytes = self.0.clone();
        if let Some(last) = bytes.last_mut() {
            *last = byte;
        }
        Self(bytes)
    }

    /// Collapse a `{27, 28, ..}` recovery byte to the `{0, 1}` convention by
    /// subtracting 27 (wrapping, matching the byte-array arithmetic of
    /// signers that emit the offset form). Returns `None` when the byte is
    /// already 0 or 1, or the signature is empty: there is no second
    /// candidate to try.
    pub fn normalized_recovery(&self) -> Option<Signature> {
        match self.recovery_byte() {
            Some(v) if v > 1 => Some(self.with_last_byte_replaced(v.wrapping_sub(27))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn normalizes_offset_recovery_byte() {
        let sig = Signature::new(vec![0xaa; 64].into_iter().chain([0x1c]).collect());
        let normalized = sig.normalized_recovery().unwrap();
        assert_eq!(normalized.recovery_byte(), Some(0x01));
        // original untouched
        assert_eq!(sig.recovery_byte(), Some(0x1c));
        assert_eq!(&normalized.as_bytes()[..64], &sig.as_bytes()[..64]);
    }

    #[test]
    fn already_normalized_has_no_second_candidate() {
        for v in [0x00, 0x01] {
            let sig = Signature::new(vec![0x11, 0x22, v]);
            assert_eq!(sig.normalized_recovery(), None);
        }
    }

    #[test]
    fn empty_signature_has_no_second_candidate() {
        assert_eq!(Signature::new(vec![]).normalized_recovery(), None);
    }

    #[test]
    fn replacing_last_byte_copies() {
        let sig = Signature::new(vec![1, 2, 3]);
        let replaced = sig.with_last_byte_replaced(9);
        assert_eq!(replaced.as_bytes(), &[1, 2, 9]);
        assert_eq!(sig.as_bytes(), &[1, 2, 3]);
    }
}
