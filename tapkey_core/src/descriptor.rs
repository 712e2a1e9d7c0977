//! Output descriptor checksum, the BCH code descriptor wallets append after
//! `#`.
//!
//! Every group of 3 payload characters contributes their low 5 bits directly
//! and one extra symbol built from their top bits, so case errors (which are
//! a multiple-of-32 offset in the character set) are caught as reliably as
//! ordinary typos.

use crate::error::DescriptorError;

/// Character set descriptor payloads may use. The position of a character is
/// what enters the polynomial, so ordering is normative.
pub const INPUT_CHARSET: &str = "0123456789()[],'/*abcdefgh@:$%{}IJKLMNOPQRSTUVWXYZ&+-.;<=>?!^_|~ijklmnopqrstuvwxyzABCDEFGH`#\"\\ ";

/// Bech32 alphabet used for the 8 checksum characters.
pub const CHECKSUM_CHARSET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";

const GENERATOR: [u64; 5] = [
    0xf5dee51989,
    0xa9fdca3312,
    0x1bab10e32d,
    0x3706b1677a,
    0x644d626ffd,
];

fn polymod(c: u64, val: u64) -> u64 {
    let c0 = c >> 35;
    let mut c = ((c & 0x7_ffff_ffff) << 5) ^ val;
    for (i, gen) in GENERATOR.iter().enumerate() {
        if (c0 >> i) & 1 == 1 {
            c ^= gen;
        }
    }
    c
}

/// Compute the 8-character checksum of a descriptor payload (the part before
/// any `#`).
pub fn checksum(payload: &str) -> Result<String, DescriptorError> {
    if payload.is_empty() {
        return Err(DescriptorError::EmptyPayload);
    }
    let mut c = 1u64;
    let mut cls = 0u64;
    let mut cls_count = 0u8;
    for (position, character) in payload.chars().enumerate() {
        // the charset is ASCII so the byte index is the symbol position
        let pos = INPUT_CHARSET
            .find(character)
            .ok_or(DescriptorError::InvalidCharacter {
                character,
                position,
            })? as u64;
        c = polymod(c, pos & 31);
        cls = cls * 3 + (pos >> 5);
        cls_count += 1;
        if cls_count == 3 {
            c = polymod(c, cls);
            cls = 0;
            cls_count = 0;
        }
    }
    if cls_count > 0 {
        c = polymod(c, cls);
    }
    for _ in 0..8 {
        c = polymod(c, 0);
    }
    c ^= 1;

    let charset = CHECKSUM_CHARSET.as_bytes();
    let mut out = String::with_capacity(8);
    for i in 0..8 {
        out.push(charset[((c >> (5 * (7 - i))) & 31) as usize] as char);
    }
    Ok(out)
}

/// Compute or verify: returns `payload#checksum`, checking any checksum the
/// descriptor already carries against the payload.
pub fn checked(descriptor: &str) -> Result<String, DescriptorError> {
    let (payload, provided) = split_checksum(descriptor)?;
    let computed = checksum(payload)?;
    if let Some(provided) = provided {
        if provided != computed {
            return Err(DescriptorError::ChecksumMismatch {
                computed,
                provided: provided.to_owned(),
            });
        }
    }
    Ok(format!("{payload}#{computed}"))
}

/// Split on the last `#`. A `#`-section must be exactly 8 characters from
/// [`CHECKSUM_CHARSET`]; a string without `#` is all payload.
fn split_checksum(descriptor: &str) -> Result<(&str, Option<&str>), DescriptorError> {
    match descriptor.rfind('#') {
        None => Ok((descriptor, None)),
        Some(i) => {
            let payload = &descriptor[..i];
            let suffix = &descriptor[i + 1..];
            if payload.is_empty() {
                return Err(DescriptorError::EmptyPayload);
            }
            if suffix.len() != 8 || !suffix.chars().all(|ch| CHECKSUM_CHARSET.contains(ch)) {
                return Err(DescriptorError::MalformedInput);
            }
            Ok((payload, Some(suffix)))
        }
    }
}
