//! A small, self-contained Z85 implementation. Neither the teacher nor the
//! rest of the reference pack pulls in a crate for this — it is a ~20-line
//! routine over a fixed 85-character alphabet, the kind of primitive the
//! teacher hand-rolls (`OffsetCoord`, `FoursquareCounter`) rather than
//! reaching for a dependency.

use crate::error::{Error, Result};

const ALPHABET: &[u8; 85] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ.-:+=^!/*?&<>()[]{}@%$#";

/// Encodes exactly 4 bytes into exactly 5 Z85 characters.
pub fn encode4(bytes: [u8; 4]) -> [u8; 5] {
    let mut value: u32 = u32::from_be_bytes(bytes);
    let mut out = [0u8; 5];
    for slot in out.iter_mut().rev() {
        *slot = ALPHABET[(value % 85) as usize];
        value /= 85;
    }
    out
}

/// Decodes exactly 5 Z85 characters into exactly 4 bytes. Every character
/// must belong to the Z85 alphabet and the recovered value must fit a
/// `u32` (it always does for 5 digits base 85, since `85^5 < 2^32`).
pub fn decode5(chars: &[u8; 5]) -> Result<[u8; 4]> {
    let mut value: u64 = 0;
    for &c in chars {
        let digit = ALPHABET
            .iter()
            .position(|&a| a == c)
            .ok_or_else(|| Error::InvalidCode(format!("byte {c:#04x} is not in the Z85 alphabet")))?;
        value = value * 85 + digit as u64;
    }
    if value > u32::MAX as u64 {
        return Err(Error::InvalidCode(format!(
            "decoded value {value} overflows 32 bits"
        )));
    }
    Ok((value as u32).to_be_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_byte_pattern_sampled() {
        for v in [0u32, 1, 42, 0x7FFF_FFFF, 0x1234_5678, u32::MAX >> 1] {
            let encoded = encode4(v.to_be_bytes());
            let decoded = decode5(&encoded).unwrap();
            assert_eq!(u32::from_be_bytes(decoded), v);
        }
    }

    #[test]
    fn rejects_out_of_alphabet_bytes() {
        let bad = [b'0', b'0', b'0', b'0', b'~'];
        assert!(matches!(decode5(&bad), Err(Error::InvalidCode(_))));
    }
}
