//! Board `<-> code` and board `<-> index` conversions, per `spec.md` §4.3.

mod index;
mod iter;
mod z85;

pub use index::{board_to_index, index_to_board};
pub use iter::{g_iterator, positions_iterator, r_iterator};

use regex::Regex;
use std::sync::OnceLock;

use crate::board::{homes, validate_board, Board, GR_OFF, RD_OFF};
use crate::error::{Error, Result};

/// Private-square slot order used by both the code packer and the index
/// codec's "safe" bitmask: `a, b, c, d, y, z`.
const GREEN_PRIVATE: [usize; 6] = [0, 1, 2, 3, 12, 13];
/// `A, B, C, D, Y, Z`.
const RED_PRIVATE: [usize; 6] = [15, 16, 17, 18, 19, 20];

fn code_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9a-zA-Z.\-:+=^!/*?&<>()\[\]{}@%$#]{5}$").expect("static pattern")
    })
}

/// Packs `board` into its 31-bit representation and renders it as exactly 5
/// printable Z85 characters.
pub fn board_to_code(board: &Board) -> String {
    let (g_home, r_home) = homes(board);

    let mut packed: u32 = (g_home as u32) << 28;
    for (bit, &slot) in GREEN_PRIVATE.iter().enumerate() {
        if board[slot] == 1 {
            packed |= 1 << (27 - bit);
        }
    }
    packed |= (r_home as u32) << 19;
    for (bit, &slot) in RED_PRIVATE.iter().enumerate() {
        if board[slot] == -1 {
            packed |= 1 << (18 - bit);
        }
    }

    let mut strip: u32 = 0;
    for i in 4..12 {
        let digit = match board[i] {
            0 => 0u32,
            1 => 1,
            -1 => 2,
            _ => unreachable!("middle strip cell outside {{-1,0,1}}"),
        };
        strip = strip * 3 + digit;
    }
    packed |= strip;

    let chars = z85::encode4(packed.to_be_bytes());
    String::from_utf8(chars.to_vec()).expect("Z85 alphabet is ASCII")
}

/// Decodes a 5-character code back into a board. Rejects malformed input
/// (wrong length, non-Z85 characters, or a packed value whose home counts
/// don't fit `[0,7]`) with [`Error::InvalidCode`] before any decode of the
/// remaining bits is attempted.
pub fn code_to_board(code: &str) -> Result<Board> {
    if !code_pattern().is_match(code) {
        return Err(Error::InvalidCode(format!(
            "{code:?} is not exactly 5 Z85 characters"
        )));
    }
    let bytes: [u8; 5] = code.as_bytes().try_into().unwrap();
    let decoded = z85::decode5(&bytes)?;
    let packed = u32::from_be_bytes(decoded);
    if packed >> 31 != 0 {
        return Err(Error::InvalidCode(format!(
            "packed value {packed} does not fit 31 bits"
        )));
    }

    let g_home = ((packed >> 28) & 0b111) as i8;
    let r_home = ((packed >> 19) & 0b111) as i8;
    if !(0..=7).contains(&g_home) || !(0..=7).contains(&r_home) {
        return Err(Error::InvalidCode(format!(
            "home counts ({g_home}, {r_home}) outside [0,7]"
        )));
    }

    let mut b = Board([0; 22]);
    for (bit, &slot) in GREEN_PRIVATE.iter().enumerate() {
        if (packed >> (27 - bit)) & 1 == 1 {
            b[slot] = 1;
        }
    }
    for (bit, &slot) in RED_PRIVATE.iter().enumerate() {
        if (packed >> (18 - bit)) & 1 == 1 {
            b[slot] = -1;
        }
    }

    let mut strip = packed & 0x1FFF;
    if strip >= 3u32.pow(8) {
        return Err(Error::InvalidCode(format!(
            "middle-strip digits {strip} out of base-3 range"
        )));
    }
    for i in (4..12).rev() {
        let digit = strip % 3;
        b[i] = match digit {
            0 => 0,
            1 => 1,
            2 => -1,
            _ => unreachable!(),
        };
        strip /= 3;
    }

    let g_on_board = (0..14).filter(|&i| b[i] == 1).count() as i8;
    let r_on_board = (15..19).chain(4..12).chain(19..21).filter(|&i| b[i] == -1).count() as i8;
    b[GR_OFF] = 7 - g_home - g_on_board;
    b[RD_OFF] = 7 - r_home - r_on_board;
    if !(0..=7).contains(&b[GR_OFF]) || !(0..=7).contains(&b[RD_OFF]) {
        return Err(Error::InvalidCode(
            "reconstructed borne-off count outside [0,7]".into(),
        ));
    }

    validate_board(&b).map_err(|e| Error::InvalidCode(e.to_string()))?;
    Ok(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::start_position;

    #[test]
    fn start_position_code_is_stable() {
        // Frozen once: re-derive and compare, not hardcode a hand-typed guess.
        let code = board_to_code(&start_position());
        assert_eq!(code.len(), 5);
        assert_eq!(code_to_board(&code).unwrap(), start_position());
    }

    #[test]
    fn roundtrips_a_midgame_board() {
        let mut b = start_position();
        b[4] = 1;
        b[9] = -1;
        b[GR_OFF] = 2;
        b[RD_OFF] = 1;
        b[0] = 1;
        b[15] = -1;
        let code = board_to_code(&b);
        assert_eq!(code.len(), 5);
        assert_eq!(code_to_board(&code).unwrap(), b);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(code_to_board("abcd"), Err(Error::InvalidCode(_))));
        assert!(matches!(code_to_board("abcdef"), Err(Error::InvalidCode(_))));
    }

    #[test]
    fn rejects_non_alphabet_characters() {
        assert!(matches!(code_to_board("ab~de"), Err(Error::InvalidCode(_))));
    }
}
