//! The persisted win-probability database: a flat big-endian byte buffer
//! indexed by board identity, per `spec.md` §4.4.1 and §6.

use std::fs;
use std::path::Path;

use crate::board::Board;
use crate::codec::board_to_index;
use crate::combinatorics::TOTAL_POSITIONS;
use crate::error::{Error, Result};

/// Width, in bytes, of one stored probability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
    /// Unsigned 16-bit; sentinel `0xFFFF`, scale `2^16 - 1`.
    TwoBytes,
    /// Signed 32-bit big-endian; sentinel `-1` (`0xFFFFFFFF`), scale `2^31`.
    FourBytes,
}

impl Width {
    fn size(self) -> usize {
        match self {
            Width::TwoBytes => 2,
            Width::FourBytes => 4,
        }
    }
}

/// Per-position win probability for the player to move, for the full game
/// space. Backed by one contiguous byte buffer (`wsize * TOTAL_POSITIONS`
/// bytes), matching the reference implementation's tradeoff of a flat
/// array over any per-position object.
pub struct ProbDb {
    buf: Vec<u8>,
    width: Width,
}

impl ProbDb {
    /// A fresh database, every entry set to "unknown", at the given width.
    pub fn new_empty(width: Width) -> ProbDb {
        let wsize = width.size();
        let sentinel_byte = 0xFFu8;
        ProbDb {
            buf: vec![sentinel_byte; wsize * TOTAL_POSITIONS as usize],
            width,
        }
    }

    /// Loads a database from a headerless byte file. The width is inferred
    /// from the file size; any size other than `2*TOTAL_POSITIONS` or
    /// `4*TOTAL_POSITIONS` bytes is [`Error::CorruptDatabase`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ProbDb> {
        let buf = fs::read(path)?;
        let two = 2 * TOTAL_POSITIONS as usize;
        let four = 4 * TOTAL_POSITIONS as usize;
        let width = if buf.len() == four {
            Width::FourBytes
        } else if buf.len() == two {
            Width::TwoBytes
        } else {
            return Err(Error::CorruptDatabase(format!(
                "file holds {} bytes; expected {two} (2-byte) or {four} (4-byte)",
                buf.len()
            )));
        };
        Ok(ProbDb { buf, width })
    }

    /// Writes the database's raw byte buffer to `path`, verbatim.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, &self.buf)?;
        Ok(())
    }

    pub fn width(&self) -> Width {
        self.width
    }

    /// The database's internal "key" for a board index: its byte offset.
    fn key(&self, index: u64) -> usize {
        self.width.size() * index as usize
    }

    /// Gets the probability at `index`. `None` iff the stored entry is the
    /// sentinel.
    pub fn get(&self, index: u64) -> Option<f64> {
        let offset = self.key(index);
        match self.width {
            Width::FourBytes => {
                let bytes: [u8; 4] = self.buf[offset..offset + 4].try_into().unwrap();
                let v = i32::from_be_bytes(bytes);
                if v == -1 {
                    None
                } else {
                    Some(v as f64 / (1u64 << 31) as f64)
                }
            }
            Width::TwoBytes => {
                let bytes: [u8; 2] = self.buf[offset..offset + 2].try_into().unwrap();
                let v = u16::from_be_bytes(bytes);
                if v == 0xFFFF {
                    None
                } else {
                    Some(v as f64 / ((1u32 << 16) - 1) as f64)
                }
            }
        }
    }

    /// Sets the probability at `index`, encoding at this database's width.
    /// For the 2-byte width, `p * (2^16 - 1)` is rounded to the nearest
    /// integer and clamped to `0xFFFE`, so a certain win never collides
    /// with the `0xFFFF` "unknown" sentinel.
    pub fn set(&mut self, index: u64, p: f64) {
        let offset = self.key(index);
        match self.width {
            Width::FourBytes => {
                let v = (p * (1u64 << 31) as f64).round() as i32;
                self.buf[offset..offset + 4].copy_from_slice(&v.to_be_bytes());
            }
            Width::TwoBytes => {
                // 0xFFFF is the "unknown" sentinel; a probability of 1.0
                // would round to exactly that, so clamp just below it.
                let v = ((p * ((1u32 << 16) - 1) as f64).round() as u16).min(0xFFFE);
                self.buf[offset..offset + 2].copy_from_slice(&v.to_be_bytes());
            }
        }
    }

    /// Convenience: `get(board_to_index(board))`.
    pub fn a_get(&self, board: &Board) -> Option<f64> {
        self.get(board_to_index(board))
    }

    /// Convenience: `set(board_to_index(board), p)`.
    pub fn a_set(&mut self, board: &Board, p: f64) {
        self.set(board_to_index(board), p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::start_position;

    #[test]
    fn fresh_db_is_all_unknown() {
        let db = ProbDb::new_empty(Width::FourBytes);
        assert_eq!(db.get(0), None);
        assert_eq!(db.get(TOTAL_POSITIONS - 1), None);
    }

    #[test]
    fn four_byte_get_set_roundtrips_exactly() {
        let mut db = ProbDb::new_empty(Width::FourBytes);
        db.set(0, 0.5);
        assert!((db.get(0).unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn two_byte_get_set_is_within_quantization_error() {
        let mut db = ProbDb::new_empty(Width::TwoBytes);
        db.set(0, 0.33333);
        let got = db.get(0).unwrap();
        assert!((got - 0.33333).abs() <= 1.0 / 65535.0);
    }

    #[test]
    fn two_byte_set_of_a_certain_win_does_not_collide_with_the_sentinel() {
        let mut db = ProbDb::new_empty(Width::TwoBytes);
        db.set(0, 1.0);
        let got = db.get(0);
        assert!(got.is_some());
        assert!((got.unwrap() - 1.0).abs() <= 1.0 / 65535.0);
    }

    #[test]
    fn a_get_a_set_roundtrip_via_board() {
        let mut db = ProbDb::new_empty(Width::FourBytes);
        let b = start_position();
        db.a_set(&b, 0.75);
        assert!((db.a_get(&b).unwrap() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn save_then_load_is_bytewise_identical_at_four_bytes() {
        let mut db = ProbDb::new_empty(Width::FourBytes);
        db.set(0, 1.0);
        db.set(10, 0.0);
        db.set(100, 0.5);
        let dir = std::env::temp_dir().join(format!("rogour-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("db.bin");
        db.save(&path).unwrap();
        let reloaded = ProbDb::load(&path).unwrap();
        assert_eq!(reloaded.buf, db.buf);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn load_rejects_a_corrupt_file_size() {
        let dir = std::env::temp_dir().join(format!("rogour-test-corrupt-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.bin");
        std::fs::write(&path, vec![0u8; 17]).unwrap();
        assert!(matches!(ProbDb::load(&path), Err(Error::CorruptDatabase(_))));
        std::fs::remove_file(&path).unwrap();
    }
}
