//! Position iterators: `g_iterator`, `r_iterator`, `positions_iterator`, per
//! `spec.md` §4.3.3. Built lazily (no stratum is ever materialized into a
//! `Vec` here) by composing the non-recursive [`bits_iterator`] over the
//! private/strip partitions of each side.

use crate::board::{Board, GR_OFF, RD_OFF};
use crate::combinatorics::bits_iterator;

/// Every board with exactly `g_off` Green men borne off and no Red men
/// placed anywhere (home, on board, or borne off — Red is entirely "at
/// home" in the boards this yields).
pub fn g_iterator(g_off: u8) -> impl Iterator<Item = Board> {
    let g_men = 7 - g_off as usize;
    (0..=g_men).flat_map(move |g_home| {
        let g_on_board = g_men - g_home;
        (0..=g_on_board.min(6)).flat_map(move |g_on_mine| {
            let on_strip_count = g_on_board - g_on_mine;
            bits_iterator(on_strip_count, 8).flat_map(move |on_strip| {
                bits_iterator(g_on_mine, 6).map(move |on_mine| {
                    let mut b = Board([0; 22]);
                    b[GR_OFF] = g_off as i8;
                    for (i, &present) in on_strip.iter().enumerate() {
                        if present {
                            b[4 + i] = 1;
                        }
                    }
                    if on_mine[0] {
                        b[0] = 1;
                    }
                    if on_mine[1] {
                        b[1] = 1;
                    }
                    if on_mine[2] {
                        b[2] = 1;
                    }
                    if on_mine[3] {
                        b[3] = 1;
                    }
                    if on_mine[4] {
                        b[12] = 1;
                    }
                    if on_mine[5] {
                        b[13] = 1;
                    }
                    b
                })
            })
        })
    })
}

/// Every completion of `board` (which must have no Red pieces placed) with
/// exactly `r_off` Red men borne off, honoring the constraint that Red
/// cannot occupy a middle-strip cell Green already holds.
pub fn r_iterator(board: Board, r_off: u8) -> impl Iterator<Item = Board> {
    let r_men = 7 - r_off as usize;
    let green_strip: [bool; 8] = std::array::from_fn(|i| board[4 + i] == 1);

    (0..=r_men).flat_map(move |r_home| {
        let r_on_board = r_men - r_home;
        let green_strip = green_strip;
        (0..=r_on_board.min(6)).flat_map(move |r_on_mine| {
            let on_strip_count = r_on_board - r_on_mine;
            let base = board;
            bits_iterator(on_strip_count, 8).filter_map(move |on_strip| {
                // Reject placements that collide with a Green-occupied cell.
                if (0..8).any(|i| on_strip[i] && green_strip[i]) {
                    return None;
                }
                Some(on_strip)
            }).flat_map(move |on_strip| {
                let mut b = base;
                b[RD_OFF] = r_off as i8;
                for (i, &present) in on_strip.iter().enumerate() {
                    if present {
                        b[4 + i] = -1;
                    }
                }
                bits_iterator(r_on_mine, 6).map(move |on_mine| {
                    let mut b = b;
                    if on_mine[0] {
                        b[15] = -1;
                    }
                    if on_mine[1] {
                        b[16] = -1;
                    }
                    if on_mine[2] {
                        b[17] = -1;
                    }
                    if on_mine[3] {
                        b[18] = -1;
                    }
                    if on_mine[4] {
                        b[19] = -1;
                    }
                    if on_mine[5] {
                        b[20] = -1;
                    }
                    b
                })
            })
        })
    })
}

/// Every board with exactly `g_off`/`r_off` Green/Red men borne off
/// (respectively): the composition of [`g_iterator`] and [`r_iterator`].
pub fn positions_iterator(g_off: u8, r_off: u8) -> impl Iterator<Item = Board> {
    g_iterator(g_off).flat_map(move |b| r_iterator(b, r_off))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinatorics::positions_off;

    #[test]
    fn g_iterator_visits_each_board_once_and_every_one_has_no_red() {
        for g_off in 0..=7u8 {
            let boards: Vec<Board> = g_iterator(g_off).collect();
            let unique: std::collections::HashSet<Board> = boards.iter().copied().collect();
            assert_eq!(boards.len(), unique.len());
            for b in &boards {
                assert_eq!(b[GR_OFF], g_off as i8);
                assert!((15..19).chain(19..21).all(|i| b[i] == 0));
                assert!((4..12).all(|i| b[i] != -1));
            }
        }
    }

    #[test]
    fn stratum_sizes_match_positions_off() {
        // Full strata can run into the millions of boards; check the small
        // end-game strata exhaustively rather than enumerating every one.
        for g_off in 5..=7u8 {
            for r_off in 5..=7u8 {
                let count = positions_iterator(g_off, r_off).count() as u64;
                assert_eq!(
                    count,
                    positions_off(g_off as usize, r_off as usize),
                    "g_off={g_off} r_off={r_off}"
                );
            }
        }
    }

    #[test]
    fn positions_iterator_is_duplicate_free_for_a_small_stratum() {
        let boards: Vec<Board> = positions_iterator(6, 6).collect();
        let unique: std::collections::HashSet<Board> = boards.iter().copied().collect();
        assert_eq!(boards.len(), unique.len());
    }
}
