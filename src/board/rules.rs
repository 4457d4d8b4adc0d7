//! Legal-move generation: entry, movement, captures, bear-off, and the
//! turn-handoff ("pass") wrapper, per `spec.md` §4.2.

use super::{game_over, reverse_board, Board, GR_OFF};

/// Returns every distinct successor board reachable by Green given the
/// roll `pips` (1..4), paired with whether landing there grants an extra
/// turn. Empty iff Green has no legal move for this roll. Moves without an
/// extra turn are returned already reversed, so the next caller always
/// treats Green as on move (the orientation convention from `spec.md`
/// §4.2). Ordering: entry first (if legal), then on-board source squares
/// ascending by index.
///
/// Panics if `pips` is outside `1..=4` or the game is already over — both
/// are programmer errors, per `spec.md` §7.
pub fn all_actual_moves(board: &Board, pips: u8) -> Vec<(Board, bool)> {
    assert!(!game_over(board), "all_actual_moves called on a finished game");
    assert!((1..=4).contains(&pips), "pips must be in 1..=4, got {pips}");

    let g_on_board = (0..14).filter(|&i| board[i] == 1).count() as i32;
    let tot_pieces_me = 7 - board[GR_OFF] as i32;
    let at_home = tot_pieces_me - g_on_board;

    let mut moves = Vec::new();

    if at_home > 0 {
        let to = pips as usize - 1;
        if board[to] == 0 {
            let mut b = *board;
            b[to] = 1;
            moves.push((b, super::is_rosette(to)));
        }
    }

    for i in 0..14 {
        if board[i] != 1 {
            continue;
        }
        let to = i + pips as usize;
        if to < 14 {
            if board[to] != 1 && (board[to] == 0 || to != super::SAFE_SQUARE) {
                let mut b = *board;
                b[i] = 0;
                b[to] = 1;
                moves.push((b, super::is_rosette(to)));
            }
        } else if to == 14 {
            let mut b = *board;
            b[i] = 0;
            b[GR_OFF] += 1;
            moves.push((b, false));
        }
    }

    for (b, extra) in moves.iter_mut() {
        if !*extra {
            *b = reverse_board(b);
        }
    }
    moves
}

/// Same as [`all_actual_moves`], but when the list would be empty, or when
/// `pips == 0`, returns the single "pass" move that hands the turn to the
/// opponent: `[(reverse_board(board), false)]`.
pub fn all_moves(board: &Board, pips: u8) -> Vec<(Board, bool)> {
    assert!(!game_over(board), "all_moves called on a finished game");
    assert!(pips <= 4, "pips must be in 0..=4, got {pips}");

    if pips != 0 {
        let actual = all_actual_moves(board, pips);
        if !actual.is_empty() {
            return actual;
        }
    }
    vec![(reverse_board(board), false)]
}
