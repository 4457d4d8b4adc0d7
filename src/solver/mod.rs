//! The retrograde value-iteration solver, per `spec.md` §4.4.2.

use crate::board::{game_over, homes, reverse_board, start_position, Board};
use crate::codec::{board_to_index, positions_iterator};
use crate::probdb::ProbDb;

/// Dice weights for `pips = 0..=4`, out of 16.
const PIP_WEIGHTS: [u32; 5] = [1, 4, 6, 4, 1];

/// For one `pips in 1..=4` roll, the precomputed set of successor db keys,
/// partitioned by whether landing there grants an extra turn. `None` means
/// this roll needs no per-sweep work: either it's an immediate win
/// (accounted for in [`Recipe::win_weight`]) or a forced pass (accounted
/// for in [`Recipe::pass_weight`]).
type Branch = Option<(Vec<u64>, Vec<u64>)>;

/// The precomputed successor structure for one board, across all four
/// non-zero rolls. Successor *sets* never change within a stratum — only
/// their stored probabilities do — so this is built once per position pair
/// and reused every sweep, per `spec.md` §4.4.2 ("Recipe caching").
struct Recipe {
    /// Sum of `w(pips)` over rolls where Green wins immediately.
    win_weight: u32,
    /// Sum of `w(pips)` over rolls that are a forced pass for this board:
    /// `pips == 0` always contributes its weight (1); each `pips in 1..=4`
    /// contributes its weight iff the only legal move is the turn handoff.
    pass_weight: u32,
    /// Per-roll successor partition for `pips = 1, 2, 3, 4` (index 0..3).
    branches: [Branch; 4],
}

impl Recipe {
    fn build(board: &Board, reversed: &Board) -> Recipe {
        let mut win_weight = 0;
        let mut pass_weight = PIP_WEIGHTS[0]; // pips == 0 is always a forced pass.
        let mut branches: [Branch; 4] = std::array::from_fn(|_| None);

        for (i, &weight) in PIP_WEIGHTS.iter().enumerate().skip(1) {
            let pips = i as u8;
            let moves = crate::board::rules::all_moves(board, pips);

            let is_forced_pass =
                moves.len() == 1 && !moves[0].1 && moves[0].0 == *reversed;
            if is_forced_pass {
                pass_weight += weight;
                continue;
            }

            if moves.iter().any(|(b, _)| game_over(b)) {
                debug_assert_eq!(win_weight, 0, "at most one roll can be an immediate win");
                win_weight = weight;
                continue;
            }

            let mut extra_keys = Vec::new();
            let mut normal_keys = Vec::new();
            for (b, extra) in &moves {
                if *extra {
                    extra_keys.push(board_to_index(b));
                } else {
                    normal_keys.push(board_to_index(b));
                }
            }
            branches[i - 1] = Some((extra_keys, normal_keys));
        }

        Recipe {
            win_weight,
            pass_weight,
            branches,
        }
    }

    /// `A` (or `B`, for the reversed side): the expected-value contribution
    /// from every roll that isn't a forced pass, given the db's *current*
    /// values for the successors this recipe names.
    fn evaluate(&self, db: &ProbDb) -> f64 {
        let mut total = self.win_weight as f64;
        for (branch, &weight) in self.branches.iter().zip(PIP_WEIGHTS[1..].iter()) {
            let Some((extra_keys, normal_keys)) = branch else {
                continue;
            };
            let best = match (extra_keys.is_empty(), normal_keys.is_empty()) {
                (true, false) => best_after_reversal(db, normal_keys),
                (false, true) => best_extra_turn(db, extra_keys),
                (false, false) => {
                    best_extra_turn(db, extra_keys).max(best_after_reversal(db, normal_keys))
                }
                (true, true) => unreachable!("a branch always has at least one successor"),
            };
            total += best * weight as f64;
        }
        total
    }
}

fn best_extra_turn(db: &ProbDb, keys: &[u64]) -> f64 {
    keys.iter()
        .map(|&k| db.get(k).expect("recipe successor not yet populated"))
        .fold(f64::MIN, f64::max)
}

fn best_after_reversal(db: &ProbDb, keys: &[u64]) -> f64 {
    keys.iter()
        .map(|&k| 1.0 - db.get(k).expect("recipe successor not yet populated"))
        .fold(f64::MIN, f64::max)
}

/// One stratum's worth of precomputed recipes, paired with the db keys they
/// update and a deterministic sort key (`spec.md`'s "ordering heuristic").
struct UpdateEntry {
    key: u64,
    reversed_key: u64,
    recipe: Recipe,
    reversed_recipe: Recipe,
}

/// Remaining pip-distance to bear off, summed over every man in play on
/// both sides (home men count as a full 14, on-board men as `14 - square`,
/// borne-off men as `0`). Smaller values sit closer to game end; sorting a
/// stratum's update list ascending by this accelerates convergence without
/// affecting the fixed point, per `spec.md` §4.4.2.
fn remaining_pip_distance(board: &Board) -> i32 {
    fn one_side(b: &Board) -> i32 {
        let on_board: i32 = (0..14).filter(|&i| b[i] == 1).map(|i| 14 - i as i32).sum();
        let (home, _) = homes(b);
        on_board + home * 14
    }
    one_side(board) + one_side(&reverse_board(board))
}

/// Builds the sorted update list for one `(g_off, r_off)` stratum: every
/// distinct `{board, reverse(board)}` pair, each visited once.
fn build_update_list(db: &ProbDb, g_off: u8, r_off: u8) -> Vec<UpdateEntry> {
    let mut seen = std::collections::HashSet::new();
    let mut entries = Vec::new();

    for board in positions_iterator(g_off, r_off) {
        let key = board_to_index(&board);
        if seen.contains(&key) {
            continue;
        }
        let reversed = reverse_board(&board);
        let reversed_key = board_to_index(&reversed);
        seen.insert(key);
        seen.insert(reversed_key);

        let recipe = Recipe::build(&board, &reversed);
        let reversed_recipe = Recipe::build(&reversed, &board);
        entries.push((remaining_pip_distance(&board), UpdateEntry {
            key,
            reversed_key,
            recipe,
            reversed_recipe,
        }));
        let _ = db; // recipes only name successors; values are read during sweeps.
    }

    entries.sort_by_key(|(pips, _)| *pips);
    entries.into_iter().map(|(_, e)| e).collect()
}

/// Applies one pair's coupled update given the current db, per `spec.md`
/// §4.4.2's `X`/`Y` equations. Returns `(new_p_board, new_p_reversed)`.
fn coupled_update(db: &ProbDb, entry: &UpdateEntry) -> (f64, f64) {
    let a = entry.recipe.evaluate(db);
    let p1 = entry.recipe.pass_weight as f64;
    let b = entry.reversed_recipe.evaluate(db);
    let p2 = entry.reversed_recipe.pass_weight as f64;

    let x = (16.0 * a + p1 * (16.0 - b - p2)) / (256.0 - p1 * p2);
    let y = (b + p2 * (1.0 - x)) / 16.0;
    debug_assert!((-1e-6..=1.0 + 1e-6).contains(&x), "X escaped [0,1]: {x}");
    debug_assert!((-1e-6..=1.0 + 1e-6).contains(&y), "Y escaped [0,1]: {y}");
    (x.clamp(0.0, 1.0), y.clamp(0.0, 1.0))
}

/// Seeds every position with `g_off == 7` to `P = 1` (Green has already
/// won) and its reverse to `P = 0`, per `spec.md` §4.4.2.
fn seed_terminal_strata(db: &mut ProbDb) {
    for r_off in 0..=7u8 {
        for board in positions_iterator(7, r_off) {
            db.a_set(&board, 1.0);
            db.a_set(&reverse_board(&board), 0.0);
        }
    }
}

/// Progress reported to the caller's `on_stratum` hook after each `(g_off,
/// r_off)` stratum converges, so a driver can log progress or checkpoint.
pub struct StratumReport {
    pub g_off: u8,
    pub r_off: u8,
    pub pairs: usize,
    pub rounds: u32,
    pub final_max_error: f64,
}

/// Seeds every key this stratum's update list touches to a starting guess
/// of `0.5` wherever the db still holds the "unknown" sentinel. Many
/// successors of a position in stratum `(g_off, r_off)` land back in the
/// *same* stratum: a normal advance's reverse keeps both off-counts, and a
/// capture sends a man home without changing either. Those entries are
/// still unset on the first sweep, so `Recipe::evaluate` must have a
/// defined value to read before any sweep runs — ordinary value iteration
/// from a defined initial state, per `spec.md` §4.4.2.
fn seed_stratum(db: &mut ProbDb, update_list: &[UpdateEntry]) {
    for entry in update_list {
        if db.get(entry.key).is_none() {
            db.set(entry.key, 0.5);
        }
        if db.get(entry.reversed_key).is_none() {
            db.set(entry.reversed_key, 0.5);
        }
    }
}

/// Sweeps one stratum's update list to a fixed point at the given
/// tolerance, seeding any still-unknown entries first, and returns the
/// number of rounds taken and the final max error.
fn solve_stratum(db: &mut ProbDb, tolerance: f64, update_list: &[UpdateEntry]) -> (u32, f64) {
    seed_stratum(db, update_list);

    let mut rounds = 0u32;
    let mut max_error = f64::INFINITY;
    while max_error > tolerance {
        max_error = 0.0;
        for entry in update_list {
            let (x, y) = coupled_update(db, entry);
            let prev_x = db.get(entry.key).unwrap_or(x);
            let prev_y = db.get(entry.reversed_key).unwrap_or(y);
            max_error = max_error.max((prev_x - x).abs()).max((prev_y - y).abs());
            db.set(entry.key, x);
            db.set(entry.reversed_key, y);
        }
        rounds += 1;
    }
    (rounds, max_error)
}

/// Runs the retrograde solver to a fixed point at the given tolerance.
/// `g_off == 7` and `r_off == 7` are seeded directly (either side having
/// already finished); every other stratum is solved by descending `g_off`
/// from 6 to 0 and, within it, `r_off` from `g_off` down to 0 — each pair
/// `(g_off, r_off)` with `g_off >= r_off` also resolves its reverse
/// `(r_off, g_off)` via the coupled update, so the lower triangle is never
/// visited separately. `on_stratum` is invoked once per completed stratum —
/// the natural checkpoint boundary, per `spec.md` §5.
pub fn solve(db: &mut ProbDb, tolerance: f64, mut on_stratum: impl FnMut(&ProbDb, StratumReport)) {
    seed_terminal_strata(db);

    for g_off in (0..=6u8).rev() {
        for r_off in (0..=g_off).rev() {
            let update_list = build_update_list(db, g_off, r_off);
            let (rounds, final_max_error) = solve_stratum(db, tolerance, &update_list);
            log::debug!("stratum ({g_off},{r_off}): {rounds} rounds, max_error={final_max_error:.3e}");

            on_stratum(
                db,
                StratumReport {
                    g_off,
                    r_off,
                    pairs: update_list.len(),
                    rounds,
                    final_max_error,
                },
            );
        }
    }
}

/// Convenience entry point equivalent to `solve` with no checkpoint hook.
pub fn solve_default(db: &mut ProbDb, tolerance: f64) {
    solve(db, tolerance, |_, report| {
        log::info!(
            "stratum ({},{}) converged: {} pairs, {} rounds, max_error={:.3e}",
            report.g_off,
            report.r_off,
            report.pairs,
            report.rounds,
            report.final_max_error
        );
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::GR_OFF;
    use crate::probdb::Width;

    #[test]
    fn seeding_gives_start_position_a_nontrivial_neighbourhood() {
        let mut db = ProbDb::new_empty(Width::FourBytes);
        seed_terminal_strata(&mut db);
        let mut b = start_position();
        b[GR_OFF] = 7;
        assert_eq!(db.a_get(&b), Some(1.0));
        assert_eq!(db.a_get(&reverse_board(&b)), Some(0.0));
    }

    #[test]
    fn solving_the_six_stratum_leaves_seven_seeds_intact() {
        let mut db = ProbDb::new_empty(Width::FourBytes);
        seed_terminal_strata(&mut db);

        // Solve only the (6, r_off) strata (the shallowest non-seeded
        // stratum); every (7,*) seed must still read back exactly.
        for r_off in (0..=6u8).rev() {
            let update_list = build_update_list(&db, 6, r_off);
            solve_stratum(&mut db, 1e-9, &update_list);
        }

        let mut b = start_position();
        b[GR_OFF] = 7;
        assert_eq!(db.a_get(&b), Some(1.0));

        // Every freshly solved (6,*) position must land in [0,1].
        for board in positions_iterator(6, 0) {
            if let Some(p) = db.a_get(&board) {
                assert!((0.0..=1.0).contains(&p));
            }
        }
    }

    #[test]
    fn recipe_forced_pass_weight_counts_zero_pips_even_with_moves_available() {
        // Every entry square is open at the start position, so pips 1..=4
        // each have a legal move; only pips == 0 is a forced pass.
        let b = start_position();
        let reversed = reverse_board(&b);
        let recipe = Recipe::build(&b, &reversed);
        assert_eq!(recipe.pass_weight, PIP_WEIGHTS[0]);
        assert_eq!(recipe.win_weight, 0);
    }

    #[test]
    fn recipe_forced_pass_weight_adds_a_blocked_rolls_weight() {
        // A single Green man one step from the safe square, itself occupied
        // by Red: pips == 1 has no legal move (capture is blocked there),
        // so its weight joins pips == 0's in pass_weight.
        let mut b = start_position();
        b[6] = 1;
        b[GR_OFF] = 6;
        b[crate::board::SAFE_SQUARE] = -1;
        let reversed = reverse_board(&b);
        let recipe = Recipe::build(&b, &reversed);
        assert_eq!(recipe.pass_weight, PIP_WEIGHTS[0] + PIP_WEIGHTS[1]);
        assert_eq!(recipe.win_weight, 0);
    }
}
