//! An exact win-probability solver for the Royal Game of Ur.
//!
//! [`board`] defines the board representation and legal-move generation;
//! [`codec`] converts boards to and from their dense index and their
//! printable share code; [`combinatorics`] supplies the counting primitives
//! both depend on; [`probdb`] is the persisted probability table the
//! [`solver`] fills in by retrograde value iteration.

pub mod board;
pub mod codec;
pub mod combinatorics;
pub mod error;
pub mod probdb;
pub mod solver;

pub mod prelude {
    pub use crate::board::{self, Board};
    pub use crate::codec::{self, board_to_code, board_to_index, code_to_board, index_to_board};
    pub use crate::error::{Error, Result};
    pub use crate::probdb::{ProbDb, Width};
    pub use crate::solver::{solve, solve_default, StratumReport};
}
