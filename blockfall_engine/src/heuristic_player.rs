/*!
This module handles an automated [`Player`] searching every final placement of the falling block.

For each target column and each number of clockwise quarter turns, the player simulates
rotating, shifting and dropping the block on a throwaway clone of the board, rates the resulting
landed cells, and replays the actions of the best rated placement.
*/

use std::cmp::Ordering;

use tracing::trace;

use crate::{Action, Board, Direction, NoActiveBlock, Player, PlayerError, Rotation, Shape};

/// How strongly each board feature counts when rating a placement.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeuristicWeights {
    /// Penalty per hole, i.e. empty cell below the top of its column.
    pub hole: i64,
    /// Penalty per unit of bumpiness between neighboring columns.
    pub bumpiness: i64,
    /// Reward per filled cell in the bottom three rows.
    pub bottom_fill: i64,
    /// Reward for clearing four rows at once with an `I`.
    pub quad_clear_bonus: i64,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            hole: 1000,
            bumpiness: 100,
            bottom_fill: 1,
            quad_clear_bonus: 90_000,
        }
    }
}

/// A player picking the best rated (rotation, column) placement for every block.
///
/// Ties are broken in favor of columns further left, then fewer rotations.
#[derive(Eq, PartialEq, Clone, Copy, Hash, Default, Debug)]
pub struct HeuristicPlayer {
    /// Weights used to rate placements.
    pub weights: HeuristicWeights,
}

/// A simulated placement and its rating.
#[derive(Eq, PartialEq, Clone, Debug)]
struct Placement {
    rating: i64,
    actions: Vec<Action>,
}

impl HeuristicPlayer {
    /// Rows at the bottom of the board whose filled cells are rewarded.
    const BOTTOM_ROWS: i32 = 3;

    /// Creates a player with the given weights.
    pub const fn new(weights: HeuristicWeights) -> Self {
        Self { weights }
    }

    /// Rates a board after a block of `shape` landed and removed `lines_removed` rows.
    pub fn rate(&self, board: &Board, shape: Shape, lines_removed: u32) -> i64 {
        let w = &self.weights;
        let mut rating = -w.hole * i64::from(board.hole_count())
            - w.bumpiness * i64::from(board.bumpiness())
            + w.bottom_fill * i64::from(board.grid().filled_in_bottom_rows(Self::BOTTOM_ROWS));
        if shape == Shape::I && lines_removed >= 4 {
            rating += w.quad_clear_bonus;
        }
        rating
    }

    fn simulate(&self, board: &Board, rotations: u8, column: i32) -> Result<Placement, PlayerError> {
        let mut sandbox = board.clone();
        let shape = sandbox.falling().ok_or(NoActiveBlock)?.shape();
        let lines_before = sandbox.lines_cleared();
        let max_steps = 2 * usize::try_from(board.width() + board.height()).unwrap_or(0);

        let mut actions = Vec::new();
        let mut landed = false;
        for _ in 0..rotations {
            actions.push(Action::Rotate(Rotation::Clockwise));
            if sandbox.rotate_block(Rotation::Clockwise)? {
                // Landed before reaching the orientation; rate it as it lies.
                landed = true;
                break;
            }
        }

        while !landed {
            if actions.len() > max_steps {
                return Err(PlayerError::PlacementInfeasible { rotations, column });
            }
            let left = sandbox.falling().ok_or(NoActiveBlock)?.left();
            let direction = match column.cmp(&left) {
                Ordering::Less => Direction::Left,
                Ordering::Greater => Direction::Right,
                Ordering::Equal => Direction::Drop,
            };
            actions.push(Action::Move(direction));
            landed = sandbox.move_block(direction)?;
        }

        let rating = self.rate(&sandbox, shape, sandbox.lines_cleared() - lines_before);
        trace!(rotations, column, rating, "rated placement");
        Ok(Placement { rating, actions })
    }
}

impl Player for HeuristicPlayer {
    fn choose_action(&mut self, board: &Board) -> Result<Vec<Action>, PlayerError> {
        let mut best: Option<Placement> = None;
        for column in 0..board.width() {
            for rotations in 0..4 {
                let placement = self.simulate(board, rotations, column)?;
                if best.as_ref().is_none_or(|b| placement.rating > b.rating) {
                    best = Some(placement);
                }
            }
        }
        Ok(best.map(|b| b.actions).unwrap_or_default())
    }
}
