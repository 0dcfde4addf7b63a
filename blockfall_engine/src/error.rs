/*!
This module collects the errors and termination signals the engine can produce.
*/

use thiserror::Error;

/// A block-requiring action was issued while no block was falling.
///
/// This is a misuse of the [`Board`](crate::Board) API and is never silently ignored.
#[derive(Eq, PartialEq, Clone, Copy, Hash, Debug, Error)]
#[error("this board has no block to manipulate")]
pub struct NoActiveBlock;

/// The adversary handed out every block of its budget.
///
/// Within a game this is the *winning* termination for the player.
#[derive(Eq, PartialEq, Clone, Copy, Hash, Debug, Error)]
#[error("adversary ran out of blocks after {handed_out} shapes")]
pub struct AdversaryExhausted {
    /// How many shapes the adversary produced before running dry.
    pub handed_out: u32,
}

/// A word that is not part of the shape or action vocabulary.
#[derive(Eq, PartialEq, Clone, Hash, Debug, Error)]
#[error("unknown instruction {0:?}")]
pub struct ParseVocabularyError(pub String);

/// Reasons a [`BoardBuilder`](crate::BoardBuilder) refuses to build.
#[derive(Eq, PartialEq, Clone, Hash, Debug, Error)]
pub enum BoardError {
    /// Width and height must both be positive.
    #[error("board dimensions must be positive, got {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },
    /// The board is positive but too small for some shape to spawn inside it.
    #[error("a {width}x{height} board cannot fit every shape, it must be at least {min_width}x{min_height}")]
    TooSmall {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
        /// Narrowest width fitting every shape.
        min_width: i32,
        /// Lowest height fitting every shape.
        min_height: i32,
    },
    /// A pre-filled row is wider than the board.
    #[error("pre-filled row {row} has {len} cells but the board is {width} wide")]
    RowTooWide {
        /// Index of the offending row, counted from the top of the given rows.
        row: usize,
        /// Number of cells in the row.
        len: usize,
        /// Board width.
        width: i32,
    },
    /// More pre-filled rows than the board is high.
    #[error("{rows} pre-filled rows do not fit a board {height} high")]
    TooManyRows {
        /// Number of rows given.
        rows: usize,
        /// Board height.
        height: i32,
    },
}

/// Failures of a [`Player`](crate::Player) to come up with actions.
#[derive(Eq, PartialEq, Clone, Hash, Debug, Error)]
pub enum PlayerError {
    /// A simulated placement never landed within the step bound.
    ///
    /// This cannot happen on a consistent board and indicates a broken invariant.
    #[error("placement with {rotations} rotations towards column {column} never landed")]
    PlacementInfeasible {
        /// Clockwise quarter turns of the simulated placement.
        rotations: u8,
        /// Target column of the simulated placement.
        column: i32,
    },
    /// The snapshot handed to the player had no falling block.
    #[error(transparent)]
    NoActiveBlock(#[from] NoActiveBlock),
    /// The player gave up, e.g. its input source closed.
    #[error("player aborted: {0}")]
    Aborted(String),
}

/// Faults that end a game prematurely, as opposed to a regular [`Outcome`](crate::Outcome).
#[derive(Eq, PartialEq, Clone, Hash, Debug, Error)]
pub enum TurnError {
    /// An action needing a falling block was applied without one.
    #[error(transparent)]
    NoActiveBlock(#[from] NoActiveBlock),
    /// The player could not decide on its actions.
    #[error(transparent)]
    Player(#[from] PlayerError),
}
