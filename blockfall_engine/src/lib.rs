/*!
# Blockfall Engine

`blockfall_engine` is a turn-based falling-block puzzle engine.
A game is played between a [`Player`] who moves and rotates the falling block, and an
[`Adversary`] who decides which [`Shape`] comes next.

# Examples

```
use blockfall_engine::*;

// A fresh 10x24 board with the usual resources.
let board = SharedBoard::new(Board::builder().build().unwrap());

// Five random shapes, then the adversary runs dry.
let mut adversary = RandomAdversary::new(42, Some(5));
let mut player = HeuristicPlayer::default();

let mut outcome = None;
for event in board.turns(&mut player, &mut adversary) {
    match event.unwrap() {
        TurnEvent::ShapeChosen(_shape) => { /* Render the new 'next' block. */ }
        TurnEvent::ActionApplied { .. } => { /* Render the moved block. */ }
        TurnEvent::GameOver(o) => outcome = Some(o),
    }
}

// Five blocks do not fill a board; running out of blocks means the player won.
assert_eq!(outcome, Some(Outcome::AdversaryExhausted));
assert!(board.lock().score() > 0);
```
*/

#![warn(missing_docs)]

pub mod adversary;
pub mod block;
pub mod board;
pub mod error;
pub mod grid;
pub mod heuristic_player;
pub mod player;
mod shared_board;
pub mod turn;

use std::{fmt, str::FromStr};

pub use adversary::{Adversary, Generation, RandomAdversary, ScriptedAdversary};
pub use block::{Block, Step};
pub use board::{Board, BoardBuilder};
pub use error::{
    AdversaryExhausted, BoardError, NoActiveBlock, ParseVocabularyError, PlayerError, TurnError,
};
pub use grid::Grid;
pub use heuristic_player::{HeuristicPlayer, HeuristicWeights};
pub use player::{Player, ScriptedPlayer};
pub use shared_board::SharedBoard;
pub use turn::{Outcome, TurnEvent, Turns};

/// Board coordinates `(x, y)`, with the origin in the top left and `y` growing downwards.
///
/// Coordinates are signed since a block may transiently leave the board while a rotation is
/// being corrected.
pub type Coord = (i32, i32);

/// A rotation pivot measured in *half* cells, i.e. `(2x, 2y)`.
///
/// Pivots of some shapes lie between cells; doubling keeps rotation arithmetic integral.
pub type Pivot = (i32, i32);

/// The eight kinds of block that can fall.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    /// Four cells in a straight line, initially upright.
    I,
    /// `J`-shape, foot pointing left.
    J,
    /// `L`-shape, foot pointing right.
    L,
    /// Two by two square.
    O,
    /// `S`-snake.
    S,
    /// `T`-junction.
    T,
    /// `Z`-snake.
    Z,
    /// A single cell which blows up its surroundings upon landing.
    Bomb,
}

/// Display color associated with a [`Shape`] and the landed cells it leaves behind.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    /// Color of [`Shape::I`].
    Cyan,
    /// Color of [`Shape::J`].
    Blue,
    /// Color of [`Shape::L`].
    Orange,
    /// Color of [`Shape::O`].
    Yellow,
    /// Color of [`Shape::S`].
    Green,
    /// Color of [`Shape::T`].
    Magenta,
    /// Color of [`Shape::Z`].
    Red,
    /// Color of [`Shape::Bomb`] and of pre-filled cells.
    White,
}

/// Ways to move the falling block.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// One column to the left.
    Left,
    /// One column to the right.
    Right,
    /// One row down.
    Down,
    /// All the way down until the block lands.
    Drop,
}

/// Ways to rotate the falling block.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    /// Quarter turn clockwise.
    Clockwise,
    /// Quarter turn counter-clockwise.
    Anticlockwise,
}

/// Everything a [`Player`] can ask the board to do during its turn.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    /// Move the falling block, see [`Board::move_block`].
    Move(Direction),
    /// Rotate the falling block, see [`Board::rotate_block`].
    Rotate(Rotation),
    /// Turn the next block into a bomb, see [`Board::bomb`].
    Bomb,
    /// Throw away the falling block, see [`Board::discard`].
    Discard,
    /// Do nothing but let the block fall, see [`Board::skip`].
    Skip,
}

impl Shape {
    /// All seven regular tetrominoes, i.e. every shape an adversary may choose freely.
    pub const TETROMINOES: [Self; 7] = {
        use Shape::*;
        [I, J, L, O, S, T, Z]
    };

    /// All `Shape` enum variants in order.
    ///
    /// Note that `Shape::VARIANTS[s as usize] == s` always holds.
    pub const VARIANTS: [Self; 8] = {
        use Shape::*;
        [I, J, L, O, S, T, Z, Bomb]
    };

    /// Returns the cells a freshly created block of this shape occupies, before it is centered.
    #[rustfmt::skip]
    pub const fn cells(&self) -> &'static [Coord] {
        match self {
            Shape::I => &[(0, 0), (0, 1), (0, 2), (0, 3)], // ⡇
            Shape::J => &[(1, 0), (1, 1), (0, 2), (1, 2)], // ⠼
            Shape::L => &[(0, 0), (0, 1), (0, 2), (1, 2)], // ⠧
            Shape::O => &[(0, 0), (1, 0), (0, 1), (1, 1)], // ⠛
            Shape::S => &[(1, 0), (2, 0), (0, 1), (1, 1)], // ⠲⠁
            Shape::T => &[(0, 0), (1, 0), (2, 0), (1, 1)], // ⠋⠁
            Shape::Z => &[(0, 0), (1, 0), (1, 1), (2, 1)], // ⠙⠂
            Shape::Bomb => &[(0, 0)],                      // ⠁
        }
    }

    /// Returns the rotation pivot of a freshly created block of this shape, in half cells.
    pub const fn pivot(&self) -> Pivot {
        match self {
            Shape::I => (1, 3),
            Shape::J => (2, 2),
            Shape::L => (0, 2),
            Shape::O => (1, 1),
            Shape::S => (2, 2),
            Shape::T => (2, 0),
            Shape::Z => (2, 2),
            Shape::Bomb => (1, 1),
        }
    }

    /// Returns the display color of this shape.
    pub const fn color(&self) -> Color {
        match self {
            Shape::I => Color::Cyan,
            Shape::J => Color::Blue,
            Shape::L => Color::Orange,
            Shape::O => Color::Yellow,
            Shape::S => Color::Green,
            Shape::T => Color::Magenta,
            Shape::Z => Color::Red,
            Shape::Bomb => Color::White,
        }
    }

    const fn name(&self) -> &'static str {
        match self {
            Shape::I => "I",
            Shape::J => "J",
            Shape::L => "L",
            Shape::O => "O",
            Shape::S => "S",
            Shape::T => "T",
            Shape::Z => "Z",
            Shape::Bomb => "B",
        }
    }
}

impl Direction {
    /// All `Direction` enum variants in order.
    pub const VARIANTS: [Self; 4] = [Self::Left, Self::Right, Self::Down, Self::Drop];

    const fn name(&self) -> &'static str {
        match self {
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
            Direction::Down => "DOWN",
            Direction::Drop => "DROP",
        }
    }
}

impl Rotation {
    /// All `Rotation` enum variants in order.
    pub const VARIANTS: [Self; 2] = [Self::Clockwise, Self::Anticlockwise];

    /// The rotation undoing this one.
    pub const fn inverse(&self) -> Self {
        match self {
            Rotation::Clockwise => Rotation::Anticlockwise,
            Rotation::Anticlockwise => Rotation::Clockwise,
        }
    }

    const fn name(&self) -> &'static str {
        match self {
            Rotation::Clockwise => "CLOCKWISE",
            Rotation::Anticlockwise => "ANTICLOCKWISE",
        }
    }
}

impl From<Direction> for Action {
    fn from(direction: Direction) -> Self {
        Action::Move(direction)
    }
}

impl From<Rotation> for Action {
    fn from(rotation: Rotation) -> Self {
        Action::Rotate(rotation)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move(direction) => direction.fmt(f),
            Action::Rotate(rotation) => rotation.fmt(f),
            Action::Bomb => f.write_str("BOMB"),
            Action::Discard => f.write_str("DISCARD"),
            Action::Skip => f.write_str("SKIP"),
        }
    }
}

impl FromStr for Shape {
    type Err = ParseVocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Shape::VARIANTS
            .into_iter()
            .find(|shape| shape.name() == s)
            .ok_or_else(|| ParseVocabularyError(s.to_owned()))
    }
}

impl FromStr for Direction {
    type Err = ParseVocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::VARIANTS
            .into_iter()
            .find(|direction| direction.name() == s)
            .ok_or_else(|| ParseVocabularyError(s.to_owned()))
    }
}

impl FromStr for Rotation {
    type Err = ParseVocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rotation::VARIANTS
            .into_iter()
            .find(|rotation| rotation.name() == s)
            .ok_or_else(|| ParseVocabularyError(s.to_owned()))
    }
}

impl FromStr for Action {
    type Err = ParseVocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BOMB" => Ok(Action::Bomb),
            "DISCARD" => Ok(Action::Discard),
            "SKIP" => Ok(Action::Skip),
            _ => s
                .parse::<Direction>()
                .map(Action::Move)
                .or_else(|_| s.parse::<Rotation>().map(Action::Rotate)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_index_matches_discriminant() {
        for (i, shape) in Shape::VARIANTS.iter().enumerate() {
            assert_eq!(*shape as usize, i);
        }
    }

    #[test]
    fn bomb_is_not_a_tetromino() {
        assert!(!Shape::TETROMINOES.contains(&Shape::Bomb));
        assert_eq!(Shape::Bomb.cells().len(), 1);
        assert!(Shape::TETROMINOES.iter().all(|s| s.cells().len() == 4));
    }

    #[test]
    fn vocabulary_words_parse_back() {
        for word in [
            "LEFT", "RIGHT", "DOWN", "DROP", "CLOCKWISE", "ANTICLOCKWISE", "BOMB", "DISCARD", "SKIP",
        ] {
            let action: Action = word.parse().unwrap();
            assert_eq!(action.to_string(), word);
        }
        assert_eq!("B".parse::<Shape>(), Ok(Shape::Bomb));
        assert_eq!("T".parse::<Shape>(), Ok(Shape::T));
    }

    #[test]
    fn unknown_words_are_rejected() {
        assert_eq!(
            "JUMP".parse::<Action>(),
            Err(ParseVocabularyError("JUMP".to_owned()))
        );
        assert!("left".parse::<Direction>().is_err());
        assert!("X".parse::<Shape>().is_err());
    }
}
