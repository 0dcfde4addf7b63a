/*!
This module handles the [`Board`] a game is played on, and its [`BoardBuilder`].
*/

use std::fmt;

use tracing::{debug, trace};

use crate::{
    Action, Block, BoardError, Color, Coord, Direction, Grid, NoActiveBlock, Rotation, Shape,
};

/// Points awarded for clearing `n` rows with a single landing, indexed by `n`.
pub const LINE_CLEAR_BONUS: [u32; 5] = [0, 25, 100, 400, 1600];

/// The main game state: landed cells, the falling and next block, score and resources.
///
/// Every action that needs a falling block fails with [`NoActiveBlock`] if there is none.
/// Each action is followed by one implicit move down, unless the action already made the block
/// land; the returned `bool` reports whether the falling block landed during the call.
///
/// Cloning a board yields a fully independent copy, suitable for simulating moves.
#[derive(Eq, PartialEq, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    grid: Grid,
    score: u32,
    falling: Option<Block>,
    next: Option<Block>,
    bombs_remaining: u32,
    discards_remaining: u32,
    lines_cleared: u32,
    blocks_landed: u32,
}

/// This builder exposes the ability to configure a new [`Board`].
///
/// The builder is not used up and its configuration can be re-used to create more boards.
#[derive(Eq, PartialEq, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardBuilder {
    /// Number of columns.
    pub width: i32,
    /// Number of rows.
    pub height: i32,
    /// Score the board starts out with.
    pub score: u32,
    /// How many times the next block may be turned into a bomb.
    pub bombs_remaining: u32,
    /// How many falling blocks may be thrown away.
    pub discards_remaining: u32,
    /// Pre-filled rows, top to bottom, resting on the floor.
    /// A space is an empty cell, any other character a filled one.
    pub rows: Vec<String>,
}

impl Default for BoardBuilder {
    fn default() -> Self {
        Self {
            width: Board::DEFAULT_WIDTH,
            height: Board::DEFAULT_HEIGHT,
            score: 0,
            bombs_remaining: Board::DEFAULT_BOMBS,
            discards_remaining: Board::DEFAULT_DISCARDS,
            rows: Vec::new(),
        }
    }
}

impl BoardBuilder {
    /// Creates a template for an empty default-sized board with the usual resources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of columns.
    pub fn width(&mut self, x: i32) -> &mut Self {
        self.width = x;
        self
    }

    /// Number of rows.
    pub fn height(&mut self, x: i32) -> &mut Self {
        self.height = x;
        self
    }

    /// Score the board starts out with.
    pub fn score(&mut self, x: u32) -> &mut Self {
        self.score = x;
        self
    }

    /// How many times the next block may be turned into a bomb.
    pub fn bombs_remaining(&mut self, x: u32) -> &mut Self {
        self.bombs_remaining = x;
        self
    }

    /// How many falling blocks may be thrown away.
    pub fn discards_remaining(&mut self, x: u32) -> &mut Self {
        self.discards_remaining = x;
        self
    }

    /// Pre-filled rows, top to bottom, resting on the floor.
    pub fn rows<S: Into<String>>(&mut self, x: impl IntoIterator<Item = S>) -> &mut Self {
        self.rows = x.into_iter().map(Into::into).collect();
        self
    }

    /// Creates a [`Board`] with the configuration specified by `self`.
    pub fn build(&self) -> Result<Board, BoardError> {
        let (width, height) = (self.width, self.height);
        if width <= 0 || height <= 0 {
            return Err(BoardError::InvalidDimensions { width, height });
        }
        if width < Board::MIN_WIDTH || height < Board::MIN_HEIGHT {
            return Err(BoardError::TooSmall {
                width,
                height,
                min_width: Board::MIN_WIDTH,
                min_height: Board::MIN_HEIGHT,
            });
        }
        let fits = i32::try_from(self.rows.len()).is_ok_and(|n| n <= height);
        if !fits {
            return Err(BoardError::TooManyRows {
                rows: self.rows.len(),
                height,
            });
        }

        let mut grid = Grid::new(width, height);
        // `rows.len() <= height` was verified above.
        let first_y = height - self.rows.len() as i32;
        for (row, (line, y)) in self.rows.iter().zip(first_y..).enumerate() {
            let len = line.chars().count();
            if i32::try_from(len).map_or(true, |len| len > width) {
                return Err(BoardError::RowTooWide { row, len, width });
            }
            for (ch, x) in line.chars().zip(0..) {
                if ch != ' ' {
                    grid.fill((x, y), Color::White);
                }
            }
        }

        Ok(Board {
            grid,
            score: self.score,
            falling: None,
            next: None,
            bombs_remaining: self.bombs_remaining,
            discards_remaining: self.discards_remaining,
            lines_cleared: 0,
            blocks_landed: 0,
        })
    }
}

impl Board {
    /// Default number of columns.
    pub const DEFAULT_WIDTH: i32 = 10;
    /// Default number of rows.
    pub const DEFAULT_HEIGHT: i32 = 24;
    /// Narrowest board every shape spawns inside of.
    pub const MIN_WIDTH: i32 = 3;
    /// Lowest board every shape spawns inside of.
    pub const MIN_HEIGHT: i32 = 4;
    /// Default number of bombs available.
    pub const DEFAULT_BOMBS: u32 = 5;
    /// Default number of discards available.
    pub const DEFAULT_DISCARDS: u32 = 10;

    /// Creates a blank new template representing a yet-to-be-built board.
    pub fn builder() -> BoardBuilder {
        BoardBuilder::default()
    }

    /// Creates an empty board of the given size with the default resources.
    pub fn new(width: i32, height: i32) -> Result<Self, BoardError> {
        Self::builder().width(width).height(height).build()
    }

    /// Number of columns.
    pub const fn width(&self) -> i32 {
        self.grid.width()
    }

    /// Number of rows.
    pub const fn height(&self) -> i32 {
        self.grid.height()
    }

    /// The landed cells.
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Whether a landed cell occupies the given coordinates.
    pub fn contains(&self, coord: Coord) -> bool {
        self.grid.contains(coord)
    }

    /// The color of the landed cell at the given coordinates, if any.
    pub fn color_at(&self, coord: Coord) -> Option<Color> {
        self.grid.color_at(coord)
    }

    /// The block currently under player control.
    pub const fn falling(&self) -> Option<&Block> {
        self.falling.as_ref()
    }

    /// The block that will fall after the current one lands.
    pub const fn next(&self) -> Option<&Block> {
        self.next.as_ref()
    }

    /// Current score.
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Bomb charges left.
    pub const fn bombs_remaining(&self) -> u32 {
        self.bombs_remaining
    }

    /// Discard charges left.
    pub const fn discards_remaining(&self) -> u32 {
        self.discards_remaining
    }

    /// Total number of rows removed since the board was built.
    pub const fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    /// Total number of blocks that merged into the board or exploded.
    pub const fn blocks_landed(&self) -> u32 {
        self.blocks_landed
    }

    /// See [`Grid::column_heights`].
    pub fn column_heights(&self) -> Vec<i32> {
        self.grid.column_heights()
    }

    /// See [`Grid::hole_count`].
    pub fn hole_count(&self) -> u32 {
        self.grid.hole_count()
    }

    /// See [`Grid::bumpiness`].
    pub fn bumpiness(&self) -> u32 {
        self.grid.bumpiness()
    }

    /// Whether the game can go on: either no block has been placed yet, or the falling block
    /// does not overlap any landed cell.
    pub fn is_alive(&self) -> bool {
        self.falling
            .as_ref()
            .is_none_or(|block| !block.collides(&self.grid))
    }

    /// Queues a new block of the given shape as the next one, replacing any queued block.
    pub fn set_next(&mut self, shape: Shape) {
        self.next = Some(Block::new(shape));
    }

    /// Turns the next block into the falling one, centered at the top of the board.
    pub fn place_next_block(&mut self) {
        self.falling = self.next.take();
        if let Some(block) = &mut self.falling {
            block.initialize(&self.grid);
            debug!(shape = %block.shape(), "placed next block");
        }
    }

    /// Moves the falling block, then lets it fall one row unless it already landed.
    pub fn move_block(&mut self, direction: Direction) -> Result<bool, NoActiveBlock> {
        let falling = self.falling.as_mut().ok_or(NoActiveBlock)?;
        let step = falling.move_by(direction, &self.grid, 1);
        self.score += step.rows_fallen;
        if step.landed {
            self.land_block();
            return Ok(true);
        }
        self.fall()
    }

    /// Rotates the falling block, then lets it fall one row.
    ///
    /// A rotation that cannot be corrected leaves the block unchanged; the fall still happens.
    pub fn rotate_block(&mut self, rotation: Rotation) -> Result<bool, NoActiveBlock> {
        let falling = self.falling.as_mut().ok_or(NoActiveBlock)?;
        match falling.rotate(rotation, &self.grid) {
            Some(rows_fallen) => self.score += rows_fallen,
            None => trace!(%rotation, "rotation rolled back"),
        }
        self.fall()
    }

    /// Lets the falling block fall one row.
    pub fn skip(&mut self) -> Result<bool, NoActiveBlock> {
        self.fall()
    }

    /// Turns the next block into a bomb if a charge is left and it is not a bomb already,
    /// then lets the falling block fall one row.
    pub fn bomb(&mut self) -> Result<bool, NoActiveBlock> {
        if self.falling.is_none() {
            return Err(NoActiveBlock);
        }
        let upgradable = self
            .next
            .as_ref()
            .is_some_and(|block| block.shape() != Shape::Bomb);
        if self.bombs_remaining > 0 && upgradable {
            self.next = Some(Block::new(Shape::Bomb));
            self.bombs_remaining -= 1;
            debug!(bombs_remaining = self.bombs_remaining, "next block is a bomb");
        }
        self.skip()
    }

    /// Throws away the falling block and brings in the next one, if a charge is left.
    ///
    /// Returns whether a charge was consumed. The thrown away block is not merged and earns no
    /// points.
    pub fn discard(&mut self) -> Result<bool, NoActiveBlock> {
        if self.falling.is_none() {
            return Err(NoActiveBlock);
        }
        if self.discards_remaining == 0 {
            return Ok(false);
        }
        self.discards_remaining -= 1;
        debug!(discards_remaining = self.discards_remaining, "discarded block");
        self.place_next_block();
        Ok(true)
    }

    /// Applies any [`Action`] by dispatching to the matching method.
    pub fn apply(&mut self, action: Action) -> Result<bool, NoActiveBlock> {
        trace!(%action, "applying action");
        match action {
            Action::Move(direction) => self.move_block(direction),
            Action::Rotate(rotation) => self.rotate_block(rotation),
            Action::Bomb => self.bomb(),
            Action::Discard => self.discard(),
            Action::Skip => self.skip(),
        }
    }

    fn fall(&mut self) -> Result<bool, NoActiveBlock> {
        let falling = self.falling.as_mut().ok_or(NoActiveBlock)?;
        let step = falling.move_by(Direction::Down, &self.grid, 1);
        self.score += step.rows_fallen;
        if step.landed {
            self.land_block();
        }
        Ok(step.landed)
    }

    fn land_block(&mut self) {
        let Some(block) = self.falling.take() else {
            return;
        };
        if block.shape() == Shape::Bomb {
            if let Some(&center) = block.cells().first() {
                self.grid.explode(center);
                debug!(?center, "bomb exploded");
            }
        } else {
            self.grid.merge(&block);
            debug!(shape = %block.shape(), cells = ?block.cells(), "block landed");
        }
        self.blocks_landed += 1;

        let removed = self.grid.clean();
        if removed > 0 {
            let bonus = LINE_CLEAR_BONUS[(removed as usize).min(LINE_CLEAR_BONUS.len() - 1)];
            self.lines_cleared += removed;
            self.score += bonus;
            debug!(removed, bonus, "lines cleared");
        }

        self.place_next_block();
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height() {
            for x in 0..self.width() {
                let glyph = if self.falling.as_ref().is_some_and(|b| b.contains((x, y))) {
                    '@'
                } else if self.grid.contains((x, y)) {
                    '#'
                } else {
                    '.'
                };
                write!(f, "{glyph}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
