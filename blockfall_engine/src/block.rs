/*!
This module handles the geometry of a single falling [`Block`].
*/

use std::collections::BTreeSet;

use crate::{grid::Grid, Color, Coord, Direction, Pivot, Rotation, Shape};

/// The result of moving a block once.
#[must_use]
#[derive(Eq, PartialEq, Clone, Copy, Hash, Default, Debug)]
pub struct Step {
    /// Whether the block came to rest.
    pub landed: bool,
    /// How many rows the block fell, each of which is worth one point.
    pub rows_fallen: u32,
}

/// A rotatable, translatable set of cells of some [`Shape`].
///
/// A block knows nothing about the board it falls on; every method that needs to check for
/// collisions takes the landed [`Grid`] explicitly.
#[derive(Eq, PartialEq, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    shape: Shape,
    cells: BTreeSet<Coord>,
    pivot: Pivot,
}

impl Block {
    /// Creates a block of the given shape in its initial position at the origin.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            cells: shape.cells().iter().copied().collect(),
            pivot: shape.pivot(),
        }
    }

    /// The shape of this block.
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    /// The color of this block.
    pub const fn color(&self) -> Color {
        self.shape.color()
    }

    /// The cells currently occupied.
    pub const fn cells(&self) -> &BTreeSet<Coord> {
        &self.cells
    }

    /// The rotation pivot in half cells.
    pub const fn pivot(&self) -> Pivot {
        self.pivot
    }

    /// Whether the block occupies the given cell.
    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.contains(&coord)
    }

    /// The leftmost x-position of the block.
    pub fn left(&self) -> i32 {
        self.cells.iter().map(|&(x, _)| x).min().unwrap_or_default()
    }

    /// The rightmost x-position of the block.
    pub fn right(&self) -> i32 {
        self.cells.iter().map(|&(x, _)| x).max().unwrap_or_default()
    }

    /// The topmost y-position of the block.
    pub fn top(&self) -> i32 {
        self.cells.iter().map(|&(_, y)| y).min().unwrap_or_default()
    }

    /// The bottommost y-position of the block.
    pub fn bottom(&self) -> i32 {
        self.cells.iter().map(|&(_, y)| y).max().unwrap_or_default()
    }

    /// Centers the block horizontally at the top of the grid.
    pub fn initialize(&mut self, grid: &Grid) {
        let (left, right) = (self.left(), self.right());
        let center = left + (right - left).div_euclid(2);
        let shift = grid.width().div_euclid(2) - center;
        self.translate(shift, 0);
    }

    /// Whether any cell of the block overlaps a landed cell.
    pub fn collides(&self, grid: &Grid) -> bool {
        self.cells.iter().any(|&coord| grid.contains(coord))
    }

    /// Whether moving down once more is impossible, i.e. some cell rests on the floor or on a
    /// landed cell.
    pub fn supported(&self, grid: &Grid) -> bool {
        self.cells
            .iter()
            .any(|&(x, y)| y + 1 >= grid.height() || grid.contains((x, y + 1)))
    }

    /// Moves the block `count` steps in the given direction.
    ///
    /// Sideways moves that would leave the grid or overlap landed cells are undone. Moving down a
    /// supported block does nothing and reports a landing, as does [`Direction::Drop`] once it
    /// has let the block fall as far as it goes.
    pub fn move_by(&mut self, direction: Direction, grid: &Grid, count: i32) -> Step {
        match direction {
            Direction::Right | Direction::Left => {
                let dx = if direction == Direction::Right { count } else { -count };
                self.translate(dx, 0);
                if self.left() < 0 || self.right() >= grid.width() || self.collides(grid) {
                    // We hit something by moving; undo.
                    self.translate(-dx, 0);
                }
                Step::default()
            }
            Direction::Down => {
                if self.supported(grid) {
                    return Step {
                        landed: true,
                        rows_fallen: 0,
                    };
                }
                self.translate(0, count);
                Step {
                    landed: false,
                    rows_fallen: count.unsigned_abs(),
                }
            }
            Direction::Drop => {
                let mut rows_fallen = 0;
                while !self.supported(grid) {
                    self.translate(0, 1);
                    rows_fallen += 1;
                }
                Step {
                    landed: true,
                    rows_fallen,
                }
            }
        }
    }

    /// Rotates the block a quarter turn around its pivot, pushing it back inside the grid if
    /// the rotation made it poke out on the left, right or top (in that order).
    ///
    /// Returns the number of rows the block was pushed down, or `None` if the rotation could not
    /// be corrected and was rolled back.
    pub fn rotate(&mut self, rotation: Rotation, grid: &Grid) -> Option<u32> {
        let old_cells = self.cells.clone();
        let old_pivot = self.pivot;

        let (px, py) = self.pivot;
        // Integer division truncates toward zero, matching rounding after a float rotation.
        self.cells = self
            .cells
            .iter()
            .map(|&(x, y)| match rotation {
                Rotation::Clockwise => ((px + py - 2 * y) / 2, (2 * x - px + py) / 2),
                Rotation::Anticlockwise => ((px - py + 2 * y) / 2, (px + py - 2 * x) / 2),
            })
            .collect();

        let corrected = self.correct_bounds(grid);
        if corrected.is_none() {
            self.cells = old_cells;
            self.pivot = old_pivot;
        }
        corrected
    }

    fn correct_bounds(&mut self, grid: &Grid) -> Option<u32> {
        let left = self.left();
        if left < 0 {
            let _ = self.move_by(Direction::Right, grid, -left);
            if self.left() < 0 {
                return None;
            }
        }

        let right = self.right();
        if right >= grid.width() {
            let _ = self.move_by(Direction::Left, grid, right - grid.width() + 1);
            if self.right() >= grid.width() {
                return None;
            }
        }

        let mut rows_fallen = 0;
        let top = self.top();
        if top < 0 {
            rows_fallen = self.move_by(Direction::Down, grid, -top).rows_fallen;
            if self.top() < 0 {
                return None;
            }
        }

        // Poking out at the bottom cannot be corrected.
        if self.bottom() >= grid.height() || self.collides(grid) {
            return None;
        }

        Some(rows_fallen)
    }

    fn translate(&mut self, dx: i32, dy: i32) {
        self.cells = self.cells.iter().map(|&(x, y)| (x + dx, y + dy)).collect();
        self.pivot = (self.pivot.0 + 2 * dx, self.pivot.1 + 2 * dy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(10, 24)
    }

    #[test]
    fn initialize_centers_horizontally() {
        let grid = grid();
        let mut block = Block::new(Shape::O);
        block.initialize(&grid);
        assert_eq!(block.left(), 5);
        assert_eq!(block.top(), 0);
        assert_eq!(block.pivot(), (11, 1));

        let mut block = Block::new(Shape::T);
        block.initialize(&grid);
        assert_eq!(block.left(), 4);
        assert_eq!(block.right(), 6);
    }

    #[test]
    fn sideways_move_is_undone_at_the_wall() {
        let grid = grid();
        let mut block = Block::new(Shape::I);
        let before = block.clone();
        let step = block.move_by(Direction::Left, &grid, 1);
        assert!(!step.landed);
        assert_eq!(block, before);

        let step = block.move_by(Direction::Right, &grid, 1);
        assert!(!step.landed);
        assert_eq!(block.left(), 1);
        assert_eq!(block.pivot(), (3, 3));
    }

    #[test]
    fn sideways_move_is_undone_on_collision() {
        let mut grid = grid();
        grid.fill((1, 2), Color::White);
        let mut block = Block::new(Shape::I);
        let _ = block.move_by(Direction::Right, &grid, 1);
        assert_eq!(block.left(), 0);
    }

    #[test]
    fn down_reports_landing_without_moving_when_supported() {
        let grid = grid();
        let mut block = Block::new(Shape::O);
        let step = block.move_by(Direction::Drop, &grid, 1);
        assert_eq!(step.rows_fallen, 22);
        assert!(step.landed);
        assert_eq!(block.bottom(), 23);

        let before = block.clone();
        let step = block.move_by(Direction::Down, &grid, 1);
        assert_eq!(
            step,
            Step {
                landed: true,
                rows_fallen: 0
            }
        );
        assert_eq!(block, before);
    }

    #[test]
    fn supported_by_a_single_landed_cell() {
        let mut grid = grid();
        grid.fill((2, 3), Color::Red);
        let block = Block::new(Shape::T); // Cells (0,0) (1,0) (2,0) (1,1).
        assert!(!block.supported(&grid));
        let mut block = block;
        let _ = block.move_by(Direction::Down, &grid, 2);
        assert!(block.supported(&grid));
    }

    #[test]
    fn rotation_of_upright_i_becomes_horizontal() {
        let grid = grid();
        let mut block = Block::new(Shape::I);
        let _ = block.move_by(Direction::Right, &grid, 4);
        let _ = block.move_by(Direction::Down, &grid, 4);
        assert_eq!(block.rotate(Rotation::Clockwise, &grid), Some(0));
        let expected: BTreeSet<Coord> = [(3, 5), (4, 5), (5, 5), (6, 5)].into_iter().collect();
        assert_eq!(block.cells(), &expected);
    }

    #[test]
    fn rotation_is_corrected_at_the_left_wall() {
        let grid = grid();
        let mut block = Block::new(Shape::I);
        let _ = block.move_by(Direction::Down, &grid, 4);
        // Rotating at the wall would put one cell at x = -1.
        assert_eq!(block.rotate(Rotation::Clockwise, &grid), Some(0));
        assert_eq!(block.left(), 0);
        assert_eq!(block.right(), 3);
    }

    #[test]
    fn rotation_is_corrected_at_the_top() {
        let grid = grid();
        let mut block = Block::new(Shape::T);
        let _ = block.move_by(Direction::Right, &grid, 4);
        // The T points downwards around a pivot in its top row; a quarter turn sticks out above.
        assert_eq!(block.rotate(Rotation::Clockwise, &grid), Some(1));
        assert_eq!(block.top(), 0);
    }

    #[test]
    fn rotation_is_rolled_back_into_landed_cells() {
        let mut grid = grid();
        for x in 0..10 {
            if x != 5 {
                grid.fill((x, 4), Color::White);
            }
        }
        let mut block = Block::new(Shape::I);
        let _ = block.move_by(Direction::Right, &grid, 5);
        let _ = block.move_by(Direction::Down, &grid, 3);
        let before = block.clone();
        assert_eq!(block.rotate(Rotation::Clockwise, &grid), None);
        assert_eq!(block, before);
    }

    #[test]
    fn rotation_past_the_floor_is_rolled_back() {
        let grid = Grid::new(10, 3);
        let mut block = Block::new(Shape::I);
        let _ = block.move_by(Direction::Right, &grid, 4);
        // Lying flat the I fits; standing upright it would need four rows.
        assert_eq!(block.rotate(Rotation::Clockwise, &grid), Some(0));
        assert_eq!(block.bottom(), 1);
        let before = block.clone();
        assert_eq!(block.rotate(Rotation::Anticlockwise, &grid), None);
        assert_eq!(block, before);
    }

    #[test]
    fn clockwise_then_anticlockwise_restores_block() {
        let grid = grid();
        for shape in Shape::VARIANTS {
            let mut block = Block::new(shape);
            block.initialize(&grid);
            let _ = block.move_by(Direction::Down, &grid, 8);
            let before = block.clone();
            assert!(block.rotate(Rotation::Clockwise, &grid).is_some());
            assert!(block.rotate(Rotation::Anticlockwise, &grid).is_some());
            assert_eq!(block, before, "{shape:?}");
        }
    }

    #[test]
    fn four_quarter_turns_are_identity() {
        let grid = grid();
        for shape in Shape::VARIANTS {
            let mut block = Block::new(shape);
            block.initialize(&grid);
            let _ = block.move_by(Direction::Down, &grid, 8);
            let before = block.clone();
            for _ in 0..4 {
                assert!(block.rotate(Rotation::Clockwise, &grid).is_some());
            }
            assert_eq!(block, before, "{shape:?}");
        }
    }
}
