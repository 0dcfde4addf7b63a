/*!
This module handles the landed cells of a board: merging, clearing full rows and explosions.
*/

use std::collections::BTreeMap;

use crate::{Block, Color, Coord};

/// The grid of cells that have come to rest, together with their colors.
///
/// Every occupied cell has exactly one color; storing them in one map keeps the two in sync.
#[derive(Eq, PartialEq, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    width: i32,
    height: i32,
    cells: BTreeMap<Coord, Color>,
}

impl Grid {
    /// Creates an empty grid.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cells: BTreeMap::new(),
        }
    }

    /// Number of columns.
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Whether a landed cell occupies the given coordinates.
    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.contains_key(&coord)
    }

    /// The color of the landed cell at the given coordinates, if any.
    pub fn color_at(&self, coord: Coord) -> Option<Color> {
        self.cells.get(&coord).copied()
    }

    /// Iterates over all landed cells in column-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, Color)> + '_ {
        self.cells.iter().map(|(&coord, &color)| (coord, color))
    }

    /// Number of landed cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell has landed.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Marks a cell as landed with the given color.
    pub fn fill(&mut self, coord: Coord, color: Color) {
        self.cells.insert(coord, color);
    }

    /// Adds all cells of a block to the landed cells.
    pub fn merge(&mut self, block: &Block) {
        let color = block.color();
        for &coord in block.cells() {
            self.cells.insert(coord, color);
        }
    }

    /// Whether every cell of row `y` is occupied.
    pub fn line_full(&self, y: i32) -> bool {
        (0..self.width).all(|x| self.contains((x, y)))
    }

    /// Removes row `y` and moves every row above it down by one.
    pub fn remove_line(&mut self, line: i32) {
        self.cells = std::mem::take(&mut self.cells)
            .into_iter()
            .filter(|&((_, y), _)| y != line)
            .map(|((x, y), color)| if y < line { ((x, y + 1), color) } else { ((x, y), color) })
            .collect();
    }

    /// Removes all full rows, scanning from the bottom up, and returns how many were removed.
    pub fn clean(&mut self) -> u32 {
        let mut removed = 0;
        for line in (0..self.height).rev() {
            // A new row slides into `line` after each removal; it may be full as well.
            while self.line_full(line) {
                self.remove_line(line);
                removed += 1;
            }
        }
        removed
    }

    /// Blows up every landed cell within one step (including diagonals) of `center`, then lets
    /// the cells above the blast in the three affected columns fall down into the gap.
    pub fn explode(&mut self, (bx, by): Coord) {
        self.cells
            .retain(|&(x, y), _| (bx - x).abs() > 1 || (by - y).abs() > 1);

        for x in bx - 1..=bx + 1 {
            let floor = (by..self.height)
                .find(|&y| self.contains((x, y)))
                .unwrap_or(self.height);
            let mut lowest = floor - 1;
            for y in (0..=by).rev() {
                if let Some(color) = self.cells.remove(&(x, y)) {
                    self.cells.insert((x, lowest), color);
                    lowest -= 1;
                }
            }
        }
    }

    /// The height of each column, measured from the floor to its topmost landed cell.
    pub fn column_heights(&self) -> Vec<i32> {
        (0..self.width)
            .map(|x| {
                (0..self.height)
                    .find(|&y| self.contains((x, y)))
                    .map_or(0, |top| self.height - top)
            })
            .collect()
    }

    /// Number of empty cells below the topmost landed cell of their column.
    pub fn hole_count(&self) -> u32 {
        let mut holes = 0;
        for (x, height) in (0..self.width).zip(self.column_heights()) {
            for y in self.height - height..self.height {
                if !self.contains((x, y)) {
                    holes += 1;
                }
            }
        }
        holes
    }

    /// Sum of absolute height differences between neighboring columns.
    pub fn bumpiness(&self) -> u32 {
        self.column_heights()
            .windows(2)
            .map(|pair| pair[0].abs_diff(pair[1]))
            .sum()
    }

    /// Number of landed cells in the lowest `rows` rows.
    pub fn filled_in_bottom_rows(&self, rows: i32) -> u32 {
        let lowest = self.height - rows;
        let count = self.cells.keys().filter(|&&(_, y)| y >= lowest).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}
