/*!
Property tests for the block and board rules that must hold for any sequence of actions.
*/

use std::collections::BTreeSet;

use blockfall_engine::{Action, Block, Board, Color, Coord, Direction, Grid, Rotation, Shape};
use proptest::prelude::*;

fn shape() -> impl Strategy<Value = Shape> {
    prop::sample::select(Shape::VARIANTS.to_vec())
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => prop::sample::select(Direction::VARIANTS.to_vec()).prop_map(Action::Move),
        3 => prop::sample::select(Rotation::VARIANTS.to_vec()).prop_map(Action::Rotate),
        1 => Just(Action::Bomb),
        1 => Just(Action::Discard),
        1 => Just(Action::Skip),
    ]
}

fn garbage() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[x ]{10}", 0..10)
}

/// Applies `actions`, refilling the falling block from `shapes`, and checks the falling block
/// after every step. Stops once the board is lost.
fn play_checked(board: &mut Board, shapes: &[Shape], actions: &[Action]) {
    let mut shapes = shapes.iter().copied().cycle();
    for &action in actions {
        if board.next().is_none() {
            board.set_next(shapes.next().unwrap_or(Shape::O));
        }
        if board.falling().is_none() {
            board.place_next_block();
            board.set_next(shapes.next().unwrap_or(Shape::O));
        }
        if !board.is_alive() {
            return;
        }
        board.apply(action).unwrap();

        if let Some(block) = board.falling() {
            if !board.is_alive() {
                // Only a freshly placed block may overlap, which ends the game.
                return;
            }
            for &(x, y) in block.cells() {
                assert!((0..board.width()).contains(&x), "x = {x} after {action}");
                assert!((0..board.height()).contains(&y), "y = {y} after {action}");
                assert!(!board.contains((x, y)));
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn falling_block_stays_inside_and_clear_of_landed_cells(
        rows in garbage(),
        shapes in prop::collection::vec(shape(), 1..8),
        actions in prop::collection::vec(action(), 0..200),
    ) {
        let mut board = Board::builder().rows(rows).build().unwrap();
        play_checked(&mut board, &shapes, &actions);
    }

    #[test]
    fn rotation_is_undone_by_the_opposite_rotation(
        shape in shape(),
        shift in -1i32..=1,
        rows in 4i32..14,
        rotation in prop::sample::select(Rotation::VARIANTS.to_vec()),
    ) {
        let grid = Grid::new(10, 24);
        let mut block = Block::new(shape);
        block.initialize(&grid);
        let direction = if shift < 0 { Direction::Left } else { Direction::Right };
        let _ = block.move_by(direction, &grid, shift.abs());
        let _ = block.move_by(Direction::Down, &grid, rows);

        let before = block.clone();
        prop_assert!(block.rotate(rotation, &grid).is_some());
        prop_assert!(block.rotate(rotation.inverse(), &grid).is_some());
        prop_assert_eq!(block.cells(), before.cells());
        prop_assert_eq!(block.pivot(), before.pivot());
    }

    #[test]
    fn clones_evolve_identically(
        rows in garbage(),
        first in shape(),
        second in shape(),
        actions in prop::collection::vec(action(), 1..60),
    ) {
        let mut board = Board::builder().rows(rows).build().unwrap();
        board.set_next(first);
        board.place_next_block();
        board.set_next(second);
        prop_assume!(board.is_alive());

        let mut clone = board.clone();
        for action in actions {
            let original = board.apply(action);
            prop_assert_eq!(original, clone.apply(action));
            if original.is_err() {
                break;
            }
        }
        prop_assert_eq!(&board, &clone);
        prop_assert_eq!(board.score(), clone.score());
    }

    #[test]
    fn explosion_clears_the_blast_and_compacts_columns(
        cells in prop::collection::btree_set((0i32..10, 0i32..24), 0..150),
        center in (0i32..10, 0i32..24),
    ) {
        let mut grid = Grid::new(10, 24);
        for &cell in &cells {
            grid.fill(cell, Color::White);
        }
        let (bx, by) = center;
        grid.explode(center);

        let in_blast = |(x, y): Coord| (bx - x).abs() <= 1 && (by - y).abs() <= 1;
        let blasted = cells.iter().filter(|&&cell| in_blast(cell)).count();
        prop_assert_eq!(grid.len(), cells.len() - blasted);
        let landed: BTreeSet<Coord> = grid.cells().map(|(cell, _)| cell).collect();

        for x in 0..10 {
            let column = |set: &BTreeSet<Coord>| -> BTreeSet<i32> {
                set.iter().filter(|&&(cx, _)| cx == x).map(|&(_, y)| y).collect()
            };
            let before = column(&cells);
            let after = column(&landed);
            if (bx - x).abs() > 1 {
                prop_assert_eq!(after, before);
                continue;
            }
            // Cells below the blast stay, cells above it now rest on them without a gap.
            let floor = before.iter().copied().find(|&y| y > by + 1).unwrap_or(24);
            let above = before.iter().filter(|&&y| y < by - 1).count() as i32;
            let expected: BTreeSet<i32> = before
                .iter()
                .copied()
                .filter(|&y| y >= floor)
                .chain(floor - above..floor)
                .collect();
            prop_assert_eq!(after, expected);
        }
    }
}
