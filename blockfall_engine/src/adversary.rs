/*!
This module handles the choice of upcoming [`Shape`]s by an [`Adversary`].
*/

use std::collections::VecDeque;

use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha12Rng};
use tracing::debug;

use crate::{AdversaryExhausted, Board, Shape};

/// The internal pseudo random number generator used by [`RandomAdversary`].
pub type AdversaryRng = ChaCha12Rng;

/// Something that picks the next shape to fall, e.g. to make the player's life hard.
pub trait Adversary {
    /// Picks the shape that will be queued as the next block.
    ///
    /// Fails once the adversary has no more shapes to hand out, which ends the game in the
    /// player's favor.
    fn choose_block(&mut self, board: &Board) -> Result<Shape, AdversaryExhausted>;
}

impl<A: Adversary + ?Sized> Adversary for Box<A> {
    fn choose_block(&mut self, board: &Board) -> Result<Shape, AdversaryExhausted> {
        (**self).choose_block(board)
    }
}

/// Method of random shape generation used by a [`RandomAdversary`].
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Generation {
    /// Every tetromino is equally likely at every request.
    #[default]
    Uniform,
    /// Standard 'bag' generation.
    ///
    /// One copy of each tetromino is handed out in random order before the bag is refilled.
    Bag {
        /// The number of each tetromino left in the bag.
        pieces_left: [u32; 7],
    },
}

impl Generation {
    /// Initialize an instance of the [`Generation::Uniform`] variant.
    pub const fn uniform() -> Self {
        Self::Uniform
    }

    /// Initialize a full 7-bag instance of the [`Generation::Bag`] variant.
    pub const fn bag() -> Self {
        Self::Bag {
            pieces_left: [1; 7],
        }
    }

    /// Picks a tetromino and updates the generation state.
    pub fn generate<R: Rng>(&mut self, rng: &mut R) -> Shape {
        match self {
            Generation::Uniform => {
                Shape::TETROMINOES[rng.random_range(0..Shape::TETROMINOES.len())]
            }
            Generation::Bag { pieces_left } => {
                if pieces_left.iter().all(|&n| n == 0) {
                    *pieces_left = [1; 7];
                }
                let total: u32 = pieces_left.iter().sum();
                let mut pick = rng.random_range(0..total);
                let mut idx = 0;
                // Find the bucket `pick` falls into.
                while pick >= pieces_left[idx] {
                    pick -= pieces_left[idx];
                    idx += 1;
                }
                pieces_left[idx] -= 1;
                Shape::TETROMINOES[idx]
            }
        }
    }
}

/// An adversary picking tetrominoes at random from a seeded generator.
///
/// It never hands out [`Shape::Bomb`]. With a budget of `n` blocks, the first `n` requests
/// succeed and every later one fails.
#[derive(Eq, PartialEq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RandomAdversary {
    rng: AdversaryRng,
    generation: Generation,
    budget: Option<u32>,
    handed_out: u32,
}

impl RandomAdversary {
    /// Creates a uniformly random adversary; `blocks` limits how many shapes it hands out.
    pub fn new(seed: u64, blocks: Option<u32>) -> Self {
        Self {
            rng: AdversaryRng::seed_from_u64(seed),
            generation: Generation::default(),
            budget: blocks,
            handed_out: 0,
        }
    }

    /// Sets the method of shape generation.
    pub fn with_generation(mut self, generation: Generation) -> Self {
        self.generation = generation;
        self
    }

    /// How many shapes have been handed out so far.
    pub const fn handed_out(&self) -> u32 {
        self.handed_out
    }

    /// The configured block budget, if any.
    pub const fn budget(&self) -> Option<u32> {
        self.budget
    }
}

impl Adversary for RandomAdversary {
    fn choose_block(&mut self, _board: &Board) -> Result<Shape, AdversaryExhausted> {
        if self.budget.is_some_and(|budget| self.handed_out >= budget) {
            debug!(handed_out = self.handed_out, "adversary exhausted");
            return Err(AdversaryExhausted {
                handed_out: self.handed_out,
            });
        }
        self.handed_out += 1;
        Ok(self.generation.generate(&mut self.rng))
    }
}

/// An adversary handing out a fixed sequence of shapes.
#[derive(Eq, PartialEq, Clone, Hash, Default, Debug)]
pub struct ScriptedAdversary {
    shapes: VecDeque<Shape>,
    handed_out: u32,
}

impl ScriptedAdversary {
    /// Creates an adversary that hands out exactly the given shapes, in order.
    pub fn new(shapes: impl IntoIterator<Item = Shape>) -> Self {
        Self {
            shapes: shapes.into_iter().collect(),
            handed_out: 0,
        }
    }

    /// Shapes not handed out yet.
    pub fn remaining(&self) -> usize {
        self.shapes.len()
    }
}

impl Adversary for ScriptedAdversary {
    fn choose_block(&mut self, _board: &Board) -> Result<Shape, AdversaryExhausted> {
        let shape = self.shapes.pop_front().ok_or(AdversaryExhausted {
            handed_out: self.handed_out,
        })?;
        self.handed_out += 1;
        Ok(shape)
    }
}
