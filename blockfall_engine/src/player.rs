/*!
This module handles the [`Player`] side of a game.
*/

use std::collections::VecDeque;

use crate::{Action, Board, PlayerError};

/// Something that decides how to move the falling block.
pub trait Player {
    /// Picks the next action, or an ordered batch of actions, for the falling block.
    ///
    /// `board` is an independent snapshot of the live board. An empty batch means
    /// [`Action::Skip`]. Actions of a batch that remain once the block has landed are dropped.
    fn choose_action(&mut self, board: &Board) -> Result<Vec<Action>, PlayerError>;
}

impl<P: Player + ?Sized> Player for Box<P> {
    fn choose_action(&mut self, board: &Board) -> Result<Vec<Action>, PlayerError> {
        (**self).choose_action(board)
    }
}

/// A player replaying prepared batches of actions, then skipping forever.
#[derive(Eq, PartialEq, Clone, Hash, Default, Debug)]
pub struct ScriptedPlayer {
    batches: VecDeque<Vec<Action>>,
}

impl ScriptedPlayer {
    /// Creates a player issuing one of the given actions per turn request.
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        Self::from_batches(actions.into_iter().map(|action| vec![action]))
    }

    /// Creates a player answering each turn request with the next batch.
    pub fn from_batches(batches: impl IntoIterator<Item = Vec<Action>>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
        }
    }

    /// Batches not issued yet.
    pub fn remaining(&self) -> usize {
        self.batches.len()
    }
}

impl Player for ScriptedPlayer {
    fn choose_action(&mut self, _board: &Board) -> Result<Vec<Action>, PlayerError> {
        Ok(self.batches.pop_front().unwrap_or_default())
    }
}
