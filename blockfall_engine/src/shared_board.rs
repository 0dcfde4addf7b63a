use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{Adversary, Board, Player, Turns};

/// A cheaply clonable handle to a [`Board`] behind one exclusive lock.
///
/// Front-ends that render from another thread hold [`SharedBoard::lock`] for the whole render
/// pass; [`Turns`] holds it for exactly one action at a time.
#[derive(Clone, Debug)]
pub struct SharedBoard(Arc<Mutex<Board>>);

impl SharedBoard {
    /// Wraps a board for shared use.
    pub fn new(board: Board) -> Self {
        Self(Arc::new(Mutex::new(board)))
    }

    /// Acquires exclusive access to the board until the guard is dropped.
    pub fn lock(&self) -> MutexGuard<'_, Board> {
        // Every action completes under a single acquisition, so a poisoned board is consistent.
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// An independent copy of the board's current state.
    pub fn snapshot(&self) -> Board {
        self.lock().clone()
    }

    /// Starts a game on this board, see [`Turns`].
    pub fn turns<'a, P, A>(&self, player: &'a mut P, adversary: &'a mut A) -> Turns<'a, P, A>
    where
        P: Player + ?Sized,
        A: Adversary + ?Sized,
    {
        Turns::new(self.clone(), player, adversary)
    }
}

impl From<Board> for SharedBoard {
    fn from(board: Board) -> Self {
        Self::new(board)
    }
}
