/*!
This module handles the turn protocol of a game, interleaving the adversary's shape choices with
the player's actions.

A game is consumed as an [`Iterator`] over [`TurnEvent`]s. The board already reflects an event
when it is yielded, so a front-end may render between any two events.
*/

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::{Action, Adversary, Player, Shape, SharedBoard, TurnError};

/// The ways a game can end.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// The adversary ran out of shapes; the player survived.
    AdversaryExhausted,
    /// A new block overlapped the landed cells.
    BoardFilled,
}

impl Outcome {
    /// Whether this outcome counts as a win for the player.
    pub const fn is_win(&self) -> bool {
        matches!(self, Outcome::AdversaryExhausted)
    }
}

/// An observable moment of a game.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnEvent {
    /// The adversary picked a shape, now queued as the next block.
    ShapeChosen(Shape),
    /// A player action was applied to the board.
    ActionApplied {
        /// The applied action.
        action: Action,
        /// Whether the falling block landed (or was discarded) during this action.
        landed: bool,
    },
    /// The game ended; this is the last event.
    GameOver(Outcome),
}

#[derive(Clone, Debug)]
enum Stage {
    Opening,
    Promote,
    RequestNext,
    CheckAlive,
    Player(VecDeque<Action>),
    Finished,
}

/// A running game, yielding [`TurnEvent`]s until it is over.
///
/// The iterator ends after [`TurnEvent::GameOver`] or after the first [`TurnError`].
pub struct Turns<'a, P: Player + ?Sized, A: Adversary + ?Sized> {
    board: SharedBoard,
    player: &'a mut P,
    adversary: &'a mut A,
    stage: Stage,
}

impl<'a, P: Player + ?Sized, A: Adversary + ?Sized> Turns<'a, P, A> {
    /// Prepares a game on `board`; nothing happens until the first event is requested.
    pub fn new(board: SharedBoard, player: &'a mut P, adversary: &'a mut A) -> Self {
        Self {
            board,
            player,
            adversary,
            stage: Stage::Opening,
        }
    }

    /// The board the game is played on.
    pub fn board(&self) -> &SharedBoard {
        &self.board
    }

    fn request_shape(&mut self, then: Stage) -> TurnEvent {
        let snapshot = self.board.snapshot();
        match self.adversary.choose_block(&snapshot) {
            Ok(shape) => {
                debug!(%shape, "adversary chose shape");
                self.board.lock().set_next(shape);
                self.stage = then;
                TurnEvent::ShapeChosen(shape)
            }
            Err(exhausted) => {
                debug!(handed_out = exhausted.handed_out, "game won");
                TurnEvent::GameOver(Outcome::AdversaryExhausted)
            }
        }
    }
}

impl<P: Player + ?Sized, A: Adversary + ?Sized> Iterator for Turns<'_, P, A> {
    type Item = Result<TurnEvent, TurnError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // Any early return below leaves the game finished.
            match std::mem::replace(&mut self.stage, Stage::Finished) {
                Stage::Opening => return Some(Ok(self.request_shape(Stage::Promote))),
                Stage::Promote => {
                    self.board.lock().place_next_block();
                    self.stage = Stage::RequestNext;
                }
                Stage::RequestNext => return Some(Ok(self.request_shape(Stage::CheckAlive))),
                Stage::CheckAlive => {
                    if !self.board.lock().is_alive() {
                        debug!("game lost");
                        return Some(Ok(TurnEvent::GameOver(Outcome::BoardFilled)));
                    }
                    self.stage = Stage::Player(VecDeque::new());
                }
                Stage::Player(mut pending) => {
                    if pending.is_empty() {
                        let snapshot = self.board.snapshot();
                        match self.player.choose_action(&snapshot) {
                            Ok(batch) => pending.extend(batch),
                            Err(e) => return Some(Err(e.into())),
                        }
                    }
                    let action = pending.pop_front().unwrap_or(Action::Skip);
                    let applied = self.board.lock().apply(action);
                    let landed = match applied {
                        Ok(landed) => landed,
                        Err(e) => return Some(Err(e.into())),
                    };
                    trace!(%action, landed, "action applied");
                    self.stage = if landed {
                        Stage::RequestNext
                    } else {
                        Stage::Player(pending)
                    };
                    return Some(Ok(TurnEvent::ActionApplied { action, landed }));
                }
                Stage::Finished => return None,
            }
        }
    }
}

impl<P: Player + ?Sized, A: Adversary + ?Sized> std::iter::FusedIterator for Turns<'_, P, A> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Board, Direction, NoActiveBlock, PlayerError, RandomAdversary, ScriptedAdversary,
        ScriptedPlayer,
    };

    fn run<P: Player, A: Adversary>(
        board: &SharedBoard,
        player: &mut P,
        adversary: &mut A,
    ) -> Vec<Result<TurnEvent, TurnError>> {
        board.turns(player, adversary).collect()
    }

    #[test]
    fn opening_requests_two_shapes_before_the_first_action() {
        let board = SharedBoard::new(Board::builder().build().unwrap());
        let mut player = ScriptedPlayer::new([Action::Move(Direction::Drop)]);
        let mut adversary = ScriptedAdversary::new([Shape::O, Shape::T]);
        let events = run(&board, &mut player, &mut adversary);
        assert_eq!(
            events,
            vec![
                Ok(TurnEvent::ShapeChosen(Shape::O)),
                Ok(TurnEvent::ShapeChosen(Shape::T)),
                Ok(TurnEvent::ActionApplied {
                    action: Action::Move(Direction::Drop),
                    landed: true
                }),
                Ok(TurnEvent::GameOver(Outcome::AdversaryExhausted)),
            ]
        );
        let board = board.lock();
        assert_eq!(board.falling().map(|b| b.shape()), Some(Shape::T));
        assert_eq!(board.grid().len(), 4);
    }

    #[test]
    fn empty_budget_ends_immediately_as_a_win() {
        let board = SharedBoard::new(Board::builder().build().unwrap());
        let mut player = ScriptedPlayer::default();
        let mut adversary = RandomAdversary::new(0, Some(0));
        let events = run(&board, &mut player, &mut adversary);
        assert_eq!(
            events,
            vec![Ok(TurnEvent::GameOver(Outcome::AdversaryExhausted))]
        );
    }

    #[test]
    fn empty_batches_skip() {
        let board = SharedBoard::new(Board::new(10, 4).unwrap());
        let mut player = ScriptedPlayer::default();
        let mut adversary = ScriptedAdversary::new([Shape::O, Shape::O]);
        let events: Vec<_> = run(&board, &mut player, &mut adversary)
            .into_iter()
            .map(Result::unwrap)
            .collect();
        // The O falls two rows, then rests on the floor.
        assert_eq!(
            &events[2..],
            &[
                TurnEvent::ActionApplied {
                    action: Action::Skip,
                    landed: false
                },
                TurnEvent::ActionApplied {
                    action: Action::Skip,
                    landed: false
                },
                TurnEvent::ActionApplied {
                    action: Action::Skip,
                    landed: true
                },
                TurnEvent::GameOver(Outcome::AdversaryExhausted),
            ]
        );
    }

    #[test]
    fn rest_of_batch_is_dropped_after_landing() {
        let board = SharedBoard::new(Board::builder().build().unwrap());
        let mut player = ScriptedPlayer::from_batches([vec![
            Action::Move(Direction::Drop),
            Action::Move(Direction::Left),
        ]]);
        let mut adversary = ScriptedAdversary::new([Shape::O, Shape::T, Shape::L]);
        let events = run(&board, &mut player, &mut adversary);
        assert_eq!(
            events[2..5],
            [
                Ok(TurnEvent::ActionApplied {
                    action: Action::Move(Direction::Drop),
                    landed: true
                }),
                Ok(TurnEvent::ShapeChosen(Shape::L)),
                // The script ran dry, so the T only falls.
                Ok(TurnEvent::ActionApplied {
                    action: Action::Skip,
                    landed: false
                }),
            ]
        );
        assert_eq!(player.remaining(), 0);
    }

    #[test]
    fn stacking_to_the_top_loses() {
        let board = SharedBoard::new(Board::new(4, 4).unwrap());
        let mut player = ScriptedPlayer::default();
        let mut adversary = ScriptedAdversary::new([Shape::O; 10]);
        let events = run(&board, &mut player, &mut adversary);
        assert_eq!(
            events.last(),
            Some(&Ok(TurnEvent::GameOver(Outcome::BoardFilled)))
        );
        assert!(!board.lock().is_alive());
        assert!(adversary.remaining() > 0);
    }

    struct Quitter;

    impl Player for Quitter {
        fn choose_action(&mut self, _board: &Board) -> Result<Vec<Action>, PlayerError> {
            Err(PlayerError::Aborted("input closed".to_owned()))
        }
    }

    #[test]
    fn player_errors_end_the_game() {
        let board = SharedBoard::new(Board::builder().build().unwrap());
        let mut adversary = ScriptedAdversary::new([Shape::S, Shape::Z]);
        let mut quitter = Quitter;
        let mut turns = board.turns(&mut quitter, &mut adversary);
        assert_eq!(turns.next(), Some(Ok(TurnEvent::ShapeChosen(Shape::S))));
        assert_eq!(turns.next(), Some(Ok(TurnEvent::ShapeChosen(Shape::Z))));
        assert_eq!(
            turns.next(),
            Some(Err(TurnError::Player(PlayerError::Aborted(
                "input closed".to_owned()
            ))))
        );
        assert_eq!(turns.next(), None);
        assert_eq!(turns.next(), None);
    }

    #[test]
    fn misuse_of_the_board_is_reported() {
        struct Meddler(SharedBoard);

        impl Player for Meddler {
            fn choose_action(&mut self, _board: &Board) -> Result<Vec<Action>, PlayerError> {
                // Throw the block away behind the coordinator's back.
                self.0.lock().discard().map_err(PlayerError::from)?;
                Ok(vec![Action::Skip])
            }
        }

        let board = SharedBoard::new(Board::builder().build().unwrap());
        let mut player = Meddler(board.clone());
        let mut adversary = ScriptedAdversary::new([Shape::J, Shape::L]);
        let events = run(&board, &mut player, &mut adversary);
        assert_eq!(events.last(), Some(&Err(TurnError::NoActiveBlock(NoActiveBlock))));
    }
}
