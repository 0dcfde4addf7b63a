use std::io::Write;

use anyhow::Context;
use blockfall_engine::{Adversary, Outcome, Player, SharedBoard, TurnEvent};
use serde::Serialize;

/// What is left of a finished game.
#[derive(PartialEq, Eq, Clone, Debug, Serialize)]
pub struct SessionSummary {
    pub seed: Option<u64>,
    pub outcome: Outcome,
    pub won: bool,
    pub score: u32,
    pub lines_cleared: u32,
    pub blocks_landed: u32,
    pub bombs_remaining: u32,
    pub discards_remaining: u32,
    pub actions: u32,
}

impl SessionSummary {
    fn new(board: &SharedBoard, seed: Option<u64>, outcome: Outcome, actions: u32) -> Self {
        let board = board.lock();
        Self {
            seed,
            outcome,
            won: outcome.is_win(),
            score: board.score(),
            lines_cleared: board.lines_cleared(),
            blocks_landed: board.blocks_landed(),
            bombs_remaining: board.bombs_remaining(),
            discards_remaining: board.discards_remaining(),
            actions,
        }
    }
}

/// Plays one game to its end, writing every shape and action as a word to `out` unless `quiet`.
pub fn play<P, A, W>(
    board: &SharedBoard,
    player: &mut P,
    adversary: &mut A,
    seed: Option<u64>,
    out: &mut W,
    quiet: bool,
) -> anyhow::Result<SessionSummary>
where
    P: Player + ?Sized,
    A: Adversary + ?Sized,
    W: Write,
{
    let mut actions = 0;
    let mut turns = board.turns(player, adversary);
    while let Some(event) = turns.next() {
        let event = event.with_context(|| format!("game aborted after {actions} actions"))?;
        match event {
            TurnEvent::ShapeChosen(shape) => {
                if !quiet {
                    writeln!(out, "{shape}")?;
                }
            }
            TurnEvent::ActionApplied { action, .. } => {
                actions += 1;
                if !quiet {
                    writeln!(out, "{action}")?;
                }
            }
            TurnEvent::GameOver(outcome) => {
                tracing::info!(?outcome, actions, "game over");
                return Ok(SessionSummary::new(turns.board(), seed, outcome, actions));
            }
        }
    }
    anyhow::bail!("game ended without an outcome")
}
