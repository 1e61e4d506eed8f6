use std::time::Duration;

use thiserror::Error;

#[derive(Clone, Debug, Default)]
pub struct OracleOptions {
    /// Thinking budget handed through to the oracle. The oracle alone enforces it.
    pub move_time: Option<Duration>,
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("no legal move available for player {player}")]
    NoLegalMove { player: usize },
    #[error("move oracle chose an illegal move for player {player}")]
    IllegalMove { player: usize },
    #[error("move oracle unavailable: {0}")]
    Unavailable(String),
}

/// An external source of moves, treated as a black box.
pub trait MoveOracle {
    type State;
    type Action;

    fn choose_move(
        &mut self,
        game_state: &Self::State,
        player: usize,
        options: &OracleOptions,
    ) -> Result<Self::Action, OracleError>;
}
