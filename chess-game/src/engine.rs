use chess::{ChessMove, Color};
use engine::{
    CanonicalKey, GameEngine, Outcome, OutcomeClassifier, PositionKey, ValidActions,
};

use super::{GameResult, GameState};

/// Chess rules as seen by the value table.
///
/// Keys are the first two FEN fields, so castling rights, the en passant square and the move
/// clocks do not separate positions.
#[derive(Default)]
pub struct Engine {}

impl Engine {
    pub fn new() -> Self {
        Self {}
    }
}

fn player_for_color(color: Color) -> usize {
    match color {
        Color::White => 1,
        Color::Black => 2,
    }
}

impl GameEngine for Engine {
    type Action = ChessMove;
    type State = GameState;
    type Terminal = GameResult;

    fn take_action(&self, game_state: &Self::State, action: &Self::Action) -> Self::State {
        game_state.make_move(*action)
    }

    fn player_to_move(&self, game_state: &Self::State) -> usize {
        player_for_color(game_state.side_to_move())
    }

    fn move_number(&self, game_state: &Self::State) -> usize {
        game_state.fullmove_number() as usize
    }

    fn terminal_state(&self, game_state: &Self::State) -> Option<Self::Terminal> {
        game_state.result()
    }
}

impl ValidActions for Engine {
    type State = GameState;
    type Action = ChessMove;

    fn valid_actions(&self, game_state: &Self::State) -> Vec<Self::Action> {
        game_state.legal_moves()
    }
}

impl CanonicalKey for Engine {
    type State = GameState;

    fn canonical_key(&self, game_state: &Self::State) -> PositionKey {
        PositionKey::new(game_state.placement_and_side())
    }

    fn player_for_key(&self, key: &PositionKey) -> Option<usize> {
        match key.as_str().rsplit(' ').next() {
            Some("w") => Some(1),
            Some("b") => Some(2),
            _ => None,
        }
    }
}

impl OutcomeClassifier for Engine {
    type State = GameState;

    fn outcome(&self, game_state: &Self::State) -> Outcome {
        if !game_state.is_checkmate() {
            return Outcome::Undecided;
        }

        match game_state.side_to_move() {
            Color::Black => Outcome::FirstPlayerWins,
            Color::White => Outcome::SecondPlayerWins,
        }
    }
}
