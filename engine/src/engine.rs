use super::position_key::PositionKey;
use super::value::Outcome;

/// Players are numbered from 1; player 1 moves first.
pub trait GameEngine {
    type Action;
    type State;
    type Terminal;

    fn take_action(&self, game_state: &Self::State, action: &Self::Action) -> Self::State;
    fn player_to_move(&self, game_state: &Self::State) -> usize;
    fn move_number(&self, game_state: &Self::State) -> usize;
    fn terminal_state(&self, game_state: &Self::State) -> Option<Self::Terminal>;
}

pub trait ValidActions {
    type State;
    type Action;

    fn valid_actions(&self, game_state: &Self::State) -> Vec<Self::Action>;
}

/// Maps a state onto the key its learned values are stored under.
///
/// States that only differ in details the key leaves out share one key.
pub trait CanonicalKey {
    type State;

    fn canonical_key(&self, game_state: &Self::State) -> PositionKey;

    /// Recovers the player to move from a key alone, when the key encodes it.
    fn player_for_key(&self, key: &PositionKey) -> Option<usize>;
}

pub trait OutcomeClassifier {
    type State;

    fn outcome(&self, game_state: &Self::State) -> Outcome;
}
