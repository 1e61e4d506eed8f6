use engine::{
    CanonicalKey, GameEngine, MoveOracle, OracleError, OracleOptions, OutcomeClassifier,
    ValidActions,
};
use log::info;
use value_table::{backward_update, PositionStore};

use super::{PlyReport, SelfPlayError, SelfPlayMetrics};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    NotStarted,
    InProgress,
    Finished,
}

/// Plays one game, backing up the value of every position it passes through.
///
/// The starting position is visited once before the first move. A failure of the oracle or the
/// table ends the game; records written up to that point stay in the table.
pub struct SelfPlayDriver<'a, 'e, E, O, S, A> {
    store: &'a mut PositionStore<'e, E>,
    oracle: &'a mut O,
    oracle_options: OracleOptions,
    game_state: S,
    state: DriverState,
    root: Option<PlyReport>,
    analysis: Vec<(A, PlyReport)>,
}

impl<'a, 'e, E, O, S, A> SelfPlayDriver<'a, 'e, E, O, S, A>
where
    E: GameEngine<State = S, Action = A>
        + ValidActions<State = S, Action = A>
        + CanonicalKey<State = S>
        + OutcomeClassifier<State = S>,
    O: MoveOracle<State = S, Action = A>,
    A: PartialEq,
{
    pub fn new(
        store: &'a mut PositionStore<'e, E>,
        oracle: &'a mut O,
        game_state: S,
        oracle_options: OracleOptions,
    ) -> Self {
        Self {
            store,
            oracle,
            oracle_options,
            game_state,
            state: DriverState::NotStarted,
            root: None,
            analysis: Vec::new(),
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn game_state(&self) -> &S {
        &self.game_state
    }

    /// Advances by one transition. Returns `None` once the game is finished.
    pub fn step(&mut self) -> Result<Option<PlyReport>, SelfPlayError> {
        let res = match self.state {
            DriverState::NotStarted => self.visit_root(),
            DriverState::InProgress => self.play_ply(),
            DriverState::Finished => return Ok(None),
        };

        match res {
            Ok(report) => {
                if self.is_terminal() {
                    self.state = DriverState::Finished;
                } else {
                    self.state = DriverState::InProgress;
                }

                Ok(Some(report))
            }
            Err(e) => {
                self.state = DriverState::Finished;
                Err(e)
            }
        }
    }

    /// Plays until the rules report the game over.
    pub fn play(mut self) -> Result<SelfPlayMetrics<A, E::Terminal>, SelfPlayError> {
        while self.step()?.is_some() {}

        let engine = self.store.engine();
        let aborted = || SelfPlayError::Aborted {
            key: engine.canonical_key(&self.game_state),
        };

        let score = engine.terminal_state(&self.game_state).ok_or_else(aborted)?;
        let root = self.root.take().ok_or_else(aborted)?;

        Ok(SelfPlayMetrics::new(root, self.analysis, score))
    }

    fn is_terminal(&self) -> bool {
        self.store
            .engine()
            .terminal_state(&self.game_state)
            .is_some()
    }

    fn visit_root(&mut self) -> Result<PlyReport, SelfPlayError> {
        let report = self.visit()?;
        self.root = Some(report.clone());
        Ok(report)
    }

    fn play_ply(&mut self) -> Result<PlyReport, SelfPlayError> {
        let engine = self.store.engine();
        let player = engine.player_to_move(&self.game_state);

        let action = self
            .oracle
            .choose_move(&self.game_state, player, &self.oracle_options)
            .and_then(|action| {
                if engine.valid_actions(&self.game_state).contains(&action) {
                    Ok(action)
                } else {
                    Err(OracleError::IllegalMove { player })
                }
            })
            .map_err(|source| SelfPlayError::Oracle {
                key: engine.canonical_key(&self.game_state),
                source,
            })?;

        self.game_state = engine.take_action(&self.game_state, &action);

        let report = self.visit()?;
        self.analysis.push((action, report.clone()));

        Ok(report)
    }

    /// Registers the current position and its children, then backs up its value.
    fn visit(&mut self) -> Result<PlyReport, SelfPlayError> {
        let engine = self.store.engine();
        let store_error = |source| SelfPlayError::Store {
            key: engine.canonical_key(&self.game_state),
            source,
        };

        let mut record = self
            .store
            .find_or_create(&self.game_state)
            .map_err(store_error)?;
        record.increment_visit_count();

        if !record.has_successors() {
            for action in engine.valid_actions(&self.game_state) {
                let child_state = engine.take_action(&self.game_state, &action);
                let child = self
                    .store
                    .find_or_create(&child_state)
                    .map_err(store_error)?;
                record.add_successor(child.key().clone());
            }
        }

        let backup = backward_update(&mut *self.store, &mut record).map_err(store_error)?;

        info!(
            "Position: {}, Value: {:.6}, Visits: {}",
            backup.key,
            backup.value,
            record.visit_count()
        );

        Ok(PlyReport {
            key: backup.key,
            value: backup.value,
            visit_count: record.visit_count(),
            reference: backup.reference,
            successors: record.successors().len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use chess::{ChessMove, Square};
    use chess_game::{Engine, GameResult, GameState};
    use engine::GameState as GameStateTrait;
    use value_table::{discount, learning_rate};

    struct ScriptedOracle {
        moves: Vec<ChessMove>,
    }

    impl MoveOracle for ScriptedOracle {
        type State = GameState;
        type Action = ChessMove;

        fn choose_move(
            &mut self,
            _game_state: &GameState,
            player: usize,
            _options: &OracleOptions,
        ) -> Result<ChessMove, OracleError> {
            if self.moves.is_empty() {
                return Err(OracleError::NoLegalMove { player });
            }

            Ok(self.moves.remove(0))
        }
    }

    struct UnavailableOracle;

    impl MoveOracle for UnavailableOracle {
        type State = GameState;
        type Action = ChessMove;

        fn choose_move(
            &mut self,
            _game_state: &GameState,
            _player: usize,
            _options: &OracleOptions,
        ) -> Result<ChessMove, OracleError> {
            Err(OracleError::Unavailable("engine not running".to_string()))
        }
    }

    fn back_rank() -> GameState {
        GameState::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap()
    }

    #[test]
    fn test_mate_in_one_backs_up_to_root() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new();
        let mut store = PositionStore::open(dir.path().join("Node.csv"), &engine).unwrap();
        let mut oracle = ScriptedOracle {
            moves: vec![ChessMove::new(Square::A1, Square::A8, None)],
        };
        let root_moves = back_rank().legal_moves().len();

        let driver = SelfPlayDriver::new(
            &mut store,
            &mut oracle,
            back_rank(),
            OracleOptions::default(),
        );
        let metrics = driver.play().unwrap();

        assert_eq!(*metrics.score(), GameResult::WhiteWins);
        assert_eq!(metrics.analysis().len(), 1);
        assert_eq!(metrics.root().successors, root_moves);
        assert_eq!(metrics.root().reference, 1.0);
        assert_approx_eq!(
            metrics.root().value,
            learning_rate(2) * discount(1),
            1e-12
        );

        let (_, mate) = &metrics.analysis()[0];
        assert_eq!(mate.key.as_str(), "R5k1/5ppp/8/8/8/8/8/6K1 b");
        assert_eq!(mate.successors, 0);
        assert_eq!(mate.visit_count, 2);

        assert_eq!(store.len().unwrap(), 1 + root_moves);
    }

    #[test]
    fn test_step_walks_the_state_machine() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new();
        let mut store = PositionStore::open(dir.path().join("Node.csv"), &engine).unwrap();
        let mut oracle = ScriptedOracle {
            moves: vec![ChessMove::new(Square::A1, Square::A8, None)],
        };

        let mut driver = SelfPlayDriver::new(
            &mut store,
            &mut oracle,
            back_rank(),
            OracleOptions::default(),
        );
        assert_eq!(driver.state(), DriverState::NotStarted);

        let root = driver.step().unwrap().unwrap();
        assert_eq!(driver.state(), DriverState::InProgress);
        assert_eq!(root.key.as_str(), "6k1/5ppp/8/8/8/8/8/R5K1 w");

        driver.step().unwrap().unwrap();
        assert_eq!(driver.state(), DriverState::Finished);

        assert!(driver.step().unwrap().is_none());
        assert_eq!(driver.state(), DriverState::Finished);
    }

    #[test]
    fn test_finished_driver_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Node.csv");
        let engine = Engine::new();
        let mut store = PositionStore::open(&path, &engine).unwrap();
        let mut oracle = ScriptedOracle { moves: vec![] };
        let mated = GameState::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 1 1").unwrap();

        let mut driver =
            SelfPlayDriver::new(&mut store, &mut oracle, mated, OracleOptions::default());
        driver.step().unwrap().unwrap();
        assert_eq!(driver.state(), DriverState::Finished);

        let before = std::fs::read_to_string(&path).unwrap();
        assert!(driver.step().unwrap().is_none());
        let after = std::fs::read_to_string(&path).unwrap();

        assert_eq!(before, after);
    }

    #[test]
    fn test_oracle_failure_ends_the_game() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new();
        let mut store = PositionStore::open(dir.path().join("Node.csv"), &engine).unwrap();
        let mut oracle = UnavailableOracle;

        let driver = SelfPlayDriver::new(
            &mut store,
            &mut oracle,
            GameState::initial(),
            OracleOptions::default(),
        );
        let err = driver.play().unwrap_err();

        match err {
            SelfPlayError::Oracle { key, source } => {
                assert_eq!(key.as_str(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w");
                assert!(matches!(source, OracleError::Unavailable(_)));
            }
            other => panic!("unexpected error {:?}", other),
        }

        let table = store.load().unwrap();
        assert_eq!(table.len(), 21);
        assert_eq!(
            table["rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w"].visit_count(),
            2
        );
    }

    #[test]
    fn test_revisit_does_not_expand_again() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new();
        let mut store = PositionStore::open(dir.path().join("Node.csv"), &engine).unwrap();

        for _ in 0..2 {
            let mut oracle = UnavailableOracle;
            let mut driver = SelfPlayDriver::new(
                &mut store,
                &mut oracle,
                GameState::initial(),
                OracleOptions::default(),
            );
            driver.step().unwrap();
        }

        let root = store
            .get(&"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w".into())
            .unwrap()
            .unwrap();
        assert_eq!(root.visit_count(), 3);
        assert_eq!(root.successors().len(), 20);
        assert_eq!(store.len().unwrap(), 21);
    }

    #[test]
    fn test_illegal_oracle_move_ends_the_game() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new();
        let mut store = PositionStore::open(dir.path().join("Node.csv"), &engine).unwrap();
        let mut oracle = ScriptedOracle {
            moves: vec![ChessMove::new(Square::A1, Square::H8, None)],
        };

        let mut driver = SelfPlayDriver::new(
            &mut store,
            &mut oracle,
            back_rank(),
            OracleOptions::default(),
        );
        driver.step().unwrap();
        let err = driver.step().unwrap_err();

        assert!(matches!(
            err,
            SelfPlayError::Oracle {
                source: OracleError::IllegalMove { player: 1 },
                ..
            }
        ));
        assert_eq!(driver.state(), DriverState::Finished);
        assert_eq!(
            driver.game_state().placement_and_side(),
            "6k1/5ppp/8/8/8/8/8/R5K1 w"
        );
    }
}
