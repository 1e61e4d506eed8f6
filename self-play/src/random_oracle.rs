use engine::{MoveOracle, OracleError, OracleOptions, ValidActions};
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};

/// Picks uniformly among the legal moves.
pub struct RandomOracle<'e, E, R> {
    engine: &'e E,
    rng: R,
}

impl<'e, E> RandomOracle<'e, E, StdRng> {
    /// Seeded oracles replay the same games for the same table.
    pub fn new(engine: &'e E, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self { engine, rng }
    }
}

impl<'e, E, R> RandomOracle<'e, E, R> {
    pub fn with_rng(engine: &'e E, rng: R) -> Self {
        Self { engine, rng }
    }
}

impl<'e, E, R> MoveOracle for RandomOracle<'e, E, R>
where
    E: ValidActions,
    R: Rng,
{
    type State = E::State;
    type Action = E::Action;

    fn choose_move(
        &mut self,
        game_state: &Self::State,
        player: usize,
        _options: &OracleOptions,
    ) -> Result<Self::Action, OracleError> {
        self.engine
            .valid_actions(game_state)
            .into_iter()
            .choose(&mut self.rng)
            .ok_or(OracleError::NoLegalMove { player })
    }
}
