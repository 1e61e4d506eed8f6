use std::fmt::Display;
use std::time::Instant;

use engine::{
    CanonicalKey, GameEngine, MoveOracle, OracleOptions, OutcomeClassifier, ValidActions,
};
use log::info;
use value_table::PositionStore;

use super::{SelfPlayDriver, SelfPlayError, SelfPlayOptions};

/// Plays `number_of_games` games one after another against the same table.
///
/// Returns the number of games played. The first failed game stops the run.
pub fn play_self<E, O, S, A, F>(
    store: &mut PositionStore<'_, E>,
    oracle: &mut O,
    initial_state: F,
    options: &SelfPlayOptions,
) -> Result<usize, SelfPlayError>
where
    E: GameEngine<State = S, Action = A>
        + ValidActions<State = S, Action = A>
        + CanonicalKey<State = S>
        + OutcomeClassifier<State = S>,
    E::Terminal: Display,
    O: MoveOracle<State = S, Action = A>,
    A: PartialEq,
    F: Fn() -> S,
{
    let starting_run_time = Instant::now();
    let oracle_options: OracleOptions = options.oracle_options();
    let mut num_of_games_played: usize = 0;

    for _ in 0..options.number_of_games {
        let driver = SelfPlayDriver::new(
            &mut *store,
            &mut *oracle,
            initial_state(),
            oracle_options.clone(),
        );
        let metrics = driver.play()?;
        num_of_games_played += 1;

        let table_size = store.len().map_err(|source| SelfPlayError::Store {
            key: metrics.root().key.clone(),
            source,
        })?;

        info!(
            "Game: {}, Number of Actions: {}, Result: {}, Root Value: {:.6}, Positions: {}, Elapsed: {:.2}h, GPM: {:.2}",
            num_of_games_played,
            metrics.analysis().len(),
            metrics.score(),
            metrics.root().value,
            table_size,
            starting_run_time.elapsed().as_secs() as f32 / (60 * 60) as f32,
            num_of_games_played as f32 / starting_run_time.elapsed().as_secs_f32().max(f32::EPSILON) * 60_f32
        );
    }

    Ok(num_of_games_played)
}
