mod cli;

use anyhow::{anyhow, Context, Result};
use chess_game::{Engine, GameState};
use clap::Parser;
use cli::{Cli, Commands};
use common::{get_env_usize, ConfigLoader, FsExt};
use dotenv::dotenv;
use engine::GameState as GameStateTrait;
use env_logger::Env;
use log::info;
use self_play::{play_self, RandomOracle, SelfPlayOptions};
use std::path::Path;
use value_table::PositionStore;

fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::SelfPlay(self_play_args) => {
            let config_path = self_play_args.config.relative_to_cwd()?;
            let config = ConfigLoader::new(config_path, "self_play".to_string())?;

            let mut self_play_options: SelfPlayOptions = config.load()?;

            if let Some(number_of_games) = get_env_usize("SELF_PLAY_GAMES")? {
                self_play_options.number_of_games = number_of_games;
            }

            let table_path = self_play_options.table_path.relative_to_cwd()?;
            assert_parent_dir_exists(&table_path)?;

            let initial_state = match config.get("start_fen").and_then(|v| v.as_string()) {
                Some(fen) => GameState::from_fen(&fen)?,
                None => GameState::initial(),
            };

            info!("{:?}", self_play_options);

            let engine = Engine::new();
            let mut store = PositionStore::open(&table_path, &engine)
                .with_context(|| format!("Failed to open position table {:?}", table_path))?;
            let mut oracle = RandomOracle::new(&engine, self_play_options.seed);

            let games_played = play_self(
                &mut store,
                &mut oracle,
                || initial_state.clone(),
                &self_play_options,
            )?;

            info!("Played {} games into {:?}", games_played, table_path);
        }
        Commands::Inspect(inspect_args) => {
            let config_path = inspect_args.config.relative_to_cwd()?;
            let config = ConfigLoader::new(config_path, "self_play".to_string())?;

            let self_play_options: SelfPlayOptions = config.load()?;
            let table_path = self_play_options.table_path.relative_to_cwd()?;
            if !table_path.is_file() {
                return Err(anyhow!("{:?} is not a position table", table_path));
            }

            inspect(&table_path, inspect_args.top)?;
        }
    }

    Ok(())
}

fn inspect(table_path: &Path, top: usize) -> Result<()> {
    let engine = Engine::new();
    let store = PositionStore::open(table_path, &engine)?;
    let table = store.load()?;

    let decisive = table.values().filter(|r| r.is_decisive()).count();
    info!(
        "Positions: {}, Decisive: {}, Table: {:?}",
        table.len(),
        decisive,
        table_path
    );

    let mut by_visits = table.values().collect::<Vec<_>>();
    by_visits.sort_by(|a, b| b.visit_count().cmp(&a.visit_count()));

    for record in by_visits.into_iter().take(top) {
        info!(
            "Position: {}, Value: {:.6}, Visits: {}, Successors: {}",
            record.key(),
            record.value(),
            record.visit_count(),
            record.successors().len()
        );
    }

    Ok(())
}

fn assert_parent_dir_exists<P: AsRef<Path>>(path: P) -> Result<()> {
    match path.as_ref().parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.is_dir() => {
            Err(anyhow!("{:?} is not a valid directory", dir))
        }
        _ => Ok(()),
    }
}
