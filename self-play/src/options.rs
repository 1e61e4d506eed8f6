use std::time::Duration;

use anyhow::Result;
use common::Config;
use engine::OracleOptions;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SelfPlayOptions {
    pub table_path: String,
    pub number_of_games: usize,
    pub move_time_ms: u64,
    pub seed: Option<u64>,
}

impl SelfPlayOptions {
    pub fn oracle_options(&self) -> OracleOptions {
        OracleOptions {
            move_time: Some(Duration::from_millis(self.move_time_ms)),
        }
    }
}

impl Default for SelfPlayOptions {
    fn default() -> Self {
        Self {
            table_path: "Node.csv".to_string(),
            number_of_games: 1,
            move_time_ms: 0,
            seed: None,
        }
    }
}

impl Config for SelfPlayOptions {
    fn load(config: &common::ConfigLoader) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            table_path: config
                .get("table_path")
                .and_then(|v| v.as_string())
                .unwrap_or(defaults.table_path),
            number_of_games: config
                .get("number_of_games")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.number_of_games),
            move_time_ms: config
                .get("move_time_ms")
                .and_then(|v| v.as_u64())
                .unwrap_or(defaults.move_time_ms),
            seed: config.get("seed").and_then(|v| v.as_u64()),
        })
    }
}
