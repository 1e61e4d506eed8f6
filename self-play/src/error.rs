use engine::{OracleError, PositionKey};
use thiserror::Error;
use value_table::ValueTableError;

#[derive(Debug, Error)]
pub enum SelfPlayError {
    #[error("move oracle failed at {key}")]
    Oracle {
        key: PositionKey,
        #[source]
        source: OracleError,
    },
    #[error("position table failed at {key}")]
    Store {
        key: PositionKey,
        #[source]
        source: ValueTableError,
    },
    #[error("game stopped at {key} before reaching a terminal position")]
    Aborted { key: PositionKey },
}
