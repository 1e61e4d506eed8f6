pub mod engine;
pub mod game_state;
pub mod oracle;
pub mod position_key;
pub mod value;

pub use crate::engine::*;
pub use crate::game_state::*;
pub use crate::oracle::*;
pub use crate::position_key::*;
pub use crate::value::*;
