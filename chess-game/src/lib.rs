pub mod engine;
pub mod game_result;
pub mod game_state;

pub use engine::*;
pub use game_result::*;
pub use game_state::*;

pub use chess::ChessMove as Action;
