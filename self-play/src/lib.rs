pub mod driver;
pub mod error;
pub mod options;
pub mod random_oracle;
pub mod self_play;
pub mod self_play_metrics;

pub use driver::*;
pub use error::*;
pub use options::*;
pub use random_oracle::*;
pub use self_play::*;
pub use self_play_metrics::*;
