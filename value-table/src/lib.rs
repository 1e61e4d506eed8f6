pub mod backward_update;
pub mod error;
pub mod record;
pub mod schedule;
pub mod store;

mod row;

pub use backward_update::*;
pub use error::*;
pub use record::*;
pub use schedule::*;
pub use store::*;
