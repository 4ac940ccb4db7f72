mod error;
mod pool;

pub use error::{PoolErr, Result};
pub use pool::ModelPool;
