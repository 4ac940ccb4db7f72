pub mod config;
pub mod service;
pub mod storage;

pub use config::Config;
pub use service::router;
pub use storage::ModelPool;
