pub mod config;
mod coordinator;
pub mod dispatch;
mod error;
pub mod ingest;
pub mod partition;
pub mod registry;
pub mod service;

pub use config::Config;
pub use coordinator::Coordinator;
pub use error::{IngestErr, Result};
pub use service::router;
