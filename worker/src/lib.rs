pub mod bootstrap;
pub mod config;
mod error;
pub mod service;
mod sink;
mod worker;

pub use config::Config;
pub use error::{Result, WorkerErr};
pub use service::router;
pub use sink::{HttpModelSink, ModelSink};
pub use worker::{Delivery, Worker};
