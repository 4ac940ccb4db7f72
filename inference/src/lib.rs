pub mod config;
mod error;
mod node;
pub mod service;
mod source;
pub mod voting;

pub use config::Config;
pub use error::{Result, VoteErr};
pub use node::InferenceNode;
pub use service::router;
pub use source::{HttpModelSource, ModelSource};
