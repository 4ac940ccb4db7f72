mod client;
pub mod codec;
pub mod env;
mod error;
mod round;
pub mod specs;

pub use client::{CallOutcome, PeerClient};
pub use error::{CodecErr, PeerErr};
pub use round::RoundToken;
