//! Request and response bodies of every HTTP route in the system.
//!
//! Field names are part of the public contract and must not change.

pub mod coordinator;
pub mod inference;
pub mod server;
pub mod worker;
