use std::{
    error::Error,
    fmt::{self, Display},
};

use comms::RoundToken;

/// The specific result type of the model pool.
pub type Result<T> = std::result::Result<T, PoolErr>;

/// Reasons an artifact is refused by the pool.
#[derive(Debug)]
pub enum PoolErr {
    /// The payload can't be turned back into a usable model.
    Decode(String),
    /// The artifact was trained for a round that is no longer current.
    StaleRound {
        got: RoundToken,
        current: RoundToken,
    },
}

impl Display for PoolErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolErr::Decode(reason) => write!(f, "failed to decode model: {reason}"),
            PoolErr::StaleRound { got, current } => {
                write!(f, "stale model from round {got}, current round is {current}")
            }
        }
    }
}

impl Error for PoolErr {}
