use comms::{RoundToken, codec::Artifact};
use log::{info, warn};
use machine_learning::Model;
use parking_lot::Mutex;

use super::{PoolErr, Result};

#[derive(Debug, Default)]
struct PoolState {
    round: RoundToken,
    artifacts: Vec<Artifact>,
}

/// The pool of trained model artifacts of the current round.
///
/// All mutations go through one lock, so `push`, `fetch_all` and `reset`
/// are atomic with respect to each other. A push tagged with a round other
/// than the current one is refused, which keeps models trained on a
/// previous upload out of a freshly reset pool.
#[derive(Debug, Default)]
pub struct ModelPool {
    state: Mutex<PoolState>,
}

impl ModelPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an artifact to the pool.
    ///
    /// # Arguments
    /// * `artifact` - The artifact to store.
    /// * `round` - The round the artifact was trained for. `None` is taken
    ///   as the current round.
    ///
    /// # Returns
    /// The amount of artifacts in the pool after the push, or a `PoolErr`
    /// if the payload isn't a model or the round is stale.
    pub fn push(&self, artifact: Artifact, round: Option<RoundToken>) -> Result<usize> {
        if let Err(e) = Model::from_bytes(&artifact.payload) {
            warn!(producer = artifact.producer.as_str(); "rejected undecodable model: {e}");
            return Err(PoolErr::Decode(e.to_string()));
        }

        let mut state = self.state.lock();
        let current = state.round;

        if let Some(got) = round.filter(|&r| r != current) {
            warn!(producer = artifact.producer.as_str(); "rejected model from round {got}, current is {current}");
            return Err(PoolErr::StaleRound { got, current });
        }

        let producer = artifact.producer.clone();
        state.artifacts.push(artifact);
        let total = state.artifacts.len();
        info!(producer = producer.as_str(), total = total; "model accepted into round {current}");
        Ok(total)
    }

    /// Takes a snapshot of the pool.
    ///
    /// # Returns
    /// Every stored artifact and the round they belong to.
    pub fn fetch_all(&self) -> (Vec<Artifact>, RoundToken) {
        let state = self.state.lock();
        (state.artifacts.clone(), state.round)
    }

    /// Empties the pool and opens a new round.
    ///
    /// # Arguments
    /// * `round` - The round to open. `None`, or a round that isn't ahead of
    ///   the current one, opens the round following the current one.
    ///
    /// # Returns
    /// How many artifacts were removed and the now current round.
    pub fn reset(&self, round: Option<RoundToken>) -> (usize, RoundToken) {
        let mut state = self.state.lock();
        let deleted = state.artifacts.len();
        state.artifacts.clear();
        let next = match round {
            Some(r) if r > state.round => r,
            _ => state.round.next(),
        };
        state.round = next;

        info!(deleted = deleted; "pool cleared, round {} is open", state.round);
        (deleted, state.round)
    }

    pub fn round(&self) -> RoundToken {
        self.state.lock().round
    }

    pub fn len(&self) -> usize {
        self.state.lock().artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
