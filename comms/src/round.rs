use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one training round.
///
/// Tokens only ever grow. A model artifact is tagged with the token of the
/// round its shard was dispatched in, and the parameter server refuses
/// artifacts whose token is not the pool's current one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundToken(u64);

impl RoundToken {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the token that follows this one.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RoundToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_is_strictly_greater() {
        let token = RoundToken::new(7);
        assert!(token.next() > token);
        assert_eq!(token.next().get(), 8);
    }

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&RoundToken::new(3)).unwrap();
        assert_eq!(json, "3");
    }
}
