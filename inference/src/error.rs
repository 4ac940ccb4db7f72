use std::{error::Error, fmt};

use comms::{CodecErr, PeerErr};
use machine_learning::MlErr;

/// The inference module's result type.
pub type Result<T> = std::result::Result<T, VoteErr>;

/// Reasons an accuracy check yields no verdict.
#[derive(Debug)]
pub enum VoteErr {
    NoModels,
    FeaturesEmpty,
    /// Every model in the pool was skipped.
    NoValidModels,
    TargetsMismatch {
        rows: usize,
        targets: usize,
    },
    FeatureWidth {
        got: usize,
        expected: usize,
    },
    Ml(MlErr),
    Fetch(PeerErr),
    Bundle(CodecErr),
    Aborted(String),
}

impl fmt::Display for VoteErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteErr::NoModels => f.write_str("No models available"),
            VoteErr::FeaturesEmpty => f.write_str("Features are empty"),
            VoteErr::NoValidModels => {
                f.write_str("No valid models to vote (class count mismatch)")
            }
            VoteErr::TargetsMismatch { rows, targets } => {
                write!(f, "Got {targets} targets for {rows} feature rows")
            }
            VoteErr::FeatureWidth { got, expected } => {
                write!(f, "Features have {got} columns, models expect {expected}")
            }
            VoteErr::Ml(e) => write!(f, "Invalid features: {e}"),
            VoteErr::Fetch(e) => write!(f, "Parameter server unavailable: {e}"),
            VoteErr::Bundle(e) => write!(f, "Model pool is malformed: {e}"),
            VoteErr::Aborted(reason) => write!(f, "Voting task aborted: {reason}"),
        }
    }
}

impl Error for VoteErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            VoteErr::Ml(e) => Some(e),
            VoteErr::Fetch(e) => Some(e),
            VoteErr::Bundle(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MlErr> for VoteErr {
    fn from(value: MlErr) -> Self {
        Self::Ml(value)
    }
}

impl From<PeerErr> for VoteErr {
    fn from(value: PeerErr) -> Self {
        Self::Fetch(value)
    }
}

impl From<CodecErr> for VoteErr {
    fn from(value: CodecErr) -> Self {
        Self::Bundle(value)
    }
}
