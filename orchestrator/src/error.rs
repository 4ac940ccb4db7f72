use std::{error::Error, fmt};

/// The orchestrator module's result type.
pub type Result<T> = std::result::Result<T, IngestErr>;

/// Reasons an uploaded dataset can't start a training round.
#[derive(Debug)]
pub enum IngestErr {
    /// No worker has registered yet.
    NoWorkersAvailable,
    /// The upload isn't a usable table.
    Parse(String),
    /// The requested target column doesn't exist.
    TargetColumnNotFound {
        target: String,
        available: Vec<String>,
    },
}

impl fmt::Display for IngestErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestErr::NoWorkersAvailable => write!(f, "No workers available"),
            IngestErr::Parse(reason) => write!(f, "Failed to parse table: {reason}"),
            IngestErr::TargetColumnNotFound { target, available } => write!(
                f,
                "Target column '{target}' not found. Available columns: {}",
                available.join(", ")
            ),
        }
    }
}

impl Error for IngestErr {}

impl From<csv::Error> for IngestErr {
    fn from(value: csv::Error) -> Self {
        Self::Parse(value.to_string())
    }
}
