use std::{error::Error, fmt};

use machine_learning::MlErr;

/// The worker module's result type.
pub type Result<T> = std::result::Result<T, WorkerErr>;

/// Failures that make a training request unanswerable.
///
/// Failing to deliver the fitted model is not one of them.
#[derive(Debug)]
pub enum WorkerErr {
    Ml(MlErr),
    TrainingAborted(String),
}

impl fmt::Display for WorkerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerErr::Ml(e) => write!(f, "training failed: {e}"),
            WorkerErr::TrainingAborted(reason) => write!(f, "training task aborted: {reason}"),
        }
    }
}

impl Error for WorkerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorkerErr::Ml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MlErr> for WorkerErr {
    fn from(value: MlErr) -> Self {
        Self::Ml(value)
    }
}
