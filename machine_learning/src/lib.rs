pub mod dataset;
pub mod error;
pub mod forest;
mod learner;
mod model;

pub use error::{MlErr, Result};
pub use learner::{Classifier, Learner};
pub use model::Model;
