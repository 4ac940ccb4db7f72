use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize, de::Error as _};

use crate::{Classifier, MlErr, Result, forest::RandomForest};

/// Every kind of model a worker can produce.
///
/// This is the type behind an artifact's opaque payload: workers serialize
/// it with `to_bytes`, the parameter server and inference node bring it back
/// with `from_bytes` and only ever use it through `Classifier`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Model {
    RandomForest(RandomForest),
}

impl Model {
    /// Serializes the model into an opaque payload.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(MlErr::Encode)
    }

    /// Restores a model from an opaque payload.
    ///
    /// # Returns
    /// The model, or `MlErr::Decode` if the payload isn't one or describes
    /// a model that can't be used for prediction.
    pub fn from_bytes(payload: &[u8]) -> Result<Self> {
        let model: Self = serde_json::from_slice(payload).map_err(MlErr::Decode)?;

        let checked = match &model {
            Model::RandomForest(m) => m.validate(),
        };
        checked.map_err(|e| MlErr::Decode(serde_json::Error::custom(e)))?;

        Ok(model)
    }
}

impl From<RandomForest> for Model {
    fn from(value: RandomForest) -> Self {
        Self::RandomForest(value)
    }
}

impl Classifier for Model {
    fn classes(&self) -> &[i64] {
        match self {
            Model::RandomForest(m) => m.classes(),
        }
    }

    fn n_features(&self) -> usize {
        match self {
            Model::RandomForest(m) => m.n_features(),
        }
    }

    fn predict_proba(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        match self {
            Model::RandomForest(m) => m.predict_proba(x),
        }
    }
}
