//! Turns an uploaded table into a training dataset.

mod labels;
mod table;

use log::info;

pub use labels::LabelEncoder;
pub use table::Table;

use crate::{IngestErr, Result};

/// Features and labels built from one upload.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// One row per sample, one column per entry of `columns_used`.
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<i64>,
    pub columns_used: Vec<String>,
    /// The categories behind the labels, if the target was textual.
    pub classes: Option<Vec<String>>,
}

impl Dataset {
    /// Builds the dataset for `target` out of a parsed table.
    ///
    /// Features are every other column whose present cells are all numbers,
    /// with missing cells set to 0; other columns are left out. A textual
    /// target is label encoded, a numeric one has missing cells set to 0 and
    /// is truncated to integers.
    ///
    /// # Arguments
    /// * `table` - The parsed upload.
    /// * `target` - The name of the label column.
    ///
    /// # Errors
    /// Returns `IngestErr::TargetColumnNotFound` if there's no such column,
    /// or `IngestErr::Parse` if it has no value at all.
    pub fn from_table(table: &Table, target: &str) -> Result<Self> {
        let target = target.trim();
        let target_idx = table
            .position(target)
            .ok_or_else(|| IngestErr::TargetColumnNotFound {
                target: target.to_string(),
                available: table.columns.clone(),
            })?;

        let mut columns_used = Vec::new();
        let mut numeric = Vec::new();
        for (idx, name) in table.columns.iter().enumerate() {
            if idx == target_idx {
                continue;
            }
            if let Some(column) = table.numeric_column(idx) {
                columns_used.push(name.clone());
                numeric.push(column);
            }
        }

        let features = (0..table.rows.len())
            .map(|row| numeric.iter().map(|col| col[row].unwrap_or(0.0)).collect())
            .collect();

        let (labels, classes) = match table.numeric_column(target_idx) {
            Some(column) => {
                if column.iter().all(Option::is_none) {
                    return Err(IngestErr::Parse(format!("target column '{target}' has no values")));
                }
                let labels = column.into_iter().map(|v| v.unwrap_or(0.0) as i64).collect();
                (labels, None)
            }
            None => {
                let (encoder, labels) = LabelEncoder::fit_transform(&table.text_column(target_idx));
                info!(target = target, classes = encoder.classes().len(); "encoded textual target");
                (labels, Some(encoder.into_classes()))
            }
        };

        Ok(Self {
            features,
            labels,
            columns_used,
            classes,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
