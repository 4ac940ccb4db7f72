use std::collections::BTreeSet;

/// Maps textual categories to small integers.
///
/// Codes follow the sorted order of the distinct categories, so the same
/// set of categories always gets the same codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Learns the categories of `values` and encodes them.
    ///
    /// # Returns
    /// The encoder and the code of every value, in input order.
    pub fn fit_transform(values: &[&str]) -> (Self, Vec<i64>) {
        let classes: Vec<String> = values
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let encoder = Self { classes };
        let codes = values
            .iter()
            .map(|v| encoder.code(v).unwrap_or_default())
            .collect();

        (encoder, codes)
    }

    /// The learned categories; a category's code is its index.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn code(&self, value: &str) -> Option<i64> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
            .map(|i| i as i64)
    }

    pub fn into_classes(self) -> Vec<String> {
        self.classes
    }
}
