use ndarray::Array2;

use crate::{MlErr, Result};

/// Builds a feature matrix out of row-major nested vectors.
///
/// # Arguments
/// * `rows` - The rows, all of the same width.
///
/// # Returns
/// A `(rows.len(), width)` matrix or a size mismatch error for ragged input.
pub fn matrix_from_rows(rows: &[Vec<f64>]) -> Result<Array2<f64>> {
    let width = rows.first().map_or(0, Vec::len);
    let mut data = Vec::with_capacity(rows.len() * width);

    for row in rows {
        if row.len() != width {
            return Err(MlErr::SizeMismatch {
                a: "row",
                b: "first row",
                got: row.len(),
                expected: width,
            });
        }
        data.extend_from_slice(row);
    }

    Array2::from_shape_vec((rows.len(), width), data).map_err(|_| MlErr::SizeMismatch {
        a: "data",
        b: "shape",
        got: rows.len() * width,
        expected: rows.len() * width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_row_major_matrix() {
        let m = matrix_from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(m.dim(), (3, 2));
        assert_eq!(m[[2, 0]], 5.0);
    }

    #[test]
    fn empty_input_is_zero_by_zero() {
        let m = matrix_from_rows(&[]).unwrap();
        assert_eq!(m.dim(), (0, 0));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = matrix_from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, MlErr::SizeMismatch { got: 1, expected: 2, .. }));
    }
}
