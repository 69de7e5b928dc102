//! Rectangular score matrices.
//!
//! `ScoreMatrix` is validated once at construction (non-empty, rectangular,
//! finite, non-negative) and never mutated afterwards. Every later stage can
//! rely on those invariants without re-checking them.

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};

/// Raw `rows × cols` scores; rows are experts or alternatives, columns are criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct ScoreMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl ScoreMatrix {
    /// Build from nested rows. Fails with `InvalidInput` on empty, ragged,
    /// non-finite or negative input.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> EvalResult<Self> {
        let n_rows = rows.len();
        if n_rows == 0 {
            return Err(EvalError::invalid("score matrix has no rows"));
        }
        let n_cols = rows.first().map_or(0, Vec::len);
        if n_cols == 0 {
            return Err(EvalError::invalid("score matrix has no columns"));
        }

        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(EvalError::invalid(format!(
                    "row {} has {} values, expected {}",
                    i + 1,
                    row.len(),
                    n_cols
                )));
            }
            for (j, v) in row.into_iter().enumerate() {
                if !v.is_finite() {
                    return Err(EvalError::invalid(format!(
                        "score at row {}, column {} is not finite",
                        i + 1,
                        j + 1
                    )));
                }
                if v < 0.0 {
                    return Err(EvalError::invalid(format!(
                        "score at row {}, column {} is negative ({v})",
                        i + 1,
                        j + 1
                    )));
                }
                data.push(v);
            }
        }

        Ok(Self {
            rows: n_rows,
            cols: n_cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Value at `(row, col)`; `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }

    pub fn row_iter(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.cols)
    }

    /// Values of one criterion across all rows.
    pub fn column(&self, col: usize) -> impl Iterator<Item = f64> + '_ {
        self.row_iter().filter_map(move |r| r.get(col).copied())
    }

    pub fn column_sums(&self) -> Vec<f64> {
        (0..self.cols).map(|j| self.column(j).sum()).collect()
    }

    pub fn column_means(&self) -> Vec<f64> {
        let m = self.rows as f64;
        self.column_sums().into_iter().map(|s| s / m).collect()
    }

    /// Smallest and largest score in the whole matrix.
    pub fn bounds(&self) -> (f64, f64) {
        self.data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.row_iter().map(<[f64]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<f64>>> for ScoreMatrix {
    type Error = EvalError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<ScoreMatrix> for Vec<Vec<f64>> {
    fn from(m: ScoreMatrix) -> Self {
        m.to_rows()
    }
}

/// Column-wise rescaled matrix, same shape as its source `ScoreMatrix`.
/// Only the normalizer constructs these.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl NormalizedMatrix {
    pub(crate) fn from_columns(rows: usize, cols: usize, columns: &[Vec<f64>]) -> Self {
        let mut data = vec![0.0; rows * cols];
        for (j, col) in columns.iter().enumerate() {
            for (i, &v) in col.iter().enumerate() {
                if let Some(slot) = data.get_mut(i * cols + j) {
                    *slot = v;
                }
            }
        }
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }

    pub fn row_iter(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.cols)
    }

    pub fn column(&self, col: usize) -> impl Iterator<Item = f64> + '_ {
        self.row_iter().filter_map(move |r| r.get(col).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_rectangular_matrix() {
        let m = ScoreMatrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!((m.rows(), m.cols()), (2, 3));
        assert_eq!(m.get(1, 2), Some(6.0));
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.column(1).collect::<Vec<_>>(), vec![2.0, 5.0]);
        assert_eq!(m.column_means(), vec![2.5, 3.5, 4.5]);
        assert_eq!(m.bounds(), (1.0, 6.0));
    }

    #[test]
    fn rejects_empty_and_ragged() {
        assert!(matches!(
            ScoreMatrix::from_rows(vec![]),
            Err(EvalError::InvalidInput(_))
        ));
        assert!(matches!(
            ScoreMatrix::from_rows(vec![vec![]]),
            Err(EvalError::InvalidInput(_))
        ));
        assert!(matches!(
            ScoreMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]),
            Err(EvalError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_negative_and_nan() {
        let neg = ScoreMatrix::from_rows(vec![vec![1.0, -0.5]]).unwrap_err();
        assert!(neg.to_string().contains("negative"));
        let nan = ScoreMatrix::from_rows(vec![vec![f64::NAN, 1.0]]).unwrap_err();
        assert!(nan.to_string().contains("not finite"));
    }

    #[test]
    fn deserializes_through_validation() {
        let ok: ScoreMatrix = serde_json::from_str("[[1,2],[3,4]]").unwrap();
        assert_eq!(ok.to_rows(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);

        let bad: Result<ScoreMatrix, _> = serde_json::from_str("[[1,2],[3]]");
        assert!(bad.is_err());
    }
}
