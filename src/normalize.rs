//! Column-wise normalisation of raw score matrices.
//!
//! - `Vector`: `r_ij = x_ij / sqrt(Σ_k x_kj²)`; each column ends up with unit
//!   sum of squares.
//! - `MinMax`: `r_ij = (x_ij - min_j) / (max_j - min_j + ε)`; each column lies
//!   in `[0, 1]` and a constant column maps to all zeros.
//!
//! Both add `STABILIZER` to the denominator, so an all-zero column yields
//! zeros instead of NaN.

use serde::{Deserialize, Serialize};

use crate::matrix::{NormalizedMatrix, ScoreMatrix};

/// Denominator guard shared by all numeric stages.
pub const STABILIZER: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Euclidean (vector) normalisation, the TOPSIS default.
    #[default]
    Vector,
    #[serde(alias = "min_max")]
    Minmax,
}

impl std::str::FromStr for Normalization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vector" | "euclidean" => Ok(Self::Vector),
            "minmax" | "min_max" | "min-max" => Ok(Self::Minmax),
            other => Err(format!("unknown normalization `{other}`")),
        }
    }
}

/// Rescale every column of `matrix`. Pure; the input is validated at
/// construction so this cannot fail.
pub fn normalize(matrix: &ScoreMatrix, method: Normalization) -> NormalizedMatrix {
    let columns: Vec<Vec<f64>> = (0..matrix.cols())
        .map(|j| {
            let col: Vec<f64> = matrix.column(j).collect();
            match method {
                Normalization::Vector => vector_column(&col),
                Normalization::Minmax => minmax_column(&col),
            }
        })
        .collect();
    NormalizedMatrix::from_columns(matrix.rows(), matrix.cols(), &columns)
}

fn vector_column(col: &[f64]) -> Vec<f64> {
    let norm = col.iter().map(|v| v * v).sum::<f64>().sqrt();
    col.iter().map(|v| v / (norm + STABILIZER)).collect()
}

fn minmax_column(col: &[f64]) -> Vec<f64> {
    let (lo, hi) = col
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let span = hi - lo + STABILIZER;
    col.iter().map(|v| (v - lo) / span).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: Vec<Vec<f64>>) -> ScoreMatrix {
        ScoreMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn vector_columns_have_unit_norm() {
        let x = m(vec![
            vec![7.0, 9.0, 9.0],
            vec![8.0, 7.0, 8.0],
            vec![9.0, 6.0, 8.0],
            vec![6.0, 7.0, 8.0],
        ]);
        let r = normalize(&x, Normalization::Vector);
        for j in 0..3 {
            let ss: f64 = r.column(j).map(|v| v * v).sum();
            assert!((ss - 1.0).abs() < 1e-6, "column {j} sum of squares {ss}");
        }
    }

    #[test]
    fn vector_all_zero_column_stays_zero() {
        let x = m(vec![vec![0.0, 3.0], vec![0.0, 4.0]]);
        let r = normalize(&x, Normalization::Vector);
        assert_eq!(r.column(0).collect::<Vec<_>>(), vec![0.0, 0.0]);
        assert!((r.get(1, 1).unwrap() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn minmax_maps_into_unit_interval() {
        let x = m(vec![vec![2.0, 5.0], vec![4.0, 5.0], vec![10.0, 5.0]]);
        let r = normalize(&x, Normalization::Minmax);
        let c0: Vec<f64> = r.column(0).collect();
        assert!(c0[0].abs() < 1e-9);
        assert!((c0[1] - 0.25).abs() < 1e-6);
        assert!((c0[2] - 1.0).abs() < 1e-6);
        // constant column collapses to zero rather than failing
        assert!(r.column(1).all(|v| v == 0.0));
    }

    #[test]
    fn parses_names() {
        assert_eq!("Vector".parse::<Normalization>(), Ok(Normalization::Vector));
        assert_eq!("min-max".parse::<Normalization>(), Ok(Normalization::Minmax));
        assert!("zscore".parse::<Normalization>().is_err());
    }
}
