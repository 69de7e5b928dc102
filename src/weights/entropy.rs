//! Shannon-entropy weighting.
//!
//! Works on raw score proportions `p_ij = x_ij / Σ_i x_ij`, not on the
//! vector-normalised matrix: entropy needs a true probability distribution
//! per criterion.
//!
//! `e_j = -Σ_i p_ij ln(p_ij + ε) / ln(m)`, `d_j = 1 - e_j`, weights are `d`
//! divided by its sum. A criterion on which every row agrees carries no
//! discriminating information, so its diversity (and weight) is ≈ 0.
//!
//! Degenerate inputs are defined, not rejected:
//! - one row: `ln(1) = 0`, entropy is taken as 0 for every column;
//! - an all-zero column has no distribution and counts as fully uniform (`d = 0`);
//! - when every diversity is ≈ 0 the weights fall back to uniform.

use crate::matrix::ScoreMatrix;
use crate::normalize::STABILIZER;

use super::CriterionWeights;

/// Diversities below this are stabilizer noise (a constant column lands
/// around 1e-9, not exactly 0) and count as no information.
const DIVERSITY_FLOOR: f64 = 1e-6;

pub fn entropy_weights(scores: &ScoreMatrix) -> CriterionWeights {
    let diversity = column_diversity(scores);
    let total: f64 = diversity.iter().sum();
    if total <= STABILIZER {
        return CriterionWeights::uniform(scores.cols());
    }
    CriterionWeights(diversity.into_iter().map(|d| d / total).collect())
}

/// Per-criterion entropy in `[0, 1]` (up to ε rounding).
pub fn column_entropy(scores: &ScoreMatrix) -> Vec<f64> {
    let m = scores.rows();
    if m < 2 {
        return vec![0.0; scores.cols()];
    }
    let log_m = (m as f64).ln();

    (0..scores.cols())
        .map(|j| {
            let sum: f64 = scores.column(j).sum();
            if sum == 0.0 {
                return 1.0;
            }
            let h: f64 = scores
                .column(j)
                .map(|x| {
                    let p = x / (sum + STABILIZER);
                    p * (p + STABILIZER).ln()
                })
                .sum();
            -h / log_m
        })
        .collect()
}

fn column_diversity(scores: &ScoreMatrix) -> Vec<f64> {
    column_entropy(scores)
        .into_iter()
        .map(|e| {
            let d = 1.0 - e;
            if d < DIVERSITY_FLOOR {
                0.0
            } else {
                d
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::assert_unit_sum;

    fn m(rows: Vec<Vec<f64>>) -> ScoreMatrix {
        ScoreMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn constant_criterion_gets_no_weight() {
        let w = entropy_weights(&m(vec![vec![1.0, 5.0, 10.0], vec![10.0, 5.0, 1.0]]));
        assert_unit_sum(&w);
        let w = w.as_slice();
        assert!(w[1] < 1e-6, "constant column weight {}", w[1]);
        assert!((w[0] - w[2]).abs() < 1e-9);
        assert!(w[0] > 0.4);
    }

    #[test]
    fn single_row_yields_equal_weights() {
        let w = entropy_weights(&m(vec![vec![3.0, 7.0, 9.0]]));
        assert_unit_sum(&w);
        assert!(w.as_slice().iter().all(|v| (v - 1.0 / 3.0).abs() < 1e-9));
    }

    #[test]
    fn all_constant_columns_fall_back_to_uniform() {
        let w = entropy_weights(&m(vec![vec![4.0, 6.0], vec![4.0, 6.0], vec![4.0, 6.0]]));
        assert_unit_sum(&w);
        assert!((w.as_slice()[0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn zero_column_is_not_favoured() {
        let w = entropy_weights(&m(vec![vec![0.0, 2.0], vec![0.0, 9.0]]));
        assert_unit_sum(&w);
        assert!(w.as_slice()[0] < 1e-6);
    }

    #[test]
    fn more_spread_means_more_weight() {
        let w = entropy_weights(&m(vec![
            vec![5.0, 1.0],
            vec![6.0, 9.0],
            vec![5.0, 2.0],
        ]));
        assert!(w.as_slice()[1] > w.as_slice()[0]);
    }

    #[test]
    fn entropy_stays_in_unit_range() {
        let e = column_entropy(&m(vec![vec![1.0, 4.0], vec![2.0, 4.0], vec![9.0, 4.0]]));
        for v in e {
            assert!((-1e-6..=1.0 + 1e-6).contains(&v), "entropy {v}");
        }
    }
}
