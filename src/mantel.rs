//! Mantel Test
//!
//! Permutation test for correlation between two distance matrices over the
//! same number of objects.
//!
//! Algorithm:
//! 1. Flatten the upper triangle of both matrices (ranked first for Spearman)
//! 2. Observed statistic r = Pearson correlation of the two vectors
//! 3. Shuffle the row/column order of the first matrix `permutations` times,
//!    recomputing r each time
//! 4. p = (#permuted statistics at least as extreme as r + 1) / (permutations + 1)

use crate::error::MantelError;
use crate::utils::distance::DistanceMatrix;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fewest objects a Mantel test accepts
pub const MIN_MANTEL_SAMPLES: usize = 3;

/// Default number of permutations
pub const DEFAULT_PERMUTATIONS: usize = 999;

/// Correlation measure between flattened distance vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    /// Pearson on average ranks
    Spearman,
}

/// Which permuted statistics count as "at least as extreme"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alternative {
    #[default]
    TwoSided,
    Greater,
    Less,
}

/// Mantel test settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MantelParams {
    pub permutations: usize,
    pub method: CorrelationMethod,
    pub alternative: Alternative,
}

impl Default for MantelParams {
    fn default() -> Self {
        Self {
            permutations: DEFAULT_PERMUTATIONS,
            method: CorrelationMethod::default(),
            alternative: Alternative::default(),
        }
    }
}

/// Outcome of one Mantel test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MantelResult {
    /// Correlation between the two matrices, in [-1, 1] (NaN if undefined)
    pub statistic: f64,
    /// Permutation p-value in (0, 1] (NaN if undefined)
    pub p_value: f64,
    /// Number of objects compared
    pub n: usize,
}

/// Run a Mantel test between `x` and `y`
///
/// # Errors
/// - `DimensionMismatch` if the matrices differ in size
/// - `TooFewSamples` if fewer than three objects are compared
pub fn mantel<R: Rng + ?Sized>(
    x: &DistanceMatrix,
    y: &DistanceMatrix,
    params: &MantelParams,
    rng: &mut R,
) -> Result<MantelResult, MantelError> {
    let n = x.size();
    if n != y.size() {
        return Err(MantelError::DimensionMismatch {
            left: n,
            right: y.size(),
        });
    }
    if n < MIN_MANTEL_SAMPLES {
        return Err(MantelError::TooFewSamples {
            needed: MIN_MANTEL_SAMPLES,
            found: n,
        });
    }

    let (x, y_flat) = match params.method {
        CorrelationMethod::Pearson => (x.clone(), y.condensed()),
        CorrelationMethod::Spearman => (
            DistanceMatrix::from_condensed(&average_ranks(&x.condensed()), n)?,
            average_ranks(&y.condensed()),
        ),
    };

    let statistic = pearson(&x.condensed(), &y_flat);
    if statistic.is_nan() || params.permutations == 0 {
        return Ok(MantelResult {
            statistic,
            p_value: f64::NAN,
            n,
        });
    }

    let mut order: Vec<usize> = (0..n).collect();
    let mut extreme = 0usize;
    for _ in 0..params.permutations {
        order.shuffle(rng);
        let permuted = pearson(&x.condensed_permuted(&order), &y_flat);
        let hit = match params.alternative {
            Alternative::TwoSided => permuted.abs() >= statistic.abs(),
            Alternative::Greater => permuted >= statistic,
            Alternative::Less => permuted <= statistic,
        };
        if hit {
            extreme += 1;
        }
    }

    let p_value = (extreme + 1) as f64 / (params.permutations + 1) as f64;

    Ok(MantelResult {
        statistic,
        p_value,
        n,
    })
}

/// Pearson product-moment correlation; NaN when either side is constant
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let len = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / len;
    let mean_b = b.iter().sum::<f64>() / len;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    // rounding can push |r| a hair past 1
    (cov / denom).clamp(-1.0, 1.0)
}

/// 1-based ranks, ties get the average of the ranks they span
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end hold ranks start+1..=end
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}
