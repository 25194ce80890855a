//! Euclidean distance matrices
//!
//! Pairwise distances are computed once in condensed form (upper triangle,
//! row-major: (0,1), (0,2), ..., (1,2), ...) and expanded into a full
//! symmetric N×N matrix with a zero diagonal.

use crate::error::MantelError;

/// Square, symmetric, zero-diagonal distance matrix (row-major storage)
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Expand a condensed distance vector of `n` samples
    pub fn from_condensed(condensed: &[f64], n: usize) -> Result<Self, MantelError> {
        if n < 2 {
            return Err(MantelError::TooFewSamples { needed: 2, found: n });
        }
        let expected = n * (n - 1) / 2;
        if condensed.len() != expected {
            return Err(MantelError::DimensionMismatch {
                left: condensed.len(),
                right: expected,
            });
        }

        let mut data = vec![0.0; n * n];
        let mut k = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                data[i * n + j] = condensed[k];
                data[j * n + i] = condensed[k];
                k += 1;
            }
        }

        Ok(Self { n, data })
    }

    /// Number of samples (rows = columns)
    pub fn size(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// Upper-triangle values in condensed order
    pub fn condensed(&self) -> Vec<f64> {
        self.condensed_permuted(&(0..self.n).collect::<Vec<_>>())
    }

    /// Upper-triangle values after reordering rows and columns by `order`
    ///
    /// `order[i]` is the original index placed at position `i`.
    pub fn condensed_permuted(&self, order: &[usize]) -> Vec<f64> {
        debug_assert_eq!(order.len(), self.n);
        let mut out = Vec::with_capacity(self.n * (self.n - 1) / 2);
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                out.push(self.get(order[i], order[j]));
            }
        }
        out
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|i| {
            self.get(i, i) == 0.0 && ((i + 1)..self.n).all(|j| self.get(i, j) == self.get(j, i))
        })
    }
}

/// Pairwise Euclidean distances between rows, in condensed order
///
/// All columns are treated as dimensions. Needs at least two rows.
pub fn euclidean_condensed(rows: &[&[f64]]) -> Result<Vec<f64>, MantelError> {
    let n = rows.len();
    if n < 2 {
        return Err(MantelError::TooFewSamples { needed: 2, found: n });
    }

    let mut distances = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            distances.push(euclidean(rows[i], rows[j]));
        }
    }
    Ok(distances)
}

/// Full N×N Euclidean distance matrix over the given rows
pub fn euclidean_distance_matrix(rows: &[&[f64]]) -> Result<DistanceMatrix, MantelError> {
    let condensed = euclidean_condensed(rows)?;
    DistanceMatrix::from_condensed(&condensed, rows.len())
}

#[inline]
fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
