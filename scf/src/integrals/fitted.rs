//! Density-fitted three-index factors.
//!
//! With the Coulomb metric J_PQ = (P|Q) over auxiliary functions and the
//! three-centre integrals (ij|P), the symmetric factors
//!
//!   B^Q_ij = Σ_P (ij|P) [J^{-1/2}]_PQ
//!
//! approximate (ij|kl) ≈ Σ_Q B^Q_ij B^Q_kl.

use crate::linalg::inverse_sqrt;
use basis::{Basis, ContractedGTO};
use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::{debug, warn};

/// Metric eigenvalues below this are removed before inversion.
pub const METRIC_CUTOFF: f64 = 1e-10;

#[derive(Debug, Clone)]
pub struct FittedIntegrals {
    factors: Vec<DMatrix<f64>>,
    /// basis functions per side of every factor
    size: usize,
    dropped: usize,
}

impl FittedIntegrals {
    pub fn new(functions: &[ContractedGTO], auxiliary: &[ContractedGTO]) -> Self {
        let n = functions.len();
        let naux = auxiliary.len();

        let metric = DMatrix::from_fn(naux, naux, |p, q| {
            ContractedGTO::JKab(&auxiliary[p], &auxiliary[q])
        });
        let (metric_inv_sqrt, dropped) = inverse_sqrt(&metric, METRIC_CUTOFF);
        if dropped > 0 {
            warn!(
                "Fitting metric is near-singular: removed {} of {} auxiliary directions",
                dropped, naux
            );
        }

        let three_center: Vec<DMatrix<f64>> = auxiliary
            .par_iter()
            .map(|aux| {
                let mut m = DMatrix::zeros(n, n);
                for i in 0..n {
                    for j in 0..=i {
                        let v = ContractedGTO::JKabc(&functions[i], &functions[j], aux);
                        m[(i, j)] = v;
                        m[(j, i)] = v;
                    }
                }
                m
            })
            .collect();

        let factors = (0..naux)
            .map(|q| {
                let mut b = DMatrix::zeros(n, n);
                for (p, a) in three_center.iter().enumerate() {
                    b += a * metric_inv_sqrt[(p, q)];
                }
                b
            })
            .collect();

        debug!("Built {} fitted factors for {} basis functions", naux, n);
        FittedIntegrals {
            factors,
            size: n,
            dropped,
        }
    }

    /// Wraps precomputed n × n factors B^Q. Returns `None` when the factors
    /// are not all square of side `size`.
    pub fn from_factors(size: usize, factors: Vec<DMatrix<f64>>) -> Option<Self> {
        factors
            .iter()
            .all(|b| b.nrows() == size && b.ncols() == size)
            .then_some(FittedIntegrals {
                factors,
                size,
                dropped: 0,
            })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// The B^Q matrices, one per auxiliary function.
    pub fn factors(&self) -> &[DMatrix<f64>] {
        &self.factors
    }

    pub fn n_auxiliary(&self) -> usize {
        self.factors.len()
    }

    /// Metric directions removed as linearly dependent.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Fitted approximation to (ij|kl).
    pub fn approximate(&self, i: usize, j: usize, k: usize, l: usize) -> f64 {
        self.factors.iter().map(|b| b[(i, j)] * b[(k, l)]).sum()
    }
}
