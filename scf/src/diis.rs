//! Pulay's direct inversion in the iterative subspace.
//!
//! Error vectors are the orbital-gradient commutator FDS - SDF expressed in
//! the orthogonal basis. The oldest entry is evicted once the buffer holds
//! `capacity` vectors.

use crate::orthogonalizer::Orthogonalizer;
use nalgebra::{DMatrix, DVector};
use std::collections::VecDeque;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Diis {
    capacity: usize,
    min_vectors: usize,
    focks: VecDeque<DMatrix<f64>>,
    errors: VecDeque<DMatrix<f64>>,
}

impl Diis {
    pub fn new(capacity: usize, min_vectors: usize) -> Self {
        Diis {
            capacity,
            min_vectors,
            focks: VecDeque::with_capacity(capacity),
            errors: VecDeque::with_capacity(capacity),
        }
    }

    /// Λᵗ (FDS - SDF) Λ.
    pub fn error_vector(
        fock: &DMatrix<f64>,
        density: &DMatrix<f64>,
        overlap: &DMatrix<f64>,
        orthogonalizer: &Orthogonalizer,
    ) -> DMatrix<f64> {
        let fds = fock * density * overlap;
        let commutator = &fds - fds.transpose();
        orthogonalizer.transform(&commutator)
    }

    /// Stores a Fock matrix with its error vector.
    pub fn push(&mut self, fock: DMatrix<f64>, error: DMatrix<f64>) {
        if self.focks.len() == self.capacity {
            self.focks.pop_front();
            self.errors.pop_front();
        }
        self.focks.push_back(fock);
        self.errors.push_back(error);
    }

    pub fn len(&self) -> usize {
        self.focks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.focks.is_empty()
    }

    pub fn reset(&mut self) {
        self.focks.clear();
        self.errors.clear();
    }

    /// Largest absolute element of the newest error vector.
    pub fn last_error(&self) -> Option<f64> {
        self.errors.back().map(|e| e.amax())
    }

    /// Extrapolated Fock matrix, or `None` while fewer than `min_vectors`
    /// entries are stored. A singular B system falls back to the newest
    /// Fock matrix.
    pub fn extrapolate(&self) -> Option<DMatrix<f64>> {
        let m = self.len();
        if m < self.min_vectors.max(1) {
            return None;
        }
        let newest = self.focks.back()?;
        if m == 1 {
            return Some(newest.clone());
        }

        let mut b = DMatrix::zeros(m + 1, m + 1);
        for i in 0..m {
            for j in 0..=i {
                let bij = self.errors[i].dot(&self.errors[j]);
                b[(i, j)] = bij;
                b[(j, i)] = bij;
            }
            b[(i, m)] = -1.0;
            b[(m, i)] = -1.0;
        }
        let mut rhs = DVector::zeros(m + 1);
        rhs[m] = -1.0;

        let Some(solution) = b.lu().solve(&rhs) else {
            warn!("DIIS system is singular, using the newest Fock matrix");
            return Some(newest.clone());
        };
        if solution.iter().any(|c| !c.is_finite()) {
            warn!("DIIS coefficients are not finite, using the newest Fock matrix");
            return Some(newest.clone());
        }

        let mut fock = DMatrix::zeros(newest.nrows(), newest.ncols());
        for (c, f) in solution.iter().zip(&self.focks) {
            fock += f * *c;
        }
        Some(fock)
    }
}
