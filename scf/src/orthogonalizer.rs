//! Canonical orthogonalization of the AO basis.
//!
//! The overlap matrix S is diagonalized once per run. Eigenpairs are ordered
//! by decreasing magnitude and every eigenvalue above
//! [`LINEAR_DEPENDENCY_THRESHOLD`] contributes a column u_k / sqrt(d_k) to
//! the transform Λ, so that Λᵗ S Λ = 1 on the retained subspace. All Fock
//! diagonalizations happen in that (possibly smaller) subspace.

use crate::linalg::{align_eigenvectors, sorted_symmetric_eigen, symmetrize};
use nalgebra::{DMatrix, DVector};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Overlap eigenvalues at or below this magnitude are treated as linear
/// dependencies.
pub const LINEAR_DEPENDENCY_THRESHOLD: f64 = 1e-7;

#[derive(Debug, Clone)]
pub struct Orthogonalizer {
    transform: DMatrix<f64>,
    retained_eigenvalues: DVector<f64>,
    dropped: usize,
}

impl Orthogonalizer {
    pub fn new(overlap: &DMatrix<f64>) -> Self {
        Orthogonalizer::with_threshold(overlap, LINEAR_DEPENDENCY_THRESHOLD)
    }

    pub fn with_threshold(overlap: &DMatrix<f64>, threshold: f64) -> Self {
        let n = overlap.nrows();
        let eig = symmetrize(overlap).symmetric_eigen();

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            eig.eigenvalues[b]
                .abs()
                .partial_cmp(&eig.eigenvalues[a].abs())
                .unwrap_or(Ordering::Equal)
        });
        // non-positive eigenvalues can never pass the threshold
        let retained: Vec<usize> = order
            .into_iter()
            .filter(|&k| eig.eigenvalues[k] > threshold)
            .collect();
        let dropped = n - retained.len();

        let mut transform = align_eigenvectors(eig.eigenvectors.select_columns(&retained));
        for (col, &k) in retained.iter().enumerate() {
            transform.column_mut(col).scale_mut(1.0 / eig.eigenvalues[k].sqrt());
        }
        let retained_eigenvalues =
            DVector::from_iterator(retained.len(), retained.iter().map(|&k| eig.eigenvalues[k]));

        if dropped > 0 {
            warn!(
                "Overlap matrix is near-singular: dropped {} of {} basis functions (threshold {:.1e})",
                dropped, n, threshold
            );
        }
        if !retained_eigenvalues.is_empty() {
            debug!(
                "Overlap eigenvalue range: [{:.3e}, {:.3e}]",
                retained_eigenvalues.min(),
                retained_eigenvalues.max()
            );
        }

        Orthogonalizer {
            transform,
            retained_eigenvalues,
            dropped,
        }
    }

    /// The n × n_mo transform Λ.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.transform
    }

    pub fn n_ao(&self) -> usize {
        self.transform.nrows()
    }

    /// Dimension of the orthogonal subspace.
    pub fn n_mo(&self) -> usize {
        self.transform.ncols()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn retained_eigenvalues(&self) -> &DVector<f64> {
        &self.retained_eigenvalues
    }

    /// Λᵗ M Λ.
    pub fn transform(&self, matrix: &DMatrix<f64>) -> DMatrix<f64> {
        self.transform.transpose() * matrix * &self.transform
    }

    /// Λ C'.
    pub fn back_transform(&self, coefficients: &DMatrix<f64>) -> DMatrix<f64> {
        &self.transform * coefficients
    }

    /// Pseudo-inverse of S on the retained subspace, Λ Λᵗ.
    pub fn overlap_inverse(&self) -> DMatrix<f64> {
        &self.transform * self.transform.transpose()
    }

    /// Solves F C = S C ε in the orthogonal subspace. Orbital energies come
    /// back ascending; coefficients are AO-basis columns.
    pub fn diagonalize(&self, fock: &DMatrix<f64>) -> (DVector<f64>, DMatrix<f64>) {
        let f_prime = symmetrize(&self.transform(fock));
        let (energies, c_prime) = sorted_symmetric_eigen(f_prime);
        (energies, align_eigenvectors(self.back_transform(&c_prime)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn random_overlap(n: usize) -> DMatrix<f64> {
        let a = DMatrix::<f64>::new_random(n, n);
        // diagonal dominance keeps it well conditioned
        let s = &a * a.transpose() + DMatrix::identity(n, n) * n as f64;
        let d = DVector::from_iterator(n, (0..n).map(|i| 1.0 / s[(i, i)].sqrt()));
        DMatrix::from_diagonal(&d) * s * DMatrix::from_diagonal(&d)
    }

    #[test]
    fn test_orthogonality_on_random_overlaps() {
        for n in [2, 5, 12] {
            let s = random_overlap(n);
            let ortho = Orthogonalizer::new(&s);
            assert_eq!(ortho.dropped(), 0);
            let identity = ortho.transform(&s);
            assert_relative_eq!(identity, DMatrix::identity(n, n), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_drops_exactly_the_small_eigenvalues() {
        let s = DMatrix::from_diagonal(&DVector::from_vec(vec![1.0, 0.5, 1e-7, 5e-8, 2e-7]));
        let ortho = Orthogonalizer::new(&s);
        assert_eq!(ortho.dropped(), 2);
        assert_eq!(ortho.n_mo(), 3);
        // descending magnitude
        assert_relative_eq!(
            ortho.retained_eigenvalues().clone(),
            DVector::from_vec(vec![1.0, 0.5, 2e-7]),
            max_relative = 1e-12
        );
        assert_relative_eq!(ortho.transform(&s), DMatrix::identity(3, 3), epsilon = 1e-10);
    }

    #[test]
    fn test_near_duplicate_functions() {
        // two functions with overlap 1 - 1e-9 plus an independent one
        let t = 1.0 - 1e-9;
        let s = DMatrix::from_row_slice(3, 3, &[1.0, t, 0.2, t, 1.0, 0.2, 0.2, 0.2, 1.0]);
        let ortho = Orthogonalizer::new(&s);
        assert_eq!(ortho.dropped(), 1);
        assert_relative_eq!(ortho.transform(&s), DMatrix::identity(2, 2), epsilon = 1e-10);
    }

    #[test]
    fn test_negative_eigenvalue_is_discarded() {
        let s = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        let ortho = Orthogonalizer::new(&s);
        assert_eq!(ortho.dropped(), 1);
        assert_relative_eq!(ortho.retained_eigenvalues()[0], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_diagonalize_generalized_problem() {
        let s = random_overlap(6);
        let f = {
            let a = DMatrix::<f64>::new_random(6, 6);
            &a + a.transpose()
        };
        let ortho = Orthogonalizer::new(&s);
        let (eps, c) = ortho.diagonalize(&f);
        for k in 1..eps.len() {
            assert!(eps[k - 1] <= eps[k]);
        }
        assert_relative_eq!(c.transpose() * &s * &c, DMatrix::identity(6, 6), epsilon = 1e-10);
        assert_relative_eq!(&f * &c, &s * &c * DMatrix::from_diagonal(&eps), epsilon = 1e-10);
    }
}
