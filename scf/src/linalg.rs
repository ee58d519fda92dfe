//! Small dense linear-algebra helpers shared by the SCF components.

use nalgebra::{DMatrix, DVector};
use std::cmp::Ordering;

/// Eigendecomposition of a symmetric matrix with eigenvalues in ascending
/// order and eigenvector signs fixed by [`align_eigenvectors`].
pub fn sorted_symmetric_eigen(matrix: DMatrix<f64>) -> (DVector<f64>, DMatrix<f64>) {
    let eig = matrix.symmetric_eigen();

    let mut indices: Vec<usize> = (0..eig.eigenvalues.len()).collect();
    indices.sort_by(|&a, &b| {
        eig.eigenvalues[a]
            .partial_cmp(&eig.eigenvalues[b])
            .unwrap_or(Ordering::Equal)
    });
    let sorted_eigenvalues = DVector::from_fn(indices.len(), |i, _| eig.eigenvalues[indices[i]]);
    let sorted_eigenvectors = eig.eigenvectors.select_columns(&indices);

    (sorted_eigenvalues, align_eigenvectors(sorted_eigenvectors))
}

/// Tolerance below which two entries count as equally large when choosing
/// the sign-defining component.
const SIGN_TIE_TOLERANCE: f64 = 1e-12;

/// Given a matrix where each column is an eigenvector,
/// this function aligns each eigenvector so that its largest-magnitude
/// entry is positive. Near-ties go to the lowest index.
pub fn align_eigenvectors(mut eigvecs: DMatrix<f64>) -> DMatrix<f64> {
    for j in 0..eigvecs.ncols() {
        if let Some(pivot) = sign_pivot(eigvecs.column(j).iter().copied()) {
            if pivot < 0.0 {
                eigvecs.column_mut(j).neg_mut();
            }
        }
    }
    eigvecs
}

/// First entry whose magnitude is within [`SIGN_TIE_TOLERANCE`] of the
/// largest one.
fn sign_pivot<I>(values: I) -> Option<f64>
where
    I: Iterator<Item = f64> + Clone,
{
    let largest = values.clone().map(f64::abs).fold(0.0, f64::max);
    values.into_iter().find(|v| v.abs() >= largest - SIGN_TIE_TOLERANCE)
}

pub fn symmetrize(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    (matrix + matrix.transpose()) * 0.5
}

/// M^{-1/2} restricted to eigenvalues above `cutoff`; returns the matrix and
/// the number of discarded eigenvalues.
pub fn inverse_sqrt(matrix: &DMatrix<f64>, cutoff: f64) -> (DMatrix<f64>, usize) {
    let eig = symmetrize(matrix).symmetric_eigen();
    let mut dropped = 0;
    let scaled = DVector::from_iterator(
        eig.eigenvalues.len(),
        eig.eigenvalues.iter().map(|&v| {
            if v > cutoff {
                1.0 / v.sqrt()
            } else {
                dropped += 1;
                0.0
            }
        }),
    );
    let inv_sqrt =
        &eig.eigenvectors * DMatrix::from_diagonal(&scaled) * eig.eigenvectors.transpose();
    (inv_sqrt, dropped)
}

/// Root-mean-square of the element-wise difference of two matrices.
pub fn rms_difference(a: &DMatrix<f64>, b: &DMatrix<f64>) -> f64 {
    let diff = a - b;
    (diff.norm_squared() / diff.len() as f64).sqrt()
}

/// Closed-shell density D = Co Coᵗ from the first `ndocc` columns.
pub fn density_from_coefficients(coefficients: &DMatrix<f64>, ndocc: usize) -> DMatrix<f64> {
    let occupied = coefficients.columns(0, ndocc);
    &occupied * occupied.transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sorted_eigen_is_ascending_and_aligned() {
        let m = DMatrix::from_row_slice(3, 3, &[2.0, -1.0, 0.0, -1.0, 2.0, -1.0, 0.0, -1.0, 2.0]);
        let (values, vectors) = sorted_symmetric_eigen(m.clone());
        assert!(values[0] <= values[1] && values[1] <= values[2]);
        for j in 0..3 {
            let col = vectors.column(j);
            assert!(sign_pivot(col.iter().copied()).unwrap() > 0.0);
            assert_relative_eq!(&m * col, col * values[j], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sign_ties_resolve_to_first_entry() {
        let r = std::f64::consts::FRAC_1_SQRT_2;
        let v = DMatrix::from_column_slice(3, 2, &[-r, 0.0, r, r, 0.0, -r]);
        let aligned = align_eigenvectors(v);
        assert_eq!(aligned.column(0).iter().copied().collect::<Vec<_>>(), vec![r, 0.0, -r]);
        assert_eq!(aligned.column(1).iter().copied().collect::<Vec<_>>(), vec![r, 0.0, -r]);
        // a clear maximum still wins over an earlier smaller entry
        let w = align_eigenvectors(DMatrix::from_column_slice(2, 1, &[0.6, -0.8]));
        assert_eq!(w[(0, 0)], -0.6);
        assert_eq!(w[(1, 0)], 0.8);
    }

    #[test]
    fn test_inverse_sqrt_drops_small_eigenvalues() {
        let m = DMatrix::from_diagonal(&DVector::from_vec(vec![4.0, 1e-14]));
        let (inv, dropped) = inverse_sqrt(&m, 1e-10);
        assert_eq!(dropped, 1);
        assert_relative_eq!(inv[(0, 0)], 0.5, epsilon = 1e-14);
        assert_eq!(inv[(1, 1)], 0.0);
    }
}
