//! Initial orbitals for the SCF loop.

use crate::config::GuessKind;
use crate::energy::electronic_energy;
use crate::error::ScfError;
use crate::fock::FockBuilder;
use crate::integrals::{AoLabel, IntegralContext};
use crate::linalg::{density_from_coefficients, sorted_symmetric_eigen, symmetrize};
use crate::orthogonalizer::Orthogonalizer;
use crate::rhf::{ReferenceWavefunction, RhfWavefunction};
use nalgebra::{DMatrix, DVector};
use tracing::info;

const HARTREE_TO_EV: f64 = 27.211386245988;

/// Wolfsberg-Helmholz constant used by the GWH guess.
pub const GWH_FACTOR: f64 = 0.875;
/// Extended-Hückel constant K.
pub const HUCKEL_FACTOR: f64 = 1.75;
/// Projected occupied overlaps at or below this are not invertible.
pub const PROJECTION_THRESHOLD: f64 = 1e-8;

#[derive(Debug, Clone)]
pub enum GuessStrategy {
    Core,
    Gwh,
    Huckel,
    /// Occupied orbitals of a converged calculation in another basis.
    Projection(Box<RhfWavefunction>),
}

impl From<GuessKind> for GuessStrategy {
    fn from(kind: GuessKind) -> Self {
        match kind {
            GuessKind::Core => GuessStrategy::Core,
            GuessKind::Gwh => GuessStrategy::Gwh,
            GuessKind::Huckel => GuessStrategy::Huckel,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InitialGuess {
    /// AO coefficients; the first `ndocc` columns are occupied.
    pub coefficients: DMatrix<f64>,
    /// Eigenvalues of the guess Fock matrix, when one was diagonalized.
    pub orbital_energies: Option<DVector<f64>>,
    /// Guess density and the Fock matrix built from it.
    pub density: DMatrix<f64>,
    pub fock: DMatrix<f64>,
    /// Electronic energy of the guess density.
    pub energy: f64,
}

impl GuessStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            GuessStrategy::Core => "core",
            GuessStrategy::Gwh => "gwh",
            GuessStrategy::Huckel => "huckel",
            GuessStrategy::Projection(_) => "projection",
        }
    }

    pub fn build(
        &self,
        integrals: &IntegralContext,
        orthogonalizer: &Orthogonalizer,
        fock_builder: &FockBuilder,
        ndocc: usize,
    ) -> Result<InitialGuess, ScfError> {
        let core = integrals.core_hamiltonian()?;
        let overlap = integrals.overlap()?;

        let (coefficients, orbital_energies) = match self {
            GuessStrategy::Core => {
                let (eps, c) = orthogonalizer.diagonalize(&core);
                (c, Some(eps))
            }
            GuessStrategy::Gwh => {
                let (eps, c) = orthogonalizer.diagonalize(&gwh_matrix(&core, overlap));
                (c, Some(eps))
            }
            GuessStrategy::Huckel => {
                let f = huckel_matrix(&core, overlap, integrals.labels());
                let (eps, c) = orthogonalizer.diagonalize(&f);
                (c, Some(eps))
            }
            GuessStrategy::Projection(source) => {
                if source.ndocc() != ndocc {
                    return Err(ScfError::Configuration {
                        key: "basis_guess",
                        value: format!(
                            "{} ({} occupied orbitals, expected {})",
                            source.integrals().basis_name(),
                            source.ndocc(),
                            ndocc
                        ),
                    });
                }
                let ca_occ = source.coefficients().columns(0, ndocc).into_owned();
                let s_ab = source.integrals().cross_overlap(integrals);
                (project_occupied(&ca_occ, &s_ab, orthogonalizer)?, None)
            }
        };

        let density = density_from_coefficients(&coefficients, ndocc);
        let fock = fock_builder.build_fock(&density, &core)?;
        let energy = electronic_energy(&density, &core, &fock);

        info!(
            "Initial guess ({}): E = {:.12} au, {} linear dependencies dropped",
            self.name(),
            energy,
            orthogonalizer.dropped()
        );

        Ok(InitialGuess {
            coefficients,
            orbital_energies,
            density,
            fock,
            energy,
        })
    }
}

/// Generalized Wolfsberg-Helmholz Fock matrix,
/// F_ij = 0.875 S_ij (H_ii + H_jj) off the diagonal and F_ii = H_ii.
pub fn gwh_matrix(core: &DMatrix<f64>, overlap: &DMatrix<f64>) -> DMatrix<f64> {
    let n = core.nrows();
    DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            core[(i, i)]
        } else {
            GWH_FACTOR * overlap[(i, j)] * (core[(i, i)] + core[(j, j)])
        }
    })
}

/// Hoffmann valence-state ionization potential in Hartree for the valence
/// `l` shell of element `z`, if tabulated.
pub fn valence_ionization_energy(z: u32, l: i32) -> Option<f64> {
    // (ns, np) in eV
    let (s, p) = match z {
        1 => (13.6, None),
        2 => (23.4, None),
        3 => (5.4, Some(3.5)),
        4 => (10.0, Some(6.0)),
        5 => (15.2, Some(8.5)),
        6 => (21.4, Some(11.4)),
        7 => (26.0, Some(13.4)),
        8 => (32.3, Some(14.8)),
        9 => (40.0, Some(18.1)),
        10 => (43.2, Some(20.0)),
        _ => return None,
    };
    let ev = match l {
        0 => Some(s),
        1 => p,
        _ => None,
    };
    ev.map(|v| v / HARTREE_TO_EV)
}

fn period(z: u32) -> i32 {
    match z {
        0..=2 => 1,
        3..=10 => 2,
        11..=18 => 3,
        19..=36 => 4,
        _ => 5,
    }
}

/// Extended-Hückel Fock matrix. Valence functions (principal shell at or
/// above the element's period) take -VSIP on the diagonal; core and
/// unparameterised functions keep H_ii. Off-diagonal elements are
/// K S_ij (H_ii + H_jj) / 2.
pub fn huckel_matrix(core: &DMatrix<f64>, overlap: &DMatrix<f64>, labels: &[AoLabel]) -> DMatrix<f64> {
    let n = core.nrows();
    let diagonal = DVector::from_fn(n, |i, _| {
        labels
            .get(i)
            .filter(|label| label.n >= period(label.atomic_number))
            .and_then(|label| valence_ionization_energy(label.atomic_number, label.l))
            .map_or(core[(i, i)], |vsip| -vsip)
    });
    DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            diagonal[i]
        } else {
            HUCKEL_FACTOR * overlap[(i, j)] * (diagonal[i] + diagonal[j]) / 2.0
        }
    })
}

/// Maps occupied orbitals `ca_occ` of basis A into basis B.
///
/// With S_bb⁻¹ = ΛΛᵗ, M = S_bb⁻¹ S_abᵗ Ca and T = Caᵗ S_ab M, the result
/// Cb = M T^{-1/2} is orthonormal in S_bb. `s_ab` is n_a × n_b.
pub fn project_occupied(
    ca_occ: &DMatrix<f64>,
    s_ab: &DMatrix<f64>,
    target: &Orthogonalizer,
) -> Result<DMatrix<f64>, ScfError> {
    let m = target.overlap_inverse() * s_ab.transpose() * ca_occ;
    let t = symmetrize(&(ca_occ.transpose() * s_ab * &m));

    let (values, vectors) = sorted_symmetric_eigen(t);
    let min_eigenvalue = values.iter().copied().fold(f64::INFINITY, f64::min);
    if !(min_eigenvalue > PROJECTION_THRESHOLD) {
        return Err(ScfError::IllPosedProjection { min_eigenvalue });
    }

    let inv_sqrt = DVector::from_iterator(values.len(), values.iter().map(|v| 1.0 / v.sqrt()));
    let t_inv_sqrt = &vectors * DMatrix::from_diagonal(&inv_sqrt) * vectors.transpose();
    Ok(m * t_inv_sqrt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gwh_rule() {
        let h = DMatrix::from_row_slice(2, 2, &[-1.0, 0.3, 0.3, -0.5]);
        let s = DMatrix::from_row_slice(2, 2, &[1.0, 0.4, 0.4, 1.0]);
        let f = gwh_matrix(&h, &s);
        assert_eq!(f[(0, 0)], -1.0);
        assert_eq!(f[(1, 1)], -0.5);
        assert_relative_eq!(f[(0, 1)], 0.875 * 0.4 * -1.5, epsilon = 1e-15);
        assert_eq!(f[(0, 1)], f[(1, 0)]);
    }

    #[test]
    fn test_vsip_table() {
        assert_relative_eq!(valence_ionization_energy(1, 0).unwrap(), 13.6 / HARTREE_TO_EV);
        assert_relative_eq!(valence_ionization_energy(8, 1).unwrap(), 14.8 / HARTREE_TO_EV);
        assert!(valence_ionization_energy(1, 1).is_none());
        assert!(valence_ionization_energy(8, 2).is_none());
        assert!(valence_ionization_energy(26, 0).is_none());
    }

    #[test]
    fn test_huckel_keeps_core_diagonal_for_core_shells() {
        let label = |n, l| AoLabel {
            atom: 0,
            atomic_number: 8,
            n,
            l,
            shell_type: String::new(),
        };
        let labels = vec![label(1, 0), label(2, 0), label(2, 2)];
        let h = DMatrix::from_diagonal(&DVector::from_vec(vec![-20.0, -2.0, 1.0]));
        let s = DMatrix::identity(3, 3);
        let f = huckel_matrix(&h, &s, &labels);
        assert_eq!(f[(0, 0)], -20.0);
        assert_relative_eq!(f[(1, 1)], -32.3 / HARTREE_TO_EV);
        assert_eq!(f[(2, 2)], 1.0);
        // unlabeled functions fall back as well
        let f = huckel_matrix(&h, &s, &[]);
        assert_eq!(f, h);
    }

    #[test]
    fn test_projection_is_orthonormal() {
        // identical bases: the projection reproduces the orbitals up to a
        // rotation within the occupied space
        let s = DMatrix::from_row_slice(3, 3, &[1.0, 0.3, 0.1, 0.3, 1.0, 0.2, 0.1, 0.2, 1.0]);
        let ortho = Orthogonalizer::new(&s);
        let ca = ortho.matrix().columns(0, 2).into_owned();
        let cb = project_occupied(&ca, &s, &ortho).unwrap();
        assert_relative_eq!(cb.transpose() * &s * &cb, DMatrix::identity(2, 2), epsilon = 1e-12);
        let da = &ca * ca.transpose();
        let db = &cb * cb.transpose();
        assert_relative_eq!(da, db, epsilon = 1e-12);
    }

    #[test]
    fn test_ill_posed_projection() {
        // two occupied orbitals cannot live in a one-function basis
        let s_ab = DMatrix::from_row_slice(2, 1, &[1.0, 0.0]);
        let ortho = Orthogonalizer::new(&DMatrix::identity(1, 1));
        let ca = DMatrix::identity(2, 2);
        match project_occupied(&ca, &s_ab, &ortho) {
            Err(ScfError::IllPosedProjection { min_eigenvalue }) => assert!(min_eigenvalue.abs() < 1e-12),
            other => panic!("expected an ill-posed projection, got {:?}", other),
        }
    }
}
