//! Closed-shell Fock matrix construction, F = H + 2J - K, for a density
//! normalized as D = Co Coᵗ.

use crate::config::FockAlgorithm;
use crate::error::ScfError;
use crate::integrals::{IntegralContext, FITTED, FOUR_INDEX};
use nalgebra::DMatrix;
use rayon::prelude::*;
use std::sync::Arc;

/// Two-electron strategy, chosen once per run.
#[derive(Debug, Clone)]
pub enum FockBuilder {
    Conventional(Arc<IntegralContext>),
    DensityFitted(Arc<IntegralContext>),
}

impl FockBuilder {
    /// Fails with `MissingIntegral` when the context lacks what the
    /// algorithm needs, and with `IntegralShape` when its dimension does
    /// not match the one-electron matrices.
    pub fn new(algorithm: FockAlgorithm, integrals: Arc<IntegralContext>) -> Result<Self, ScfError> {
        let n = integrals.n_basis();
        let (key, size) = match algorithm {
            FockAlgorithm::Conventional => (FOUR_INDEX, integrals.eri()?.size()),
            FockAlgorithm::DensityFitted => (FITTED, integrals.fitted()?.size()),
        };
        if size != n {
            return Err(ScfError::IntegralShape {
                key: key.to_string(),
                detail: format!("built for {} functions, basis has {}", size, n),
            });
        }
        Ok(match algorithm {
            FockAlgorithm::Conventional => FockBuilder::Conventional(integrals),
            FockAlgorithm::DensityFitted => FockBuilder::DensityFitted(integrals),
        })
    }

    pub fn algorithm(&self) -> FockAlgorithm {
        match self {
            FockBuilder::Conventional(_) => FockAlgorithm::Conventional,
            FockBuilder::DensityFitted(_) => FockAlgorithm::DensityFitted,
        }
    }

    pub fn integrals(&self) -> &Arc<IntegralContext> {
        match self {
            FockBuilder::Conventional(integrals) | FockBuilder::DensityFitted(integrals) => integrals,
        }
    }

    /// Coulomb and exchange matrices for `density`.
    pub fn coulomb_exchange(
        &self,
        density: &DMatrix<f64>,
    ) -> Result<(DMatrix<f64>, DMatrix<f64>), ScfError> {
        match self {
            FockBuilder::Conventional(integrals) => conventional_jk(integrals, density),
            FockBuilder::DensityFitted(integrals) => fitted_jk(integrals, density),
        }
    }

    pub fn build_fock(
        &self,
        density: &DMatrix<f64>,
        core_hamiltonian: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>, ScfError> {
        let (j, k) = self.coulomb_exchange(density)?;
        Ok(core_hamiltonian + j * 2.0 - k)
    }
}

fn conventional_jk(
    integrals: &IntegralContext,
    density: &DMatrix<f64>,
) -> Result<(DMatrix<f64>, DMatrix<f64>), ScfError> {
    let eri = integrals.eri()?;
    let n = density.nrows();

    // J_ij = Σ_kl (ij|kl) D_kl, K_ij = Σ_kl (ik|jl) D_kl
    let rows: Vec<(Vec<f64>, Vec<f64>)> = (0..n)
        .into_par_iter()
        .map(|i| {
            let mut j_row = vec![0.0; n];
            let mut k_row = vec![0.0; n];
            for j in 0..n {
                let mut jv = 0.0;
                let mut kv = 0.0;
                for k in 0..n {
                    for l in 0..n {
                        let d = density[(k, l)];
                        jv += eri.get(i, j, k, l) * d;
                        kv += eri.get(i, k, j, l) * d;
                    }
                }
                j_row[j] = jv;
                k_row[j] = kv;
            }
            (j_row, k_row)
        })
        .collect();

    let mut coulomb = DMatrix::zeros(n, n);
    let mut exchange = DMatrix::zeros(n, n);
    for (i, (j_row, k_row)) in rows.into_iter().enumerate() {
        for j in 0..n {
            coulomb[(i, j)] = j_row[j];
            exchange[(i, j)] = k_row[j];
        }
    }
    Ok((coulomb, exchange))
}

fn fitted_jk(
    integrals: &IntegralContext,
    density: &DMatrix<f64>,
) -> Result<(DMatrix<f64>, DMatrix<f64>), ScfError> {
    let factors = integrals.fitted()?.factors();
    let n = density.nrows();

    let terms: Vec<(DMatrix<f64>, DMatrix<f64>)> = factors
        .par_iter()
        .map(|b| {
            let gamma = b.dot(density);
            (b * gamma, b * density * b)
        })
        .collect();

    // summed in auxiliary order
    let (coulomb, exchange) = terms.into_iter().fold(
        (DMatrix::zeros(n, n), DMatrix::zeros(n, n)),
        |(j, k), (dj, dk)| (j + dj, k + dk),
    );
    Ok((coulomb, exchange))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrals::{EriTensor, FittedIntegrals};
    use crate::linalg::density_from_coefficients;
    use crate::molecule::Molecule;
    use approx::assert_relative_eq;
    use basis::BasisSet;

    fn h2_context() -> (Molecule, IntegralContext) {
        let molecule =
            Molecule::from_symbols(&[("H", [0.0, 0.0, 0.0]), ("H", [0.0, 0.0, 1.4])]).unwrap();
        let basis = BasisSet::builtin("sto-3g").unwrap();
        let ints = IntegralContext::one_electron(&molecule, &basis).unwrap();
        (molecule, ints)
    }

    #[test]
    fn test_missing_two_electron_integrals() {
        let (_, ints) = h2_context();
        let ints = Arc::new(ints);
        assert_eq!(
            FockBuilder::new(FockAlgorithm::Conventional, ints.clone()).unwrap_err(),
            ScfError::MissingIntegral("ERI".to_string())
        );
        assert_eq!(
            FockBuilder::new(FockAlgorithm::DensityFitted, ints).unwrap_err(),
            ScfError::MissingIntegral("DF".to_string())
        );
    }

    #[test]
    fn test_tensor_dimension_must_match_basis() {
        let (_, ints) = h2_context();
        let eri = EriTensor::from_fn(3, |_, _, _, _| 0.0);
        let ints = Arc::new(ints.with_eri(eri));
        assert!(matches!(
            FockBuilder::new(FockAlgorithm::Conventional, ints),
            Err(ScfError::IntegralShape { ref key, .. }) if key == "ERI"
        ));

        let (_, ints) = h2_context();
        let factors = FittedIntegrals::from_factors(1, vec![DMatrix::identity(1, 1)]).unwrap();
        let ints = Arc::new(ints.with_fitted_factors(factors));
        assert!(matches!(
            FockBuilder::new(FockAlgorithm::DensityFitted, ints),
            Err(ScfError::IntegralShape { ref key, .. }) if key == "DF"
        ));
    }

    #[test]
    fn test_h2_sigma_g_coulomb_exchange() {
        let (_, ints) = h2_context();
        let ints = Arc::new(ints.with_four_index());
        let s12 = ints.overlap().unwrap()[(0, 1)];
        let c = 1.0 / (2.0 * (1.0 + s12)).sqrt();
        let coefficients = DMatrix::from_row_slice(2, 1, &[c, c]);
        let density = density_from_coefficients(&coefficients, 1);

        let builder = FockBuilder::new(FockAlgorithm::Conventional, ints.clone()).unwrap();
        let (j, k) = builder.coulomb_exchange(&density).unwrap();
        // for a single occupied orbital J and K coincide
        assert_relative_eq!(j, k, epsilon = 1e-12);
        // J_11 of the bonding orbital: c²((11|11) + (11|22) + 2(11|12))
        let expected = c * c * (0.7746 + 0.5697 + 2.0 * 0.4441);
        assert_relative_eq!(j[(0, 0)], expected, epsilon = 1e-3);

        let core = ints.core_hamiltonian().unwrap();
        let fock = builder.build_fock(&density, &core).unwrap();
        assert_relative_eq!(fock.clone(), fock.transpose(), epsilon = 1e-14);
    }

    #[test]
    fn test_fitted_matches_conventional_roughly() {
        let (molecule, ints) = h2_context();
        let fitting = BasisSet::builtin("sto-3g")
            .unwrap()
            .even_tempered(&molecule.atomic_numbers(), 2.0)
            .unwrap();
        let ints = Arc::new(ints.with_four_index().with_fitted(&molecule, &fitting).unwrap());
        let density = DMatrix::from_row_slice(2, 2, &[0.3, 0.3, 0.3, 0.3]);

        let exact = FockBuilder::new(FockAlgorithm::Conventional, ints.clone()).unwrap();
        let fitted = FockBuilder::new(FockAlgorithm::DensityFitted, ints).unwrap();
        let (j0, k0) = exact.coulomb_exchange(&density).unwrap();
        let (j1, k1) = fitted.coulomb_exchange(&density).unwrap();
        assert_relative_eq!(j0, j1, epsilon = 1e-2);
        assert_relative_eq!(k0, k1, epsilon = 1e-2);
    }
}
