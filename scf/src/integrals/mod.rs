//! AO integrals for one molecule in one basis.
//!
//! The context is built once and then shared read-only (behind an `Arc`)
//! by the Fock builder, the guesses and the final wavefunction. Quantities
//! are looked up by key:
//!
//! | key     | content                               |
//! |---------|---------------------------------------|
//! | `"S"`   | overlap matrix                        |
//! | `"T"`   | kinetic energy matrix                 |
//! | `"V"`   | nuclear attraction matrix             |
//! | `"ERI"` | four-index repulsion tensor           |
//! | `"DF"`  | density-fitted three-index factors    |

mod eri;
mod fitted;

pub use eri::EriTensor;
pub use fitted::{FittedIntegrals, METRIC_CUTOFF};

use crate::error::ScfError;
use crate::molecule::Molecule;
use basis::{Basis, BasisSet, ContractedGTO};
use nalgebra::DMatrix;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{info, warn};

pub const OVERLAP: &str = "S";
pub const KINETIC: &str = "T";
pub const POTENTIAL: &str = "V";
pub const FOUR_INDEX: &str = "ERI";
pub const FITTED: &str = "DF";

/// Where an AO basis function lives and what kind of shell it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct AoLabel {
    /// Index of the atom in the molecule.
    pub atom: usize,
    pub atomic_number: u32,
    /// Principal quantum number as counted within the basis (1s, 2s, 2p, ...).
    pub n: i32,
    pub l: i32,
    pub shell_type: String,
}

#[derive(Debug, Clone)]
pub struct IntegralContext {
    basis_name: String,
    functions: Vec<ContractedGTO>,
    labels: Vec<AoLabel>,
    nuclear_repulsion: f64,
    matrices: HashMap<&'static str, DMatrix<f64>>,
    eri: Option<EriTensor>,
    fitted: Option<FittedIntegrals>,
}

fn place_functions(
    molecule: &Molecule,
    basis_set: &BasisSet,
) -> Result<(Vec<ContractedGTO>, Vec<AoLabel>), ScfError> {
    let mut functions = Vec::new();
    let mut labels = Vec::new();
    for (idx, atom) in molecule.atoms().iter().enumerate() {
        for f in basis_set.functions_on(atom.atomic_number, atom.position)? {
            labels.push(AoLabel {
                atom: idx,
                atomic_number: atom.atomic_number,
                n: f.n,
                l: f.l,
                shell_type: f.shell_type.clone(),
            });
            functions.push(f);
        }
    }
    Ok((functions, labels))
}

impl IntegralContext {
    /// Places `basis_set` on the molecule and evaluates S, T and V.
    pub fn one_electron(molecule: &Molecule, basis_set: &BasisSet) -> Result<Self, ScfError> {
        let (functions, labels) = place_functions(molecule, basis_set)?;
        let n = functions.len();
        info!(
            "Basis {}: {} functions on {} atoms",
            basis_set.name,
            n,
            molecule.atoms().len()
        );

        let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (0..=i).map(move |j| (i, j))).collect();
        let values: Vec<(f64, f64, f64)> = pairs
            .par_iter()
            .map(|&(i, j)| {
                let (a, b) = (&functions[i], &functions[j]);
                let v = molecule
                    .atoms()
                    .iter()
                    .map(|atom| ContractedGTO::Vab(a, b, atom.position, atom.atomic_number))
                    .sum::<f64>();
                (ContractedGTO::Sab(a, b), ContractedGTO::Tab(a, b), v)
            })
            .collect();

        let mut s = DMatrix::zeros(n, n);
        let mut t = DMatrix::zeros(n, n);
        let mut v = DMatrix::zeros(n, n);
        for (&(i, j), &(sij, tij, vij)) in pairs.iter().zip(&values) {
            s[(i, j)] = sij;
            s[(j, i)] = sij;
            t[(i, j)] = tij;
            t[(j, i)] = tij;
            v[(i, j)] = vij;
            v[(j, i)] = vij;
        }

        let mut matrices = HashMap::new();
        matrices.insert(OVERLAP, s);
        matrices.insert(KINETIC, t);
        matrices.insert(POTENTIAL, v);

        Ok(IntegralContext {
            basis_name: basis_set.name.clone(),
            functions,
            labels,
            nuclear_repulsion: molecule.nuclear_repulsion(),
            matrices,
            eri: None,
            fitted: None,
        })
    }

    /// Context from precomputed one-electron matrices, without basis
    /// functions. Two-electron quantities must be attached separately.
    pub fn from_matrices(s: DMatrix<f64>, t: DMatrix<f64>, v: DMatrix<f64>) -> Self {
        let mut matrices = HashMap::new();
        matrices.insert(OVERLAP, s);
        matrices.insert(KINETIC, t);
        matrices.insert(POTENTIAL, v);
        IntegralContext {
            basis_name: "custom".to_string(),
            functions: Vec::new(),
            labels: Vec::new(),
            nuclear_repulsion: 0.0,
            matrices,
            eri: None,
            fitted: None,
        }
    }

    pub fn with_nuclear_repulsion(mut self, energy: f64) -> Self {
        self.nuclear_repulsion = energy;
        self
    }

    /// Adds the full four-index tensor. Needs basis functions; a context
    /// built from bare matrices is left unchanged.
    pub fn with_four_index(mut self) -> Self {
        if self.functions.is_empty() {
            warn!("No basis functions to evaluate repulsion integrals over; attach them with with_eri");
            return self;
        }
        info!("Computing four-index repulsion integrals");
        self.eri = Some(EriTensor::from_basis(&self.functions));
        self
    }

    pub fn with_eri(mut self, eri: EriTensor) -> Self {
        self.eri = Some(eri);
        self
    }

    /// Adds fitted factors using `fitting` placed on the same atoms.
    pub fn with_fitted(mut self, molecule: &Molecule, fitting: &BasisSet) -> Result<Self, ScfError> {
        if self.functions.is_empty() {
            return Err(ScfError::IntegralShape {
                key: FITTED.to_string(),
                detail: "no basis functions to fit; attach factors with with_fitted_factors"
                    .to_string(),
            });
        }
        let (auxiliary, _) = place_functions(molecule, fitting)?;
        info!(
            "Density fitting with {}: {} auxiliary functions",
            fitting.name,
            auxiliary.len()
        );
        self.fitted = Some(FittedIntegrals::new(&self.functions, &auxiliary));
        Ok(self)
    }

    pub fn with_fitted_factors(mut self, fitted: FittedIntegrals) -> Self {
        self.fitted = Some(fitted);
        self
    }

    pub fn basis_name(&self) -> &str {
        &self.basis_name
    }

    pub fn n_basis(&self) -> usize {
        self.matrices.get(OVERLAP).map_or(0, |s| s.nrows())
    }

    pub fn functions(&self) -> &[ContractedGTO] {
        &self.functions
    }

    pub fn labels(&self) -> &[AoLabel] {
        &self.labels
    }

    pub fn nuclear_repulsion(&self) -> f64 {
        self.nuclear_repulsion
    }

    pub fn has(&self, key: &str) -> bool {
        match key {
            FOUR_INDEX => self.eri.is_some(),
            FITTED => self.fitted.is_some(),
            _ => self.matrices.contains_key(key),
        }
    }

    /// One-electron matrix by key. The two-electron keys name tensors, not
    /// matrices; use [`IntegralContext::eri`] and [`IntegralContext::fitted`].
    pub fn matrix(&self, key: &str) -> Result<&DMatrix<f64>, ScfError> {
        if key == FOUR_INDEX || key == FITTED {
            return Err(ScfError::IntegralShape {
                key: key.to_string(),
                detail: "two-electron quantity is not a matrix".to_string(),
            });
        }
        self.matrices
            .get(key)
            .ok_or_else(|| ScfError::MissingIntegral(key.to_string()))
    }

    pub fn overlap(&self) -> Result<&DMatrix<f64>, ScfError> {
        self.matrix(OVERLAP)
    }

    /// H = T + V.
    pub fn core_hamiltonian(&self) -> Result<DMatrix<f64>, ScfError> {
        Ok(self.matrix(KINETIC)? + self.matrix(POTENTIAL)?)
    }

    pub fn eri(&self) -> Result<&EriTensor, ScfError> {
        self.eri
            .as_ref()
            .ok_or_else(|| ScfError::MissingIntegral(FOUR_INDEX.to_string()))
    }

    pub fn fitted(&self) -> Result<&FittedIntegrals, ScfError> {
        self.fitted
            .as_ref()
            .ok_or_else(|| ScfError::MissingIntegral(FITTED.to_string()))
    }

    /// Mixed overlap <a_i|b_j> between this basis (rows) and `other`
    /// (columns), both placed on the same molecule.
    pub fn cross_overlap(&self, other: &IntegralContext) -> DMatrix<f64> {
        DMatrix::from_fn(self.functions.len(), other.functions.len(), |i, j| {
            ContractedGTO::Sab(&self.functions[i], &other.functions[j])
        })
    }
}
