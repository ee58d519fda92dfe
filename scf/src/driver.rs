//! One-call entry point: options and a molecule in, SCF outcome out.

use crate::config::{FittingBasis, FockAlgorithm, ScfOptions, ScfSettings};
use crate::error::ScfError;
use crate::guess::GuessStrategy;
use crate::integrals::IntegralContext;
use crate::io::load_basis;
use crate::molecule::Molecule;
use crate::rhf::{Rhf, ScfOutcome};
use basis::BasisSet;
use std::sync::Arc;
use tracing::info;

/// Validates `options`, builds the integrals the chosen algorithm needs and
/// runs the SCF. With `basis_guess` set, a calculation in that basis runs
/// first and its occupied orbitals are projected into the target basis.
pub fn run_rhf(molecule: Arc<Molecule>, options: &ScfOptions) -> Result<ScfOutcome, ScfError> {
    let settings = ScfSettings::from_options(options)?;
    run_with_settings(molecule, settings)
}

pub fn run_with_settings(
    molecule: Arc<Molecule>,
    settings: ScfSettings,
) -> Result<ScfOutcome, ScfError> {
    let basis = load_basis(&settings.basis)?;

    let guess = match &settings.basis_guess {
        Some(small) => {
            info!("Converging in {} for a projection guess", small);
            let small_settings = ScfSettings {
                basis: small.clone(),
                basis_guess: None,
                ..settings.clone()
            };
            let source = run_with_settings(molecule.clone(), small_settings)?.into_result()?;
            GuessStrategy::Projection(Box::new(source))
        }
        None => GuessStrategy::from(settings.guess),
    };

    let integrals = Arc::new(build_integrals(&molecule, &basis, &settings)?);
    Rhf::new(settings, molecule, integrals)?.compute(&guess)
}

/// One-electron integrals plus whatever two-electron quantity the Fock
/// algorithm reads.
pub fn build_integrals(
    molecule: &Molecule,
    basis: &BasisSet,
    settings: &ScfSettings,
) -> Result<IntegralContext, ScfError> {
    let integrals = IntegralContext::one_electron(molecule, basis)?;
    match settings.algorithm {
        FockAlgorithm::Conventional => Ok(integrals.with_four_index()),
        FockAlgorithm::DensityFitted => {
            let FittingBasis::EvenTempered { beta } = settings.jkfit;
            let fitting = basis.even_tempered(&molecule.atomic_numbers(), beta)?;
            integrals.with_fitted(molecule, &fitting)
        }
    }
}
