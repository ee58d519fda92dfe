use crate::driver::run_rhf;
use crate::molecule::Molecule;
use crate::rhf::{RhfWavefunction, ScfOutcome};
use crate::config::ScfOptions;
use color_eyre::eyre::{eyre, Result, WrapErr};
use std::sync::Arc;
use tracing::info;

pub fn run_restricted(molecule: Arc<Molecule>, options: &ScfOptions) -> Result<RhfWavefunction> {
    info!("\nInitializing RHF calculation...");
    info!(
        "  algorithm = {}, guess = {}, basis = {}",
        options.scf_alg.as_deref().unwrap_or("conventional"),
        options.scf_guess.as_deref().unwrap_or("core"),
        options.basis.as_deref().unwrap_or("sto-3g")
    );

    match run_rhf(molecule, options).wrap_err("RHF calculation failed")? {
        ScfOutcome::Converged(wfn) => Ok(wfn),
        ScfOutcome::MaxIterExceeded(failure) => Err(eyre!(
            "SCF did not converge in {} iterations (last energy {:.10} au, density RMS {:.3e})",
            failure.iterations,
            failure.last_energy,
            failure.density_rms
        )),
    }
}
