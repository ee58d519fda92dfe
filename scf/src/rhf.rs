//! Restricted Hartree-Fock SCF loop.
//!
//! Each iteration diagonalizes the current Fock matrix in the orthogonal
//! basis, forms the new aufbau density and either takes an optimal-damping
//! step towards it (early phase) or accepts it outright, with DIIS
//! extrapolating the Fock matrix in the late phase. Convergence is judged
//! on the RMS change between the previous density and the freshly
//! diagonalized one.

use crate::config::ScfSettings;
use crate::diis::Diis;
use crate::energy::electronic_energy;
use crate::error::ScfError;
use crate::fock::FockBuilder;
use crate::guess::GuessStrategy;
use crate::integrals::IntegralContext;
use crate::linalg::{density_from_coefficients, rms_difference};
use crate::molecule::Molecule;
use crate::oda::{line_search, OdaPolicy};
use crate::orthogonalizer::Orthogonalizer;
use nalgebra::{DMatrix, DVector};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScfStage {
    Guessing,
    Iterating,
    Converged,
    MaxIterExceeded,
}

/// Which stabilization an iteration used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stabilizer {
    None,
    Oda { lambda: f64 },
    Diis { vectors: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    pub iteration: usize,
    /// Electronic energy after the update.
    pub energy: f64,
    pub delta_energy: f64,
    pub density_rms: f64,
    /// Largest element of the DIIS error vector, when one was formed.
    pub diis_error: Option<f64>,
    /// Tr(D S) of the updated density.
    pub density_trace: f64,
    pub stabilizer: Stabilizer,
}

/// Data downstream methods need from a converged reference.
pub trait ReferenceWavefunction {
    fn molecule(&self) -> &Arc<Molecule>;
    fn integrals(&self) -> &Arc<IntegralContext>;
    /// Total energy including nuclear repulsion.
    fn energy(&self) -> f64;
    fn orbital_energies(&self) -> &DVector<f64>;
    fn coefficients(&self) -> &DMatrix<f64>;
    fn ndocc(&self) -> usize;
    fn nvir(&self) -> usize;
}

/// Converged closed-shell wavefunction. Never modified after construction.
#[derive(Debug, Clone)]
pub struct RhfWavefunction {
    molecule: Arc<Molecule>,
    integrals: Arc<IntegralContext>,
    electronic_energy: f64,
    nuclear_repulsion: f64,
    orbital_energies: DVector<f64>,
    coefficients: DMatrix<f64>,
    density: DMatrix<f64>,
    fock: DMatrix<f64>,
    ndocc: usize,
    nvir: usize,
    iterations: usize,
    dropped: usize,
    history: Vec<IterationRecord>,
}

impl RhfWavefunction {
    pub fn electronic_energy(&self) -> f64 {
        self.electronic_energy
    }

    pub fn nuclear_repulsion(&self) -> f64 {
        self.nuclear_repulsion
    }

    pub fn total_energy(&self) -> f64 {
        self.electronic_energy + self.nuclear_repulsion
    }

    pub fn density(&self) -> &DMatrix<f64> {
        &self.density
    }

    pub fn fock(&self) -> &DMatrix<f64> {
        &self.fock
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Basis dimensions removed by the orthogonalizer.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn history(&self) -> &[IterationRecord] {
        &self.history
    }
}

impl ReferenceWavefunction for RhfWavefunction {
    fn molecule(&self) -> &Arc<Molecule> {
        &self.molecule
    }

    fn integrals(&self) -> &Arc<IntegralContext> {
        &self.integrals
    }

    fn energy(&self) -> f64 {
        self.total_energy()
    }

    fn orbital_energies(&self) -> &DVector<f64> {
        &self.orbital_energies
    }

    fn coefficients(&self) -> &DMatrix<f64> {
        &self.coefficients
    }

    fn ndocc(&self) -> usize {
        self.ndocc
    }

    fn nvir(&self) -> usize {
        self.nvir
    }
}

#[derive(Debug, Clone)]
pub struct NonConvergence {
    pub iterations: usize,
    pub last_energy: f64,
    pub density_rms: f64,
    pub history: Vec<IterationRecord>,
}

/// Terminal state of one SCF run.
#[derive(Debug, Clone)]
pub enum ScfOutcome {
    Converged(RhfWavefunction),
    MaxIterExceeded(NonConvergence),
}

impl ScfOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, ScfOutcome::Converged(_))
    }

    pub fn history(&self) -> &[IterationRecord] {
        match self {
            ScfOutcome::Converged(wfn) => wfn.history(),
            ScfOutcome::MaxIterExceeded(failure) => &failure.history,
        }
    }

    /// Treats an exhausted loop as an error.
    pub fn into_result(self) -> Result<RhfWavefunction, ScfError> {
        match self {
            ScfOutcome::Converged(wfn) => Ok(wfn),
            ScfOutcome::MaxIterExceeded(failure) => Err(ScfError::NotConverged {
                iterations: failure.iterations,
                density_rms: failure.density_rms,
            }),
        }
    }
}

/// Everything that changes between iterations, owned by one run.
struct ScfState {
    stage: ScfStage,
    iteration: usize,
    coefficients: DMatrix<f64>,
    orbital_energies: DVector<f64>,
    /// Current (possibly damped) density and its Fock matrix.
    density: DMatrix<f64>,
    fock: DMatrix<f64>,
    energy: f64,
    density_rms: f64,
    diis: Diis,
    history: Vec<IterationRecord>,
}

impl ScfState {
    fn new(diis: Diis) -> Self {
        ScfState {
            stage: ScfStage::Guessing,
            iteration: 0,
            coefficients: DMatrix::zeros(0, 0),
            orbital_energies: DVector::zeros(0),
            density: DMatrix::zeros(0, 0),
            fock: DMatrix::zeros(0, 0),
            energy: 0.0,
            density_rms: f64::INFINITY,
            diis,
            history: Vec::new(),
        }
    }
}

pub struct Rhf {
    settings: ScfSettings,
    molecule: Arc<Molecule>,
    integrals: Arc<IntegralContext>,
    orthogonalizer: Orthogonalizer,
    fock_builder: FockBuilder,
    core_hamiltonian: DMatrix<f64>,
    ndocc: usize,
}

impl Rhf {
    pub fn new(
        settings: ScfSettings,
        molecule: Arc<Molecule>,
        integrals: Arc<IntegralContext>,
    ) -> Result<Self, ScfError> {
        let fock_builder = FockBuilder::new(settings.algorithm, integrals.clone())?;
        let core_hamiltonian = integrals.core_hamiltonian()?;
        let orthogonalizer = Orthogonalizer::new(integrals.overlap()?);

        let ndocc = molecule.ndocc();
        if ndocc > orthogonalizer.n_mo() {
            return Err(ScfError::TooManyElectrons {
                ndocc,
                orbitals: orthogonalizer.n_mo(),
            });
        }
        info!(
            "RHF: {} basis functions, {} orbitals, {} doubly occupied",
            orthogonalizer.n_ao(),
            orthogonalizer.n_mo(),
            ndocc
        );

        Ok(Rhf {
            settings,
            molecule,
            integrals,
            orthogonalizer,
            fock_builder,
            core_hamiltonian,
            ndocc,
        })
    }

    pub fn orthogonalizer(&self) -> &Orthogonalizer {
        &self.orthogonalizer
    }

    pub fn ndocc(&self) -> usize {
        self.ndocc
    }

    fn oda_policy(&self) -> OdaPolicy {
        OdaPolicy {
            enabled: self.settings.oda,
            cutoff: self.settings.oda_cutoff,
            shutoff: self.settings.oda_shutoff,
        }
    }

    /// Runs the loop from `guess` until convergence or the iteration cap.
    pub fn compute(&self, guess: &GuessStrategy) -> Result<ScfOutcome, ScfError> {
        let mut state = ScfState::new(Diis::new(
            self.settings.diis_max_vecs,
            self.settings.diis_min_vecs,
        ));

        loop {
            state.stage = match state.stage {
                ScfStage::Guessing => self.start(&mut state, guess)?,
                ScfStage::Iterating => self.iterate(&mut state)?,
                ScfStage::Converged => return Ok(ScfOutcome::Converged(self.finish(state))),
                ScfStage::MaxIterExceeded => {
                    warn!(
                        "SCF did not converge in {} iterations (density RMS {:.3e})",
                        state.iteration, state.density_rms
                    );
                    return Ok(ScfOutcome::MaxIterExceeded(NonConvergence {
                        iterations: state.iteration,
                        last_energy: state.energy + self.integrals.nuclear_repulsion(),
                        density_rms: state.density_rms,
                        history: state.history,
                    }));
                }
            };
        }
    }

    fn start(&self, state: &mut ScfState, guess: &GuessStrategy) -> Result<ScfStage, ScfError> {
        let initial = guess.build(
            &self.integrals,
            &self.orthogonalizer,
            &self.fock_builder,
            self.ndocc,
        )?;
        state.coefficients = initial.coefficients;
        state.orbital_energies = initial.orbital_energies.unwrap_or_else(|| DVector::zeros(0));
        state.density = initial.density;
        state.fock = initial.fock;
        state.energy = initial.energy;
        info!("\nStarting SCF cycle...\n");
        Ok(ScfStage::Iterating)
    }

    fn iterate(&self, state: &mut ScfState) -> Result<ScfStage, ScfError> {
        let iteration = state.iteration + 1;
        let overlap = self.integrals.overlap()?;
        let damping = self.oda_policy().active(iteration, state.density_rms);

        let mut diis_error = None;
        let (fock, mut stabilizer) = if damping || !self.settings.diis {
            (state.fock.clone(), Stabilizer::None)
        } else {
            let error =
                Diis::error_vector(&state.fock, &state.density, overlap, &self.orthogonalizer);
            diis_error = Some(error.amax());
            state.diis.push(state.fock.clone(), error);
            match state.diis.extrapolate() {
                Some(extrapolated) => (
                    extrapolated,
                    Stabilizer::Diis {
                        vectors: state.diis.len(),
                    },
                ),
                None => (state.fock.clone(), Stabilizer::None),
            }
        };

        let (orbital_energies, coefficients) = self.orthogonalizer.diagonalize(&fock);
        let new_density = density_from_coefficients(&coefficients, self.ndocc);
        let density_rms = rms_difference(&new_density, &state.density);
        let new_fock = self
            .fock_builder
            .build_fock(&new_density, &self.core_hamiltonian)?;
        let converged = density_rms < self.settings.max_rms;

        if damping && !converged {
            let step = line_search(&state.density, &state.fock, &new_density, &new_fock);
            debug!(
                "ODA step: lambda = {:.6}, slope = {:.3e}, curvature = {:.3e}",
                step.lambda, step.slope, step.curvature
            );
            let delta_density = (new_density - &state.density) * step.lambda;
            let delta_fock = (new_fock - &state.fock) * step.lambda;
            state.density += delta_density;
            state.fock += delta_fock;
            stabilizer = Stabilizer::Oda {
                lambda: step.lambda,
            };
        } else {
            state.density = new_density;
            state.fock = new_fock;
        }

        let energy = electronic_energy(&state.density, &self.core_hamiltonian, &state.fock);
        let delta_energy = energy - state.energy;
        let density_trace = (&state.density * overlap).trace();

        info!(
            "Cycle {}: E = {:.12} au, dE = {:.3e} au, rms(D) = {:.3e}{}",
            iteration,
            energy + self.integrals.nuclear_repulsion(),
            delta_energy,
            density_rms,
            match stabilizer {
                Stabilizer::None => String::new(),
                Stabilizer::Oda { lambda } => format!(", ODA lambda = {:.4}", lambda),
                Stabilizer::Diis { vectors } => format!(", DIIS({})", vectors),
            }
        );

        state.history.push(IterationRecord {
            iteration,
            energy,
            delta_energy,
            density_rms,
            diis_error,
            density_trace,
            stabilizer,
        });
        state.iteration = iteration;
        state.coefficients = coefficients;
        state.orbital_energies = orbital_energies;
        state.energy = energy;
        state.density_rms = density_rms;

        Ok(if converged {
            ScfStage::Converged
        } else if iteration >= self.settings.max_iter {
            ScfStage::MaxIterExceeded
        } else {
            ScfStage::Iterating
        })
    }

    fn finish(&self, state: ScfState) -> RhfWavefunction {
        let nuclear_repulsion = self.integrals.nuclear_repulsion();
        info!(
            "SCF converged in {} iterations: E = {:.12} au",
            state.iteration,
            state.energy + nuclear_repulsion
        );
        RhfWavefunction {
            molecule: self.molecule.clone(),
            integrals: self.integrals.clone(),
            electronic_energy: state.energy,
            nuclear_repulsion,
            orbital_energies: state.orbital_energies,
            coefficients: state.coefficients,
            density: state.density,
            fock: state.fock,
            ndocc: self.ndocc,
            nvir: self.orthogonalizer.n_mo() - self.ndocc,
            iterations: state.iteration,
            dropped: self.orthogonalizer.dropped(),
            history: state.history,
        }
    }
}
