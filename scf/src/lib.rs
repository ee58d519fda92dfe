// Main library file for RHF calculations

pub mod app;
pub mod config;
pub mod diis;
pub mod driver;
pub mod energy;
pub mod error;
pub mod fock;
pub mod guess;
pub mod integrals;
pub mod io;
pub mod linalg;
pub mod molecule;
pub mod oda;
pub mod orthogonalizer;
pub mod rhf;

pub use config::{FockAlgorithm, GuessKind, ScfOptions, ScfSettings};
pub use driver::run_rhf;
pub use error::ScfError;
pub use fock::FockBuilder;
pub use guess::{GuessStrategy, InitialGuess};
pub use integrals::IntegralContext;
pub use molecule::{Atom, Molecule};
pub use orthogonalizer::Orthogonalizer;
pub use rhf::{
    IterationRecord, NonConvergence, ReferenceWavefunction, Rhf, RhfWavefunction, ScfOutcome,
    Stabilizer,
};
