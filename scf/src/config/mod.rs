//! Configuration management for RHF calculations
//!
//! This module handles the YAML job structure, option defaults, and the
//! validation that turns loosely typed options into [`ScfSettings`].

mod args;

pub use args::Args;

use crate::error::ScfError;
use serde::{Deserialize, Serialize};

/// Main configuration structure for a calculation
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub geometry: Vec<Atom>,
    #[serde(default)]
    pub scf_params: ScfOptions,
    pub charge: Option<i32>,
    pub multiplicity: Option<usize>,
}

impl Config {
    pub fn with_defaults(mut self) -> Self {
        self.scf_params = self.scf_params.with_defaults();
        if self.charge.is_none() {
            self.charge = Some(0);
        }
        if self.multiplicity.is_none() {
            self.multiplicity = Some(1);
        }
        self
    }
}

/// Atomic position configuration (bohr)
#[derive(Debug, Deserialize, Serialize)]
pub struct Atom {
    pub element: String,
    pub coords: [f64; 3],
}

/// SCF options as they appear in the job file; missing entries are filled
/// by [`ScfOptions::with_defaults`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScfOptions {
    pub scf_alg: Option<String>,
    pub scf_guess: Option<String>,
    pub scf_max_rms: Option<f64>,
    pub scf_max_iter: Option<usize>,
    pub oda: Option<bool>,
    pub oda_cutoff: Option<f64>,
    pub oda_shutoff: Option<usize>,
    pub diis: Option<bool>,
    pub diis_max_vecs: Option<usize>,
    pub diis_min_vecs: Option<usize>,
    pub basis: Option<String>,
    pub jkfit: Option<String>,
    /// Smaller basis to converge first and project from.
    pub basis_guess: Option<String>,
}

impl Default for ScfOptions {
    fn default() -> Self {
        ScfOptions {
            scf_alg: Some("conventional".to_string()),
            scf_guess: Some("core".to_string()),
            scf_max_rms: Some(1e-8),
            scf_max_iter: Some(100),
            oda: Some(true),
            oda_cutoff: Some(1e-4),
            oda_shutoff: Some(20),
            diis: Some(true),
            diis_max_vecs: Some(8),
            diis_min_vecs: Some(2),
            basis: Some("sto-3g".to_string()),
            jkfit: Some("even-tempered".to_string()),
            basis_guess: None,
        }
    }
}

impl ScfOptions {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.scf_alg.is_none() {
            self.scf_alg = defaults.scf_alg;
        }
        if self.scf_guess.is_none() {
            self.scf_guess = defaults.scf_guess;
        }
        if self.scf_max_rms.is_none() {
            self.scf_max_rms = defaults.scf_max_rms;
        }
        if self.scf_max_iter.is_none() {
            self.scf_max_iter = defaults.scf_max_iter;
        }
        if self.oda.is_none() {
            self.oda = defaults.oda;
        }
        if self.oda_cutoff.is_none() {
            self.oda_cutoff = defaults.oda_cutoff;
        }
        if self.oda_shutoff.is_none() {
            self.oda_shutoff = defaults.oda_shutoff;
        }
        if self.diis.is_none() {
            self.diis = defaults.diis;
        }
        if self.diis_max_vecs.is_none() {
            self.diis_max_vecs = defaults.diis_max_vecs;
        }
        if self.diis_min_vecs.is_none() {
            self.diis_min_vecs = defaults.diis_min_vecs;
        }
        if self.basis.is_none() {
            self.basis = defaults.basis;
        }
        if self.jkfit.is_none() {
            self.jkfit = defaults.jkfit;
        }
        self
    }
}

/// How the two-electron part of the Fock matrix is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FockAlgorithm {
    Conventional,
    DensityFitted,
}

impl FockAlgorithm {
    pub fn parse(value: &str) -> Result<Self, ScfError> {
        match value.to_ascii_lowercase().as_str() {
            "conventional" | "pk" | "direct" => Ok(FockAlgorithm::Conventional),
            "df" | "density-fitted" | "ri" => Ok(FockAlgorithm::DensityFitted),
            _ => Err(ScfError::Configuration {
                key: "scf_alg",
                value: value.to_string(),
            }),
        }
    }
}

/// Initial guess requested by name. Projection is not selectable here; it
/// is implied by `basis_guess`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessKind {
    Core,
    Gwh,
    Huckel,
}

impl GuessKind {
    pub fn parse(value: &str) -> Result<Self, ScfError> {
        match value.to_ascii_lowercase().as_str() {
            "core" => Ok(GuessKind::Core),
            "gwh" => Ok(GuessKind::Gwh),
            "huckel" | "hückel" => Ok(GuessKind::Huckel),
            _ => Err(ScfError::Configuration {
                key: "scf_guess",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FittingBasis {
    /// Generated from the orbital basis with the given exponent ratio.
    EvenTempered { beta: f64 },
}

impl FittingBasis {
    pub const DEFAULT_BETA: f64 = 2.0;

    pub fn parse(value: &str) -> Result<Self, ScfError> {
        match value.to_ascii_lowercase().as_str() {
            "even-tempered" | "etb" => Ok(FittingBasis::EvenTempered {
                beta: FittingBasis::DEFAULT_BETA,
            }),
            _ => Err(ScfError::Configuration {
                key: "jkfit",
                value: value.to_string(),
            }),
        }
    }
}

/// Validated, fully typed SCF settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ScfSettings {
    pub algorithm: FockAlgorithm,
    pub guess: GuessKind,
    pub max_rms: f64,
    pub max_iter: usize,
    pub oda: bool,
    pub oda_cutoff: f64,
    pub oda_shutoff: usize,
    pub diis: bool,
    pub diis_max_vecs: usize,
    pub diis_min_vecs: usize,
    pub basis: String,
    pub jkfit: FittingBasis,
    pub basis_guess: Option<String>,
}

impl ScfSettings {
    pub fn from_options(options: &ScfOptions) -> Result<Self, ScfError> {
        let options = options.clone().with_defaults();
        let defaults = ScfOptions::default();

        let algorithm = FockAlgorithm::parse(options.scf_alg.as_deref().unwrap_or("conventional"))?;
        let guess = GuessKind::parse(options.scf_guess.as_deref().unwrap_or("core"))?;
        let jkfit = FittingBasis::parse(options.jkfit.as_deref().unwrap_or("even-tempered"))?;

        let max_rms = options.scf_max_rms.or(defaults.scf_max_rms).unwrap_or(1e-8);
        if !(max_rms > 0.0 && max_rms.is_finite()) {
            return Err(invalid("scf_max_rms", max_rms));
        }
        let max_iter = options.scf_max_iter.or(defaults.scf_max_iter).unwrap_or(100);
        if max_iter == 0 {
            return Err(invalid("scf_max_iter", max_iter));
        }
        let oda_cutoff = options.oda_cutoff.or(defaults.oda_cutoff).unwrap_or(1e-4);
        if !(oda_cutoff >= 0.0) {
            return Err(invalid("oda_cutoff", oda_cutoff));
        }
        let diis_max_vecs = options.diis_max_vecs.or(defaults.diis_max_vecs).unwrap_or(8);
        if diis_max_vecs == 0 {
            return Err(invalid("diis_max_vecs", diis_max_vecs));
        }
        let diis_min_vecs = options.diis_min_vecs.or(defaults.diis_min_vecs).unwrap_or(2);
        if diis_min_vecs == 0 || diis_min_vecs > diis_max_vecs {
            return Err(invalid("diis_min_vecs", diis_min_vecs));
        }

        let basis = options.basis.unwrap_or_else(|| "sto-3g".to_string());
        let basis_guess = options
            .basis_guess
            .filter(|b| !b.is_empty() && !b.eq_ignore_ascii_case(&basis));

        Ok(ScfSettings {
            algorithm,
            guess,
            max_rms,
            max_iter,
            oda: options.oda.unwrap_or(true),
            oda_cutoff,
            oda_shutoff: options.oda_shutoff.or(defaults.oda_shutoff).unwrap_or(20),
            diis: options.diis.unwrap_or(true),
            diis_max_vecs,
            diis_min_vecs,
            basis,
            jkfit,
            basis_guess,
        })
    }
}

fn invalid<T: ToString>(key: &'static str, value: T) -> ScfError {
    ScfError::Configuration {
        key,
        value: value.to_string(),
    }
}
