use basis::BasisError;
use std::fmt;

/// Everything that can stop an RHF calculation.
///
/// An ill-conditioned overlap matrix is not an error; dropped dimensions are
/// recorded on the result.
#[derive(Debug, Clone, PartialEq)]
pub enum ScfError {
    /// A configuration value could not be interpreted.
    Configuration { key: &'static str, value: String },
    /// Basis set lookup or parsing failed.
    Basis(BasisError),
    /// The geometry names an element that does not exist.
    UnknownElement(String),
    /// RHF needs a closed-shell singlet.
    OpenShell { electrons: i64, multiplicity: usize },
    /// More electron pairs than linearly independent orbitals.
    TooManyElectrons { ndocc: usize, orbitals: usize },
    /// The integral context lacks a quantity the run needs.
    MissingIntegral(String),
    /// An integral is present but cannot be used as requested.
    IntegralShape { key: String, detail: String },
    /// The occupied space cannot be represented in the target basis.
    IllPosedProjection { min_eigenvalue: f64 },
    NotConverged { iterations: usize, density_rms: f64 },
}

impl fmt::Display for ScfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScfError::Configuration { key, value } => {
                write!(f, "invalid value '{}' for option '{}'", value, key)
            }
            ScfError::Basis(err) => write!(f, "{}", err),
            ScfError::UnknownElement(symbol) => write!(f, "unknown element symbol '{}'", symbol),
            ScfError::OpenShell {
                electrons,
                multiplicity,
            } => write!(
                f,
                "RHF requires a closed-shell singlet, got {} electrons with multiplicity {}",
                electrons, multiplicity
            ),
            ScfError::TooManyElectrons { ndocc, orbitals } => write!(
                f,
                "{} doubly occupied orbitals requested but only {} orbitals are available",
                ndocc, orbitals
            ),
            ScfError::MissingIntegral(key) => write!(f, "integral '{}' is not available", key),
            ScfError::IntegralShape { key, detail } => {
                write!(f, "integral '{}' cannot be used here: {}", key, detail)
            }
            ScfError::IllPosedProjection { min_eigenvalue } => write!(
                f,
                "basis projection is ill-posed: projected occupied overlap has eigenvalue {:.3e}",
                min_eigenvalue
            ),
            ScfError::NotConverged {
                iterations,
                density_rms,
            } => write!(
                f,
                "SCF did not converge in {} iterations (density RMS {:.3e})",
                iterations, density_rms
            ),
        }
    }
}

impl std::error::Error for ScfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScfError::Basis(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BasisError> for ScfError {
    fn from(err: BasisError) -> Self {
        ScfError::Basis(err)
    }
}
