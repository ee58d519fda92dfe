use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum BasisError {
    /// No basis set with this name is bundled.
    UnknownBasis(String),
    /// The basis set has no functions for the element.
    MissingElement { basis: String, atomic_number: u32 },
    /// Malformed NWChem input.
    Parse { line: usize, message: String },
}

impl fmt::Display for BasisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasisError::UnknownBasis(name) => write!(f, "unknown basis set '{}'", name),
            BasisError::MissingElement {
                basis,
                atomic_number,
            } => write!(
                f,
                "basis set '{}' has no functions for element Z = {}",
                basis, atomic_number
            ),
            BasisError::Parse { line, message } => {
                write!(f, "basis parse error at line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for BasisError {}
