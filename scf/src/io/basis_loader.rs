//! Basis set loading utilities

use crate::error::ScfError;
use basis::BasisSet;
use std::fs;
use std::path::Path;
use tracing::info;

/// Resolves `name` to a basis set: an existing NWChem-format file is read
/// from disk, anything else must be a builtin basis name.
pub fn load_basis(name: &str) -> Result<BasisSet, ScfError> {
    let path = Path::new(name);
    if path.is_file() {
        info!("Loading basis set from file: {}", name);
        let content = fs::read_to_string(path).map_err(|err| ScfError::Configuration {
            key: "basis",
            value: format!("{} ({})", name, err),
        })?;
        let label = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(name);
        return Ok(BasisSet::parse_nwchem(label, &content)?);
    }

    Ok(BasisSet::builtin(name)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use basis::BasisError;

    #[test]
    fn test_builtin_and_unknown_names() {
        assert_eq!(load_basis("sto-3g").unwrap().name, "sto-3g");
        assert!(matches!(
            load_basis("def2-qzvppd"),
            Err(ScfError::Basis(BasisError::UnknownBasis(_)))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("minimal-h-{}.nwchem", std::process::id()));
        fs::write(
            &path,
            "BASIS \"ao basis\" PRINT\nH    S\n      1.0  1.0\nEND\n",
        )
        .unwrap();
        let basis = load_basis(path.to_str().unwrap()).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(basis.atom(1).unwrap().shells.len(), 1);
        assert!(basis.name.starts_with("minimal-h-"));
    }
}
