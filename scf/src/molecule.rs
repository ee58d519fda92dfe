use crate::error::ScfError;
use nalgebra::Vector3;
use basis::element_from_symbol;

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub symbol: String,
    pub atomic_number: u32,
    /// Cartesian position in bohr.
    pub position: Vector3<f64>,
}

impl Atom {
    pub fn from_symbol(symbol: &str, position: Vector3<f64>) -> Result<Self, ScfError> {
        let element = element_from_symbol(symbol.trim())
            .ok_or_else(|| ScfError::UnknownElement(symbol.to_string()))?;
        Ok(Atom {
            symbol: element.get_symbol().to_string(),
            atomic_number: element.get_atomic_number() as u32,
            position,
        })
    }
}

/// A closed-shell molecule: nuclei, total charge and spin multiplicity.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    atoms: Vec<Atom>,
    charge: i32,
    multiplicity: usize,
}

impl Molecule {
    /// Rejects anything RHF cannot describe: an odd electron count or a
    /// multiplicity other than one.
    pub fn new(atoms: Vec<Atom>, charge: i32, multiplicity: usize) -> Result<Self, ScfError> {
        let electrons =
            atoms.iter().map(|a| a.atomic_number as i64).sum::<i64>() - charge as i64;
        if electrons < 0 || electrons % 2 != 0 || multiplicity != 1 {
            return Err(ScfError::OpenShell {
                electrons,
                multiplicity,
            });
        }
        Ok(Molecule {
            atoms,
            charge,
            multiplicity,
        })
    }

    /// Neutral singlet from `(symbol, [x, y, z])` pairs in bohr.
    pub fn from_symbols(atoms: &[(&str, [f64; 3])]) -> Result<Self, ScfError> {
        let atoms = atoms
            .iter()
            .map(|(symbol, xyz)| Atom::from_symbol(symbol, Vector3::from(*xyz)))
            .collect::<Result<Vec<_>, _>>()?;
        Molecule::new(atoms, 0, 1)
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn charge(&self) -> i32 {
        self.charge
    }

    pub fn multiplicity(&self) -> usize {
        self.multiplicity
    }

    pub fn atomic_numbers(&self) -> Vec<u32> {
        self.atoms.iter().map(|a| a.atomic_number).collect()
    }

    pub fn n_electrons(&self) -> usize {
        let nuclear: i64 = self.atoms.iter().map(|a| a.atomic_number as i64).sum();
        (nuclear - self.charge as i64) as usize
    }

    /// Number of doubly occupied orbitals.
    pub fn ndocc(&self) -> usize {
        self.n_electrons() / 2
    }

    pub fn nuclear_repulsion(&self) -> f64 {
        let mut energy = 0.0;
        for (i, a) in self.atoms.iter().enumerate() {
            for b in &self.atoms[i + 1..] {
                let r = (a.position - b.position).norm();
                energy += (a.atomic_number * b.atomic_number) as f64 / r;
            }
        }
        energy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_water_electron_count() {
        let water = Molecule::from_symbols(&[
            ("O", [0.0, -0.143225816552, 0.0]),
            ("H", [1.638036840407, 1.136548822547, 0.0]),
            ("H", [-1.638036840407, 1.136548822547, 0.0]),
        ])
        .unwrap();
        assert_eq!(water.n_electrons(), 10);
        assert_eq!(water.ndocc(), 5);
        assert_eq!(water.atomic_numbers(), vec![8, 1, 1]);
        assert_relative_eq!(water.nuclear_repulsion(), 8.002367061810450, epsilon = 1e-9);
    }

    #[test]
    fn test_open_shell_is_rejected() {
        let h = Atom::from_symbol("H", Vector3::zeros()).unwrap();
        assert_eq!(
            Molecule::new(vec![h.clone()], 0, 2),
            Err(ScfError::OpenShell {
                electrons: 1,
                multiplicity: 2
            })
        );
        // H2+ with multiplicity 1 still has an odd electron count
        let h2 = vec![h.clone(), Atom { position: Vector3::new(0.0, 0.0, 1.4), ..h }];
        assert!(Molecule::new(h2, 1, 1).is_err());
    }

    #[test]
    fn test_unknown_element() {
        assert_eq!(
            Atom::from_symbol("Xx", Vector3::zeros()),
            Err(ScfError::UnknownElement("Xx".to_string()))
        );
        for bogus in ["", "1", " ", "A"] {
            assert_eq!(
                Atom::from_symbol(bogus, Vector3::zeros()),
                Err(ScfError::UnknownElement(bogus.to_string()))
            );
        }
        let lower = Atom::from_symbol("he", Vector3::zeros()).unwrap();
        assert_eq!(lower.symbol, "He");
    }
}
