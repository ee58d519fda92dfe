use crate::config::Config;
use crate::molecule::{Atom, Molecule};
use color_eyre::eyre::{Result, WrapErr};
use nalgebra::Vector3;
use tracing::info;

/// Build the molecule defined in the YAML configuration.
pub fn build_molecule(config: &Config, charge_override: Option<i32>) -> Result<Molecule> {
    info!("\nPreparing geometry...");

    let atoms = config
        .geometry
        .iter()
        .map(|atom| {
            let position = Vector3::new(atom.coords[0], atom.coords[1], atom.coords[2]);
            Atom::from_symbol(&atom.element, position)
        })
        .collect::<Result<Vec<_>, _>>()
        .wrap_err("Invalid geometry")?;

    for (i, atom) in atoms.iter().enumerate() {
        info!(
            "  Atom {:>2} {:>2}: [{:.6}, {:.6}, {:.6}]",
            i + 1,
            atom.symbol,
            atom.position.x,
            atom.position.y,
            atom.position.z
        );
    }

    let charge = charge_override.or(config.charge).unwrap_or(0);
    let multiplicity = config.multiplicity.unwrap_or(1);
    let molecule = Molecule::new(atoms, charge, multiplicity).wrap_err("Unsupported electronic state")?;
    info!(
        "Charge {}, multiplicity {}, {} electrons",
        charge,
        multiplicity,
        molecule.n_electrons()
    );
    Ok(molecule)
}
