use crate::rhf::{ReferenceWavefunction, RhfWavefunction};
use tracing::info;

pub fn report_restricted_summary(wfn: &RhfWavefunction) {
    info!("\nRHF calculation finished.");
    if wfn.dropped() > 0 {
        info!("  {} linearly dependent functions removed", wfn.dropped());
    }
    report_levels(wfn);

    info!("\nNuclear repulsion energy: {:.10} au", wfn.nuclear_repulsion());
    info!("Electronic energy:        {:.10} au", wfn.electronic_energy());
    info!("\nHartree-Fock Total Energy: {:.10} au", wfn.total_energy());
}

fn report_levels(wfn: &impl ReferenceWavefunction) {
    info!("\nFinal Energy Levels:");
    for (i, energy) in wfn.orbital_energies().iter().enumerate() {
        let tag = if i < wfn.ndocc() { "occ" } else { "vir" };
        info!("  Level {}: {:.8} au ({})", i + 1, energy, tag);
    }
}
