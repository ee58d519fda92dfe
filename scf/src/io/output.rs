//! Output formatting and logging utilities

use crate::rhf::ReferenceWavefunction;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::time::SystemTime as StdSystemTime;
use tracing::info;
use tracing_subscriber::{
    filter::LevelFilter, fmt::format::Writer, fmt::layer, fmt::time::FormatTime,
    layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

/// Custom time formatter that shows only seconds
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let now = StdSystemTime::now();
        let duration = now
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();

        // Format as HH:MM:SS (only seconds precision)
        let total_seconds = duration.as_secs();
        let hours = (total_seconds / 3600) % 24;
        let minutes = (total_seconds / 60) % 60;
        let seconds = total_seconds % 60;

        write!(w, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Setup output logging to file or stdout. `verbose` lowers the level to
/// debug.
pub fn setup_output(output_path: Option<&String>, verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    match output_path {
        Some(path) => {
            if let Ok(log) = File::create(path) {
                let file_layer = layer()
                    .with_writer(log)
                    .with_timer(SecondPrecisionTimer)
                    .with_ansi(false)
                    .with_filter(level);
                Registry::default().with(file_layer).init();
                info!("Output will be written to: {}", path);
            } else {
                eprintln!("Could not create output file: {}", path);
            }
        }
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(true)
                .with_filter(level);
            Registry::default().with(stdout_layer).init();
            info!("Output will be printed to stdout");
        }
    }
}

/// Plain-text summary of a converged reference: total energy and the
/// orbital energies with their occupations.
pub fn write_summary<W: Write>(
    writer: &mut W,
    wavefunction: &impl ReferenceWavefunction,
) -> std::io::Result<()> {
    let integrals = wavefunction.integrals();
    writeln!(
        writer,
        "Basis: {} ({} functions)",
        integrals.basis_name(),
        integrals.n_basis()
    )?;
    writeln!(
        writer,
        "Orbitals: {} occupied, {} virtual",
        wavefunction.ndocc(),
        wavefunction.nvir()
    )?;
    for (i, energy) in wavefunction.orbital_energies().iter().enumerate() {
        let occupation = if i < wavefunction.ndocc() { 2 } else { 0 };
        writeln!(writer, "  {:>4} {:>16.8} {}", i + 1, energy, occupation)?;
    }
    writeln!(writer, "Total energy: {:.10} au", wavefunction.energy())?;
    Ok(())
}
