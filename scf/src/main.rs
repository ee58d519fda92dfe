//! RHF Calculation Command-Line Interface
//!
//! This is the main entry point for running RHF calculations with YAML configuration.

use color_eyre::eyre::Result;
use rhf_scf::app::RhfApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    RhfApplication::from_cli()?.run()
}
