mod geometry;
mod report;
mod runner;

pub use geometry::build_molecule;
pub use runner::run_restricted;

use self::report::report_restricted_summary;
use crate::config::{Args, Config};
use crate::io::{setup_output, write_summary};
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::fs::{self, File};
use std::sync::Arc;
use tracing::info;

pub struct RhfApplication {
    args: Args,
    config: Config,
}

impl RhfApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = load_config(&args)?;
        Ok(Self { args, config })
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_ref(), self.args.verbose);
        info!("Configuration loaded from: {}", self.args.config_file);

        let molecule = Arc::new(build_molecule(&self.config, self.args.charge)?);
        let wfn = run_restricted(molecule, &self.config.scf_params)?;
        report_restricted_summary(&wfn);

        if let Some(path) = &self.args.summary {
            let mut file = File::create(path)
                .wrap_err_with(|| format!("Unable to create summary file: {}", path))?;
            write_summary(&mut file, &wfn).wrap_err("Failed to write summary")?;
            info!("Summary written to: {}", path);
        }

        Ok(())
    }
}

/// Reads the YAML job and applies command-line overrides.
fn load_config(args: &Args) -> Result<Config> {
    let config_content = fs::read_to_string(&args.config_file)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", args.config_file))?;

    let mut config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?;
    args.apply_overrides(&mut config.scf_params);

    Ok(config.with_defaults())
}
