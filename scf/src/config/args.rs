//! Command-line argument parsing for RHF calculations

use super::ScfOptions;
use clap::Parser;

/// Restricted Hartree-Fock calculation with YAML configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write a plain-text energy summary to this file
    #[arg(long)]
    pub summary: Option<String>,

    /// Override Fock build algorithm (conventional or df)
    #[arg(long)]
    pub scf_alg: Option<String>,

    /// Override initial guess (core, gwh or huckel)
    #[arg(long)]
    pub scf_guess: Option<String>,

    /// Override orbital basis (builtin name or NWChem file)
    #[arg(long)]
    pub basis: Option<String>,

    /// Converge in this basis first and project the orbitals
    #[arg(long)]
    pub basis_guess: Option<String>,

    /// Override maximum SCF iterations
    #[arg(long)]
    pub max_iter: Option<usize>,

    /// Override density RMS convergence threshold
    #[arg(long)]
    pub max_rms: Option<f64>,

    /// Disable DIIS extrapolation
    #[arg(long)]
    pub no_diis: bool,

    /// Disable the optimal damping line search
    #[arg(long)]
    pub no_oda: bool,

    /// Molecular charge (default: 0 for neutral)
    #[arg(long)]
    pub charge: Option<i32>,

    /// Log per-iteration details at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Command-line values take precedence over the job file.
    pub fn apply_overrides(&self, options: &mut ScfOptions) {
        if let Some(alg) = &self.scf_alg {
            options.scf_alg = Some(alg.clone());
        }
        if let Some(guess) = &self.scf_guess {
            options.scf_guess = Some(guess.clone());
        }
        if let Some(basis) = &self.basis {
            options.basis = Some(basis.clone());
        }
        if let Some(basis_guess) = &self.basis_guess {
            options.basis_guess = Some(basis_guess.clone());
        }
        if let Some(max_iter) = self.max_iter {
            options.scf_max_iter = Some(max_iter);
        }
        if let Some(max_rms) = self.max_rms {
            options.scf_max_rms = Some(max_rms);
        }
        if self.no_diis {
            options.diis = Some(false);
        }
        if self.no_oda {
            options.oda = Some(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_take_precedence() {
        let args = Args::parse_from(["rhf", "-c", "job.yaml", "--scf-alg", "df", "--max-iter", "7", "--no-diis"]);
        let mut options = ScfOptions::default();
        args.apply_overrides(&mut options);
        assert_eq!(args.config_file, "job.yaml");
        assert_eq!(options.scf_alg.as_deref(), Some("df"));
        assert_eq!(options.scf_max_iter, Some(7));
        assert_eq!(options.diis, Some(false));
        assert_eq!(options.oda, Some(true));
    }
}
