//! Input/Output operations for RHF calculations
//!
//! This module handles logging setup and basis set loading.

mod basis_loader;
mod output;

pub use basis_loader::load_basis;
pub use output::{setup_output, write_summary};
