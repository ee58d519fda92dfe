#![allow(non_snake_case)]
//! Cartesian Gaussian basis functions and their one- and two-electron
//! integrals (McMurchie-Davidson scheme), plus the basis-set library used to
//! place them on atoms.

extern crate nalgebra as na;

pub mod basis_set;
pub mod cgto;
pub mod error;
pub mod gto;
pub mod helper;

pub use basis_set::{element_from_symbol, AtomicBasis, BasisSet, Shell};
pub use cgto::ContractedGTO;
pub use error::BasisError;
pub use gto::{GTO, GTO1d};

use na::Vector3;

/// Integrals every basis-function type provides.
pub trait Basis {
    fn evaluate(&self, r: &Vector3<f64>) -> f64;
    /// Overlap <a|b>.
    fn Sab(a: &Self, b: &Self) -> f64;
    /// Kinetic energy <a|-1/2 nabla^2|b>.
    fn Tab(a: &Self, b: &Self) -> f64;
    /// Attraction to a point nucleus of charge `Z` at `R`.
    fn Vab(a: &Self, b: &Self, R: Vector3<f64>, Z: u32) -> f64;
    /// Electron repulsion (ab|cd), chemists' notation.
    fn JKabcd(a: &Self, b: &Self, c: &Self, d: &Self) -> f64;
    /// Three-centre repulsion (ab|c).
    fn JKabc(a: &Self, b: &Self, c: &Self) -> f64;
    /// Two-centre repulsion (a|b).
    fn JKab(a: &Self, b: &Self) -> f64;
}
