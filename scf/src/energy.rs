use nalgebra::DMatrix;

/// Closed-shell electronic energy E = Σ_ij D_ij (H_ij + F_ij).
pub fn electronic_energy(density: &DMatrix<f64>, core: &DMatrix<f64>, fock: &DMatrix<f64>) -> f64 {
    density.dot(&(core + fock))
}
