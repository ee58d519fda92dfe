//! Optimal damping: an exact line search along D̃ + λ(D_new - D̃) of the
//! quadratic closed-shell energy model.

use nalgebra::DMatrix;

/// When the line search is used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OdaPolicy {
    pub enabled: bool,
    /// Only damp while the previous density RMS is above this.
    pub cutoff: f64,
    /// Never damp at or after this iteration.
    pub shutoff: usize,
}

impl OdaPolicy {
    pub fn active(&self, iteration: usize, previous_rms: f64) -> bool {
        self.enabled && previous_rms > self.cutoff && iteration < self.shutoff
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSearch {
    pub lambda: f64,
    pub slope: f64,
    pub curvature: f64,
}

/// E(λ) = E(0) + λ s + λ² c with s = 2 ΔD·F̃ and c = ΔD·(F_new - F̃). The
/// step is 1 when the parabola has no interior minimum in [0, 1].
pub fn line_search(
    damped_density: &DMatrix<f64>,
    damped_fock: &DMatrix<f64>,
    new_density: &DMatrix<f64>,
    new_fock: &DMatrix<f64>,
) -> LineSearch {
    let delta_d = new_density - damped_density;
    let slope = 2.0 * delta_d.dot(damped_fock);
    let curvature = delta_d.dot(&(new_fock - damped_fock));

    let lambda = if curvature <= -slope / 2.0 {
        1.0
    } else {
        (-slope / (2.0 * curvature)).clamp(0.0, 1.0)
    };

    LineSearch {
        lambda,
        slope,
        curvature,
    }
}
