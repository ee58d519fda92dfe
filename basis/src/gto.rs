#![allow(non_snake_case)]
extern crate nalgebra as na;

use crate::helper::boys_function;
use crate::Basis;
use itertools::iproduct;
use na::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq)]
pub struct GTO1d {
    pub alpha: f64,
    pub l: i32,
    pub center: f64,
    pub norm: f64,
}

fn factorial(n: i32) -> f64 {
    (1..=n).fold(1.0, |acc, x| acc * x as f64)
}

impl GTO1d {
    pub fn new(alpha: f64, l: i32, center: f64) -> Self {
        let norm = GTO1d::compute_norm(alpha, l);
        Self {
            alpha,
            l,
            center,
            norm,
        }
    }

    fn compute_norm(alpha: f64, l: i32) -> f64 {
        // N^2 = (2^(3l) * l! * alpha^l * sqrt(2 alpha / pi)) / (2l)!
        let numerator = 2.0_f64.powi(3 * l) * factorial(l) * alpha.powi(l);
        let factor = (2.0 * alpha / PI).sqrt();
        (numerator * factor / factorial(2 * l)).sqrt()
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let x = x - self.center;
        self.norm * x.powi(self.l) * (-self.alpha * x.powi(2)).exp()
    }

    /// Hermite expansion coefficient E^{ij}_t of the product of two 1d
    /// Gaussians with exponents `a`, `b` separated by `Qx = A - B`.
    pub fn Eab(i: i32, j: i32, t: i32, Qx: f64, a: f64, b: f64) -> f64 {
        let p = a + b;
        let q = a * b / p;

        if t < 0 || t > i + j || i < 0 || j < 0 {
            0.0
        } else if i == 0 && j == 0 && t == 0 {
            (-q * Qx.powi(2)).exp()
        } else if j == 0 {
            GTO1d::Eab(i - 1, j, t - 1, Qx, a, b) / (2.0 * p)
                - GTO1d::Eab(i - 1, j, t, Qx, a, b) * q * Qx / a
                + GTO1d::Eab(i - 1, j, t + 1, Qx, a, b) * ((t + 1) as f64)
        } else {
            GTO1d::Eab(i, j - 1, t - 1, Qx, a, b) / (2.0 * p)
                + GTO1d::Eab(i, j - 1, t, Qx, a, b) * q * Qx / b
                + GTO1d::Eab(i, j - 1, t + 1, Qx, a, b) * ((t + 1) as f64)
        }
    }

    pub(crate) fn Sab(a: &GTO1d, b: &GTO1d) -> f64 {
        let p = a.alpha + b.alpha;
        let Qx = a.center - b.center;
        GTO1d::Eab(a.l, b.l, 0, Qx, a.alpha, b.alpha) * (PI / p).sqrt() * a.norm * b.norm
    }

    pub(crate) fn Tab(a: &GTO1d, b: &GTO1d) -> f64 {
        let p = a.alpha + b.alpha;
        let Qx = a.center - b.center;
        let norm = a.norm * b.norm * (PI / p).sqrt();

        let term1 =
            b.l as f64 * (b.l as f64 - 1.0) * GTO1d::Eab(a.l, b.l - 2, 0, Qx, a.alpha, b.alpha);
        let term2 = -2.0
            * b.alpha
            * (2.0 * b.l as f64 + 1.0)
            * GTO1d::Eab(a.l, b.l, 0, Qx, a.alpha, b.alpha);
        let term3 = 4.0 * b.alpha.powi(2) * GTO1d::Eab(a.l, b.l + 2, 0, Qx, a.alpha, b.alpha);

        -0.5 * norm * (term1 + term2 + term3)
    }
}

/// Normalized Cartesian primitive x^lx y^ly z^lz exp(-alpha r^2).
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq)]
pub struct GTO {
    pub alpha: f64,
    pub l_xyz: Vector3<i32>,
    pub center: Vector3<f64>,
    pub norm: f64,
    pub gto1d: [GTO1d; 3],
}

impl GTO {
    pub fn new(alpha: f64, l_xyz: Vector3<i32>, center: Vector3<f64>) -> Self {
        let gto1d = [
            GTO1d::new(alpha, l_xyz.x, center.x),
            GTO1d::new(alpha, l_xyz.y, center.y),
            GTO1d::new(alpha, l_xyz.z, center.z),
        ];
        let norm = gto1d[0].norm * gto1d[1].norm * gto1d[2].norm;
        Self {
            alpha,
            l_xyz,
            center,
            norm,
            gto1d,
        }
    }

    /// The constant function 1 (zero exponent, unit norm). Pairing a
    /// primitive with it turns the four-centre routine into the three- and
    /// two-centre Coulomb integrals needed for density fitting.
    pub fn unit(center: Vector3<f64>) -> Self {
        let axis = |c: f64| GTO1d {
            alpha: 0.0,
            l: 0,
            center: c,
            norm: 1.0,
        };
        Self {
            alpha: 0.0,
            l_xyz: Vector3::zeros(),
            center,
            norm: 1.0,
            gto1d: [axis(center.x), axis(center.y), axis(center.z)],
        }
    }

    pub fn angular_momentum(&self) -> i32 {
        self.l_xyz.x + self.l_xyz.y + self.l_xyz.z
    }

    pub(crate) fn merge(a: &GTO, b: &GTO) -> GTO {
        let center = (a.center * a.alpha + b.center * b.alpha) / (a.alpha + b.alpha);
        let l_xyz = a.l_xyz + b.l_xyz;
        let alpha = a.alpha + b.alpha;
        GTO::new(alpha, l_xyz, center)
    }

    /// Computes the Coulomb auxiliary Hermite integrals.
    ///
    /// # Arguments
    ///
    /// * `t, u, v` - Orders of the Coulomb Hermite derivative in x, y, z directions, respectively
    /// * `n` - Order of the Boys function
    /// * `p` - Exponent of the Gaussian charge distribution
    /// * `PCx, PCy, PCz` - Cartesian distance components between the composite center P and center C
    /// * `RPC` - Distance between P and C
    ///
    /// Recursion from Helgaker, Jørgensen, and Taylor.
    #[allow(clippy::too_many_arguments)]
    pub fn hermite_coulomb(
        t: i32, u: i32, v: i32,
        n: i32, p: f64,
        PCx: f64, PCy: f64, PCz: f64, RPC: f64,
    ) -> f64 {
        let T = p * RPC * RPC;
        let mut val = 0.0;

        if t == 0 && u == 0 && v == 0 {
            val += (-2.0 * p).powi(n) * boys_function(n, T);
        } else if t == 0 && u == 0 {
            if v > 1 {
                val += (v as f64 - 1.0)
                    * GTO::hermite_coulomb(t, u, v - 2, n + 1, p, PCx, PCy, PCz, RPC);
            }
            val += PCz * GTO::hermite_coulomb(t, u, v - 1, n + 1, p, PCx, PCy, PCz, RPC);
        } else if t == 0 {
            if u > 1 {
                val += (u as f64 - 1.0)
                    * GTO::hermite_coulomb(t, u - 2, v, n + 1, p, PCx, PCy, PCz, RPC);
            }
            val += PCy * GTO::hermite_coulomb(t, u - 1, v, n + 1, p, PCx, PCy, PCz, RPC);
        } else {
            if t > 1 {
                val += (t as f64 - 1.0)
                    * GTO::hermite_coulomb(t - 2, u, v, n + 1, p, PCx, PCy, PCz, RPC);
            }
            val += PCx * GTO::hermite_coulomb(t - 1, u, v, n + 1, p, PCx, PCy, PCz, RPC);
        }

        val
    }

    fn hermite_coefficients(a: &GTO, b: &GTO, t: i32, u: i32, v: i32) -> f64 {
        let dab = a.center - b.center;
        GTO1d::Eab(a.l_xyz.x, b.l_xyz.x, t, dab.x, a.alpha, b.alpha)
            * GTO1d::Eab(a.l_xyz.y, b.l_xyz.y, u, dab.y, a.alpha, b.alpha)
            * GTO1d::Eab(a.l_xyz.z, b.l_xyz.z, v, dab.z, a.alpha, b.alpha)
    }
}

impl Basis for GTO {
    fn evaluate(&self, r: &Vector3<f64>) -> f64 {
        self.gto1d[0].evaluate(r.x) * self.gto1d[1].evaluate(r.y) * self.gto1d[2].evaluate(r.z)
    }

    fn Sab(a: &GTO, b: &GTO) -> f64 {
        GTO1d::Sab(&a.gto1d[0], &b.gto1d[0])
            * GTO1d::Sab(&a.gto1d[1], &b.gto1d[1])
            * GTO1d::Sab(&a.gto1d[2], &b.gto1d[2])
    }

    fn Tab(a: &GTO, b: &GTO) -> f64 {
        GTO1d::Tab(&a.gto1d[0], &b.gto1d[0])
            * GTO1d::Sab(&a.gto1d[1], &b.gto1d[1])
            * GTO1d::Sab(&a.gto1d[2], &b.gto1d[2])
            + GTO1d::Tab(&a.gto1d[1], &b.gto1d[1])
                * GTO1d::Sab(&a.gto1d[0], &b.gto1d[0])
                * GTO1d::Sab(&a.gto1d[2], &b.gto1d[2])
            + GTO1d::Tab(&a.gto1d[2], &b.gto1d[2])
                * GTO1d::Sab(&a.gto1d[0], &b.gto1d[0])
                * GTO1d::Sab(&a.gto1d[1], &b.gto1d[1])
    }

    fn Vab(a: &GTO, b: &GTO, R: Vector3<f64>, Z: u32) -> f64 {
        let c = GTO::merge(a, b);
        let dr = c.center - R;

        // summed in a fixed order so repeated runs are bit-identical
        let val = iproduct!(0..=c.l_xyz.x, 0..=c.l_xyz.y, 0..=c.l_xyz.z)
            .map(|(i, j, k)| {
                GTO::hermite_coefficients(a, b, i, j, k)
                    * GTO::hermite_coulomb(i, j, k, 0, c.alpha, dr.x, dr.y, dr.z, dr.norm())
            })
            .sum::<f64>();

        // nuclear attraction is negative
        -1.0 * a.norm * b.norm * val * 2.0 * PI * (Z as f64) / c.alpha
    }

    fn JKabcd(a: &GTO, b: &GTO, c: &GTO, d: &GTO) -> f64 {
        let e = GTO::merge(a, b);
        let f = GTO::merge(c, d);
        let dr = e.center - f.center;
        let alpha = e.alpha * f.alpha / (e.alpha + f.alpha);

        let val = iproduct!(
            0..=e.l_xyz.x,
            0..=e.l_xyz.y,
            0..=e.l_xyz.z,
            0..=f.l_xyz.x,
            0..=f.l_xyz.y,
            0..=f.l_xyz.z
        )
        .map(|(i, j, k, l, m, n)| {
            let eab = GTO::hermite_coefficients(a, b, i, j, k);
            if eab == 0.0 {
                return 0.0;
            }
            let ecd = GTO::hermite_coefficients(c, d, l, m, n);
            let hermite_val =
                GTO::hermite_coulomb(i + l, j + m, k + n, 0, alpha, dr.x, dr.y, dr.z, dr.norm());

            // (-1)^(l+m+n)
            let sgn = if (l + m + n) % 2 == 0 { 1.0 } else { -1.0 };
            eab * ecd * sgn * hermite_val
        })
        .sum::<f64>();

        a.norm * b.norm * c.norm * d.norm * val * 2.0 * PI.powf(2.5)
            / (e.alpha * f.alpha * (e.alpha + f.alpha).sqrt())
    }

    fn JKabc(a: &GTO, b: &GTO, c: &GTO) -> f64 {
        GTO::JKabcd(a, b, c, &GTO::unit(c.center))
    }

    fn JKab(a: &GTO, b: &GTO) -> f64 {
        GTO::JKabcd(a, &GTO::unit(a.center), b, &GTO::unit(b.center))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::simpson_integration;
    use approx::assert_relative_eq;
    use rand::Rng;

    #[test]
    fn test_gto1d_normalization() {
        for l in 0..=3 {
            let gto = GTO1d::new(0.8, l, 1.0);
            let integral = simpson_integration(|x| gto.evaluate(x).powi(2), -12.0, 14.0, 20_000);
            assert!((integral - 1.0).abs() < 1e-8, "l = {}: got {}", l, integral);
        }
    }

    #[test]
    fn test_gto1d_overlap_matches_quadrature() {
        let gto1 = GTO1d::new(1.2, 1, 1.0);
        let gto2 = GTO1d::new(0.8, 2, 2.5);
        let integral =
            simpson_integration(|x| gto1.evaluate(x) * gto2.evaluate(x), -10.0, 14.0, 20_000);
        assert_relative_eq!(GTO1d::Sab(&gto1, &gto2), integral, epsilon = 1e-9);
    }

    #[test]
    fn test_gto1d_kinetic_matches_quadrature() {
        let a = GTO1d::new(0.9, 1, 0.3);
        let b = GTO1d::new(0.5, 2, -0.4);
        // -1/2 <a| d^2/dx^2 |b> by central differences
        let h = 1e-3;
        let integrand = |x: f64| {
            let d2 = (b.evaluate(x + h) - 2.0 * b.evaluate(x) + b.evaluate(x - h)) / (h * h);
            -0.5 * a.evaluate(x) * d2
        };
        let integral = simpson_integration(integrand, -12.0, 12.0, 20_000);
        assert_relative_eq!(GTO1d::Tab(&a, &b), integral, epsilon = 1e-6);
    }

    #[test]
    fn test_unit_function_reduces_to_overlap_like_integrals() {
        // concentric s primitives: F_0(0) = 1
        let alpha = 0.7;
        let beta = 1.3;
        let a = GTO::new(alpha, Vector3::zeros(), Vector3::zeros());
        let b = GTO::new(beta, Vector3::zeros(), Vector3::zeros());
        let expected = a.norm * b.norm * 2.0 * PI.powf(2.5)
            / (alpha * beta * (alpha + beta).sqrt());
        assert_relative_eq!(GTO::JKab(&a, &b), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_integral_permutational_symmetry() {
        let mut rng = rand::thread_rng();
        let mut random_center =
            || Vector3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        let a = GTO::new(0.6, Vector3::new(1, 0, 0), random_center());
        let b = GTO::new(1.1, Vector3::new(0, 1, 1), random_center());
        let c = GTO::new(0.4, Vector3::new(0, 0, 0), random_center());
        let d = GTO::new(2.0, Vector3::new(0, 0, 1), random_center());

        assert_relative_eq!(GTO::Sab(&a, &b), GTO::Sab(&b, &a), epsilon = 1e-12);
        assert_relative_eq!(GTO::Tab(&a, &b), GTO::Tab(&b, &a), epsilon = 1e-12);
        let R = Vector3::new(0.1, -0.2, 0.3);
        assert_relative_eq!(GTO::Vab(&a, &b, R, 3), GTO::Vab(&b, &a, R, 3), epsilon = 1e-12);

        let abcd = GTO::JKabcd(&a, &b, &c, &d);
        assert_relative_eq!(abcd, GTO::JKabcd(&b, &a, &c, &d), epsilon = 1e-11);
        assert_relative_eq!(abcd, GTO::JKabcd(&c, &d, &a, &b), epsilon = 1e-11);
        assert_relative_eq!(abcd, GTO::JKabcd(&d, &c, &b, &a), epsilon = 1e-11);
    }
}
