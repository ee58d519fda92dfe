/* Contracted Cartesian Gaussian type orbitals (CGTO),
   built on the normalized primitives in gto.rs
*/

use crate::gto::GTO;
use crate::Basis;
use itertools::iproduct;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// One Cartesian component of a contracted shell. Primitives of the same shell
// share exponents; the integral routines do not exploit that yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractedGTO {
    pub primitives: Vec<GTO>,
    pub coefficients: Vec<f64>,
    // shell_type: 1s, 2s, 2px, 2py, 2pz, 3dxy, ...
    pub shell_type: String,
    pub n: i32, // 1, 2, ...
    pub l: i32, // 0 .. n-1
    pub l_xyz: Vector3<i32>,
    pub center: Vector3<f64>,
}

const SHELL_LETTERS: [char; 5] = ['s', 'p', 'd', 'f', 'g'];

fn cartesian_label(l_xyz: &Vector3<i32>) -> String {
    let mut label = "x".repeat(l_xyz.x as usize);
    label.push_str(&"y".repeat(l_xyz.y as usize));
    label.push_str(&"z".repeat(l_xyz.z as usize));
    label
}

/// Cartesian exponent triples of angular momentum `l` in the usual
/// (xx, xy, xz, yy, yz, zz) order.
pub fn cartesian_components(l: i32) -> Vec<Vector3<i32>> {
    let mut components = Vec::with_capacity(((l + 1) * (l + 2) / 2) as usize);
    for lx in (0..=l).rev() {
        for ly in (0..=(l - lx)).rev() {
            components.push(Vector3::new(lx, ly, l - lx - ly));
        }
    }
    components
}

impl ContractedGTO {
    /// Builds a contraction from raw exponents and coefficients and rescales
    /// it to unit self-overlap.
    pub fn new(
        exponents: &[f64],
        coefficients: &[f64],
        l_xyz: Vector3<i32>,
        center: Vector3<f64>,
        n: i32,
    ) -> Self {
        let l = l_xyz.x + l_xyz.y + l_xyz.z;
        let letter = SHELL_LETTERS.get(l as usize).copied().unwrap_or('?');
        let mut cgto = ContractedGTO {
            primitives: exponents
                .iter()
                .map(|&alpha| GTO::new(alpha, l_xyz, center))
                .collect(),
            coefficients: coefficients.to_vec(),
            shell_type: format!("{}{}{}", n, letter, cartesian_label(&l_xyz)),
            n,
            l,
            l_xyz,
            center,
        };
        cgto.normalize();
        cgto
    }

    fn normalize(&mut self) {
        let self_overlap = ContractedGTO::Sab(self, self);
        if self_overlap > 0.0 {
            let scale = 1.0 / self_overlap.sqrt();
            self.coefficients.iter_mut().for_each(|c| *c *= scale);
        }
    }

    fn contract2<F>(a: &Self, b: &Self, integral: F) -> f64
    where
        F: Fn(&GTO, &GTO) -> f64,
    {
        iproduct!(
            a.primitives.iter().zip(&a.coefficients),
            b.primitives.iter().zip(&b.coefficients)
        )
        .map(|((pa, ca), (pb, cb))| ca * cb * integral(pa, pb))
        .sum()
    }
}

impl Basis for ContractedGTO {
    fn evaluate(&self, r: &Vector3<f64>) -> f64 {
        self.primitives
            .iter()
            .zip(&self.coefficients)
            .map(|(p, c)| c * p.evaluate(r))
            .sum()
    }

    fn Sab(a: &Self, b: &Self) -> f64 {
        ContractedGTO::contract2(a, b, GTO::Sab)
    }

    fn Tab(a: &Self, b: &Self) -> f64 {
        ContractedGTO::contract2(a, b, GTO::Tab)
    }

    fn Vab(a: &Self, b: &Self, R: Vector3<f64>, Z: u32) -> f64 {
        ContractedGTO::contract2(a, b, |pa, pb| GTO::Vab(pa, pb, R, Z))
    }

    fn JKabcd(a: &Self, b: &Self, c: &Self, d: &Self) -> f64 {
        iproduct!(
            a.primitives.iter().zip(&a.coefficients),
            b.primitives.iter().zip(&b.coefficients),
            c.primitives.iter().zip(&c.coefficients),
            d.primitives.iter().zip(&d.coefficients)
        )
        .map(|((pa, ca), (pb, cb), (pc, cc), (pd, cd))| {
            ca * cb * cc * cd * GTO::JKabcd(pa, pb, pc, pd)
        })
        .sum()
    }

    fn JKabc(a: &Self, b: &Self, c: &Self) -> f64 {
        iproduct!(
            a.primitives.iter().zip(&a.coefficients),
            b.primitives.iter().zip(&b.coefficients),
            c.primitives.iter().zip(&c.coefficients)
        )
        .map(|((pa, ca), (pb, cb), (pc, cc))| ca * cb * cc * GTO::JKabc(pa, pb, pc))
        .sum()
    }

    fn JKab(a: &Self, b: &Self) -> f64 {
        ContractedGTO::contract2(a, b, GTO::JKab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // STO-3G hydrogen 1s
    fn h1s(center: Vector3<f64>) -> ContractedGTO {
        ContractedGTO::new(
            &[3.425250914, 0.6239137298, 0.1688554040],
            &[0.1543289673, 0.5353281423, 0.4446345422],
            Vector3::zeros(),
            center,
            1,
        )
    }

    #[test]
    fn test_contraction_is_normalized() {
        let s = h1s(Vector3::zeros());
        assert_relative_eq!(ContractedGTO::Sab(&s, &s), 1.0, epsilon = 1e-14);

        let p = ContractedGTO::new(
            &[5.0331513, 1.1695961, 0.3803890],
            &[0.15591627, 0.60768372, 0.39195739],
            Vector3::new(0, 0, 1),
            Vector3::zeros(),
            2,
        );
        assert_relative_eq!(ContractedGTO::Sab(&p, &p), 1.0, epsilon = 1e-14);
        assert_eq!(p.shell_type, "2pz");
    }

    #[test]
    fn test_cartesian_components() {
        let d: Vec<String> = cartesian_components(2).iter().map(cartesian_label).collect();
        assert_eq!(d, vec!["xx", "xy", "xz", "yy", "yz", "zz"]);
        assert_eq!(cartesian_components(1).len(), 3);
        assert_eq!(cartesian_components(0), vec![Vector3::zeros()]);
    }

    // Szabo & Ostlund, table 3.5 (H2, R = 1.4 bohr, STO-3G)
    #[test]
    fn test_h2_integrals_reference_values() {
        let r_a = Vector3::zeros();
        let r_b = Vector3::new(0.0, 0.0, 1.4);
        let a = h1s(r_a);
        let b = h1s(r_b);

        assert_relative_eq!(ContractedGTO::Sab(&a, &b), 0.6593, epsilon = 1e-4);
        assert_relative_eq!(ContractedGTO::Tab(&a, &a), 0.7600, epsilon = 1e-4);
        assert_relative_eq!(ContractedGTO::Tab(&a, &b), 0.2365, epsilon = 1e-4);
        assert_relative_eq!(ContractedGTO::Vab(&a, &a, r_a, 1), -1.2266, epsilon = 1e-4);
        assert_relative_eq!(ContractedGTO::Vab(&a, &b, r_a, 1), -0.5974, epsilon = 1e-4);
        assert_relative_eq!(ContractedGTO::Vab(&b, &b, r_a, 1), -0.6538, epsilon = 1e-4);

        assert_relative_eq!(ContractedGTO::JKabcd(&a, &a, &a, &a), 0.7746, epsilon = 1e-4);
        assert_relative_eq!(ContractedGTO::JKabcd(&a, &a, &b, &b), 0.5697, epsilon = 1e-4);
        assert_relative_eq!(ContractedGTO::JKabcd(&b, &a, &a, &a), 0.4441, epsilon = 1e-4);
        assert_relative_eq!(ContractedGTO::JKabcd(&b, &a, &b, &a), 0.2970, epsilon = 1e-4);
    }

    #[test]
    fn test_two_centre_metric_obeys_schwarz() {
        let p = ContractedGTO::new(&[0.9], &[1.0], Vector3::zeros(), Vector3::zeros(), 1);
        let q = ContractedGTO::new(&[0.4], &[1.0], Vector3::new(0, 1, 0), Vector3::new(0.0, 0.5, 0.7), 2);
        let pq = ContractedGTO::JKab(&p, &q);
        assert_relative_eq!(pq, ContractedGTO::JKab(&q, &p), epsilon = 1e-14);
        assert!(pq * pq < ContractedGTO::JKab(&p, &p) * ContractedGTO::JKab(&q, &q));
    }
}
