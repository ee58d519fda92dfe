//! Four-index electron repulsion integrals with eightfold permutational
//! symmetry, (ij|kl) = (ji|kl) = (ij|lk) = (kl|ij) = ...

use basis::{Basis, ContractedGTO};
use rayon::prelude::*;
use std::ops::Index;

#[inline(always)]
fn pair_index(i: usize, j: usize) -> usize {
    let (i, j) = if i >= j { (i, j) } else { (j, i) };
    i * (i + 1) / 2 + j
}

/// Packed storage of the unique (ij|kl) values.
#[derive(Debug, Clone)]
pub struct EriTensor {
    data: Vec<f64>,
    /// side length
    size: usize,
}

impl EriTensor {
    /// Computes every unique integral. Rows of the packed triangle are
    /// evaluated in parallel and collected in order, so the result does not
    /// depend on the thread count.
    pub fn from_basis(functions: &[ContractedGTO]) -> Self {
        EriTensor::from_fn(functions.len(), |i, j, k, l| {
            ContractedGTO::JKabcd(&functions[i], &functions[j], &functions[k], &functions[l])
        })
    }

    /// Fills the tensor from `f(i, j, k, l)`, called once per unique index
    /// quadruple with i >= j, k >= l and ij >= kl.
    pub fn from_fn<F>(size: usize, f: F) -> Self
    where
        F: Fn(usize, usize, usize, usize) -> f64 + Sync,
    {
        let pairs: Vec<(usize, usize)> = (0..size)
            .flat_map(|i| (0..=i).map(move |j| (i, j)))
            .collect();

        let rows: Vec<Vec<f64>> = pairs
            .par_iter()
            .enumerate()
            .map(|(ij, &(i, j))| pairs[..=ij].iter().map(|&(k, l)| f(i, j, k, l)).collect())
            .collect();

        EriTensor {
            data: rows.into_iter().flatten().collect(),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// (ij|kl) in chemists' notation.
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize, l: usize) -> f64 {
        self.data[pair_index(pair_index(i, j), pair_index(k, l))]
    }
}

impl Index<(usize, usize, usize, usize)> for EriTensor {
    type Output = f64;

    fn index(&self, (i, j, k, l): (usize, usize, usize, usize)) -> &Self::Output {
        &self.data[pair_index(pair_index(i, j), pair_index(k, l))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn functions() -> Vec<ContractedGTO> {
        vec![
            ContractedGTO::new(&[1.3], &[1.0], Vector3::zeros(), Vector3::zeros(), 1),
            ContractedGTO::new(&[0.7], &[1.0], Vector3::new(0, 0, 1), Vector3::new(0.0, 0.3, 1.1), 2),
            ContractedGTO::new(&[0.4], &[1.0], Vector3::zeros(), Vector3::new(0.9, -0.2, 0.0), 1),
        ]
    }

    #[test]
    fn test_packed_storage_size() {
        let eri = EriTensor::from_basis(&functions());
        // 6 pairs, 21 unique pair-pairs
        assert_eq!(eri.data.len(), 21);
        assert_eq!(eri.size(), 3);
    }

    #[test]
    fn test_lookup_matches_direct_evaluation() {
        let f = functions();
        let eri = EriTensor::from_basis(&f);
        for (i, j, k, l) in [(0, 1, 2, 1), (2, 2, 0, 1), (1, 0, 1, 0), (2, 0, 2, 2)] {
            let direct = ContractedGTO::JKabcd(&f[i], &f[j], &f[k], &f[l]);
            assert_relative_eq!(eri[(i, j, k, l)], direct, epsilon = 1e-12);
            assert_eq!(eri[(i, j, k, l)], eri.get(l, k, j, i));
            assert_eq!(eri[(i, j, k, l)], eri.get(k, l, i, j));
        }
    }

    #[test]
    fn test_from_fn_visits_unique_quadruples() {
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let eri = EriTensor::from_fn(3, |i, j, k, l| {
            calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            assert!(i >= j && k >= l);
            (1000 * i + 100 * j + 10 * k + l) as f64
        });
        assert_eq!(calls.into_inner(), 21);
        assert_eq!(eri.size(), 3);
        assert_eq!(eri.get(1, 2, 0, 0), 2100.0);
        assert_eq!(eri.get(0, 0, 2, 1), 2100.0);
    }
}
