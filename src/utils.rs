// src/utils.rs

//! Combinatorics over regressor indices.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A set of regressor indices, kept sorted so it can serve as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Subset(Vec<usize>);

impl Subset {
    pub fn new(mut indices: Vec<usize>) -> Self {
        indices.sort_unstable();
        indices.dedup();
        Subset(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.binary_search(&index).is_ok()
    }

    /// The same subset with `index` removed.
    pub fn without(&self, index: usize) -> Subset {
        Subset(self.0.iter().copied().filter(|&i| i != index).collect())
    }

    /// Membership flags over `0..universe`.
    pub fn membership(&self, universe: usize) -> Vec<bool> {
        (0..universe).map(|i| self.contains(i)).collect()
    }
}

/// Lexicographic `k`-combinations of `0..n`, like `itertools.combinations(range(n), k)`.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        Combinations {
            n,
            indices: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Subset;

    fn next(&mut self) -> Option<Subset> {
        if self.done {
            return None;
        }
        let current = Subset(self.indices.clone());

        // Advance the rightmost index that still has room, then reset the tail.
        let k = self.indices.len();
        match (0..k).rev().find(|&i| self.indices[i] != i + self.n - k) {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }
        Some(current)
    }
}

/// Helper for combinations C(n, k) = n! / (k! * (n-k)!)
pub fn n_choose_k(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    if k == 0 || k == n {
        return 1.0;
    }
    // C(n, k) = C(n, n-k); keep the loop short
    let eff_k = if k > n / 2 { n - k } else { k };

    let mut res = 1.0;
    for i in 0..eff_k {
        res *= (n - i) as f64;
        res /= (i + 1) as f64;
    }
    res
}
