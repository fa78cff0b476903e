// src/algorithms/cache.rs
use std::collections::HashMap;

use crate::core::Result;
use crate::utils::Subset;

/// Memo of subset R² values.
///
/// Several targets share the same subsets (`{A, B}` is fitted for both `A`
/// and `B`), so a cache kept across targets fits each subset once.
#[derive(Debug, Default)]
pub struct FitCache {
    fits: HashMap<Subset, f64>,
    hits: usize,
    misses: usize,
}

impl FitCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, subset: &Subset) -> Option<f64> {
        self.fits.get(subset).copied()
    }

    /// Returns the cached value for `subset`, or computes and stores it.
    ///
    /// Errors are not cached.
    pub fn get_or_try_insert_with<F>(&mut self, subset: &Subset, compute: F) -> Result<f64>
    where
        F: FnOnce() -> Result<f64>,
    {
        if let Some(value) = self.fits.get(subset) {
            self.hits += 1;
            return Ok(*value);
        }
        let value = compute()?;
        self.misses += 1;
        self.fits.insert(subset.clone(), value);
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.fits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fits.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}
