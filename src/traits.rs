// src/traits.rs
use ndarray::{ArrayView1, ArrayView2};

use crate::core::Result;

/// A regression that can be fitted on any column subset and scored by R².
///
/// `design` holds one column per regressor of the subset (no intercept
/// column); implementations fit their own intercept. Failures are reported
/// as [`crate::ShapleyError::Computation`], with `subset` naming the columns.
pub trait SubsetFit {
    fn r_squared(&self, design: ArrayView2<f64>, response: ArrayView1<f64>, subset: &[&str]) -> Result<f64>;
}
