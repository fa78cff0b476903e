// src/algorithms/ols.rs

use crate::core::{Result, ShapleyError};
use crate::traits::SubsetFit;
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use tracing::trace;

/// Default relative threshold below which a column is treated as linearly dependent.
pub const DEFAULT_RANK_TOLERANCE: f64 = 1e-10;

/// Coefficients and goodness of fit of one least squares regression.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    pub intercept: f64,
    pub coefficients: Array1<f64>,
    pub r_squared: f64,
}

/// Ordinary least squares with an intercept.
///
/// Rank-deficient designs (perfectly collinear or constant regressors) are
/// rejected rather than resolved to an arbitrary coefficient split.
#[derive(Debug, Clone)]
pub struct OrdinaryLeastSquares {
    rank_tolerance: f64,
}

impl Default for OrdinaryLeastSquares {
    fn default() -> Self {
        OrdinaryLeastSquares {
            rank_tolerance: DEFAULT_RANK_TOLERANCE,
        }
    }
}

impl OrdinaryLeastSquares {
    pub fn new(rank_tolerance: f64) -> Self {
        OrdinaryLeastSquares { rank_tolerance }
    }

    /// Fits `response ~ 1 + design` and scores it with R² = 1 - SS_res / SS_tot.
    ///
    /// `subset` only labels errors.
    pub fn fit(&self, design: ArrayView2<f64>, response: ArrayView1<f64>, subset: &[&str]) -> Result<OlsFit> {
        let fail = |reason: String| ShapleyError::Computation {
            subset: subset.iter().map(|name| name.to_string()).collect(),
            reason,
        };

        let (n_samples, n_features) = design.dim();
        if n_samples != response.len() {
            return Err(fail(format!(
                "design has {} rows, but the response has {}",
                n_samples,
                response.len()
            )));
        }
        if n_features == 0 {
            return Err(fail("no regressors to fit".to_string()));
        }
        if n_samples <= n_features {
            return Err(fail(format!(
                "{} observations cannot determine {} coefficients and an intercept",
                n_samples, n_features
            )));
        }

        // Centering both sides absorbs the intercept.
        let x_means = design
            .mean_axis(Axis(0))
            .ok_or_else(|| fail("empty design matrix".to_string()))?;
        let y_mean = response.mean().ok_or_else(|| fail("empty response".to_string()))?;
        let x_centered = &design - &x_means;
        let y_centered = response.mapv(|y| y - y_mean);

        let ss_tot = y_centered.dot(&y_centered);
        if ss_tot <= 0.0 {
            return Err(fail("response has zero variance, R² is undefined".to_string()));
        }

        let coefficients = self.solve(x_centered.view(), y_centered.view()).map_err(fail)?;

        let residuals = &y_centered - &x_centered.dot(&coefficients);
        let ss_res = residuals.dot(&residuals);
        let r_squared = 1.0 - ss_res / ss_tot;
        if !r_squared.is_finite() {
            return Err(fail(format!("non-finite R² ({})", r_squared)));
        }

        let intercept = y_mean - x_means.dot(&coefficients);
        trace!(?subset, r_squared, "fitted least squares");

        Ok(OlsFit {
            intercept,
            coefficients,
            r_squared,
        })
    }

    #[cfg(not(feature = "linalg"))]
    fn solve(&self, features: ArrayView2<f64>, target: ArrayView1<f64>) -> std::result::Result<Array1<f64>, String> {
        use nalgebra::{DMatrix, DVector};

        let (n_samples, n_coeffs) = features.dim();
        let x = DMatrix::from_fn(n_samples, n_coeffs, |i, j| features[[i, j]]);
        let y = DVector::from_iterator(n_samples, target.iter().copied());

        let svd = x.svd(true, true);
        let largest = svd.singular_values.max();
        let cutoff = self.rank_tolerance * largest;
        if largest <= 0.0 || svd.singular_values.iter().any(|&sv| sv <= cutoff) {
            return Err(format!(
                "design matrix is rank deficient (rank {} < {}, collinear or constant regressors)",
                svd.rank(cutoff),
                n_coeffs
            ));
        }

        let beta = svd
            .solve(&y, cutoff)
            .map_err(|e| format!("SVD least squares failed: {}", e))?;
        Ok(Array1::from_iter(beta.iter().copied()))
    }

    #[cfg(feature = "linalg")]
    fn solve(&self, features: ArrayView2<f64>, target: ArrayView1<f64>) -> std::result::Result<Array1<f64>, String> {
        use ndarray_linalg::LeastSquaresSvd;

        let results = features
            .least_squares(&target)
            .map_err(|e| format!("SVD least squares failed: {}", e))?;

        let n_coeffs = features.ncols();
        if (results.rank as usize) < n_coeffs {
            return Err(format!(
                "design matrix is rank deficient (rank {} < {})",
                results.rank, n_coeffs
            ));
        }
        // gelsd uses machine precision for rank; apply our own relative cut too.
        let largest = results.singular_values.iter().cloned().fold(0.0_f64, f64::max);
        if results
            .singular_values
            .iter()
            .any(|&sv| sv <= self.rank_tolerance * largest)
        {
            return Err("design matrix is rank deficient (collinear regressors)".to_string());
        }
        Ok(results.solution)
    }
}

impl SubsetFit for OrdinaryLeastSquares {
    fn r_squared(&self, design: ArrayView2<f64>, response: ArrayView1<f64>, subset: &[&str]) -> Result<f64> {
        self.fit(design, response, subset).map(|fit| fit.r_squared)
    }
}
