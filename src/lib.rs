// src/lib.rs

//! `shapley_r2` splits the R² of an ordinary least squares regression among
//! its regressors by Shapley value: each regressor receives its average
//! marginal gain in R² over every subset of the other regressors, and the
//! shares add up to the R² of the full model.
//!
//! ```
//! use shapley_r2::{Dataset, ShapleyDecomposer};
//!
//! # fn main() -> shapley_r2::Result<()> {
//! let mut data = Dataset::new()
//!     .with_column("A", vec![1.0, 2.0, 3.0, 4.0, 5.0])?
//!     .with_column("B", vec![2.0, 1.0, 4.0, 3.0, 6.0])?
//!     .with_column("y", vec![3.0, 3.0, 7.0, 7.0, 11.0])?;
//!
//! let decomposer = ShapleyDecomposer::new(&mut data, &["A", "B"], "y", None)?;
//! let table = decomposer.contribution_all()?;
//!
//! assert!((table.total - table.full_r_squared).abs() < 1e-9);
//! println!("{}", table);
//! # Ok(())
//! # }
//! ```

pub mod algorithms;
pub mod core;
pub mod traits;
pub mod utils;

pub use crate::algorithms::{DecomposerConfig, OlsFit, OrdinaryLeastSquares, ShapleyDecomposer};
pub use crate::core::{
    Column, ColumnRole, ContributionRecord, ContributionTable, Dataset, RecordKind, Result, ShapleyError,
    SingleContribution, SizeClass,
};
pub use crate::traits::SubsetFit;
pub use crate::utils::Subset;
