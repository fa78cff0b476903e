pub mod cache;
pub mod ols;
pub mod shapley;

pub use cache::FitCache;
pub use ols::{OlsFit, OrdinaryLeastSquares, DEFAULT_RANK_TOLERANCE};
pub use shapley::{DecomposerConfig, ShapleyDecomposer};
