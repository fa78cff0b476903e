// src/algorithms/shapley.rs

use std::collections::{BTreeMap, HashSet};

use ndarray::{stack, Array2, ArrayView1, Axis};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::algorithms::cache::FitCache;
use crate::algorithms::ols::{OrdinaryLeastSquares, DEFAULT_RANK_TOLERANCE};
use crate::core::{
    ColumnRole, ContributionRecord, ContributionTable, Dataset, RecordKind, Result, ShapleyError,
    SingleContribution, SizeClass,
};
use crate::traits::SubsetFit;
use crate::utils::{n_choose_k, Combinations, Subset};

/// Configuration for the Shapley R² decomposer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecomposerConfig {
    /// Share subset fits across targets in [`ShapleyDecomposer::contribution_all`].
    pub cache_fits: bool,
    /// Relative pivot size under which a design column counts as collinear.
    pub rank_tolerance: f64,
    /// Upper bound on the regressor count; every subset of them gets fitted.
    pub max_regressors: usize,
}

impl Default for DecomposerConfig {
    fn default() -> Self {
        DecomposerConfig {
            cache_fits: true,
            rank_tolerance: DEFAULT_RANK_TOLERANCE,
            max_regressors: 20,
        }
    }
}

/// Attributes the R² of `response ~ regressors` to each regressor by Shapley value.
#[derive(Debug)]
pub struct ShapleyDecomposer<'a, F: SubsetFit = OrdinaryLeastSquares> {
    dataset: &'a Dataset,
    regressors: Vec<String>,
    response: String,
    columns: Vec<ArrayView1<'a, f64>>,
    response_values: ArrayView1<'a, f64>,
    config: DecomposerConfig,
    fitter: F,
}

impl<'a> ShapleyDecomposer<'a, OrdinaryLeastSquares> {
    /// Validates the columns, coerces them to floats in `dataset`, and builds
    /// a decomposer fitting ordinary least squares.
    pub fn new<S: AsRef<str>>(
        dataset: &'a mut Dataset,
        regressors: &[S],
        response: &str,
        config: Option<DecomposerConfig>,
    ) -> Result<Self> {
        let resolved_config = config.unwrap_or_default();
        let fitter = OrdinaryLeastSquares::new(resolved_config.rank_tolerance);
        Self::with_fitter(dataset, regressors, response, resolved_config, fitter)
    }
}

impl<'a, F: SubsetFit> ShapleyDecomposer<'a, F> {
    /// Like [`ShapleyDecomposer::new`], scoring subsets with a custom fitter.
    pub fn with_fitter<S: AsRef<str>>(
        dataset: &'a mut Dataset,
        regressors: &[S],
        response: &str,
        config: DecomposerConfig,
        fitter: F,
    ) -> Result<Self> {
        let regressors: Vec<String> = regressors.iter().map(|r| r.as_ref().to_string()).collect();

        if regressors.is_empty() {
            return Err(ShapleyError::validation(
                ColumnRole::Regressor,
                "",
                "at least one regressor is required",
            ));
        }
        if regressors.len() > config.max_regressors {
            return Err(ShapleyError::validation(
                ColumnRole::Regressor,
                &regressors.join(", "),
                format!(
                    "{} regressors exceed the configured maximum of {}",
                    regressors.len(),
                    config.max_regressors
                ),
            ));
        }
        let mut seen = HashSet::new();
        for name in &regressors {
            if !seen.insert(name.as_str()) {
                return Err(ShapleyError::validation(
                    ColumnRole::Regressor,
                    name,
                    "listed more than once",
                ));
            }
        }
        if regressors.iter().any(|r| r == response) {
            return Err(ShapleyError::validation(
                ColumnRole::Response,
                response,
                "response is also listed as a regressor",
            ));
        }

        if dataset.n_rows() < 2 {
            return Err(ShapleyError::validation(
                ColumnRole::Response,
                response,
                format!("needs at least 2 rows, the dataset has {}", dataset.n_rows()),
            ));
        }

        let requested: Vec<(&str, ColumnRole)> = regressors
            .iter()
            .map(|name| (name.as_str(), ColumnRole::Regressor))
            .chain(std::iter::once((response, ColumnRole::Response)))
            .collect();
        dataset.coerce_all_numeric(&requested)?;

        let dataset: &'a Dataset = dataset;
        let numeric = |name: &str, role: ColumnRole| {
            dataset
                .numeric(name)
                .ok_or_else(|| ShapleyError::validation(role, name, "column is not numeric"))
        };
        let columns = regressors
            .iter()
            .map(|name| numeric(name, ColumnRole::Regressor))
            .collect::<Result<Vec<_>>>()?;
        let response_values = numeric(response, ColumnRole::Response)?;

        debug!(
            regressors = ?regressors,
            response,
            rows = dataset.n_rows(),
            "validated decomposer columns"
        );

        Ok(ShapleyDecomposer {
            dataset,
            regressors,
            response: response.to_string(),
            columns,
            response_values,
            config,
            fitter,
        })
    }

    pub fn regressors(&self) -> &[String] {
        &self.regressors
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn dataset(&self) -> &Dataset {
        self.dataset
    }

    pub fn config(&self) -> &DecomposerConfig {
        &self.config
    }

    /// R² of the regression on every regressor.
    pub fn full_r_squared(&self) -> Result<f64> {
        self.full_r_squared_with(&mut FitCache::new())
    }

    /// Shapley share of `target`, with the signed records it is summed from.
    #[instrument(level = "debug", skip(self, target), fields(regressor = %target))]
    pub fn contribution_of(&self, target: &str) -> Result<SingleContribution> {
        self.contribution_with(target, &mut FitCache::new())
    }

    /// Shapley shares of every regressor, in regressor order.
    pub fn contribution_all(&self) -> Result<ContributionTable> {
        let mut shared = FitCache::new();
        let full_r_squared = self.full_r_squared_with(&mut shared)?;

        let mut shares = Vec::with_capacity(self.regressors.len());
        for name in &self.regressors {
            let single = if self.config.cache_fits {
                self.contribution_with(name, &mut shared)?
            } else {
                self.contribution_with(name, &mut FitCache::new())?
            };
            debug!(
                regressor = %name,
                share = single.contribution,
                full_r_squared = single.full_r_squared,
                "R2 share"
            );
            shares.push((name.clone(), single.contribution));
        }

        if self.config.cache_fits {
            debug!(fits = shared.misses(), reused = shared.hits(), "subset fit cache");
        }
        Ok(ContributionTable::new(shares, full_r_squared))
    }

    fn contribution_with(&self, target: &str, cache: &mut FitCache) -> Result<SingleContribution> {
        let target_idx = self
            .regressors
            .iter()
            .position(|r| r == target)
            .ok_or_else(|| {
                ShapleyError::InvalidArgument(format!(
                    "'{}' is not one of the regressors [{}]",
                    target,
                    self.regressors.join(", ")
                ))
            })?;
        let n_regressors = self.regressors.len();

        let mut records = Vec::with_capacity(1 << n_regressors);
        for size in 1..=n_regressors {
            debug!(
                regressor = target,
                size,
                subsets = n_choose_k(n_regressors - 1, size - 1),
                "fitting subsets"
            );
            for subset in Combinations::new(n_regressors, size).filter(|s| s.contains(target_idx)) {
                let with_target = self.subset_r_squared(&subset, cache)?;

                let complement = subset.without(target_idx);
                // No regressors explain no variance.
                let without_target = if complement.is_empty() {
                    0.0
                } else {
                    self.subset_r_squared(&complement, cache)?
                };

                records.push(Self::record(RecordKind::WithTarget, size, &subset, n_regressors, with_target));
                records.push(Self::record(
                    RecordKind::WithoutTarget,
                    size,
                    &complement,
                    n_regressors,
                    -without_target,
                ));
            }
        }

        let size_classes = weight_records(&mut records);
        debug_assert!(size_classes
            .iter()
            .all(|(&size, class)| class.subsets() as f64 == n_choose_k(n_regressors - 1, size - 1)));

        let contribution = size_classes.values().map(|class| class.weighted_sum).sum();
        let full_r_squared = self.full_r_squared_with(cache)?;

        Ok(SingleContribution {
            regressor: target.to_string(),
            contribution,
            full_r_squared,
            records,
            size_classes,
        })
    }

    fn record(kind: RecordKind, size: usize, fitted: &Subset, n_regressors: usize, r_squared: f64) -> ContributionRecord {
        ContributionRecord {
            kind,
            subset_size: size,
            complement_size: size - 1,
            membership: fitted.membership(n_regressors),
            r_squared,
            class_count: 0,
            class_total: 0,
            weighted_value: 0.0,
        }
    }

    fn full_r_squared_with(&self, cache: &mut FitCache) -> Result<f64> {
        let everything = Subset::new((0..self.regressors.len()).collect());
        self.subset_r_squared(&everything, cache)
    }

    fn subset_r_squared(&self, subset: &Subset, cache: &mut FitCache) -> Result<f64> {
        cache.get_or_try_insert_with(subset, || {
            let names: Vec<&str> = subset.indices().iter().map(|&i| self.regressors[i].as_str()).collect();
            let design = self.design(subset)?;
            self.fitter.r_squared(design.view(), self.response_values, &names)
        })
    }

    fn design(&self, subset: &Subset) -> Result<Array2<f64>> {
        let views: Vec<ArrayView1<f64>> = subset.indices().iter().map(|&i| self.columns[i]).collect();
        Ok(stack(Axis(1), &views)?)
    }
}

/// Groups records by subset size and fills in their weights.
///
/// With `K` subsets of a size (two records each) and `m` sizes, every record
/// is weighted by `1 / K / m`.
fn weight_records(records: &mut [ContributionRecord]) -> BTreeMap<usize, SizeClass> {
    let mut classes: BTreeMap<usize, SizeClass> = BTreeMap::new();
    for record in records.iter() {
        classes.entry(record.subset_size).or_default().records += 1;
    }

    let class_total = classes.len();
    for record in records.iter_mut() {
        if let Some(class) = classes.get_mut(&record.subset_size) {
            record.class_count = class.subsets();
            record.class_total = class_total;
            record.weighted_value = record.r_squared / record.class_count as f64 / class_total as f64;
            class.weighted_sum += record.weighted_value;
        }
    }
    classes
}
