// src/core/contribution.rs
use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether a record holds the fit that includes the target regressor or the
/// fit of the same subset with the target removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RecordKind {
    WithTarget,
    WithoutTarget,
}

/// One signed R² term of a single-regressor decomposition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContributionRecord {
    pub kind: RecordKind,
    /// Size `r` of the subset containing the target. Both records of a pair carry it.
    pub subset_size: usize,
    /// `r - 1`, the size of the subset without the target.
    pub complement_size: usize,
    /// Membership of the fitted subset, aligned with the decomposer's regressors.
    pub membership: Vec<bool>,
    /// `+R²(S)` for `WithTarget`, `-R²(S \ {target})` for `WithoutTarget`.
    pub r_squared: f64,
    /// Number of subsets of this size that contain the target (`K`).
    pub class_count: usize,
    /// Number of distinct subset sizes (`m`).
    pub class_total: usize,
    /// `r_squared / class_count / class_total`.
    pub weighted_value: f64,
}

/// Aggregate of all records sharing a subset size.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SizeClass {
    pub records: usize,
    pub weighted_sum: f64,
}

impl SizeClass {
    /// Number of subsets in the class; every subset contributes a with/without pair.
    pub fn subsets(&self) -> usize {
        self.records / 2
    }
}

/// Shapley share of one regressor together with the records it was built from.
#[derive(Debug, Clone)]
pub struct SingleContribution {
    pub regressor: String,
    pub contribution: f64,
    /// R² of the regression on every regressor.
    pub full_r_squared: f64,
    pub records: Vec<ContributionRecord>,
    pub size_classes: BTreeMap<usize, SizeClass>,
}

impl fmt::Display for SingleContribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "+--R2 Share ({}): {:.5}\tof\t{:.5}--+",
            self.regressor, self.contribution, self.full_r_squared
        )
    }
}

/// Shapley shares of every regressor, in the decomposer's regressor order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContributionTable {
    pub shares: Vec<(String, f64)>,
    /// Sum of all shares.
    pub total: f64,
    pub full_r_squared: f64,
}

impl ContributionTable {
    pub(crate) fn new(shares: Vec<(String, f64)>, full_r_squared: f64) -> Self {
        let total = shares.iter().map(|(_, share)| share).sum();
        ContributionTable {
            shares,
            total,
            full_r_squared,
        }
    }

    pub fn get(&self, regressor: &str) -> Option<f64> {
        self.shares
            .iter()
            .find(|(name, _)| name == regressor)
            .map(|(_, share)| *share)
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.shares.iter().map(|(name, share)| (name.as_str(), *share))
    }

    /// Gap between the summed shares and the full-model R².
    pub fn residual(&self) -> f64 {
        self.full_r_squared - self.total
    }
}

impl fmt::Display for ContributionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.shares.iter().map(|(name, _)| name.chars().count()).max().unwrap_or(0);

        writeln!(f, "+--Share of Individual Regressors and the Shapley Value--+")?;
        writeln!(f, "+--------------------------------------------------------+")?;
        for (name, share) in &self.shares {
            writeln!(
                f,
                "+--R2 Share ({:<width$}): {:.5}\tof\t{:.5}--+",
                name,
                share,
                self.full_r_squared,
                width = width
            )?;
        }
        writeln!(f, "+--Total: {:.5}--+", self.total)
    }
}
