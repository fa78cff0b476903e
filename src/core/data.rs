// src/core/data.rs
use ndarray::{Array1, ArrayView1};
use std::fmt;

use crate::core::{ColumnRole, Result, ShapleyError};

/// A single named column of the dataset.
///
/// Columns loaded from text sources start out as `Text` and are turned into
/// `Numeric` when a decomposer claims them as regressor or response.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Array1<f64>),
    Text(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }

    /// Parses every value as a finite `f64`, without touching `self`.
    fn to_numeric(&self) -> std::result::Result<Array1<f64>, String> {
        match self {
            Column::Numeric(values) => {
                if let Some(row) = values.iter().position(|v| !v.is_finite()) {
                    return Err(format!("value {} at row {} is not finite", values[row], row));
                }
                Ok(values.clone())
            }
            Column::Text(values) => values
                .iter()
                .enumerate()
                .map(|(row, raw)| match raw.trim().parse::<f64>() {
                    Ok(v) if v.is_finite() => Ok(v),
                    Ok(_) => Err(format!("value '{}' at row {} is not finite", raw, row)),
                    Err(_) => Err(format!("value '{}' at row {} is not numeric", raw, row)),
                })
                .collect::<std::result::Result<Vec<f64>, String>>()
                .map(Array1::from_vec),
        }
    }
}

impl From<Vec<f64>> for Column {
    fn from(values: Vec<f64>) -> Self {
        Column::Numeric(Array1::from_vec(values))
    }
}

impl From<Array1<f64>> for Column {
    fn from(values: Array1<f64>) -> Self {
        Column::Numeric(values)
    }
}

impl From<Vec<String>> for Column {
    fn from(values: Vec<String>) -> Self {
        Column::Text(values)
    }
}

impl From<Vec<&str>> for Column {
    fn from(values: Vec<&str>) -> Self {
        Column::Text(values.into_iter().map(str::to_string).collect())
    }
}

/// An in-memory table of uniquely named, equally long columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    names: Vec<String>,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column, replacing any existing column of the same name.
    ///
    /// All columns must have the same number of rows as the first one added.
    pub fn insert(&mut self, name: impl Into<String>, column: impl Into<Column>) -> Result<()> {
        let name = name.into();
        let column = column.into();

        if !self.columns.is_empty() && column.len() != self.n_rows {
            return Err(ShapleyError::InvalidArgument(format!(
                "Column '{}' has {} rows, but the dataset has {}.",
                name,
                column.len(),
                self.n_rows
            )));
        }
        self.n_rows = column.len();

        match self.position(&name) {
            Some(idx) => self.columns[idx] = column,
            None => {
                self.names.push(name);
                self.columns.push(column);
            }
        }
        Ok(())
    }

    /// Builder-style variant of [`Dataset::insert`].
    pub fn with_column(mut self, name: impl Into<String>, column: impl Into<Column>) -> Result<Self> {
        self.insert(name, column)?;
        Ok(self)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|idx| &self.columns[idx])
    }

    /// View of a column that has already been coerced to floating point.
    pub fn numeric(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        match self.column(name)? {
            Column::Numeric(values) => Some(values.view()),
            Column::Text(_) => None,
        }
    }

    /// Coerces the named column to finite floats in place.
    ///
    /// Either every row converts or the column is left untouched and a
    /// validation error carrying `role` is returned.
    pub fn coerce_numeric(&mut self, name: &str, role: ColumnRole) -> Result<()> {
        self.coerce_all_numeric(&[(name, role)])
    }

    /// Coerces several columns at once, writing nothing unless all of them convert.
    pub fn coerce_all_numeric(&mut self, requested: &[(&str, ColumnRole)]) -> Result<()> {
        let converted = requested
            .iter()
            .map(|&(name, role)| -> Result<(usize, Array1<f64>)> {
                let idx = self
                    .position(name)
                    .ok_or_else(|| ShapleyError::validation(role, name, "column not found in dataset"))?;
                let values = self.columns[idx]
                    .to_numeric()
                    .map_err(|reason| ShapleyError::validation(role, name, reason))?;
                Ok((idx, values))
            })
            .collect::<Result<Vec<_>>>()?;

        for (idx, values) in converted {
            self.columns[idx] = Column::Numeric(values);
        }
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset: {} rows x {} columns", self.n_rows, self.n_cols())?;
        for (name, column) in self.names.iter().zip(&self.columns) {
            let kind = if column.is_numeric() { "numeric" } else { "text" };
            writeln!(f, "  {} ({})", name, kind)?;
        }
        Ok(())
    }
}
