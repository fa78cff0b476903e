// src/core/errors.rs
use std::fmt;

use thiserror::Error;

/// Which side of the regression a column was requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Regressor,
    Response,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::Regressor => write!(f, "regressor"),
            ColumnRole::Response => write!(f, "response"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ShapleyError {
    /// A column could not be used as requested (missing, non-numeric, misused).
    #[error("Validation Error: {role} column '{column}': {reason}")]
    Validation {
        role: ColumnRole,
        column: String,
        reason: String,
    },

    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),

    /// A least squares fit failed for the named subset of regressors.
    #[error("Computation Error: fit on [{}] failed: {reason}", .subset.join(", "))]
    Computation { subset: Vec<String>, reason: String },

    #[error("Ndarray Error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

impl ShapleyError {
    pub(crate) fn validation(role: ColumnRole, column: &str, reason: impl Into<String>) -> Self {
        ShapleyError::Validation {
            role,
            column: column.to_string(),
            reason: reason.into(),
        }
    }

    /// The role of the offending column, if this is a validation failure.
    pub fn role(&self) -> Option<ColumnRole> {
        match self {
            ShapleyError::Validation { role, .. } => Some(*role),
            _ => None,
        }
    }
}

// Convenience type alias for Result
pub type Result<T> = std::result::Result<T, ShapleyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computation_error_lists_subset() {
        let err = ShapleyError::Computation {
            subset: vec!["A".to_string(), "B".to_string()],
            reason: "design matrix is rank deficient".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Computation Error: fit on [A, B] failed: design matrix is rank deficient"
        );
        assert_eq!(err.role(), None);
    }

    #[test]
    fn validation_error_reports_role() {
        let err = ShapleyError::validation(ColumnRole::Response, "y", "value 'abc' at row 2 is not numeric");
        assert_eq!(err.role(), Some(ColumnRole::Response));
        assert!(err.to_string().contains("response column 'y'"));
    }
}
