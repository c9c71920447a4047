use std::fmt;

use crate::types::RecordId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Unknown field '{field}' for collection {collection}")]
    UnknownField {
        collection: &'static str,
        field: String,
    },

    #[error("Invalid sort key '{key}': {reason}")]
    InvalidSortKey { key: String, reason: String },

    #[error("Record decode failed: {0}")]
    Decode(String),

    #[error("Record not found: {0}")]
    NotFound(RecordId),
}

/// A single rejected form field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldProblem {
    pub field: String,
    pub message: String,
}

/// Every problem found while validating a form, in schema field order.
///
/// Rendered as a single user-facing notice, e.g.
/// `name is required; rating must be a number`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    problems: Vec<FieldProblem>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.problems.push(FieldProblem {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn problems(&self) -> &[FieldProblem] {
        &self.problems
    }

    /// Names of the rejected fields, in order.
    pub fn fields(&self) -> Vec<&str> {
        self.problems.iter().map(|p| p.field.as_str()).collect()
    }

    /// `Ok(())` when nothing was collected, otherwise a [`CoreError::Validation`].
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, problem) in self.problems.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{} {}", problem.field, problem.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_errors_are_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn notice_joins_problems_in_order() {
        let mut errors = ValidationErrors::new();
        errors.push("name", "is required");
        errors.push("rating", "must be a number");

        assert_eq!(errors.fields(), vec!["name", "rating"]);
        assert_eq!(
            errors.to_string(),
            "name is required; rating must be a number"
        );

        let err = errors.into_result().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: name is required; rating must be a number"
        );
    }
}
