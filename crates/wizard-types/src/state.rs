//! Runtime state snapshot and validation result types.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Field name -> error message, as reported by a step validator.
pub type ValidationErrors = BTreeMap<String, String>;

/// Outcome of running a step validator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: ValidationErrors,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: ValidationErrors::new(),
        }
    }

    pub fn invalid(errors: ValidationErrors) -> Self {
        Self {
            valid: false,
            errors,
        }
    }

    /// Build an invalid result with a single field error.
    pub fn field_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.insert(field.into(), message.into());
        Self::invalid(errors)
    }
}

/// Public snapshot of a wizard's runtime state.
///
/// The engine replaces its snapshot on every change, so an `Arc<WizardState<T>>`
/// handed out earlier is never mutated and can be cached by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardState<T> {
    pub current_step_id: String,
    pub data: Arc<T>,
    pub is_valid: bool,
    #[serde(default)]
    pub validation_errors: ValidationErrors,
    pub is_completed: bool,
}

impl<T> WizardState<T> {
    /// Fresh state positioned on `step_id` with nothing validated yet.
    pub fn new(step_id: impl Into<String>, data: Arc<T>) -> Self {
        Self {
            current_step_id: step_id.into(),
            data,
            is_valid: true,
            validation_errors: ValidationErrors::new(),
            is_completed: false,
        }
    }
}
