use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::ValidationErrors;

/// Why a navigation request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationReason {
    /// The target step's `enabled` guard evaluated to false.
    Disabled,
    /// The target step id is not part of the definition.
    NotFound,
    /// Another navigation operation is still in flight.
    Busy,
    /// Step resolution revisited a step while skipping disabled steps.
    Circular,
    /// No eligible step exists behind the current one.
    NoPreviousStep,
    /// The history is shorter than the requested number of steps back.
    InsufficientHistory,
    /// The wizard has already completed.
    Completed,
}

impl fmt::Display for NavigationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disabled => "step is disabled",
            Self::NotFound => "step not found",
            Self::Busy => "navigation already in progress",
            Self::Circular => "circular dependency between disabled steps",
            Self::NoPreviousStep => "no previous step",
            Self::InsufficientHistory => "not enough history",
            Self::Completed => "wizard already completed",
        };
        f.write_str(s)
    }
}

/// Errors produced by the wizard engine.
#[derive(Debug, Error)]
pub enum WizardError {
    /// The definition is structurally invalid. Raised only at construction.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The current step's validator reported failure.
    #[error("validation failed: {}", format_fields(.errors))]
    Validation { errors: ValidationErrors },

    #[error("navigation error: {reason}{}", format_step(.step_id))]
    Navigation {
        step_id: Option<String>,
        reason: NavigationReason,
    },

    /// The cancellation signal was already set when the operation began.
    #[error("operation aborted")]
    Aborted,

    /// A guard, validator, hook or handler failed.
    #[error("callback failed: {0}")]
    Callback(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl WizardError {
    pub fn navigation(step_id: impl Into<String>, reason: NavigationReason) -> Self {
        Self::Navigation {
            step_id: Some(step_id.into()),
            reason,
        }
    }

    /// Navigation failure that is not tied to a particular step.
    pub fn navigation_without_step(reason: NavigationReason) -> Self {
        Self::Navigation {
            step_id: None,
            reason,
        }
    }

    pub fn navigation_reason(&self) -> Option<NavigationReason> {
        match self {
            Self::Navigation { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.navigation_reason() == Some(NavigationReason::Busy)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Step id carried by a navigation error, if any.
    pub fn step_id(&self) -> Option<&str> {
        match self {
            Self::Navigation { step_id, .. } => step_id.as_deref(),
            _ => None,
        }
    }
}

fn format_step(step_id: &Option<String>) -> String {
    match step_id {
        Some(id) => format!(" (step '{id}')"),
        None => String::new(),
    }
}

fn format_fields(errors: &ValidationErrors) -> String {
    if errors.is_empty() {
        return "no field errors reported".to_string();
    }
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_error_display() {
        let err = WizardError::navigation("billing", NavigationReason::Disabled);
        assert_eq!(
            err.to_string(),
            "navigation error: step is disabled (step 'billing')"
        );
    }

    #[test]
    fn test_navigation_error_without_step() {
        let err = WizardError::navigation_without_step(NavigationReason::Busy);
        assert_eq!(err.to_string(), "navigation error: navigation already in progress");
        assert!(err.is_busy());
        assert_eq!(err.step_id(), None);
    }

    #[test]
    fn test_validation_error_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.insert("email".to_string(), "required".to_string());
        errors.insert("age".to_string(), "must be positive".to_string());
        let err = WizardError::Validation { errors };
        // BTreeMap keeps fields sorted
        assert_eq!(
            err.to_string(),
            "validation failed: age: must be positive, email: required"
        );
        assert!(err.is_validation());
        assert_eq!(err.navigation_reason(), None);
    }

    #[test]
    fn test_callback_error_keeps_source() {
        let io = std::io::Error::other("disk on fire");
        let err = WizardError::Callback(Box::new(io));
        assert!(err.to_string().contains("disk on fire"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_reason_serializes_snake_case() {
        let json = serde_json::to_string(&NavigationReason::InsufficientHistory).unwrap();
        assert_eq!(json, "\"insufficient_history\"");
    }
}
