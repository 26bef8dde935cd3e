//! Shared domain types for the wizard engine.
//!
//! State snapshots, validation results, step metadata, events, configuration
//! and the error taxonomy. No runtime behavior lives here -- only serde and
//! thiserror.

pub mod config;
pub mod error;
pub mod event;
pub mod state;
pub mod step;

pub use error::{NavigationReason, WizardError};
pub use state::{ValidationErrors, ValidationResult, WizardState};
