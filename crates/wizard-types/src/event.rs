//! Event types for the wizard event bus.
//!
//! `WizardEvent` mirrors the engine's callback set one variant per callback,
//! so subscribers on a broadcast channel observe the same sequence as direct
//! callbacks. All variants are `Clone` for use with tokio broadcast channels.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::state::{ValidationResult, WizardState};

/// Events emitted by a wizard engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardEvent<T> {
    /// The public state snapshot changed.
    StateChanged { state: Arc<WizardState<T>> },

    /// A step became the current step.
    StepEntered { step_id: String, data: Arc<T> },

    /// The current step was left during a transition.
    StepLeft { step_id: String, data: Arc<T> },

    /// A step validator ran.
    Validated {
        step_id: String,
        result: ValidationResult,
    },

    /// A step's data was submitted.
    StepSubmitted { step_id: String, data: Arc<T> },

    /// The wizard completed with its final data.
    Completed { data: Arc<T> },

    /// An operation failed. Carries the rendered error.
    Failed { message: String },
}

impl<T> WizardEvent<T> {
    /// Short machine-readable name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "state_changed",
            Self::StepEntered { .. } => "step_entered",
            Self::StepLeft { .. } => "step_left",
            Self::Validated { .. } => "validated",
            Self::StepSubmitted { .. } => "step_submitted",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
        }
    }
}
