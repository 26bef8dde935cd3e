//! Per-engine event callbacks.
//!
//! Each engine owns one `EventCallbacks` set. Every emitted event is handed
//! synchronously to its matching callback (if set) and then published on the
//! attached [`EventBus`] (if any).

use std::fmt;
use std::sync::Arc;

use wizard_types::event::WizardEvent;
use wizard_types::{ValidationResult, WizardError, WizardState};

use super::bus::EventBus;

type StateFn<T> = Box<dyn Fn(&WizardState<T>) + Send + Sync>;
type StepDataFn<T> = Box<dyn Fn(&str, &T) + Send + Sync>;
type ValidationFn = Box<dyn Fn(&str, &ValidationResult) + Send + Sync>;
type DataFn<T> = Box<dyn Fn(&T) + Send + Sync>;
type ErrorFn = Box<dyn Fn(&WizardError) + Send + Sync>;

/// Optional observers of engine activity.
pub struct EventCallbacks<T> {
    on_state_change: Option<StateFn<T>>,
    on_step_enter: Option<StepDataFn<T>>,
    on_step_leave: Option<StepDataFn<T>>,
    on_validation: Option<ValidationFn>,
    on_submit: Option<StepDataFn<T>>,
    on_complete: Option<DataFn<T>>,
    on_error: Option<ErrorFn>,
    bus: Option<EventBus<T>>,
}

impl<T> Default for EventCallbacks<T> {
    fn default() -> Self {
        Self {
            on_state_change: None,
            on_step_enter: None,
            on_step_leave: None,
            on_validation: None,
            on_submit: None,
            on_complete: None,
            on_error: None,
            bus: None,
        }
    }
}

impl<T: Clone> EventCallbacks<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_state_change(mut self, f: impl Fn(&WizardState<T>) + Send + Sync + 'static) -> Self {
        self.on_state_change = Some(Box::new(f));
        self
    }

    pub fn on_step_enter(mut self, f: impl Fn(&str, &T) + Send + Sync + 'static) -> Self {
        self.on_step_enter = Some(Box::new(f));
        self
    }

    pub fn on_step_leave(mut self, f: impl Fn(&str, &T) + Send + Sync + 'static) -> Self {
        self.on_step_leave = Some(Box::new(f));
        self
    }

    pub fn on_validation(
        mut self,
        f: impl Fn(&str, &ValidationResult) + Send + Sync + 'static,
    ) -> Self {
        self.on_validation = Some(Box::new(f));
        self
    }

    pub fn on_submit(mut self, f: impl Fn(&str, &T) + Send + Sync + 'static) -> Self {
        self.on_submit = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&WizardError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Also publish every event on `bus`.
    pub fn with_bus(mut self, bus: EventBus<T>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub(crate) fn state_changed(&self, state: &Arc<WizardState<T>>) {
        if let Some(f) = &self.on_state_change {
            f(&**state);
        }
        self.publish(|| WizardEvent::StateChanged {
            state: Arc::clone(state),
        });
    }

    pub(crate) fn step_entered(&self, step_id: &str, data: &Arc<T>) {
        if let Some(f) = &self.on_step_enter {
            f(step_id, &**data);
        }
        self.publish(|| WizardEvent::StepEntered {
            step_id: step_id.to_string(),
            data: Arc::clone(data),
        });
    }

    pub(crate) fn step_left(&self, step_id: &str, data: &Arc<T>) {
        if let Some(f) = &self.on_step_leave {
            f(step_id, &**data);
        }
        self.publish(|| WizardEvent::StepLeft {
            step_id: step_id.to_string(),
            data: Arc::clone(data),
        });
    }

    pub(crate) fn validated(&self, step_id: &str, result: &ValidationResult) {
        if let Some(f) = &self.on_validation {
            f(step_id, result);
        }
        self.publish(|| WizardEvent::Validated {
            step_id: step_id.to_string(),
            result: result.clone(),
        });
    }

    pub(crate) fn submitted(&self, step_id: &str, data: &Arc<T>) {
        if let Some(f) = &self.on_submit {
            f(step_id, &**data);
        }
        self.publish(|| WizardEvent::StepSubmitted {
            step_id: step_id.to_string(),
            data: Arc::clone(data),
        });
    }

    pub(crate) fn completed(&self, data: &Arc<T>) {
        if let Some(f) = &self.on_complete {
            f(&**data);
        }
        self.publish(|| WizardEvent::Completed {
            data: Arc::clone(data),
        });
    }

    pub(crate) fn failed(&self, err: &WizardError) {
        tracing::warn!(error = %err, "wizard operation failed");
        if let Some(f) = &self.on_error {
            f(err);
        }
        self.publish(|| WizardEvent::Failed {
            message: err.to_string(),
        });
    }

    fn publish(&self, event: impl FnOnce() -> WizardEvent<T>) {
        if let Some(bus) = &self.bus {
            bus.publish(event());
        }
    }
}

impl<T> fmt::Debug for EventCallbacks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventCallbacks")
            .field("on_state_change", &self.on_state_change.is_some())
            .field("on_step_enter", &self.on_step_enter.is_some())
            .field("on_step_leave", &self.on_step_leave.is_some())
            .field("on_validation", &self.on_validation.is_some())
            .field("on_submit", &self.on_submit.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("bus", &self.bus)
            .finish()
    }
}
