//! Wizard engine: the runtime state machine driving a user through a
//! [`WizardDefinition`].
//!
//! The engine owns the current step, form data, validation result,
//! completion flag, visited set and ordered history. Navigation and
//! submission (`go_next`, `go_previous`, `go_back`, `go_to_step`, `submit`)
//! are single-flight: a second call while one is suspended fails with a busy
//! error instead of queueing. Data updates, `validate` and `can_submit` are
//! not serialized against them.
//!
//! # Concurrency
//!
//! All methods take `&self`. Internal state lives behind a `std::sync::Mutex`
//! that is only held for short synchronous sections, never across an
//! `.await`, and never while user callbacks run.

mod navigation;


use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use wizard_types::{NavigationReason, ValidationResult, WizardError, WizardState};

use crate::callback::WizardData;
use crate::context::WizardContext;
use crate::definition::{Direction, StepDefinition, WizardDefinition};
use crate::event::EventCallbacks;
use crate::guard::evaluate_guard;
use crate::resolver::resolve_step;

/// Navigation bookkeeping guarded by the engine mutex.
struct Navigation<T> {
    state: Arc<WizardState<T>>,
    visited: HashSet<String>,
    history: Vec<String>,
}

/// Runtime driver for one wizard instance.
pub struct WizardEngine<T: WizardData> {
    definition: Arc<WizardDefinition<T>>,
    context: WizardContext,
    events: Arc<EventCallbacks<T>>,
    nav: Mutex<Navigation<T>>,
    busy: AtomicBool,
}

/// One validation run: the step and data that were checked, and the outcome.
struct Validated<T> {
    step_id: String,
    data: Arc<T>,
    result: ValidationResult,
}

/// Clears the busy flag when a locked operation finishes, however it ends.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl<T: WizardData> WizardEngine<T> {
    /// Construct an engine positioned on the definition's initial step.
    ///
    /// The initial step's `on_enter` hook and enter event are fired on the
    /// ambient tokio runtime without being awaited; failures reach the error
    /// callback only. Outside a runtime the initial hook is skipped.
    /// Use [`WizardEngine::start`] to await it instead.
    pub fn new(
        definition: impl Into<Arc<WizardDefinition<T>>>,
        context: WizardContext,
        initial_data: T,
        events: EventCallbacks<T>,
    ) -> Result<Self, WizardError> {
        let engine = Self::build(definition.into(), context, initial_data, events)?;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(engine.initial_enter());
            }
            Err(_) => {
                tracing::warn!(
                    wizard = %engine.definition.id,
                    "no tokio runtime available, initial on_enter hook not run"
                );
            }
        }
        Ok(engine)
    }

    /// Construct an engine and await the initial step's `on_enter` hook.
    ///
    /// A failing hook is reported through the error callback; construction
    /// itself still succeeds.
    pub async fn start(
        definition: impl Into<Arc<WizardDefinition<T>>>,
        context: WizardContext,
        initial_data: T,
        events: EventCallbacks<T>,
    ) -> Result<Self, WizardError> {
        let engine = Self::build(definition.into(), context, initial_data, events)?;
        engine.initial_enter().await;
        Ok(engine)
    }

    fn build(
        definition: Arc<WizardDefinition<T>>,
        context: WizardContext,
        initial_data: T,
        events: EventCallbacks<T>,
    ) -> Result<Self, WizardError> {
        let initial = definition.initial_step_id.clone();
        if !definition.contains(&initial) {
            return Err(WizardError::Configuration(format!(
                "initial step '{}' not found in wizard '{}'",
                initial, definition.id
            )));
        }

        let state = Arc::new(WizardState::new(initial.clone(), Arc::new(initial_data)));
        let nav = Navigation {
            state,
            visited: HashSet::from([initial.clone()]),
            history: vec![initial],
        };

        Ok(Self {
            definition,
            context,
            events: Arc::new(events),
            nav: Mutex::new(nav),
            busy: AtomicBool::new(false),
        })
    }

    /// Owned future running the initial step's enter hook and event.
    fn initial_enter(&self) -> impl Future<Output = ()> + Send + 'static {
        let definition = Arc::clone(&self.definition);
        let events = Arc::clone(&self.events);
        let context = self.context.clone();
        let state = self.snapshot();
        async move {
            let step_id = state.current_step_id.as_str();
            if let Some(hook) = definition.step(step_id).and_then(|s| s.on_enter.as_ref()) {
                if let Err(err) = hook.run(Arc::clone(&state.data), &context).await {
                    events.failed(&err);
                    return;
                }
            }
            events.step_entered(step_id, &state.data);
        }
    }

    // -----------------------------------------------------------------------
    // Read accessors
    // -----------------------------------------------------------------------

    pub fn definition(&self) -> &WizardDefinition<T> {
        &self.definition
    }

    pub fn context(&self) -> &WizardContext {
        &self.context
    }

    /// Current state snapshot. A new `Arc` is produced on every change.
    pub fn snapshot(&self) -> Arc<WizardState<T>> {
        Arc::clone(&self.lock().state)
    }

    pub fn current_step_id(&self) -> String {
        self.lock().state.current_step_id.clone()
    }

    pub fn current_step(&self) -> Option<&StepDefinition<T>> {
        let id = self.current_step_id();
        self.definition.step(&id)
    }

    pub fn data(&self) -> Arc<T> {
        Arc::clone(&self.lock().state.data)
    }

    pub fn visited_steps(&self) -> HashSet<String> {
        self.lock().visited.clone()
    }

    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Whether there is no earlier history entry to go back to.
    pub fn is_first_step(&self) -> bool {
        self.lock().history.len() <= 1
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn is_completed(&self) -> bool {
        self.lock().state.is_completed
    }

    // -----------------------------------------------------------------------
    // Data
    // -----------------------------------------------------------------------

    /// Replace the data with the result of `updater` applied to the current
    /// value. Not serialized against in-flight navigation.
    pub fn update_data(&self, updater: impl FnOnce(&T) -> T) {
        let current = self.data();
        let next = updater(&current);
        self.set_data(next);
    }

    pub fn set_data(&self, data: T) {
        let data = Arc::new(data);
        let state = self.replace_state(|s| WizardState {
            data,
            ..s.clone()
        });
        self.events.state_changed(&state);
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Run the current step's validator and record the result.
    ///
    /// Does not take the navigation lock. When the current step changes while
    /// the validator is suspended, the result is returned but not recorded.
    #[tracing::instrument(skip(self), fields(wizard = %self.definition.id))]
    pub async fn validate(&self) -> Result<ValidationResult, WizardError> {
        self.ensure_not_cancelled()?;
        let result = self.run_validation().await.map(|v| v.result);
        if let Err(err) = &result {
            self.events.failed(err);
        }
        result
    }

    /// True when the current step validates and is the terminal step.
    pub async fn can_submit(&self) -> Result<bool, WizardError> {
        if self.is_completed() {
            return Ok(false);
        }
        let result = self.validate().await?;
        if !result.valid {
            return Ok(false);
        }
        Ok(self.get_next_step_id().await?.is_none())
    }

    async fn run_validation(&self) -> Result<Validated<T>, WizardError> {
        let (step_id, data) = self.position();
        let step = self.step(&step_id)?;
        let result = match &step.validate {
            Some(validator) => validator.run(Arc::clone(&data), &self.context).await?,
            None => ValidationResult::valid(),
        };

        let recorded = {
            let mut nav = self.lock();
            if nav.state.current_step_id == step_id {
                let next = Arc::new(WizardState {
                    is_valid: result.valid,
                    validation_errors: result.errors.clone(),
                    ..(*nav.state).clone()
                });
                nav.state = Arc::clone(&next);
                Some(next)
            } else {
                None
            }
        };

        self.events.validated(&step_id, &result);
        match recorded {
            Some(state) => self.events.state_changed(&state),
            None => tracing::debug!(
                step_id = %step_id,
                "step changed during validation, result not recorded"
            ),
        }
        Ok(Validated {
            step_id,
            data,
            result,
        })
    }

    // -----------------------------------------------------------------------
    // Read-only navigation queries
    // -----------------------------------------------------------------------

    /// Whether `step_id` exists and its `enabled` guard currently holds.
    pub async fn can_navigate_to_step(&self, step_id: &str) -> Result<bool, WizardError> {
        let Some(step) = self.definition.step(step_id) else {
            return Ok(false);
        };
        let data = self.data();
        evaluate_guard(step.enabled.as_ref(), &data, &self.context).await
    }

    /// Ids of all currently enabled steps, in declaration order.
    pub async fn get_available_steps(&self) -> Result<Vec<String>, WizardError> {
        let data = self.data();
        let mut available = Vec::new();
        for step in self.definition.steps() {
            if evaluate_guard(step.enabled.as_ref(), &data, &self.context).await? {
                available.push(step.id.clone());
            }
        }
        Ok(available)
    }

    pub async fn get_next_step_id(&self) -> Result<Option<String>, WizardError> {
        self.resolve_from_current(Direction::Forward).await
    }

    pub async fn get_previous_step_id(&self) -> Result<Option<String>, WizardError> {
        self.resolve_from_current(Direction::Backward).await
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, Navigation<T>> {
        self.nav.lock().expect("wizard state lock poisoned")
    }

    /// Current step id and data, read together.
    fn position(&self) -> (String, Arc<T>) {
        let nav = self.lock();
        (nav.state.current_step_id.clone(), Arc::clone(&nav.state.data))
    }

    fn step(&self, step_id: &str) -> Result<&StepDefinition<T>, WizardError> {
        self.definition
            .step(step_id)
            .ok_or_else(|| WizardError::navigation(step_id, NavigationReason::NotFound))
    }

    fn replace_state(
        &self,
        f: impl FnOnce(&WizardState<T>) -> WizardState<T>,
    ) -> Arc<WizardState<T>> {
        let mut nav = self.lock();
        let next = Arc::new(f(&nav.state));
        nav.state = Arc::clone(&next);
        next
    }

    async fn resolve_from_current(
        &self,
        direction: Direction,
    ) -> Result<Option<String>, WizardError> {
        let (step_id, data) = self.position();
        resolve_step(&self.definition, &step_id, direction, &data, &self.context).await
    }

    fn ensure_not_cancelled(&self) -> Result<(), WizardError> {
        if self.context.is_cancelled() {
            return Err(WizardError::Aborted);
        }
        Ok(())
    }

    /// Check cancellation, then take the single-flight lock.
    fn begin(&self) -> Result<BusyGuard<'_>, WizardError> {
        self.ensure_not_cancelled()?;
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| WizardError::navigation_without_step(NavigationReason::Busy))?;
        Ok(BusyGuard { flag: &self.busy })
    }

    /// Report a failed operation on the error channel and hand it back.
    /// Validation failures already produced a validation event.
    fn report(&self, result: Result<(), WizardError>) -> Result<(), WizardError> {
        if let Err(err) = &result {
            if !err.is_validation() {
                self.events.failed(err);
            }
        }
        result
    }
}

impl<T: WizardData> std::fmt::Debug for WizardEngine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let nav = self.lock();
        f.debug_struct("WizardEngine")
            .field("wizard", &self.definition.id)
            .field("current_step_id", &nav.state.current_step_id)
            .field("is_completed", &nav.state.is_completed)
            .field("history", &nav.history)
            .field("busy", &self.is_busy())
            .finish()
    }
}
