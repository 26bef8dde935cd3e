//! Locked navigation operations, transition mechanics and completion.

use std::sync::Arc;

use wizard_types::{NavigationReason, WizardError, WizardState};

use super::{Validated, WizardEngine};
use crate::callback::WizardData;
use crate::definition::Direction;
use crate::guard::evaluate_guard;

impl<T: WizardData> WizardEngine<T> {
    /// Validate and submit the current step, then advance to the next
    /// enabled step, completing the wizard when there is none.
    #[tracing::instrument(skip(self), fields(wizard = %self.definition.id))]
    pub async fn go_next(&self) -> Result<(), WizardError> {
        let _busy = self.begin()?;
        let result = self.go_next_locked().await;
        self.report(result)
    }

    async fn go_next_locked(&self) -> Result<(), WizardError> {
        self.ensure_not_completed()?;
        self.validate_and_submit().await?;
        match self.resolve_from_current(Direction::Forward).await? {
            Some(target) => self.transition_to(&target).await,
            None => self.complete().await,
        }
    }

    /// Move to the previous enabled step. The current step is neither
    /// validated nor submitted.
    #[tracing::instrument(skip(self), fields(wizard = %self.definition.id))]
    pub async fn go_previous(&self) -> Result<(), WizardError> {
        let _busy = self.begin()?;
        let result = self.go_previous_locked().await;
        self.report(result)
    }

    async fn go_previous_locked(&self) -> Result<(), WizardError> {
        match self.resolve_from_current(Direction::Backward).await? {
            Some(target) => self.transition_to(&target).await,
            None => Err(WizardError::navigation(
                self.current_step_id(),
                NavigationReason::NoPreviousStep,
            )),
        }
    }

    /// Return to the history entry `steps` positions before the current one.
    ///
    /// History is an already-travelled path, so the step resolver is bypassed;
    /// only the target's `enabled` guard is re-checked against current data.
    /// `steps == 0` is a no-op.
    #[tracing::instrument(skip(self), fields(wizard = %self.definition.id))]
    pub async fn go_back(&self, steps: usize) -> Result<(), WizardError> {
        let _busy = self.begin()?;
        let result = self.go_back_locked(steps).await;
        self.report(result)
    }

    async fn go_back_locked(&self, steps: usize) -> Result<(), WizardError> {
        if steps == 0 {
            return Ok(());
        }
        let target = {
            let nav = self.lock();
            let current = nav.history.len() - 1;
            match current.checked_sub(steps) {
                Some(index) => nav.history[index].clone(),
                None => {
                    return Err(WizardError::navigation(
                        nav.state.current_step_id.clone(),
                        NavigationReason::InsufficientHistory,
                    ));
                }
            }
        };
        self.ensure_enabled(&target).await?;
        self.transition_to(&target).await
    }

    /// Jump directly to `step_id` if it exists and is currently enabled.
    #[tracing::instrument(skip(self), fields(wizard = %self.definition.id))]
    pub async fn go_to_step(&self, step_id: &str) -> Result<(), WizardError> {
        let _busy = self.begin()?;
        let result = self.go_to_step_locked(step_id).await;
        self.report(result)
    }

    async fn go_to_step_locked(&self, step_id: &str) -> Result<(), WizardError> {
        self.ensure_enabled(step_id).await?;
        self.transition_to(step_id).await
    }

    /// Validate and submit the current step without navigating. Completes
    /// the wizard when the current step is the terminal one.
    #[tracing::instrument(skip(self), fields(wizard = %self.definition.id))]
    pub async fn submit(&self) -> Result<(), WizardError> {
        let _busy = self.begin()?;
        let result = self.submit_locked().await;
        self.report(result)
    }

    async fn submit_locked(&self) -> Result<(), WizardError> {
        self.ensure_not_completed()?;
        self.validate_and_submit().await?;
        if self.resolve_from_current(Direction::Forward).await?.is_none() {
            self.complete().await?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Shared steps
    // -----------------------------------------------------------------------

    fn ensure_not_completed(&self) -> Result<(), WizardError> {
        if self.is_completed() {
            return Err(WizardError::navigation(
                self.current_step_id(),
                NavigationReason::Completed,
            ));
        }
        Ok(())
    }

    async fn ensure_enabled(&self, step_id: &str) -> Result<(), WizardError> {
        let step = self.step(step_id)?;
        let data = self.data();
        if !evaluate_guard(step.enabled.as_ref(), &data, &self.context).await? {
            return Err(WizardError::navigation(step_id, NavigationReason::Disabled));
        }
        Ok(())
    }

    async fn validate_and_submit(&self) -> Result<(), WizardError> {
        let Validated {
            step_id,
            data,
            result,
        } = self.run_validation().await?;
        if !result.valid {
            return Err(WizardError::Validation {
                errors: result.errors,
            });
        }

        let step = self.step(&step_id)?;
        if let Some(handler) = &step.on_submit {
            handler.run(Arc::clone(&data), &self.context).await?;
        }
        self.events.submitted(&step_id, &data);
        Ok(())
    }

    /// Leave the current step and enter `target`.
    ///
    /// Order: leave hook, leave event, state update (validation reset,
    /// visited, history), enter hook, enter event, state-change event.
    /// A failing enter hook leaves the engine on `target`; observers still
    /// get the state-change event before the error is returned.
    async fn transition_to(&self, target: &str) -> Result<(), WizardError> {
        let (from, data) = self.position();

        if let Some(hook) = self.definition.step(&from).and_then(|s| s.on_leave.as_ref()) {
            hook.run(Arc::clone(&data), &self.context).await?;
        }
        self.events.step_left(&from, &data);

        let entered = {
            let mut nav = self.lock();
            let next = Arc::new(WizardState {
                current_step_id: target.to_string(),
                is_valid: true,
                validation_errors: Default::default(),
                ..(*nav.state).clone()
            });
            nav.state = Arc::clone(&next);
            nav.visited.insert(target.to_string());
            nav.history.push(target.to_string());
            next
        };

        if self.context.debug {
            tracing::info!(from = %from, to = %target, "step transition");
        } else {
            tracing::trace!(from = %from, to = %target, "step transition");
        }

        if let Some(hook) = self.definition.step(target).and_then(|s| s.on_enter.as_ref()) {
            if let Err(err) = hook.run(Arc::clone(&entered.data), &self.context).await {
                self.events.state_changed(&self.snapshot());
                return Err(err);
            }
        }
        self.events.step_entered(target, &entered.data);
        self.events.state_changed(&self.snapshot());
        Ok(())
    }

    /// Mark the wizard completed and run the completion handler. A second
    /// call is a no-op.
    async fn complete(&self) -> Result<(), WizardError> {
        let completed = {
            let mut nav = self.lock();
            if nav.state.is_completed {
                return Ok(());
            }
            let next = Arc::new(WizardState {
                is_completed: true,
                ..(*nav.state).clone()
            });
            nav.state = Arc::clone(&next);
            next
        };

        tracing::info!(
            wizard = %self.definition.id,
            step_id = %completed.current_step_id,
            "wizard completed"
        );

        if let Some(handler) = self.definition.completion_handler() {
            handler.run(Arc::clone(&completed.data), &self.context).await?;
        }
        self.events.completed(&completed.data);
        self.events.state_changed(&self.snapshot());
        Ok(())
    }
}
