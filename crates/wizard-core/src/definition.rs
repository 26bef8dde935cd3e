//! Immutable wizard graph: step definitions keyed by id plus the global
//! completion handler.

use std::collections::{HashMap, HashSet};
use std::fmt;

use wizard_types::WizardError;
use wizard_types::step::StepMetadata;

use crate::callback::{CompletionHandler, StepHook, SubmitHandler, Validator, WizardData};
use crate::guard::Guard;
use crate::transition::Transition;

/// Navigation direction used by step resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// One node of the wizard graph.
pub struct StepDefinition<T> {
    pub id: String,
    pub previous: Option<Transition<T>>,
    pub next: Option<Transition<T>>,
    /// `None` means always enabled.
    pub enabled: Option<Guard<T>>,
    pub validate: Option<Validator<T>>,
    pub on_enter: Option<StepHook<T>>,
    pub on_leave: Option<StepHook<T>>,
    pub on_submit: Option<SubmitHandler<T>>,
    pub metadata: StepMetadata,
}

impl<T: WizardData> StepDefinition<T> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            previous: None,
            next: None,
            enabled: None,
            validate: None,
            on_enter: None,
            on_leave: None,
            on_submit: None,
            metadata: StepMetadata::default(),
        }
    }

    pub fn next(mut self, transition: Transition<T>) -> Self {
        self.next = Some(transition);
        self
    }

    pub fn previous(mut self, transition: Transition<T>) -> Self {
        self.previous = Some(transition);
        self
    }

    pub fn enabled(mut self, guard: impl Into<Guard<T>>) -> Self {
        self.enabled = Some(guard.into());
        self
    }

    pub fn validate(mut self, validator: Validator<T>) -> Self {
        self.validate = Some(validator);
        self
    }

    pub fn on_enter(mut self, hook: StepHook<T>) -> Self {
        self.on_enter = Some(hook);
        self
    }

    pub fn on_leave(mut self, hook: StepHook<T>) -> Self {
        self.on_leave = Some(hook);
        self
    }

    pub fn on_submit(mut self, handler: SubmitHandler<T>) -> Self {
        self.on_submit = Some(handler);
        self
    }

    pub fn metadata(mut self, metadata: StepMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn transition(&self, direction: Direction) -> Option<&Transition<T>> {
        match direction {
            Direction::Forward => self.next.as_ref(),
            Direction::Backward => self.previous.as_ref(),
        }
    }
}

impl<T> fmt::Debug for StepDefinition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("id", &self.id)
            .field("previous", &self.previous)
            .field("next", &self.next)
            .field("enabled", &self.enabled)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// The complete, immutable wizard graph.
///
/// Step order is preserved as declared; lookups go through an id index.
pub struct WizardDefinition<T> {
    pub id: String,
    pub initial_step_id: String,
    steps: Vec<StepDefinition<T>>,
    index: HashMap<String, usize>,
    on_complete: Option<CompletionHandler<T>>,
}

impl<T: WizardData> WizardDefinition<T> {
    /// Build a definition, rejecting duplicate step ids.
    ///
    /// The initial step is checked when an engine is constructed.
    pub fn new(
        id: impl Into<String>,
        initial_step_id: impl Into<String>,
        steps: Vec<StepDefinition<T>>,
    ) -> Result<Self, WizardError> {
        let mut seen = HashSet::new();
        for step in &steps {
            if !seen.insert(step.id.as_str()) {
                return Err(WizardError::Configuration(format!(
                    "duplicate step ID: '{}'",
                    step.id
                )));
            }
        }
        let index = steps
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();

        Ok(Self {
            id: id.into(),
            initial_step_id: initial_step_id.into(),
            steps,
            index,
            on_complete: None,
        })
    }

    pub fn on_complete(mut self, handler: CompletionHandler<T>) -> Self {
        self.on_complete = Some(handler);
        self
    }

    pub fn step(&self, id: &str) -> Option<&StepDefinition<T>> {
        self.index.get(id).map(|&i| &self.steps[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Steps in declaration order.
    pub fn steps(&self) -> &[StepDefinition<T>] {
        &self.steps
    }

    pub fn completion_handler(&self) -> Option<&CompletionHandler<T>> {
        self.on_complete.as_ref()
    }
}

impl<T> fmt::Debug for WizardDefinition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardDefinition")
            .field("id", &self.id)
            .field("initial_step_id", &self.initial_step_id)
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_id_preserves_order() {
        let def = WizardDefinition::<()>::new(
            "signup",
            "b",
            vec![StepDefinition::new("b"), StepDefinition::new("a")],
        )
        .unwrap();
        assert!(def.contains("a"));
        assert_eq!(def.step("b").map(|s| s.id.as_str()), Some("b"));
        assert!(def.step("missing").is_none());
        let order: Vec<&str> = def.steps().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn duplicate_step_ids_rejected() {
        let err = WizardDefinition::<()>::new(
            "signup",
            "a",
            vec![StepDefinition::new("a"), StepDefinition::new("a")],
        )
        .unwrap_err();
        assert!(matches!(err, WizardError::Configuration(_)));
        assert!(err.to_string().contains("duplicate step ID: 'a'"));
    }

    #[test]
    fn transition_by_direction() {
        let step = StepDefinition::<()>::new("b")
            .next(Transition::to("c"))
            .previous(Transition::to("a"));
        assert!(matches!(
            step.transition(Direction::Forward),
            Some(Transition::Static(t)) if t == "c"
        ));
        assert!(matches!(
            step.transition(Direction::Backward),
            Some(Transition::Static(t)) if t == "a"
        ));
        assert!(StepDefinition::<()>::new("z").transition(Direction::Forward).is_none());
    }
}
