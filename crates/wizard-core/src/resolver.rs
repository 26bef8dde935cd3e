//! Step resolution: find the next enabled step in a direction, skipping
//! disabled steps.
//!
//! Starting from a step's transition in the requested direction, each
//! candidate is checked against its `enabled` guard. Disabled candidates are
//! skipped by following *their* same-direction transition. A candidate seen
//! twice within one resolution means the disabled steps loop without ever
//! reaching an enabled one, which is reported as a circular dependency
//! instead of hanging.

use std::collections::HashSet;
use std::sync::Arc;

use wizard_types::{NavigationReason, WizardError};

use crate::callback::WizardData;
use crate::context::WizardContext;
use crate::definition::{Direction, WizardDefinition};
use crate::guard::evaluate_guard;
use crate::transition::resolve_transition;

/// Id of the nearest enabled step from `from` in `direction`, or `None`
/// when the transition chain ends before reaching one.
pub async fn resolve_step<T: WizardData>(
    definition: &WizardDefinition<T>,
    from: &str,
    direction: Direction,
    data: &Arc<T>,
    ctx: &WizardContext,
) -> Result<Option<String>, WizardError> {
    let origin = definition
        .step(from)
        .ok_or_else(|| WizardError::navigation(from, NavigationReason::NotFound))?;

    let mut candidate = match resolve_transition(origin.transition(direction), data, ctx).await? {
        Some(id) => id,
        None => return Ok(None),
    };

    let mut visited: HashSet<String> = HashSet::new();
    loop {
        if !visited.insert(candidate.clone()) {
            return Err(WizardError::navigation(candidate, NavigationReason::Circular));
        }

        let step = definition
            .step(&candidate)
            .ok_or_else(|| {
                WizardError::navigation(candidate.as_str(), NavigationReason::NotFound)
            })?;

        if evaluate_guard(step.enabled.as_ref(), data, ctx).await? {
            return Ok(Some(candidate));
        }

        tracing::debug!(step_id = %candidate, ?direction, "skipping disabled step");

        candidate = match resolve_transition(step.transition(direction), data, ctx).await? {
            Some(id) => id,
            None => return Ok(None),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::StepDefinition;
    use crate::guard::Guard;
    use crate::transition::{Branch, Transition};
    use serde_json::{Value, json};

    fn linear(steps: Vec<StepDefinition<Value>>) -> WizardDefinition<Value> {
        WizardDefinition::new("test", "a", steps).unwrap()
    }

    async fn forward(
        def: &WizardDefinition<Value>,
        from: &str,
        data: Value,
    ) -> Result<Option<String>, WizardError> {
        resolve_step(def, from, Direction::Forward, &Arc::new(data), &WizardContext::new()).await
    }

    async fn backward(
        def: &WizardDefinition<Value>,
        from: &str,
    ) -> Result<Option<String>, WizardError> {
        let data = Arc::new(json!({}));
        resolve_step(def, from, Direction::Backward, &data, &WizardContext::new()).await
    }

    #[tokio::test]
    async fn enabled_neighbour_is_returned() {
        let def = linear(vec![
            StepDefinition::new("a").next(Transition::to("b")),
            StepDefinition::new("b"),
        ]);
        assert_eq!(forward(&def, "a", json!({})).await.unwrap().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn no_transition_is_none() {
        let def = linear(vec![StepDefinition::new("a")]);
        assert_eq!(forward(&def, "a", json!({})).await.unwrap(), None);
        assert_eq!(backward(&def, "a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn disabled_step_is_skipped_forward() {
        let def = linear(vec![
            StepDefinition::new("a").next(Transition::to("b")),
            StepDefinition::new("b").enabled(false).next(Transition::to("c")),
            StepDefinition::new("c"),
        ]);
        assert_eq!(forward(&def, "a", json!({})).await.unwrap().as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn disabled_step_is_skipped_backward() {
        let def = linear(vec![
            StepDefinition::new("a"),
            StepDefinition::new("b").enabled(false).previous(Transition::to("a")),
            StepDefinition::new("c").previous(Transition::to("b")),
        ]);
        assert_eq!(backward(&def, "c").await.unwrap().as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn chain_of_disabled_steps_without_end_is_none() {
        let def = linear(vec![
            StepDefinition::new("a").next(Transition::to("b")),
            StepDefinition::new("b").enabled(false).next(Transition::to("c")),
            StepDefinition::new("c").enabled(false),
        ]);
        assert_eq!(forward(&def, "a", json!({})).await.unwrap(), None);
    }

    #[tokio::test]
    async fn guard_enablement_depends_on_data() {
        let def = linear(vec![
            StepDefinition::new("a").next(Transition::to("extras")),
            StepDefinition::new("extras")
                .enabled(Guard::when(|d: &Value, _| d["premium"] == json!(true)))
                .next(Transition::to("done")),
            StepDefinition::new("done"),
        ]);
        assert_eq!(
            forward(&def, "a", json!({ "premium": true })).await.unwrap().as_deref(),
            Some("extras")
        );
        assert_eq!(
            forward(&def, "a", json!({ "premium": false })).await.unwrap().as_deref(),
            Some("done")
        );
    }

    #[tokio::test]
    async fn loop_among_disabled_steps_is_circular() {
        let def = linear(vec![
            StepDefinition::new("a").next(Transition::to("b")),
            StepDefinition::new("b").enabled(false).next(Transition::to("c")),
            StepDefinition::new("c").enabled(false).next(Transition::to("b")),
        ]);
        let err = forward(&def, "a", json!({})).await.unwrap_err();
        assert_eq!(err.navigation_reason(), Some(NavigationReason::Circular));
        assert_eq!(err.step_id(), Some("b"));
    }

    #[tokio::test]
    async fn self_loop_on_disabled_step_is_circular() {
        let def = linear(vec![
            StepDefinition::new("a").next(Transition::to("b")),
            StepDefinition::new("b").enabled(false).next(Transition::to("b")),
        ]);
        let err = forward(&def, "a", json!({})).await.unwrap_err();
        assert_eq!(err.navigation_reason(), Some(NavigationReason::Circular));
    }

    #[tokio::test]
    async fn missing_target_is_not_found() {
        let def = linear(vec![StepDefinition::new("a").next(Transition::to("ghost"))]);
        let err = forward(&def, "a", json!({})).await.unwrap_err();
        assert_eq!(err.navigation_reason(), Some(NavigationReason::NotFound));
        assert_eq!(err.step_id(), Some("ghost"));
    }

    #[tokio::test]
    async fn unknown_origin_is_not_found() {
        let def = linear(vec![StepDefinition::new("a")]);
        let err = forward(&def, "nowhere", json!({})).await.unwrap_err();
        assert_eq!(err.step_id(), Some("nowhere"));
    }

    #[tokio::test]
    async fn conditional_transition_routes_by_data() {
        let route = Transition::conditional(vec![
            Branch::new(
                Guard::when(|d: &Value, _| d["age"].as_u64().is_some_and(|age| age >= 18)),
                "adult",
            ),
            Branch::new(true, "minor"),
        ]);
        let def = linear(vec![
            StepDefinition::new("a").next(route),
            StepDefinition::new("adult"),
            StepDefinition::new("minor"),
        ]);
        let adult = forward(&def, "a", json!({ "age": 25 })).await.unwrap();
        assert_eq!(adult.as_deref(), Some("adult"));
        let minor = forward(&def, "a", json!({ "age": 10 })).await.unwrap();
        assert_eq!(minor.as_deref(), Some("minor"));
    }

    #[tokio::test]
    async fn disabled_step_uses_its_own_conditional_transition() {
        let def = linear(vec![
            StepDefinition::new("a").next(Transition::to("gate")),
            StepDefinition::new("gate")
                .enabled(false)
                .next(Transition::conditional(vec![
                    Branch::new(false, "x"),
                    Branch::new(true, "y"),
                ])),
            StepDefinition::new("x"),
            StepDefinition::new("y"),
        ]);
        assert_eq!(forward(&def, "a", json!({})).await.unwrap().as_deref(), Some("y"));
    }
}
