//! Interactive terminal session driving a [`WizardEngine`].
//!
//! Each round shows the current step, prompts for its field (if any) and
//! offers the navigation actions that currently make sense.

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};
use serde_json::Value;

use wizard_core::WizardEngine;
use wizard_types::WizardError;

use crate::account::{Field, FieldKind, with_field};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Next,
    Finish,
    Back,
    Jump,
    Quit,
}

impl Action {
    fn label(self) -> &'static str {
        match self {
            Self::Next => "Next",
            Self::Finish => "Finish",
            Self::Back => "Back",
            Self::Jump => "Jump to step...",
            Self::Quit => "Quit",
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed(Value),
    Abandoned,
}

/// Run the wizard until it completes or the user quits.
pub async fn run(engine: &WizardEngine<Value>) -> Result<Outcome> {
    while !engine.is_completed() {
        let step = engine
            .current_step()
            .context("current step missing from definition")?;
        let title = step.metadata.title.as_deref().unwrap_or(&step.id);

        println!();
        println!(
            "  {} {}",
            style(step.metadata.icon.as_deref().unwrap_or(">")).cyan().bold(),
            style(title).bold()
        );
        if let Some(description) = &step.metadata.description {
            println!("  {}", style(description).dim());
        }

        match Field::from_metadata(&step.metadata) {
            Some(field) => {
                let value = prompt_field(&field, &engine.data())?;
                engine.update_data(|d| with_field(d, &field.name, value));
            }
            None => {
                println!();
                println!("{}", serde_json::to_string_pretty(&*engine.data())?);
            }
        }

        let actions = available_actions(engine).await?;
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        let selection = Select::new().items(&labels).default(0).interact()?;

        let result = match actions[selection] {
            Action::Next | Action::Finish => engine.go_next().await,
            Action::Back => engine.go_previous().await,
            Action::Jump => match pick_step(engine).await? {
                Some(target) => engine.go_to_step(&target).await,
                None => Ok(()),
            },
            Action::Quit => {
                engine.context().cancel();
                return Ok(Outcome::Abandoned);
            }
        };

        if let Err(err) = result {
            show_error(&err)?;
        }
    }

    Ok(Outcome::Completed((*engine.data()).clone()))
}

async fn available_actions(engine: &WizardEngine<Value>) -> Result<Vec<Action>> {
    let mut actions = Vec::new();
    match engine.get_next_step_id().await? {
        Some(_) => actions.push(Action::Next),
        None => actions.push(Action::Finish),
    }
    if engine.get_previous_step_id().await?.is_some() {
        actions.push(Action::Back);
    }
    actions.push(Action::Jump);
    actions.push(Action::Quit);
    Ok(actions)
}

fn prompt_field(field: &Field, data: &Value) -> Result<Value> {
    let current = &data[field.name.as_str()];
    let label = field.name.replace('_', " ");
    let value = match field.kind {
        FieldKind::Confirm => Value::Bool(
            Confirm::new()
                .with_prompt(label)
                .default(current.as_bool().unwrap_or(false))
                .interact()?,
        ),
        FieldKind::Text | FieldKind::Number => {
            let initial = match current {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            let raw: String = Input::new()
                .with_prompt(label)
                .with_initial_text(initial)
                .allow_empty(true)
                .interact_text()?;
            field.parse(&raw)
        }
    };
    Ok(value)
}

async fn pick_step(engine: &WizardEngine<Value>) -> Result<Option<String>> {
    let current = engine.current_step_id();
    let targets: Vec<String> = engine
        .get_available_steps()
        .await?
        .into_iter()
        .filter(|id| *id != current)
        .collect();
    if targets.is_empty() {
        println!("  {}", style("No other steps are available.").yellow());
        return Ok(None);
    }
    let selection = Select::new()
        .with_prompt("Jump to")
        .items(&targets)
        .default(0)
        .interact_opt()?;
    Ok(selection.map(|i| targets[i].clone()))
}

/// Print a recoverable navigation or validation failure. Anything else ends
/// the session.
fn show_error(err: &WizardError) -> Result<()> {
    match err {
        WizardError::Validation { errors } => {
            for (field, message) in errors {
                println!("  {} {}: {}", style("x").red().bold(), field, message);
            }
            Ok(())
        }
        WizardError::Navigation { .. } => {
            println!("  {} {}", style("!").yellow().bold(), err);
            Ok(())
        }
        _ => Err(anyhow::anyhow!("wizard failed: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wizard_core::{EventCallbacks, WizardContext};

    use crate::account::account_setup;

    async fn engine(data: Value) -> WizardEngine<Value> {
        WizardEngine::start(
            account_setup().unwrap(),
            WizardContext::new(),
            data,
            EventCallbacks::new(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn first_step_offers_next_without_back() {
        let engine = engine(json!({})).await;
        let actions = available_actions(&engine).await.unwrap();
        assert_eq!(actions, vec![Action::Next, Action::Jump, Action::Quit]);
    }

    #[tokio::test]
    async fn review_offers_finish_and_back() {
        let engine = engine(json!({ "age": 40 })).await;
        engine.go_to_step("review").await.unwrap();
        let actions = available_actions(&engine).await.unwrap();
        assert_eq!(actions, vec![Action::Finish, Action::Back, Action::Jump, Action::Quit]);
    }

    #[test]
    fn validation_and_navigation_errors_are_recoverable() {
        let mut errors = wizard_types::ValidationErrors::new();
        errors.insert("name".into(), "name is required".into());
        assert!(show_error(&WizardError::Validation { errors }).is_ok());
        assert!(
            show_error(&WizardError::navigation(
                "newsletter",
                wizard_types::NavigationReason::Disabled
            ))
            .is_ok()
        );
        assert!(show_error(&WizardError::Aborted).is_err());
    }
}
