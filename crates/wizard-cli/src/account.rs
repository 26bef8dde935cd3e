//! Sample account-setup wizard.
//!
//! profile -> age -> adult | minor -> newsletter (adults only) -> review
//!
//! Each step that asks for input names its field and input kind in the
//! step metadata's `extra` map so the terminal session can prompt for it.

use serde::Deserialize;
use serde_json::{Value, json};

use wizard_core::{
    Branch, Guard, StepDefinition, StepHook, Transition, Validator, WizardContext,
    WizardDefinition,
};
use wizard_types::step::StepMetadata;
use wizard_types::{ValidationResult, WizardError};

pub const ADULT_AGE: u64 = 18;

/// How a step's field is prompted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Confirm,
}

/// The field a step collects, read from its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

impl Field {
    pub fn from_metadata(metadata: &StepMetadata) -> Option<Self> {
        let name = metadata.extra.get("field")?.as_str()?.to_string();
        let kind = serde_json::from_value(metadata.extra.get("kind")?.clone()).ok()?;
        Some(Self { name, kind })
    }

    /// Convert raw text input into the stored JSON value. Numbers that do
    /// not parse are kept as text so the step validator can reject them.
    pub fn parse(&self, raw: &str) -> Value {
        let raw = raw.trim();
        match self.kind {
            FieldKind::Number => raw
                .parse::<u64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(raw.to_string())),
            FieldKind::Confirm => Value::Bool(matches!(raw, "y" | "yes" | "true")),
            FieldKind::Text => Value::String(raw.to_string()),
        }
    }
}

/// Copy of `data` with `field` set to `value`.
pub fn with_field(data: &Value, field: &str, value: Value) -> Value {
    let mut next = match data {
        Value::Object(_) => data.clone(),
        _ => json!({}),
    };
    next[field] = value;
    next
}

fn prompt(title: &str, description: &str, field: &str, kind: &str) -> StepMetadata {
    let mut metadata = StepMetadata::titled(title).with_description(description);
    metadata.extra.insert("field".into(), json!(field));
    metadata.extra.insert("kind".into(), json!(kind));
    metadata
}

fn age(data: &Value) -> Option<u64> {
    data["age"].as_u64()
}

fn is_adult(data: &Value) -> bool {
    age(data).is_some_and(|a| a >= ADULT_AGE)
}

fn non_empty(field: &'static str, message: &'static str) -> Validator<Value> {
    Validator::new(move |data: &Value, _: &WizardContext| {
        match data[field].as_str().map(str::trim) {
            Some(s) if !s.is_empty() => ValidationResult::valid(),
            _ => ValidationResult::field_error(field, message),
        }
    })
}

fn email(field: &'static str) -> Validator<Value> {
    Validator::new(move |data: &Value, _: &WizardContext| match data[field].as_str() {
        Some(s) if s.contains('@') && !s.starts_with('@') && !s.ends_with('@') => {
            ValidationResult::valid()
        }
        _ => ValidationResult::field_error(field, "enter a valid email address"),
    })
}

/// Build the account-setup wizard definition.
pub fn account_setup() -> Result<WizardDefinition<Value>, WizardError> {
    let steps = vec![
        StepDefinition::new("profile")
            .next(Transition::to("age"))
            .validate(non_empty("name", "name is required"))
            .metadata(prompt("Profile", "Tell us who you are.", "name", "text").with_icon("*")),
        StepDefinition::new("age")
            .previous(Transition::to("profile"))
            .next(Transition::conditional(vec![
                Branch::new(Guard::when(|d: &Value, _| is_adult(d)), "adult"),
                Branch::new(true, "minor"),
            ]))
            .validate(Validator::new(|data: &Value, _: &WizardContext| match age(data) {
                Some(1..=130) => ValidationResult::valid(),
                _ => ValidationResult::field_error("age", "enter an age between 1 and 130"),
            }))
            .metadata(prompt("Age", "Used to pick the right sign-up path.", "age", "number")),
        StepDefinition::new("adult")
            .previous(Transition::to("age"))
            .next(Transition::to("newsletter"))
            .validate(email("email"))
            .metadata(prompt("Contact", "Where can we reach you?", "email", "text")),
        StepDefinition::new("minor")
            .previous(Transition::to("age"))
            .next(Transition::to("newsletter"))
            .validate(email("guardian_email"))
            .metadata(prompt(
                "Guardian",
                "Accounts for minors need a guardian's email.",
                "guardian_email",
                "text",
            )),
        StepDefinition::new("newsletter")
            .enabled(Guard::when(|d: &Value, _| is_adult(d)))
            .previous(Transition::resolver(|d: &Value, _| {
                Some(if is_adult(d) { "adult" } else { "minor" }.to_string())
            }))
            .next(Transition::to("review"))
            .metadata(prompt("Newsletter", "Receive product news?", "newsletter", "confirm")),
        StepDefinition::new("review")
            .previous(Transition::to("newsletter"))
            .on_enter(StepHook::new(|data: &Value, _: &WizardContext| {
                let fields = data.as_object().map_or(0, |o| o.len());
                tracing::debug!(fields, "reviewing account");
            }))
            .metadata(
                StepMetadata::titled("Review").with_description("Confirm your details to finish."),
            ),
    ];

    Ok(WizardDefinition::new("account-setup", "profile", steps)?.on_complete(
        StepHook::new(|data: &Value, _: &WizardContext| {
            tracing::info!(name = %data["name"], "account created");
        }),
    ))
}
