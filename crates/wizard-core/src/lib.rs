//! Navigation and state engine for multi-step wizards.
//!
//! A wizard is a graph of named steps with conditional transitions,
//! per-step validation and lifecycle hooks. This crate resolves transitions,
//! skips disabled steps with cycle protection, and runs the state machine
//! that sequences validation, submission, hooks and completion.
//!
//! - `guard` -- boolean guards and short-circuit combinators
//! - `transition` -- static / conditional / resolver transitions
//! - `resolver` -- next-enabled-step resolution with cycle detection
//! - `engine` -- the single-flight runtime state machine
//! - `event` -- per-engine callbacks and the broadcast event bus

pub mod callback;
pub mod context;
pub mod definition;
pub mod engine;
pub mod event;
pub mod guard;
pub mod resolver;
pub mod transition;

pub use callback::{CompletionHandler, StepHook, SubmitHandler, Validator, WizardData};
pub use context::WizardContext;
pub use definition::{Direction, StepDefinition, WizardDefinition};
pub use engine::WizardEngine;
pub use event::{EventBus, EventCallbacks};
pub use guard::{Guard, and_guards, evaluate_guard, not_guard, or_guards};
pub use resolver::resolve_step;
pub use transition::{Branch, Transition, resolve_transition};
