//! Ambient context passed to every guard, validator and hook.
//!
//! `WizardContext` carries the recognized keys (debug flag, cancellation
//! token) plus a shared key-value bag for anything else the host wants its
//! callbacks to see. Extras are backed by `DashMap` and cloned on read so no
//! guard is ever held across an `.await`.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use wizard_types::config::EngineConfig;

/// Context shared by all callbacks of one engine.
///
/// Cloning produces a shared view: extras and the cancellation token are
/// the same underlying objects.
#[derive(Debug, Clone, Default)]
pub struct WizardContext {
    /// Raise engine transition logs to `info`.
    pub debug: bool,
    /// Cancellation signal checked at the start of every engine operation.
    pub cancellation: CancellationToken,
    extras: Arc<DashMap<String, Value>>,
}

impl WizardContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            debug: config.debug,
            ..Self::default()
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Builder-style extra insertion.
    pub fn with_extra(self, key: impl Into<String>, value: Value) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    /// Derive a context that shares extras but owns a child cancellation
    /// token: cancelling the parent cancels the child, not vice versa.
    pub fn child(&self) -> Self {
        Self {
            debug: self.debug,
            cancellation: self.cancellation.child_token(),
            extras: Arc::clone(&self.extras),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Cloned value at `key`, if present.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.extras.get(key).map(|r| r.value().clone())
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.extras.insert(key.into(), value);
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.extras.remove(key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.extras.contains_key(key)
    }
}
