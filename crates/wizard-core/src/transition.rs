//! Transition descriptors and their resolution to a target step id.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use wizard_types::WizardError;

use crate::callback::{AsyncFn, WizardData, callback_error, erase_async, erase_sync};
use crate::context::WizardContext;
use crate::guard::Guard;

/// One arm of a conditional transition.
pub struct Branch<T> {
    pub guard: Guard<T>,
    pub target: String,
}

impl<T> Branch<T> {
    pub fn new(guard: impl Into<Guard<T>>, target: impl Into<String>) -> Self {
        Self {
            guard: guard.into(),
            target: target.into(),
        }
    }
}

impl<T> Clone for Branch<T> {
    fn clone(&self) -> Self {
        Self {
            guard: self.guard.clone(),
            target: self.target.clone(),
        }
    }
}

impl<T> fmt::Debug for Branch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Branch")
            .field("guard", &self.guard)
            .field("target", &self.target)
            .finish()
    }
}

/// Rule choosing the neighbouring step in one direction.
pub enum Transition<T> {
    /// Always the same target.
    Static(String),
    /// First branch whose guard holds wins; none matching resolves to `None`.
    Conditional(Vec<Branch<T>>),
    /// Target computed by a caller-supplied function.
    Resolver(AsyncFn<T, Option<String>>),
}

impl<T: WizardData> Transition<T> {
    pub fn to(target: impl Into<String>) -> Self {
        Self::Static(target.into())
    }

    pub fn conditional(branches: Vec<Branch<T>>) -> Self {
        Self::Conditional(branches)
    }

    pub fn resolver<F>(f: F) -> Self
    where
        F: Fn(&T, &WizardContext) -> Option<String> + Send + Sync + 'static,
    {
        Self::Resolver(erase_sync(f))
    }

    pub fn resolver_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<T>, WizardContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Option<String>>> + Send + 'static,
    {
        Self::Resolver(erase_async(f))
    }

    pub async fn resolve(
        &self,
        data: &Arc<T>,
        ctx: &WizardContext,
    ) -> Result<Option<String>, WizardError> {
        match self {
            Self::Static(target) => Ok(Some(target.clone())),
            Self::Conditional(branches) => {
                for branch in branches {
                    if branch.guard.evaluate(data, ctx).await? {
                        return Ok(Some(branch.target.clone()));
                    }
                }
                Ok(None)
            }
            Self::Resolver(f) => f(Arc::clone(data), ctx.clone())
                .await
                .map_err(callback_error),
        }
    }
}

impl<T> Clone for Transition<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Static(target) => Self::Static(target.clone()),
            Self::Conditional(branches) => Self::Conditional(branches.clone()),
            Self::Resolver(f) => Self::Resolver(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for Transition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(target) => f.debug_tuple("Static").field(target).finish(),
            Self::Conditional(branches) => f.debug_tuple("Conditional").field(branches).finish(),
            Self::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

/// Resolve an optional transition. A missing transition resolves to `None`.
pub async fn resolve_transition<T: WizardData>(
    transition: Option<&Transition<T>>,
    data: &Arc<T>,
    ctx: &WizardContext,
) -> Result<Option<String>, WizardError> {
    match transition {
        None => Ok(None),
        Some(transition) => transition.resolve(data, ctx).await,
    }
}
