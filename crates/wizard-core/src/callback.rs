//! Type-erased user callbacks: validators and lifecycle hooks.
//!
//! Every callback is stored as an `Arc<dyn Fn(Arc<T>, WizardContext) -> BoxFuture>`
//! so definitions stay cheap to clone and callbacks can suspend. Each wrapper
//! has a synchronous constructor for the common case and a `from_async`
//! constructor for callbacks that need to await something.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use wizard_types::{ValidationResult, WizardError};

use crate::context::WizardContext;

/// Bounds every form-data type must satisfy.
pub trait WizardData: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> WizardData for T {}

/// Erased async callback over form data.
pub(crate) type AsyncFn<T, R> =
    Arc<dyn Fn(Arc<T>, WizardContext) -> BoxFuture<'static, anyhow::Result<R>> + Send + Sync>;

pub(crate) fn erase_async<T, R, F, Fut>(f: F) -> AsyncFn<T, R>
where
    T: WizardData,
    R: Send + 'static,
    F: Fn(Arc<T>, WizardContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
{
    Arc::new(
        move |data: Arc<T>, ctx: WizardContext| -> BoxFuture<'static, anyhow::Result<R>> {
            Box::pin(f(data, ctx))
        },
    )
}

pub(crate) fn erase_sync<T, R, F>(f: F) -> AsyncFn<T, R>
where
    T: WizardData,
    R: Send + 'static,
    F: Fn(&T, &WizardContext) -> R + Send + Sync + 'static,
{
    Arc::new(
        move |data: Arc<T>, ctx: WizardContext| -> BoxFuture<'static, anyhow::Result<R>> {
            let out = f(&data, &ctx);
            Box::pin(async move { Ok(out) })
        },
    )
}

/// Wrap a callback failure. Engine errors raised inside nested callbacks
/// (guard combinators, resolvers) pass through unwrapped.
pub(crate) fn callback_error(err: anyhow::Error) -> WizardError {
    match err.downcast::<WizardError>() {
        Ok(inner) => inner,
        Err(err) => WizardError::Callback(err.into()),
    }
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Per-step validator producing a [`ValidationResult`].
pub struct Validator<T> {
    inner: AsyncFn<T, ValidationResult>,
}

impl<T: WizardData> Validator<T> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&T, &WizardContext) -> ValidationResult + Send + Sync + 'static,
    {
        Self {
            inner: erase_sync(f),
        }
    }

    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<T>, WizardContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<ValidationResult>> + Send + 'static,
    {
        Self {
            inner: erase_async(f),
        }
    }

    /// Validator used for steps that configure none.
    pub fn always_valid() -> Self {
        Self::new(|_, _| ValidationResult::valid())
    }

    pub async fn run(
        &self,
        data: Arc<T>,
        ctx: &WizardContext,
    ) -> Result<ValidationResult, WizardError> {
        (self.inner)(data, ctx.clone()).await.map_err(callback_error)
    }
}

impl<T> Clone for Validator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator(..)")
    }
}

// ---------------------------------------------------------------------------
// StepHook
// ---------------------------------------------------------------------------

/// Side-effecting callback: `on_enter`, `on_leave`, `on_submit` and the
/// definition's completion handler all share this shape.
pub struct StepHook<T> {
    inner: AsyncFn<T, ()>,
}

/// Handler invoked when a step's data is submitted.
pub type SubmitHandler<T> = StepHook<T>;

/// Handler invoked once with the final data when the wizard completes.
pub type CompletionHandler<T> = StepHook<T>;

impl<T: WizardData> StepHook<T> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&T, &WizardContext) + Send + Sync + 'static,
    {
        Self {
            inner: erase_sync(f),
        }
    }

    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<T>, WizardContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            inner: erase_async(f),
        }
    }

    pub async fn run(&self, data: Arc<T>, ctx: &WizardContext) -> Result<(), WizardError> {
        (self.inner)(data, ctx.clone()).await.map_err(callback_error)
    }
}

impl<T> Clone for StepHook<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for StepHook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StepHook(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn sync_validator_sees_data() {
        let validator = Validator::new(|n: &u32, _| {
            if *n > 3 {
                ValidationResult::valid()
            } else {
                ValidationResult::field_error("n", "too small")
            }
        });
        let ctx = WizardContext::new();
        assert!(validator.run(Arc::new(5), &ctx).await.unwrap().valid);
        assert!(!validator.run(Arc::new(1), &ctx).await.unwrap().valid);
    }

    #[tokio::test]
    async fn async_validator_error_becomes_callback_error() {
        let validator: Validator<u32> =
            Validator::from_async(|_, _| async { Err(anyhow::anyhow!("service down")) });
        let err = validator.run(Arc::new(1), &WizardContext::new()).await.unwrap_err();
        assert!(matches!(err, WizardError::Callback(_)));
        assert!(err.to_string().contains("service down"));
    }

    #[tokio::test]
    async fn always_valid_accepts_anything() {
        let result = Validator::<String>::always_valid()
            .run(Arc::new(String::new()), &WizardContext::new())
            .await
            .unwrap();
        assert_eq!(result, ValidationResult::valid());
    }

    #[tokio::test]
    async fn hook_runs_each_time_invoked() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let hook = StepHook::new(move |_: &u8, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let ctx = WizardContext::new();
        hook.run(Arc::new(0), &ctx).await.unwrap();
        hook.clone().run(Arc::new(0), &ctx).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn async_hook_receives_context_extras() {
        let hook: StepHook<u8> = StepHook::from_async(|_, ctx: WizardContext| async move {
            ctx.set("touched", serde_json::json!(true));
            Ok(())
        });
        let ctx = WizardContext::new();
        hook.run(Arc::new(0), &ctx).await.unwrap();
        assert_eq!(ctx.get("touched"), Some(serde_json::json!(true)));
    }
}
