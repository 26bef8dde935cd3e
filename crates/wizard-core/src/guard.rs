//! Boolean guards and their combinators.
//!
//! A guard is either a literal boolean or a (possibly suspending) predicate
//! over form data and context. Combinators await their children one at a
//! time so short-circuiting skips the cost of guards that cannot change the
//! outcome.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use wizard_types::WizardError;

use crate::callback::{AsyncFn, WizardData, callback_error, erase_async, erase_sync};
use crate::context::WizardContext;

/// Predicate gating a step or a conditional branch.
pub enum Guard<T> {
    Const(bool),
    Predicate(AsyncFn<T, bool>),
}

impl<T: WizardData> Guard<T> {
    /// Guard from a synchronous predicate.
    pub fn when<F>(f: F) -> Self
    where
        F: Fn(&T, &WizardContext) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(erase_sync(f))
    }

    /// Guard from an async, fallible predicate.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<T>, WizardContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        Self::Predicate(erase_async(f))
    }

    pub async fn evaluate(&self, data: &Arc<T>, ctx: &WizardContext) -> Result<bool, WizardError> {
        match self {
            Self::Const(value) => Ok(*value),
            Self::Predicate(f) => f(Arc::clone(data), ctx.clone())
                .await
                .map_err(callback_error),
        }
    }
}

impl<T> From<bool> for Guard<T> {
    fn from(value: bool) -> Self {
        Self::Const(value)
    }
}

impl<T> Clone for Guard<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Const(value) => Self::Const(*value),
            Self::Predicate(f) => Self::Predicate(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for Guard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(value) => f.debug_tuple("Const").field(value).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Evaluate an optional guard. A missing guard allows.
pub async fn evaluate_guard<T: WizardData>(
    guard: Option<&Guard<T>>,
    data: &Arc<T>,
    ctx: &WizardContext,
) -> Result<bool, WizardError> {
    match guard {
        None => Ok(true),
        Some(guard) => guard.evaluate(data, ctx).await,
    }
}

/// True when every guard is true. Stops at the first false guard.
pub fn and_guards<T: WizardData>(guards: Vec<Guard<T>>) -> Guard<T> {
    let guards = Arc::new(guards);
    Guard::from_async(move |data, ctx| {
        let guards = Arc::clone(&guards);
        async move {
            for guard in guards.iter() {
                if !guard.evaluate(&data, &ctx).await? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    })
}

/// True when any guard is true. Stops at the first true guard.
pub fn or_guards<T: WizardData>(guards: Vec<Guard<T>>) -> Guard<T> {
    let guards = Arc::new(guards);
    Guard::from_async(move |data, ctx| {
        let guards = Arc::clone(&guards);
        async move {
            for guard in guards.iter() {
                if guard.evaluate(&data, &ctx).await? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    })
}

pub fn not_guard<T: WizardData>(guard: Guard<T>) -> Guard<T> {
    match guard {
        Guard::Const(value) => Guard::Const(!value),
        predicate => Guard::from_async(move |data, ctx| {
            let inner = predicate.clone();
            async move { Ok(!inner.evaluate(&data, &ctx).await?) }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(value: bool, calls: &Arc<AtomicUsize>) -> Guard<u32> {
        let calls = Arc::clone(calls);
        Guard::when(move |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            value
        })
    }

    async fn eval(guard: &Guard<u32>, data: u32) -> bool {
        guard
            .evaluate(&Arc::new(data), &WizardContext::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn missing_guard_allows() {
        let allowed = evaluate_guard::<u32>(None, &Arc::new(0), &WizardContext::new())
            .await
            .unwrap();
        assert!(allowed);
    }

    #[tokio::test]
    async fn literal_guard_is_itself() {
        assert!(eval(&Guard::from(true), 0).await);
        assert!(!eval(&Guard::from(false), 0).await);
    }

    #[tokio::test]
    async fn predicate_guard_reads_data() {
        let adult = Guard::when(|age: &u32, _| *age >= 18);
        assert!(eval(&adult, 25).await);
        assert!(!eval(&adult, 10).await);
    }

    #[tokio::test]
    async fn predicate_guard_reads_context() {
        let guard = Guard::when(|_: &u32, ctx: &WizardContext| ctx.contains("beta"));
        let ctx = WizardContext::new().with_extra("beta", serde_json::json!(true));
        assert!(guard.evaluate(&Arc::new(0), &ctx).await.unwrap());
    }

    #[tokio::test]
    async fn and_short_circuits_on_first_false() {
        let calls = Arc::new(AtomicUsize::new(0));
        let guard = and_guards(vec![counting(false, &calls), counting(true, &calls)]);
        assert!(!eval(&guard, 0).await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn and_of_all_true_is_true() {
        let calls = Arc::new(AtomicUsize::new(0));
        let guard = and_guards(vec![counting(true, &calls), counting(true, &calls)]);
        assert!(eval(&guard, 0).await);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn or_short_circuits_on_first_true() {
        let calls = Arc::new(AtomicUsize::new(0));
        let guard = or_guards(vec![counting(true, &calls), counting(false, &calls)]);
        assert!(eval(&guard, 0).await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_combinators() {
        assert!(eval(&and_guards(vec![]), 0).await);
        assert!(!eval(&or_guards(vec![]), 0).await);
    }

    #[tokio::test]
    async fn not_inverts_literal_and_predicate() {
        assert!(!eval(&not_guard(Guard::from(true)), 0).await);
        let minor = not_guard(Guard::when(|age: &u32, _| *age >= 18));
        assert!(minor.evaluate(&Arc::new(10), &WizardContext::new()).await.unwrap());
    }

    #[tokio::test]
    async fn async_guard_error_propagates_through_combinator() {
        let failing: Guard<u32> =
            Guard::from_async(|_, _| async { Err(anyhow::anyhow!("lookup failed")) });
        let guard = and_guards(vec![Guard::from(true), failing]);
        let err = guard
            .evaluate(&Arc::new(0), &WizardContext::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("lookup failed"));
    }
}
