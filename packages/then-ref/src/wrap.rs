//! Entry points and re-classification.
//!
//! [`IntoThenable`] is implemented by everything a continuation may return.
//! [`Wrap`] is implemented by everything [`wrap`] accepts, and it is the
//! identity on values that are already wrappers, so wrapping twice is the
//! same as wrapping once.

use std::any::type_name;

use tracing::debug;

use crate::callable::Callable;
use crate::kind::{Classify, Kind};
use crate::promise::Promise;
use crate::resolved::Resolved;
use crate::thenable::Thenable;

/// The wrapper a value of type `R` turns into.
pub type Wrapped<R> = Thenable<<R as IntoThenable>::Output, <R as IntoThenable>::Error>;

/// Conversion of a continuation's return value into the next link.
///
/// | input               | next link  |
/// |---------------------|------------|
/// | `Ok(v)`             | `Value`    |
/// | `Err(e)`            | `Failure`  |
/// | `Promise`           | `Async`    |
/// | `Thenable`          | unchanged  |
/// | `Resolved`          | its state  |
pub trait IntoThenable {
    /// Success type of the resulting wrapper.
    type Output;
    /// Failure type of the resulting wrapper.
    type Error;

    /// Convert into a wrapper, never wrapping an existing wrapper again.
    fn into_thenable(self) -> Thenable<Self::Output, Self::Error>;
}

impl<T, E> IntoThenable for Thenable<T, E> {
    type Output = T;
    type Error = E;

    fn into_thenable(self) -> Thenable<T, E> {
        self
    }
}

impl<T, E> IntoThenable for Result<T, E> {
    type Output = T;
    type Error = E;

    fn into_thenable(self) -> Thenable<T, E> {
        Thenable::from(self)
    }
}

impl<T, E> IntoThenable for Promise<T, E> {
    type Output = T;
    type Error = E;

    fn into_thenable(self) -> Thenable<T, E> {
        Thenable::pending(self)
    }
}

impl<T, E> IntoThenable for Resolved<T, E> {
    type Output = T;
    type Error = E;

    fn into_thenable(self) -> Thenable<T, E> {
        match self {
            Resolved::Value(value) => Thenable::resolve(value),
            Resolved::Failure(error) => Thenable::reject(error),
            Resolved::Pending(promise) => Thenable::pending(promise),
        }
    }
}

/// Anything [`wrap`] accepts.
pub trait Wrap {
    /// The wrapper produced.
    type Wrapper;

    /// Wrap `self`. Wrappers come back unchanged.
    fn wrap(self) -> Self::Wrapper;
}

impl<R: IntoThenable> Wrap for R {
    type Wrapper = Wrapped<R>;

    fn wrap(self) -> Self::Wrapper {
        self.into_thenable()
    }
}

impl<F> Wrap for Callable<F> {
    type Wrapper = Callable<F>;

    fn wrap(self) -> Self::Wrapper {
        self
    }
}

/// Wrap a result, a promise, or an existing wrapper.
///
/// Bare data such as `5` or `"text"` is not accepted here, since a plain `T`
/// cannot be told apart from a `Result` at the type level. Use
/// [`wrap_value`] for bare data and [`wrap_fn`] for functions.
///
/// ```ignore
/// use then_ref::{wrap, Promise};
///
/// let now = wrap(Ok::<_, String>(1));
/// let later = wrap(Promise::<i32, String>::resolve(1));
/// let same = wrap(wrap(Ok::<_, String>(1)));
/// ```
pub fn wrap<W: Wrap>(input: W) -> W::Wrapper {
    input.wrap()
}

/// Wrap a function without invoking it.
///
/// The function runs on [`Callable::call`]; until then the wrapper
/// dereferences to the function itself.
pub fn wrap_fn<F>(func: F) -> Callable<F> {
    Callable::new(func)
}

/// Wrap a bare value. `wrap_value(x).value()` yields `x`.
pub fn wrap_value<T, E>(value: T) -> Thenable<T, E> {
    Thenable::resolve(value)
}

/// Convert a continuation result, logging when it settles into a failure.
pub(crate) fn settle<R: IntoThenable>(result: R, step: &'static str) -> Wrapped<R> {
    let next = result.into_thenable();
    if next.kind() == Kind::Failure {
        debug!(
            step,
            output = type_name::<R::Output>(),
            "continuation settled into failure"
        );
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_result() {
        assert_eq!(wrap(Ok::<i32, String>(1)).kind(), Kind::Value);
        assert_eq!(wrap(Err::<i32, String>("e".into())).kind(), Kind::Failure);
    }

    #[test]
    fn test_wrap_promise_is_async() {
        let wrapped = wrap(Promise::<i32, String>::resolve(1));
        assert_eq!(wrapped.kind(), Kind::Async);
    }

    #[test]
    fn test_wrap_resolved_restores_state() {
        let settled = wrap_value::<i32, String>(4).value();
        let again = wrap(settled);
        assert_eq!(again.get(), Some(&4));
    }

    #[test]
    fn test_wrap_value_is_identity() {
        assert_eq!(wrap_value::<_, String>("x").value().ok(), Some("x"));
    }

    #[test]
    fn test_bare_data_through_wrap_value_chains_like_wrap() {
        let bare = wrap_value::<i32, String>(5).then(|n| Ok(n + 1));
        let result = wrap(Ok::<i32, String>(5)).then(|n| Ok(n + 1));
        assert_eq!(bare.kind(), Kind::Value);
        assert_eq!(bare.value().ok(), result.value().ok());
    }

    #[test]
    fn test_wrap_is_idempotent_on_thenables() {
        let once = wrap(Ok::<i32, String>(1));
        let twice = wrap(wrap(Ok::<i32, String>(1)));
        assert_eq!(once.kind(), twice.kind());
        assert_eq!(once.value().ok(), twice.value().ok());
    }

    #[test]
    fn test_wrap_is_idempotent_on_callables() {
        let producer = || Ok::<i32, String>(1);
        let once = wrap_fn(producer);
        let twice = wrap(wrap_fn(producer));
        assert_eq!(once.call(()).value().ok(), twice.call(()).value().ok());
        assert_eq!(twice.kind(), Kind::Callable);
    }

    #[test]
    fn test_wrap_fn_does_not_invoke() {
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let wrapped = wrap_fn(|| {
            calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok::<i32, String>(1)
        });
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        let _ = wrapped.call(());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
