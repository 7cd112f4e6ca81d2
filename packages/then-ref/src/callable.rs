//! Invocable wrapper for functions.
//!
//! A [`Callable`] is a function that has not been chained yet. It has no
//! `then`/`catch`/`finally` of its own: it dereferences to the wrapped
//! function, and only [`Callable::call`] turns it into a [`Thenable`].
//!
//! # Key Properties
//!
//! - **Deferred**: wrapping never invokes the function
//! - **Repeatable**: every `call` runs the function again and returns a
//!   fresh link
//! - **Contained**: an `Err` from the function settles the returned link as
//!   a failure; `call_unwind` also contains panics

use std::any::type_name;
use std::fmt;
use std::ops::Deref;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::error;

use crate::error::ThenRefError;
use crate::kind::{Classify, Kind};
use crate::thenable::Thenable;
use crate::wrap::{settle, IntoThenable, Wrapped};

/// Invocation of a function with its arguments packed as a tuple.
///
/// Implemented for every `Fn` closure of zero to six arguments, so
/// `f.invoke((a, b))` is `f(a, b)`.
pub trait Invoke<Args> {
    /// What the function returns.
    type Output;

    /// Call the function.
    fn invoke(&self, args: Args) -> Self::Output;
}

macro_rules! impl_invoke {
    ($($arg:ident),*) => {
        impl<Func, Ret, $($arg,)*> Invoke<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Ret,
        {
            type Output = Ret;

            #[allow(non_snake_case)]
            fn invoke(&self, ($($arg,)*): ($($arg,)*)) -> Ret {
                (self)($($arg),*)
            }
        }
    };
}

impl_invoke!();
impl_invoke!(A1);
impl_invoke!(A1, A2);
impl_invoke!(A1, A2, A3);
impl_invoke!(A1, A2, A3, A4);
impl_invoke!(A1, A2, A3, A4, A5);
impl_invoke!(A1, A2, A3, A4, A5, A6);

/// A wrapped function.
#[derive(Clone, Copy)]
pub struct Callable<F> {
    func: F,
}

impl<F> Callable<F> {
    /// Wrap `func` without invoking it.
    pub fn new(func: F) -> Self {
        Self { func }
    }

    /// Unwrap the function.
    pub fn into_inner(self) -> F {
        self.func
    }

    /// Invoke the function and wrap its outcome.
    ///
    /// `args` is a tuple: `()` for no arguments, `(a,)` for one.
    pub fn call<Args>(&self, args: Args) -> Wrapped<F::Output>
    where
        F: Invoke<Args>,
        F::Output: IntoThenable,
    {
        settle(self.func.invoke(args), "call")
    }

    /// Like [`call`](Self::call), but a panic in the function settles the
    /// returned link as [`ThenRefError::Panicked`] instead of unwinding.
    pub fn call_unwind<Args>(&self, args: Args) -> Wrapped<F::Output>
    where
        F: Invoke<Args>,
        F::Output: IntoThenable,
        <F::Output as IntoThenable>::Error: From<ThenRefError>,
    {
        // AssertUnwindSafe: the function is only borrowed, and nothing it
        // may have left half-updated is read after a panic.
        match catch_unwind(AssertUnwindSafe(|| self.func.invoke(args))) {
            Ok(result) => settle(result, "call_unwind"),
            Err(payload) => {
                let fault = ThenRefError::from_panic(payload);
                error!(
                    callable = type_name::<F>(),
                    panic = %fault,
                    "callable panicked"
                );
                Thenable::reject(fault.into())
            }
        }
    }
}

impl<F> Deref for Callable<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.func
    }
}

impl<F> Classify for Callable<F> {
    fn kind(&self) -> Kind {
        Kind::Callable
    }
}

impl<F> fmt::Debug for Callable<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("func", &type_name::<F>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn add(a: i32, b: i32) -> Result<i32, String> {
        Ok(a + b)
    }

    fn always_fails() -> Result<i32, String> {
        Err("refused".into())
    }

    struct Named {
        label: &'static str,
    }

    impl Named {
        fn label(&self) -> &'static str {
            self.label
        }
    }

    #[test]
    fn test_invoke_packs_arguments() {
        assert_eq!(add.invoke((2, 3)), Ok(5));
        assert_eq!(always_fails.invoke(()), Err("refused".to_string()));
    }

    #[test]
    fn test_call_wraps_success() {
        let wrapped = Callable::new(add);
        let next = wrapped.call((1, 1));
        assert_eq!(next.kind(), Kind::Value);
        assert_eq!(next.get(), Some(&2));
    }

    #[test]
    fn test_call_captures_failure() {
        let next = Callable::new(always_fails).call(());
        assert_eq!(next.kind(), Kind::Failure);
        assert_eq!(next.get_err().map(String::as_str), Some("refused"));
    }

    #[test]
    fn test_call_is_repeatable() {
        let calls = AtomicUsize::new(0);
        let wrapped = Callable::new(|| Ok::<_, String>(calls.fetch_add(1, Ordering::SeqCst)));
        assert_eq!(wrapped.call(()).get(), Some(&0));
        assert_eq!(wrapped.call(()).get(), Some(&1));
    }

    #[test]
    fn test_call_accepts_six_arguments() {
        let sum = Callable::new(|a: i32, b: i32, c: i32, d: i32, e: i32, f: i32| {
            Ok::<_, String>(a + b + c + d + e + f)
        });
        assert_eq!(sum.call((1, 2, 3, 4, 5, 6)).get(), Some(&21));
    }

    #[test]
    fn test_deref_forwards_to_function() {
        let wrapped = Callable::new(Named { label: "inner" });
        assert_eq!(wrapped.label(), "inner");
        assert_eq!(wrapped.kind(), Kind::Callable);
    }

    #[test]
    fn test_deref_allows_direct_invocation() {
        let wrapped = Callable::new(add);
        assert_eq!((*wrapped)(4, 4), Ok(8));
        assert_eq!(wrapped.into_inner()(1, 2), Ok(3));
    }

    #[test]
    fn test_call_unwind_captures_panic() {
        let wrapped = Callable::new(|| -> Result<i32, ThenRefError> { panic!("exploded") });
        let next = wrapped.call_unwind(());
        assert_eq!(next.kind(), Kind::Failure);
        assert_eq!(
            next.get_err(),
            Some(&ThenRefError::Panicked {
                message: "exploded".into()
            })
        );
    }

    #[test]
    fn test_call_unwind_into_anyhow() {
        let wrapped = Callable::new(|n: u32| -> anyhow::Result<u32> {
            if n == 0 {
                panic!("zero");
            }
            Ok(10 / n)
        });
        assert_eq!(wrapped.call_unwind((2,)).get(), Some(&5));

        let failed = wrapped.call_unwind((0,)).value().err().unwrap();
        assert!(matches!(
            failed.downcast_ref::<ThenRefError>(),
            Some(ThenRefError::Panicked { .. })
        ));
    }

    #[test]
    fn test_call_unwind_passes_errors_through() {
        let wrapped = Callable::new(|| -> Result<i32, ThenRefError> { Err(ThenRefError::Cancelled) });
        assert_eq!(wrapped.call_unwind(()).get_err(), Some(&ThenRefError::Cancelled));
    }

    #[test]
    fn test_debug_names_function_type() {
        let rendered = format!("{:?}", Callable::new(add));
        assert!(rendered.starts_with("Callable"));
        assert!(rendered.contains("add"));
    }
}
