//! The chaining engine.
//!
//! A [`Thenable`] holds a value, a captured failure, or a [`Promise`], and
//! exposes one chaining interface over all three. Synchronous kinds run each
//! step immediately; the `Async` kind queues the step on the promise and
//! leaves settlement to whoever awaits it.
//!
//! # Step Table
//!
//! | kind      | `then`           | `catch`          | `finally`             |
//! |-----------|------------------|------------------|-----------------------|
//! | `Value`   | run `on_ok`      | pass through     | observe, pass through |
//! | `Failure` | pass through     | run `on_err`     | observe, pass through |
//! | `Async`   | queue `on_ok`    | queue `on_err`   | queue observer        |
//!
//! Every continuation returns something [`IntoThenable`]: `Ok` settles the
//! next link as a value, `Err` as a failure, and a `Thenable` or `Promise`
//! is taken over as-is. A failing continuation never unwinds the caller.
//!
//! # Example
//!
//! ```ignore
//! use then_ref::wrap_fn;
//!
//! let settled = wrap_fn(|| Ok::<i32, i32>(1))
//!     .call(())
//!     .then(|n| Err(n + 1))
//!     .catch(|n| Ok(n + 1))
//!     .value();
//! assert_eq!(settled.ok(), Some(3));
//! ```

use std::future::IntoFuture;

use tracing::{debug, trace};

use crate::kind::{Classify, Kind};
use crate::promise::Promise;
use crate::resolved::Resolved;
use crate::wrap::{settle, IntoThenable, Wrapped};

/// A value that settles now or later, successfully or not.
///
/// Each chain step consumes its link and returns a new one, so links never
/// share state. Accessors that borrow (`get`, `get_err`, `kind`) can be
/// called any number of times and always observe the same value.
///
/// # Bounds
///
/// The chain methods (`then`, `catch`, `finally` and friends) require
/// `T`, `E` and every continuation to be `Send + 'static`, because the same
/// call may have to queue the continuation on a promise. Borrowed or
/// `!Send` data can still be wrapped and read: `wrap`, `get`, `get_err`,
/// `value` and `into_result` carry no bounds, so a synchronous pipeline over
/// such data continues on the `Result` from `into_result`.
#[derive(Debug)]
#[must_use = "a thenable does nothing unless chained, awaited or read"]
pub struct Thenable<T, E> {
    state: State<T, E>,
}

#[derive(Debug)]
enum State<T, E> {
    Value(T),
    Failure(E),
    Async(Promise<T, E>),
}

impl<T, E> Thenable<T, E> {
    /// A wrapper already settled with `value`.
    pub fn resolve(value: T) -> Self {
        Self {
            state: State::Value(value),
        }
    }

    /// A wrapper already settled with the failure `error`.
    pub fn reject(error: E) -> Self {
        Self {
            state: State::Failure(error),
        }
    }

    /// A wrapper around a promise.
    pub fn pending(promise: Promise<T, E>) -> Self {
        Self {
            state: State::Async(promise),
        }
    }

    /// The settled value, if this wrapper holds one.
    pub fn get(&self) -> Option<&T> {
        match &self.state {
            State::Value(value) => Some(value),
            _ => None,
        }
    }

    /// The captured failure, if this wrapper holds one.
    pub fn get_err(&self) -> Option<&E> {
        match &self.state {
            State::Failure(error) => Some(error),
            _ => None,
        }
    }

    /// Returns true if the outcome is still behind a promise.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, State::Async(_))
    }

    /// Force the wrapper and return what it holds.
    ///
    /// Reading a failed chain does not raise: the error comes back as
    /// [`Resolved::Failure`]. For `Async` the promise itself comes back.
    pub fn value(self) -> Resolved<T, E> {
        match self.state {
            State::Value(value) => Resolved::Value(value),
            State::Failure(error) => Resolved::Failure(error),
            State::Async(promise) => Resolved::Pending(promise),
        }
    }

    /// The settled outcome, or the promise when not settled yet.
    pub fn into_result(self) -> Result<Result<T, E>, Promise<T, E>> {
        self.value().into_result()
    }
}

impl<T, E> Thenable<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Continue with `on_ok` once the value is available.
    ///
    /// Failures skip `on_ok` and pass through to the next link.
    pub fn then<F, R>(self, on_ok: F) -> Wrapped<R>
    where
        F: FnOnce(T) -> R + Send + 'static,
        R: IntoThenable<Error = E> + Send + 'static,
        R::Output: Send + 'static,
    {
        trace!(step = "then", kind = %self.kind(), "chain step");
        match self.state {
            State::Value(value) => settle(on_ok(value), "then"),
            State::Failure(error) => Thenable::reject(error),
            State::Async(promise) => Thenable::pending(promise.chain(move |outcome| match outcome {
                Ok(value) => settle(on_ok(value), "then"),
                Err(error) => Thenable::reject(error),
            })),
        }
    }

    /// Continue with `on_ok` on success or `on_err` on failure.
    ///
    /// Exactly one of the two runs. A failure returned by `on_ok` is not
    /// routed to `on_err`; it settles the next link.
    pub fn then_or_else<F, G, R, S>(self, on_ok: F, on_err: G) -> Wrapped<R>
    where
        F: FnOnce(T) -> R + Send + 'static,
        G: FnOnce(E) -> S + Send + 'static,
        R: IntoThenable<Error = E> + Send + 'static,
        S: IntoThenable<Output = R::Output, Error = E> + Send + 'static,
        R::Output: Send + 'static,
    {
        trace!(step = "then_or_else", kind = %self.kind(), "chain step");
        match self.state {
            State::Value(value) => settle(on_ok(value), "then_or_else"),
            State::Failure(error) => settle(on_err(error), "then_or_else"),
            State::Async(promise) => Thenable::pending(promise.chain(move |outcome| match outcome {
                Ok(value) => settle(on_ok(value), "then_or_else"),
                Err(error) => settle(on_err(error), "then_or_else"),
            })),
        }
    }

    /// Recover from a failure with `on_err`.
    ///
    /// Values pass through untouched.
    pub fn catch<G, S>(self, on_err: G) -> Thenable<T, E>
    where
        G: FnOnce(E) -> S + Send + 'static,
        S: IntoThenable<Output = T, Error = E> + Send + 'static,
    {
        trace!(step = "catch", kind = %self.kind(), "chain step");
        match self.state {
            State::Value(value) => Thenable::resolve(value),
            State::Failure(error) => settle(on_err(error), "catch"),
            State::Async(promise) => Thenable::pending(promise.chain(move |outcome| match outcome {
                Ok(value) => Thenable::resolve(value),
                Err(error) => settle(on_err(error), "catch"),
            })),
        }
    }

    /// Run `on_finally` once this link settles, whatever the outcome.
    ///
    /// The callback's return value is discarded. The next link settles
    /// exactly like this one.
    pub fn finally<F, R>(self, on_finally: F) -> Thenable<T, E>
    where
        F: FnOnce() -> R + Send + 'static,
    {
        trace!(step = "finally", kind = %self.kind(), "chain step");
        match self.state {
            State::Async(promise) => Thenable::pending(promise.chain(move |outcome| {
                let _ = on_finally();
                Thenable::from(outcome)
            })),
            state => {
                let _ = on_finally();
                Thenable { state }
            }
        }
    }

    /// Like [`finally`](Self::finally), but the observer may fail.
    ///
    /// `Ok(())` keeps the settled outcome. `Err(e)` replaces it with the
    /// failure `e`, even when this link had already failed.
    pub fn try_finally<F>(self, on_finally: F) -> Thenable<T, E>
    where
        F: FnOnce() -> Result<(), E> + Send + 'static,
    {
        trace!(step = "try_finally", kind = %self.kind(), "chain step");
        match self.state {
            State::Async(promise) => Thenable::pending(promise.chain(move |outcome| {
                override_settled(Thenable::from(outcome), on_finally())
            })),
            state => override_settled(Thenable { state }, on_finally()),
        }
    }
}

fn override_settled<T, E>(link: Thenable<T, E>, cleanup: Result<(), E>) -> Thenable<T, E> {
    match cleanup {
        Ok(()) => link,
        Err(error) => {
            debug!(step = "try_finally", "observer failed, overriding settled state");
            Thenable::reject(error)
        }
    }
}

impl<T, E> Classify for Thenable<T, E> {
    fn kind(&self) -> Kind {
        match self.state {
            State::Value(_) => Kind::Value,
            State::Failure(_) => Kind::Failure,
            State::Async(_) => Kind::Async,
        }
    }
}

impl<T, E> From<Promise<T, E>> for Thenable<T, E> {
    fn from(promise: Promise<T, E>) -> Self {
        Thenable::pending(promise)
    }
}

impl<T, E> From<Result<T, E>> for Thenable<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Thenable::resolve(value),
            Err(error) => Thenable::reject(error),
        }
    }
}

impl<T, E> IntoFuture for Thenable<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = Result<T, E>;
    type IntoFuture = Promise<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        self.value().into_future()
    }
}
