//! # then-ref
//!
//! One chaining interface over values that settle now or later,
//! successfully or not.
//!
//! ## Core Concepts
//!
//! Callers often get a value that is sometimes ready and sometimes behind a
//! future, and sometimes a failure. then-ref wraps all of them in a
//! [`Thenable`] so the calling code chains `then` / `catch` / `finally`
//! without branching on which case occurred:
//! - [`Kind::Value`] and [`Kind::Failure`] run every step immediately
//! - [`Kind::Async`] queues every step on the [`Promise`] and settles
//!   when awaited
//! - [`Kind::Callable`] is a function that runs on [`Callable::call`]
//!
//! ## Architecture
//!
//! ```text
//! wrap(input) / wrap_fn(f)
//!     │
//!     ├─► Callable ── call(args) ──┐
//!     │                            │
//!     ▼                            ▼
//! Thenable ── then / catch / finally ──► Thenable ──► ...
//!     │
//!     └─► value() / .await
//! ```
//!
//! ## Key Invariants
//!
//! 1. **Failures are data** - an `Err` from a continuation settles the next
//!    link as a failure; it never unwinds the caller
//! 2. **Async is tagged, not guessed** - only a [`Promise`] makes a link
//!    asynchronous
//! 3. **Links are immutable** - every step consumes its link and returns a
//!    new one
//! 4. **Wrapping is idempotent** - `wrap(wrap(x))` is `wrap(x)`
//!
//! ## Example
//!
//! ```ignore
//! use then_ref::{wrap, wrap_fn, Promise};
//!
//! // Synchronous: settles immediately
//! let n = wrap_fn(|| Ok::<i32, i32>(1))
//!     .call(())
//!     .then(|n| Ok(n + 1))
//!     .value();
//! assert_eq!(n.ok(), Some(2));
//!
//! // Asynchronous: same chain, settled by awaiting
//! let n = wrap(Promise::<i32, i32>::resolve(1))
//!     .then(|n| Ok(n + 1))
//!     .await;
//! assert_eq!(n, Ok(2));
//! ```
//!
//! ## What This Is Not
//!
//! then-ref is **not** a scheduler or an executor, and it has no
//! cancellation, timeouts or multi-value combinators.

mod callable;
mod error;
mod kind;
mod promise;
mod resolved;
mod thenable;
mod wrap;

// Testing utilities (feature-gated)
#[cfg(feature = "testing")]
pub mod testing;



// Re-export classification
pub use crate::kind::{classify, Classify, Kind};

// Re-export wrapper types
pub use crate::callable::{Callable, Invoke};
pub use crate::promise::Promise;
pub use crate::resolved::Resolved;
pub use crate::thenable::Thenable;

// Re-export entry points
pub use crate::wrap::{wrap, wrap_fn, wrap_value, IntoThenable, Wrap, Wrapped};

// Re-export error types
pub use crate::error::ThenRefError;

/// A thenable whose failures are `anyhow::Error`.
///
/// Captured panics and cancelled tasks convert into it automatically.
pub type Fallible<T> = Thenable<T, anyhow::Error>;
