//! Testing utilities for code that chains on then-ref wrappers.
//!
//! # Feature Flag
//!
//! This module is only available with the `testing` feature:
//!
//! ```toml
//! [dev-dependencies]
//! then-ref = { version = "0.1", features = ["testing"] }
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use then_ref::assert_settled;
//! use then_ref::testing::CallCounter;
//!
//! let finals = CallCounter::new();
//!
//! assert_settled!(
//!     wrap_value::<i32, i32>(1).finally(finals.observer()).then(|n| Ok(n + 1))
//!         => Ok(2)
//! );
//! assert_eq!(finals.count(), 1);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Asserts that a wrapper settled synchronously with the expected outcome.
///
/// Accepts anything [`IntoThenable`](crate::IntoThenable). The expected
/// value is a `Result`: `Ok(v)` for a value, `Err(e)` for a failure.
///
/// # Panics
///
/// Panics if the outcome differs, or if the wrapper is still pending.
#[macro_export]
macro_rules! assert_settled {
    ($thenable:expr => $expected:expr $(,)?) => {{
        match $crate::IntoThenable::into_thenable($thenable).into_result() {
            Ok(outcome) => assert_eq!(outcome, $expected),
            Err(_) => panic!("expected a settled thenable, found a pending promise"),
        }
    }};
}

/// Shared counter for observing how often continuations run.
///
/// Clones share the same count, so a clone can move into a `'static`
/// continuation while the test keeps the original.
#[derive(Debug, Clone, Default)]
pub struct CallCounter {
    count: Arc<AtomicUsize>,
}

impl CallCounter {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment and return the previous count.
    pub fn hit(&self) -> usize {
        self.count.fetch_add(1, Ordering::SeqCst)
    }

    /// Current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// A `finally`-shaped observer that increments this counter.
    pub fn observer(&self) -> impl FnOnce() -> usize + Send + 'static {
        let counter = self.clone();
        move || counter.hit()
    }
}
