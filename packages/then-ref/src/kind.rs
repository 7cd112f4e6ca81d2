//! Classification of wrapped values.
//!
//! Every wrapper carries exactly one [`Kind`]. The kind decides which
//! branch of a chain step runs, and it can change from one link to the
//! next (a `Value` becomes a `Failure` when a continuation returns `Err`).
//!
//! Nothing here is inferred structurally. A value is `Async` because the
//! producer handed over a [`Promise`](crate::Promise), and `Callable`
//! because it went through [`wrap_fn`](crate::wrap_fn).

use std::fmt;

/// Discrete tag for what a wrapper currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Ordinary data that is already available.
    Value,
    /// A function that has not been invoked yet.
    Callable,
    /// A computation that settles later.
    Async,
    /// A captured synchronous failure.
    Failure,
}

impl Kind {
    /// Returns true for the kinds that settle without suspending.
    pub fn is_sync(self) -> bool {
        !matches!(self, Kind::Async)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Value => write!(f, "value"),
            Kind::Callable => write!(f, "callable"),
            Kind::Async => write!(f, "async"),
            Kind::Failure => write!(f, "failure"),
        }
    }
}

/// Anything that can report its [`Kind`].
///
/// Implementations must be pure: asking for the kind never resolves,
/// polls or invokes anything.
pub trait Classify {
    /// The kind of value currently held.
    fn kind(&self) -> Kind;
}

/// Classify a value.
pub fn classify<C: Classify + ?Sized>(value: &C) -> Kind {
    value.kind()
}
