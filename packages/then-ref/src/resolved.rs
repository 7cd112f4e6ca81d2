//! What `Thenable::value` hands back.

use std::future::IntoFuture;

use crate::kind::{Classify, Kind};
use crate::promise::Promise;

/// The settled state of a wrapper, or its pending handle.
///
/// For synchronous kinds this is the concrete value or the captured error.
/// For `Async` it is the promise itself, which the caller awaits. Every
/// variant can be awaited, so `thenable.value().await` works without
/// knowing which case occurred.
#[derive(Debug)]
pub enum Resolved<T, E> {
    /// Settled successfully.
    Value(T),
    /// Settled with a captured failure.
    Failure(E),
    /// Not settled yet.
    Pending(Promise<T, E>),
}

impl<T, E> Resolved<T, E> {
    /// The success value, if settled successfully.
    pub fn ok(self) -> Option<T> {
        match self {
            Resolved::Value(value) => Some(value),
            _ => None,
        }
    }

    /// The captured error, if settled with a failure.
    pub fn err(self) -> Option<E> {
        match self {
            Resolved::Failure(error) => Some(error),
            _ => None,
        }
    }

    /// Returns true if the value is still behind a promise.
    pub fn is_pending(&self) -> bool {
        matches!(self, Resolved::Pending(_))
    }

    /// Split into the settled outcome or the pending promise.
    pub fn into_result(self) -> Result<Result<T, E>, Promise<T, E>> {
        match self {
            Resolved::Value(value) => Ok(Ok(value)),
            Resolved::Failure(error) => Ok(Err(error)),
            Resolved::Pending(promise) => Err(promise),
        }
    }
}

impl<T, E> Classify for Resolved<T, E> {
    fn kind(&self) -> Kind {
        match self {
            Resolved::Value(_) => Kind::Value,
            Resolved::Failure(_) => Kind::Failure,
            Resolved::Pending(_) => Kind::Async,
        }
    }
}

impl<T, E> IntoFuture for Resolved<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = Result<T, E>;
    type IntoFuture = Promise<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Resolved::Value(value) => Promise::resolve(value),
            Resolved::Failure(error) => Promise::reject(error),
            Resolved::Pending(promise) => promise,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let settled: Resolved<i32, String> = Resolved::Value(1);
        assert_eq!(settled.kind(), Kind::Value);
        assert_eq!(settled.ok(), Some(1));

        let failed: Resolved<i32, String> = Resolved::Failure("bad".into());
        assert_eq!(failed.kind(), Kind::Failure);
        assert!(!failed.is_pending());
        assert_eq!(failed.err(), Some("bad".to_string()));
    }

    #[test]
    fn test_pending_has_no_settled_value() {
        let pending: Resolved<i32, String> = Resolved::Pending(Promise::resolve(1));
        assert!(pending.is_pending());
        assert_eq!(pending.kind(), Kind::Async);
        assert!(pending.into_result().is_err());
    }

    #[tokio::test]
    async fn test_every_variant_is_awaitable() {
        let settled: Resolved<i32, String> = Resolved::Value(1);
        assert_eq!(settled.await, Ok(1));

        let failed: Resolved<i32, String> = Resolved::Failure("bad".into());
        assert_eq!(failed.await, Err("bad".to_string()));

        let pending: Resolved<i32, String> = Resolved::Pending(Promise::resolve(3));
        assert_eq!(pending.await, Ok(3));
    }
}
