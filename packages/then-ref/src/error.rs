//! Faults produced by then-ref itself.
//!
//! Failures that flow through a chain are the caller's own error type `E`.
//! `ThenRefError` only covers the two cases the crate detects on its own:
//! a panic captured at a boundary, and a spawned task that never settled.
//!
//! Callers opt in by choosing an `E` that implements `From<ThenRefError>`.
//! `anyhow::Error` already does, so [`Fallible`](crate::Fallible) chains get
//! these faults for free.
//!
//! # Example
//!
//! ```ignore
//! use then_ref::{wrap_fn, ThenRefError};
//!
//! let parse = wrap_fn(|s: &str| -> anyhow::Result<u32> { Ok(s.parse()?) });
//! let settled = parse.call_unwind(("42",)).value();
//! if let Some(err) = settled.err() {
//!     if let Some(ThenRefError::Panicked { message }) = err.downcast_ref() {
//!         eprintln!("parser panicked: {}", message);
//!     }
//! }
//! ```

use std::any::Any;

use thiserror::Error;

/// Structured error type for faults detected by then-ref.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThenRefError {
    /// A callable or spawned task panicked instead of returning.
    #[error("panicked: {message}")]
    Panicked {
        /// The panic payload, when it was a string.
        message: String,
    },

    /// A spawned task was aborted before it settled.
    #[error("task was cancelled before it settled")]
    Cancelled,
}

impl ThenRefError {
    /// Build a `Panicked` fault from a `catch_unwind` payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        Self::Panicked {
            message: panic_message(payload.as_ref()),
        }
    }

    /// Returns true if this fault came from a captured panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, ThenRefError::Panicked { .. })
    }
}

/// Extract a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panicked_display() {
        let err = ThenRefError::Panicked {
            message: "boom".into(),
        };
        assert!(err.to_string().contains("panicked"));
        assert!(err.to_string().contains("boom"));
        assert!(err.is_panic());
    }

    #[test]
    fn test_cancelled_display() {
        let err = ThenRefError::Cancelled;
        assert!(err.to_string().contains("cancelled"));
        assert!(!err.is_panic());
    }

    #[test]
    fn test_from_panic_str_payload() {
        let payload = std::panic::catch_unwind(|| panic!("static message")).unwrap_err();
        assert_eq!(
            ThenRefError::from_panic(payload),
            ThenRefError::Panicked {
                message: "static message".into()
            }
        );
    }

    #[test]
    fn test_from_panic_string_payload() {
        let payload = std::panic::catch_unwind(|| panic!("formatted {}", 7)).unwrap_err();
        assert_eq!(
            ThenRefError::from_panic(payload),
            ThenRefError::Panicked {
                message: "formatted 7".into()
            }
        );
    }

    #[test]
    fn test_from_panic_opaque_payload() {
        let payload: Box<dyn Any + Send> = Box::new(17_u8);
        assert_eq!(
            ThenRefError::from_panic(payload),
            ThenRefError::Panicked {
                message: "unknown panic".into()
            }
        );
    }

    #[test]
    fn test_error_can_be_downcast_from_anyhow() {
        let err: anyhow::Error = ThenRefError::Cancelled.into();
        match err.downcast_ref::<ThenRefError>() {
            Some(ThenRefError::Cancelled) => {}
            other => panic!("Expected Cancelled, got {:?}", other),
        }
    }
}
