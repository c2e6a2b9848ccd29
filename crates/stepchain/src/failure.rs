use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// The failure value that stops a chain.
///
/// Wraps any error type behind a shared pointer, so the same failure can be
/// handed to every compensation and then returned to the caller. Wrapping a
/// `Failure` again yields the same allocation, see [`Failure::same_as`].
///
/// A step may also `std::panic::panic_any` a `Failure`; the chain surfaces
/// it unchanged.
#[derive(Clone)]
pub struct Failure {
    inner: Arc<dyn StdError + Send + Sync + 'static>,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Message(String);

impl Failure {
    /// Wrap an error as a chain failure.
    #[must_use]
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        if let Some(failure) = (&error as &dyn Any).downcast_ref::<Failure>() {
            return failure.clone();
        }
        Self {
            inner: Arc::new(error),
        }
    }

    /// Create a failure from a plain message.
    #[must_use]
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(Message(message.into()))
    }

    /// Returns `true` if the wrapped error is of type `E`.
    #[must_use]
    pub fn is<E: StdError + 'static>(&self) -> bool {
        self.inner.is::<E>()
    }

    /// Borrow the wrapped error as `E`, if it has that type.
    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    /// Returns `true` if both values share the same underlying error.
    #[must_use]
    pub fn same_as(&self, other: &Failure) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner, f)
    }
}

impl StdError for Failure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("card declined")]
    struct CardDeclined;

    #[test]
    fn displays_wrapped_error() {
        let failure = Failure::new(CardDeclined);
        assert_eq!(failure.to_string(), "card declined");
    }

    #[test]
    fn msg_creates_message_failure() {
        let failure = Failure::msg("out of stock");
        assert_eq!(failure.to_string(), "out of stock");
    }

    #[test]
    fn downcast_finds_original_type() {
        let failure = Failure::new(CardDeclined);

        assert!(failure.is::<CardDeclined>());
        assert!(failure.downcast_ref::<CardDeclined>().is_some());
        assert!(failure.downcast_ref::<std::io::Error>().is_none());
    }

    #[test]
    fn wrapping_a_failure_keeps_identity() {
        let original = Failure::new(CardDeclined);
        let rewrapped = Failure::new(original.clone());

        assert!(rewrapped.same_as(&original));
        assert!(rewrapped.is::<CardDeclined>());
    }

    #[test]
    fn distinct_failures_are_not_the_same() {
        let a = Failure::new(CardDeclined);
        let b = Failure::new(CardDeclined);

        assert!(!a.same_as(&b));
    }
}
