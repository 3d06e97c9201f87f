use core::fmt;

/// Error which occurs when pushing into a full queue.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct PushError<T>(pub T);

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        "PushError(..)".fmt(f)
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        "pushing into a full queue".fmt(f)
    }
}

impl<T: Send> std::error::Error for PushError<T> {}

/// Error which occurs when popping from an empty queue.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PopError;

impl fmt::Display for PopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        "popping from an empty queue".fmt(f)
    }
}

impl std::error::Error for PopError {}
