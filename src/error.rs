//! Cursor errors.

use std::fmt;

/// Error returned by a [`Cursor`](crate::Cursor) over a mutable collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorError {
    /// The collection was modified after the cursor captured its
    /// modification count, other than through the cursor itself.
    ConcurrentModification,
    /// `remove` was called before the first `next`, or twice without an
    /// intervening `next`.
    IllegalState,
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConcurrentModification => {
                write!(f, "collection was modified while a cursor was open")
            }
            Self::IllegalState => write!(f, "no element to remove: call next first"),
        }
    }
}

impl std::error::Error for CursorError {}
