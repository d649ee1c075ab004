//! Owner tokens for transient (in-place) mutation.
//!
//! A token is a write capability, not a reference count: a node stamped with
//! a token may be mutated in place by the view holding that token, provided
//! the node handle is not shared with anyone else.

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Identity of the current exclusive mutator of a node cluster.
///
/// Tokens are drawn from a process-wide counter and never reused, so
/// comparing two tokens by value is comparing them by identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OwnerToken(NonZeroU64);

impl OwnerToken {
    /// Claims a fresh token no node has been stamped with yet.
    pub fn new() -> Self {
        let raw = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
        // The counter starts at 1 and would need 2^64 claims to wrap.
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }
}

impl Default for OwnerToken {
    fn default() -> Self {
        Self::new()
    }
}
