//! Error types for ring buffer operations.

use thiserror::Error;

/// Errors that can occur in ring buffer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingError {
    /// Every slot is occupied.
    #[error("ring buffer is full (capacity: {capacity})")]
    Full { capacity: usize },

    /// No slot is occupied.
    #[error("ring buffer is empty")]
    Empty,

    /// A bulk push asked for more slots than are vacant.
    #[error("not enough vacant slots: requested {requested}, available {available}")]
    InsufficientSpace { requested: usize, available: usize },

    /// The allocator could not provide a block.
    #[error("failed to allocate {slots} slots ({bytes} bytes)")]
    OutOfMemory { slots: usize, bytes: usize },

    /// The requested slot count does not fit in a valid layout.
    #[error("capacity overflow: {slots} slots exceed the maximum allocation size")]
    CapacityOverflow { slots: usize },
}

impl RingError {
    /// Returns `true` if the caller can retry after draining or refilling
    /// the buffer (`Full`, `Empty`, `InsufficientSpace`).
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Full { .. } | Self::Empty | Self::InsufficientSpace { .. }
        )
    }

    /// Returns `true` if storage could not be obtained.
    #[inline]
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. } | Self::CapacityOverflow { .. })
    }
}

/// A push rejected because the buffer was full.
///
/// Hands the item back so nothing is dropped behind the caller's back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ring buffer is full (capacity: {capacity})")]
pub struct PushError<T> {
    /// The rejected item.
    pub item: T,
    /// Capacity of the buffer at the time of the push.
    pub capacity: usize,
}

impl<T> PushError<T> {
    /// Recovers the rejected item.
    #[inline]
    pub fn into_inner(self) -> T {
        self.item
    }
}

impl<T> From<PushError<T>> for RingError {
    fn from(err: PushError<T>) -> Self {
        Self::Full {
            capacity: err.capacity,
        }
    }
}
