//! RingFIFO - Resizable Single-Threaded Ring Buffer
//!
//! A FIFO queue over a single block of raw, uninitialized slots. Elements are
//! written into a slot on push and moved out on pop; nothing is ever
//! default-constructed and no allocation happens per element.
//!
//! # Key Features
//!
//! - Head index + occupancy count (no empty/full pointer ambiguity)
//! - Explicit capacity control: only [`RingBuffer::reserve`] reallocates
//! - Shrinking below the current length keeps the oldest elements
//! - Pluggable [`SlotAllocator`] strategy (global heap by default)
//!
//! # Example
//!
//! ```
//! use ringfifo_rs::{RingBuffer, RingError};
//!
//! let mut ring = RingBuffer::<u64>::with_capacity(4)?;
//! ring.push(1)?;
//! ring.push_slice(&[2, 3, 4])?;
//! assert!(ring.is_full());
//!
//! // Shrink: the two oldest survive
//! ring.reserve(2)?;
//! assert_eq!(ring.pop()?, 1);
//! assert_eq!(ring.pop()?, 2);
//! assert_eq!(ring.pop(), Err(RingError::Empty));
//! # Ok::<(), RingError>(())
//! ```

#![cfg_attr(feature = "allocator-api", feature(allocator_api))]

mod allocator;
mod config;
mod error;
mod invariants;
mod metrics;
mod ring;

pub use allocator::{Heap, SlotAllocator};
#[cfg(feature = "allocator-api")]
pub use allocator::AllocatorBridge;
pub use config::{Config, LARGE_CONFIG, SMALL_CONFIG};
pub use error::{PushError, RingError};
pub use metrics::MetricsSnapshot;
pub use ring::{Iter, RingBuffer};
