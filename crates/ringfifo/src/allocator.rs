//! Pluggable allocation strategy for ring buffer storage.
//!
//! A [`SlotAllocator`] hands out raw, uninitialized blocks described by a
//! [`Layout`]. The ring buffer never asks it to construct anything: slots are
//! written one at a time on push and read out on pop.
//!
//! # Implementations
//!
//! - [`Heap`]: the global allocator (default)
//! - `&A` for any `A: SlotAllocator`, so a buffer can borrow an arena
//! - [`AllocatorBridge`] (feature `allocator-api`, nightly): any
//!   `core::alloc::Allocator`

use std::alloc::Layout;
use std::ptr::NonNull;

/// Raw block allocation strategy.
///
/// # Safety
///
/// Implementors must guarantee that a pointer returned by [`allocate`] is
/// valid for reads and writes of `layout.size()` bytes, aligned to
/// `layout.align()`, and stays valid until it is passed to [`deallocate`]
/// with the same layout.
///
/// Any layout, including a zero-sized one, may be requested by safe code.
/// The ring buffer itself never sends zero-sized layouts.
///
/// [`allocate`]: SlotAllocator::allocate
/// [`deallocate`]: SlotAllocator::deallocate
pub unsafe trait SlotAllocator {
    /// Allocates a block for `layout`. Returns `None` on exhaustion.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Releases a block previously returned by [`allocate`](SlotAllocator::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must come from `self.allocate(layout)` and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The global heap allocator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Heap;

// SAFETY: std::alloc::alloc upholds the block validity contract for
// non-zero-sized layouts; zero-sized ones get an aligned dangling pointer,
// which is valid for zero-byte accesses.
unsafe impl SlotAllocator for Heap {
    #[inline]
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() == 0 {
            return NonNull::new(layout.align() as *mut u8);
        }
        // SAFETY: layout has non-zero size
        NonNull::new(unsafe { std::alloc::alloc(layout) })
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            std::alloc::dealloc(ptr.as_ptr(), layout);
        }
    }
}

// SAFETY: forwards to A, which upholds the contract.
unsafe impl<A: SlotAllocator + ?Sized> SlotAllocator for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        (**self).deallocate(ptr, layout);
    }
}

/// Adapter from the nightly `Allocator` trait.
#[cfg(feature = "allocator-api")]
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocatorBridge<A>(pub A);

// SAFETY: Allocator::allocate returns blocks that fit the layout and stay
// valid until deallocated.
#[cfg(feature = "allocator-api")]
unsafe impl<A: std::alloc::Allocator> SlotAllocator for AllocatorBridge<A> {
    #[inline]
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.0.allocate(layout).ok().map(NonNull::cast)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.0.deallocate(ptr, layout);
    }
}
