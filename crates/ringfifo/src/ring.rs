use crate::allocator::{Heap, SlotAllocator};
use crate::invariants::{
    debug_assert_bounded_count, debug_assert_head_in_bounds, debug_assert_in_window,
    debug_assert_slot_in_bounds, debug_assert_truncation,
};
use crate::metrics::Metrics;
use crate::{Config, MetricsSnapshot, PushError, RingError};
use log::{debug, trace, warn};
use std::alloc::Layout;
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::mem::{self, MaybeUninit};
use std::ptr::{self, NonNull};
use std::slice;

// =============================================================================
// WINDOW TRACKING
// =============================================================================
//
// The occupied slots are described by two integers:
//
// - `head`: physical index of the oldest element
// - `len`:  number of occupied slots
//
// `len` is the ground truth for empty/full. A raw start/end pair cannot tell
// "nothing stored" from "everything stored" once the window has wrapped all
// the way around; a count can. When `len` drops to 0 the window is reset to
// `head = 0`, so the next push starts a fresh window at the front of storage.
//
// Physically the window is either one run or two:
//
//   Contiguous                       Wrapped
//   ┌───┬───┬───┬───┬───┬───┐        ┌───┬───┬───┬───┬───┬───┐
//   │   │ a │ b │ c │   │   │        │ d │ e │   │   │ a │ b │ ...
//   └───┴───┴───┴───┴───┴───┘        └───┴───┴───┴───┴───┴───┘
//         start      end              0    end     start   capacity
//
// In the wrapped case the tail segment [start, capacity) holds the oldest
// elements and the head segment [0, end) the newest.
//
// =============================================================================

/// Physical layout of the occupied window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Window {
    Empty,
    /// `[start, end)`
    Contiguous { start: usize, end: usize },
    /// `[start, capacity) ++ [0, end)`
    Wrapped { start: usize, end: usize },
}

/// Resizable FIFO ring buffer over raw, uninitialized slots.
///
/// Storage is a single block of `capacity` slots obtained from a
/// [`SlotAllocator`]. Slots are never default-constructed: `push` writes into
/// a vacant slot, `pop` moves the oldest element out and leaves its slot
/// vacant. Only [`reserve`](RingBuffer::reserve) touches the allocator after
/// construction.
///
/// Not synchronized. Every mutating method takes `&mut self`, so sharing a
/// buffer across threads needs an outer lock or a channel.
pub struct RingBuffer<T, A: SlotAllocator = Heap> {
    /// Slot storage; dangling when the block would be zero-sized.
    buffer: NonNull<MaybeUninit<T>>,
    capacity: usize,
    head: usize,
    len: usize,
    alloc: A,
    metrics: Metrics,
    enable_metrics: bool,
    _marker: PhantomData<T>,
}

// Safety: RingBuffer owns its elements outright, like Vec<T>.
unsafe impl<T: Send, A: SlotAllocator + Send> Send for RingBuffer<T, A> {}
unsafe impl<T: Sync, A: SlotAllocator + Sync> Sync for RingBuffer<T, A> {}

impl<T> RingBuffer<T> {
    /// Creates a buffer with no storage. It is both empty and full; push
    /// needs a prior [`reserve`](RingBuffer::reserve).
    pub const fn new() -> Self {
        Self::new_in(Heap)
    }

    /// Creates an empty buffer with exactly `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Result<Self, RingError> {
        Self::with_capacity_in(capacity, Heap)
    }

    /// Creates an empty buffer from a [`Config`].
    pub fn with_config(config: Config) -> Result<Self, RingError> {
        Self::with_config_in(config, Heap)
    }
}

impl<T, A: SlotAllocator> RingBuffer<T, A> {
    /// Creates a buffer with no storage that will allocate through `alloc`.
    pub const fn new_in(alloc: A) -> Self {
        Self {
            buffer: NonNull::dangling(),
            capacity: 0,
            head: 0,
            len: 0,
            alloc,
            metrics: Metrics::new(),
            enable_metrics: false,
            _marker: PhantomData,
        }
    }

    /// Creates an empty buffer with exactly `capacity` slots from `alloc`.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Result<Self, RingError> {
        Self::with_config_in(Config::default().with_capacity(capacity), alloc)
    }

    /// Creates an empty buffer from a [`Config`], allocating through `alloc`.
    pub fn with_config_in(config: Config, alloc: A) -> Result<Self, RingError> {
        let buffer = Self::allocate_block(&alloc, config.capacity)?;
        trace!("ring created with {} slots", config.capacity);

        Ok(Self {
            buffer,
            capacity: config.capacity,
            head: 0,
            len: 0,
            alloc,
            metrics: Metrics::new(),
            enable_metrics: config.enable_metrics,
            _marker: PhantomData,
        })
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// Returns the number of allocated slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of vacant slots.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.len
    }

    /// Returns true if no slot is occupied.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if every slot is occupied. A buffer without storage is
    /// always full.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Returns the allocation strategy.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Get a snapshot of metrics if enabled.
    pub fn metrics(&self) -> MetricsSnapshot {
        if self.enable_metrics {
            self.metrics.snapshot()
        } else {
            MetricsSnapshot::default()
        }
    }

    // ---------------------------------------------------------------------
    // PUSH / POP
    // ---------------------------------------------------------------------

    /// Appends `item` after the newest element.
    ///
    /// # Errors
    ///
    /// Returns the item inside a [`PushError`] if the buffer is full.
    ///
    /// # Example
    /// ```
    /// use ringfifo_rs::RingBuffer;
    ///
    /// let mut ring = RingBuffer::with_capacity(1).unwrap();
    /// ring.push("a").unwrap();
    /// let rejected = ring.push("b").unwrap_err();
    /// assert_eq!(rejected.into_inner(), "b");
    /// ```
    pub fn push(&mut self, item: T) -> Result<(), PushError<T>> {
        if self.is_full() {
            self.record_rejected();
            return Err(PushError {
                item,
                capacity: self.capacity,
            });
        }

        let idx = self.physical(self.len);
        // SAFETY: len < capacity, so idx addresses a vacant slot inside the block
        unsafe { self.slot_ptr(idx).write(item) };
        self.len += 1;

        debug_assert_bounded_count!(self.len, self.capacity);

        if self.enable_metrics {
            self.metrics.add_pushed(1);
        }
        Ok(())
    }

    /// Appends clones of `items`, in order.
    ///
    /// Either every item fits and all are pushed, or nothing is pushed.
    pub fn push_slice(&mut self, items: &[T]) -> Result<(), RingError>
    where
        T: Clone,
    {
        let available = self.remaining();
        if items.len() > available {
            self.record_rejected();
            return Err(RingError::InsufficientSpace {
                requested: items.len(),
                available,
            });
        }
        if items.is_empty() {
            return Ok(());
        }

        let mut idx = self.physical(self.len);
        for item in items {
            // SAFETY: at most `available` writes, each into a vacant slot.
            // len is bumped per write so a panicking clone leaves a valid window.
            unsafe { self.slot_ptr(idx).write(item.clone()) };
            self.len += 1;
            idx += 1;
            if idx == self.capacity {
                idx = 0;
            }
        }

        debug_assert_bounded_count!(self.len, self.capacity);

        if self.enable_metrics {
            self.metrics.add_pushed(items.len() as u64);
        }
        Ok(())
    }

    /// Removes and returns the oldest element.
    pub fn pop(&mut self) -> Result<T, RingError> {
        if self.len == 0 {
            self.record_rejected();
            return Err(RingError::Empty);
        }

        // SAFETY: len > 0 so the oldest slot is occupied; reading moves the
        // value out and the slot is treated as vacant from here on
        let item = unsafe { self.live_ptr(0).read() };
        self.len -= 1;

        if self.len == 0 {
            self.head = 0;
        } else {
            self.head += 1;
            if self.head == self.capacity {
                self.head = 0;
            }
        }

        debug_assert_head_in_bounds!(self.head, self.capacity);

        if self.enable_metrics {
            self.metrics.add_popped(1);
        }
        Ok(item)
    }

    /// Returns the oldest element without removing it.
    pub fn peek(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        // SAFETY: len > 0 so the oldest slot is occupied
        Some(unsafe { &*self.live_ptr(0) })
    }

    /// Drops every element and resets the window. Storage is kept.
    pub fn clear(&mut self) {
        let (front, back) = self.raw_slices();
        self.len = 0;
        self.head = 0;
        // SAFETY: both runs held live elements and are now outside the window
        unsafe {
            ptr::drop_in_place(front);
            ptr::drop_in_place(back);
        }
    }

    // ---------------------------------------------------------------------
    // RESIZE
    // ---------------------------------------------------------------------

    /// Changes the capacity to exactly `new_capacity` slots.
    ///
    /// Survivors keep their order and are packed at the front of the new
    /// block. When `new_capacity < len()` the buffer keeps the **oldest**
    /// `new_capacity` elements and drops the newest ones in place, newest
    /// first. This truncation is silent and deliberate.
    ///
    /// The new block is allocated before any element is touched, so on error
    /// the buffer is unchanged. `reserve(capacity())` does nothing.
    ///
    /// When the window wraps and the tail segment alone overflows
    /// `new_capacity`, the whole head segment is dropped before the tail
    /// segment is cut. Because the tail segment holds the oldest elements the
    /// result is the same oldest-first retention.
    ///
    /// Survivors are moved into the new block before any element is dropped.
    /// If a discarded element's `Drop` panics, the buffer already holds the
    /// survivors at the new capacity, the old block is still released, and
    /// only the discarded elements not yet dropped are leaked.
    pub fn reserve(&mut self, new_capacity: usize) -> Result<(), RingError> {
        if new_capacity == self.capacity {
            return Ok(());
        }

        let block = Self::allocate_block(&self.alloc, new_capacity)?;
        let old_len = self.len;
        let old_capacity = self.capacity;
        let window = self.window();

        let src = self.buffer.as_ptr().cast::<T>();
        let dst = block.as_ptr().cast::<T>();

        // Physical ranges of the old block to drop, newest range first
        let (moved, discard): (usize, [(usize, usize); 2]) = match window {
            Window::Empty => (0, [(0, 0); 2]),
            Window::Contiguous { start, end } => {
                let keep = (end - start).min(new_capacity);
                // SAFETY: [start, start + keep) is live in the old block and
                // fits in the new one; the blocks are distinct allocations
                unsafe { ptr::copy_nonoverlapping(src.add(start), dst, keep) };
                (keep, [(start + keep, end), (0, 0)])
            }
            Window::Wrapped { start, end } => {
                let tail_len = old_capacity - start;
                if tail_len > new_capacity {
                    // SAFETY: as above, new_capacity < tail_len live slots
                    unsafe { ptr::copy_nonoverlapping(src.add(start), dst, new_capacity) };
                    (new_capacity, [(0, end), (start + new_capacity, old_capacity)])
                } else {
                    let head_keep = old_len.min(new_capacity) - tail_len;
                    // SAFETY: both runs are live and together fit in the new block
                    unsafe {
                        ptr::copy_nonoverlapping(src.add(start), dst, tail_len);
                        ptr::copy_nonoverlapping(src, dst.add(tail_len), head_keep);
                    }
                    (tail_len + head_keep, [(head_keep, end), (0, 0)])
                }
            }
        };

        let old = mem::replace(&mut self.buffer, block);
        self.capacity = new_capacity;
        self.head = 0;
        self.len = moved;

        // The old block now holds only discarded elements; it is released
        // even if one of their Drop impls panics.
        let release = ReleaseOnDrop {
            alloc: &self.alloc,
            block: old,
            slots: old_capacity,
        };
        let mut dropped = 0;
        for (from, to) in discard {
            // SAFETY: each range holds live, discarded elements that were not moved
            dropped += unsafe { drop_newest_first(src, from, to) };
        }
        drop(release);

        debug_assert_truncation!(dropped, moved, old_len, new_capacity);

        debug!(
            "ring reserve: capacity {} -> {}, kept {}, truncated {}",
            old_capacity, new_capacity, moved, dropped
        );

        if self.enable_metrics {
            self.metrics.add_reallocation(dropped as u64);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // VIEWS
    // ---------------------------------------------------------------------

    /// Returns the elements as at most two contiguous runs, oldest first.
    ///
    /// The second run is empty unless the window wraps.
    pub fn as_slices(&self) -> (&[T], &[T]) {
        let base = self.buffer.as_ptr().cast::<T>();
        // SAFETY: the runs cover exactly the occupied slots
        unsafe {
            match self.window() {
                Window::Empty => (&[][..], &[][..]),
                Window::Contiguous { start, end } => {
                    (slice::from_raw_parts(base.add(start), end - start), &[][..])
                }
                Window::Wrapped { start, end } => (
                    slice::from_raw_parts(base.add(start), self.capacity - start),
                    slice::from_raw_parts(base, end),
                ),
            }
        }
    }

    /// Mutable counterpart of [`as_slices`](RingBuffer::as_slices).
    pub fn as_mut_slices(&mut self) -> (&mut [T], &mut [T]) {
        let (front, back) = self.raw_slices();
        // SAFETY: the runs are disjoint, occupied, and borrowed through &mut self
        unsafe { (&mut *front, &mut *back) }
    }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> Iter<'_, T> {
        let (front, back) = self.as_slices();
        Iter {
            front: front.iter(),
            back: back.iter(),
        }
    }

    // ---------------------------------------------------------------------
    // INTERNALS
    // ---------------------------------------------------------------------

    fn window(&self) -> Window {
        if self.len == 0 {
            return Window::Empty;
        }
        let room = self.capacity - self.head;
        if self.len <= room {
            Window::Contiguous {
                start: self.head,
                end: self.head + self.len,
            }
        } else {
            Window::Wrapped {
                start: self.head,
                end: self.len - room,
            }
        }
    }

    fn raw_slices(&mut self) -> (*mut [T], *mut [T]) {
        let base = self.buffer.as_ptr().cast::<T>();
        let (start, front_len, back_len) = match self.window() {
            Window::Empty => (0, 0, 0),
            Window::Contiguous { start, end } => (start, end - start, 0),
            Window::Wrapped { start, end } => (start, self.capacity - start, end),
        };
        // SAFETY: start <= capacity, so the offset stays within (or one past) the block
        let front_ptr = unsafe { base.add(start) };
        (
            ptr::slice_from_raw_parts_mut(front_ptr, front_len),
            ptr::slice_from_raw_parts_mut(base, back_len),
        )
    }

    /// Maps a logical offset from the oldest element to a physical index.
    #[inline]
    fn physical(&self, offset: usize) -> usize {
        let idx = self.head + offset;
        if idx >= self.capacity {
            idx - self.capacity
        } else {
            idx
        }
    }

    /// Pointer to slot `idx`. Caller keeps `idx < capacity`.
    #[inline]
    unsafe fn slot_ptr(&self, idx: usize) -> *mut T {
        debug_assert_slot_in_bounds!(idx, self.capacity);
        self.buffer.as_ptr().add(idx).cast::<T>()
    }

    /// Pointer to the live element `offset` places after the oldest one.
    /// Caller keeps `offset < len`.
    #[inline]
    unsafe fn live_ptr(&self, offset: usize) -> *mut T {
        debug_assert_in_window!(offset, self.len);
        self.slot_ptr(self.physical(offset))
    }

    fn record_rejected(&mut self) {
        if self.enable_metrics {
            self.metrics.add_rejected();
        }
    }

    fn allocate_block(alloc: &A, slots: usize) -> Result<NonNull<MaybeUninit<T>>, RingError> {
        let layout =
            Layout::array::<T>(slots).map_err(|_| RingError::CapacityOverflow { slots })?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }
        match alloc.allocate(layout) {
            Some(ptr) => Ok(ptr.cast()),
            None => {
                warn!(
                    "ring allocation failed: {} slots ({} bytes)",
                    slots,
                    layout.size()
                );
                Err(RingError::OutOfMemory {
                    slots,
                    bytes: layout.size(),
                })
            }
        }
    }

    /// # Safety
    ///
    /// `block` must come from `allocate_block(alloc, slots)` and hold no live elements.
    unsafe fn release_block(alloc: &A, block: NonNull<MaybeUninit<T>>, slots: usize) {
        if let Ok(layout) = Layout::array::<T>(slots) {
            if layout.size() != 0 {
                alloc.deallocate(block.cast(), layout);
            }
        }
    }
}

/// Drops `base[from..to]` from the highest index down. Returns the count.
///
/// # Safety
///
/// Every slot in the range must hold a live element that is never used again.
unsafe fn drop_newest_first<T>(base: *mut T, from: usize, to: usize) -> usize {
    for idx in (from..to).rev() {
        ptr::drop_in_place(base.add(idx));
    }
    to - from
}

/// Releases a retired block when it goes out of scope, unwinding included.
struct ReleaseOnDrop<'a, T, A: SlotAllocator> {
    alloc: &'a A,
    block: NonNull<MaybeUninit<T>>,
    slots: usize,
}

impl<T, A: SlotAllocator> Drop for ReleaseOnDrop<'_, T, A> {
    fn drop(&mut self) {
        // SAFETY: the block came from allocate_block(slots); by the time this
        // runs every element in it has been moved out, dropped or leaked
        unsafe { RingBuffer::<T, A>::release_block(self.alloc, self.block, self.slots) };
    }
}

impl<T, A: SlotAllocator> Drop for RingBuffer<T, A> {
    fn drop(&mut self) {
        self.clear();
        // SAFETY: clear() left no live elements; buffer/capacity describe our block
        unsafe { Self::release_block(&self.alloc, self.buffer, self.capacity) };
    }
}

impl<T> Default for RingBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, A: SlotAllocator> fmt::Debug for RingBuffer<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T, A: SlotAllocator> IntoIterator for &'a RingBuffer<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ---------------------------------------------------------------------
// ITERATOR
// ---------------------------------------------------------------------

/// Borrowing iterator over a [`RingBuffer`], oldest to newest.
#[derive(Debug)]
pub struct Iter<'a, T> {
    front: slice::Iter<'a, T>,
    back: slice::Iter<'a, T>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            front: self.front.clone(),
            back: self.back.clone(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.front.next().or_else(|| self.back.next())
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.front.len() + self.back.len();
        (n, Some(n))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.back.next_back().or_else(|| self.front.next_back())
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
