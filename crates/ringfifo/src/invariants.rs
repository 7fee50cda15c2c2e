//! Debug assertion macros for ring buffer invariants.
//!
//! Active only in debug builds (`debug_assert!`), so release builds pay
//! nothing for them.

// =============================================================================
// Bounded Count
// =============================================================================

/// Assert that the occupied count does not exceed capacity.
///
/// **Invariant**: `0 ≤ len ≤ capacity`
///
/// Used in: `push()`, `push_slice()` after incrementing len
macro_rules! debug_assert_bounded_count {
    ($len:expr, $capacity:expr) => {
        debug_assert!(
            $len <= $capacity,
            "bounded count violated: len {} exceeds capacity {}",
            $len,
            $capacity
        )
    };
}

// =============================================================================
// Head Placement
// =============================================================================

/// Assert that the head index addresses a real slot (or is 0 with no storage).
///
/// **Invariant**: `head < capacity || (head == 0 && capacity == 0)`
///
/// Used in: `pop()` after advancing head
macro_rules! debug_assert_head_in_bounds {
    ($head:expr, $capacity:expr) => {
        debug_assert!(
            $head < $capacity || ($head == 0 && $capacity == 0),
            "head placement violated: head {} outside capacity {}",
            $head,
            $capacity
        )
    };
}

// =============================================================================
// Slot Bounds
// =============================================================================

/// Assert that a physical slot index addresses the allocated block.
///
/// **Invariant**: `idx < capacity` for every slot read, written or dropped
///
/// Used in: `slot_ptr()`
macro_rules! debug_assert_slot_in_bounds {
    ($idx:expr, $capacity:expr) => {
        debug_assert!(
            $idx < $capacity,
            "slot bounds violated: index {} outside capacity {}",
            $idx,
            $capacity
        )
    };
}

// =============================================================================
// Initialized Range Check
// =============================================================================

/// Assert that a logical offset lies inside the occupied window.
///
/// **Invariant**: `slot(head + i) is initialized ⟺ i < len`
///
/// Used in: `live_ptr()`, which backs `pop()` and `peek()`
macro_rules! debug_assert_in_window {
    ($offset:expr, $len:expr) => {
        debug_assert!(
            $offset < $len,
            "initialized range violated: offset {} outside window of length {}",
            $offset,
            $len
        )
    };
}

// =============================================================================
// Truncation Accounting
// =============================================================================

/// Assert that a resize dropped plus moved exactly the old occupied count.
///
/// **Invariant**: `dropped + moved == old_len && moved == min(old_len, new_capacity)`
///
/// Used in: `reserve()` after repopulating the new block
macro_rules! debug_assert_truncation {
    ($dropped:expr, $moved:expr, $old_len:expr, $new_capacity:expr) => {
        debug_assert!(
            $dropped + $moved == $old_len && $moved == $old_len.min($new_capacity),
            "truncation accounting violated: dropped {} + moved {} vs len {} into capacity {}",
            $dropped,
            $moved,
            $old_len,
            $new_capacity
        )
    };
}

// =============================================================================
// Re-exports for crate-internal use
// =============================================================================

pub(crate) use debug_assert_bounded_count;
pub(crate) use debug_assert_head_in_bounds;
pub(crate) use debug_assert_in_window;
pub(crate) use debug_assert_slot_in_bounds;
pub(crate) use debug_assert_truncation;
