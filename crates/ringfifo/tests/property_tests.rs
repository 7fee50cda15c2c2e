//! Property-based tests against a `VecDeque` model.
//!
//! Any sequence of push / bulk push / pop / reserve must leave the ring in
//! the same observable state as a `VecDeque` bounded by the same capacity,
//! where a shrinking reserve is modelled as `truncate` (keep the oldest).

use proptest::prelude::*;
use ringfifo_rs::{RingBuffer, RingError};
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Clone)]
enum Op {
    Push(u32),
    PushSlice(Vec<u32>),
    Pop,
    Reserve(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<u32>().prop_map(Op::Push),
        1 => prop::collection::vec(any::<u32>(), 0..6).prop_map(Op::PushSlice),
        3 => Just(Op::Pop),
        1 => (0usize..12).prop_map(Op::Reserve),
    ]
}

fn assert_matches_model(ring: &RingBuffer<u32>, model: &VecDeque<u32>, capacity: usize) {
    assert_eq!(ring.len(), model.len());
    assert_eq!(ring.capacity(), capacity);
    assert_eq!(ring.is_empty(), ring.len() == 0);
    assert_eq!(ring.is_full(), ring.len() == ring.capacity());
    assert!(ring.iter().eq(model.iter()));
}

// =============================================================================
// Model equivalence (FIFO order, bounded count, oldest-first truncation)
// =============================================================================

proptest! {
    #[test]
    fn prop_matches_vecdeque_model(
        initial in 0usize..8,
        ops in prop::collection::vec(op_strategy(), 1..200),
    ) {
        let mut ring = RingBuffer::with_capacity(initial).unwrap();
        let mut model = VecDeque::new();
        let mut capacity = initial;

        for op in ops {
            match op {
                Op::Push(v) => {
                    let result = ring.push(v);
                    if model.len() < capacity {
                        prop_assert!(result.is_ok());
                        model.push_back(v);
                    } else {
                        let err = result.unwrap_err();
                        prop_assert_eq!(err.item, v);
                        prop_assert_eq!(err.capacity, capacity);
                    }
                }
                Op::PushSlice(items) => {
                    let available = capacity - model.len();
                    let result = ring.push_slice(&items);
                    if items.len() <= available {
                        prop_assert!(result.is_ok());
                        model.extend(items.iter().copied());
                    } else {
                        prop_assert_eq!(result, Err(RingError::InsufficientSpace {
                            requested: items.len(),
                            available,
                        }));
                    }
                }
                Op::Pop => {
                    let expected = model.pop_front().ok_or(RingError::Empty);
                    prop_assert_eq!(ring.pop(), expected);
                }
                Op::Reserve(k) => {
                    ring.reserve(k).unwrap();
                    model.truncate(k);
                    capacity = k;
                }
            }
            assert_matches_model(&ring, &model, capacity);
        }
    }
}

// =============================================================================
// Push count: n pushes, no pops
// =============================================================================

proptest! {
    #[test]
    fn prop_push_count(capacity in 1usize..64, n in 0usize..64) {
        let n = n.min(capacity);
        let mut ring = RingBuffer::with_capacity(capacity).unwrap();
        for i in 0..n {
            prop_assert!(ring.push(i).is_ok());
        }
        prop_assert_eq!(ring.len(), n);
        prop_assert_eq!(ring.is_full(), n == ring.capacity());
    }
}

// =============================================================================
// Reserve: growing preserves everything, shrinking keeps the k oldest
// =============================================================================

proptest! {
    #[test]
    fn prop_reserve_keeps_oldest(
        capacity in 1usize..32,
        rotate in 0usize..32,
        fill in 0usize..32,
        new_capacity in 0usize..48,
    ) {
        let mut ring = RingBuffer::with_capacity(capacity).unwrap();

        // Shift the window start so wrapped layouts get covered. The window
        // only moves while something stays queued, so the fillers are popped
        // after the first values are in.
        let rotate = rotate % capacity;
        let fill = fill.min(capacity) as u64;
        let first = fill.min((capacity - rotate) as u64);
        for _ in 0..rotate {
            ring.push(u64::MAX).unwrap();
        }
        for v in 0..first {
            ring.push(v).unwrap();
        }
        for _ in 0..rotate {
            prop_assert_eq!(ring.pop(), Ok(u64::MAX));
        }
        for v in first..fill {
            ring.push(v).unwrap();
        }
        let before: Vec<u64> = ring.iter().copied().collect();

        ring.reserve(new_capacity).unwrap();
        prop_assert_eq!(ring.capacity(), new_capacity);

        let kept = before.len().min(new_capacity);
        prop_assert_eq!(ring.len(), kept);

        let mut after = Vec::new();
        while let Ok(v) = ring.pop() {
            after.push(v);
        }
        prop_assert_eq!(&after[..], &before[..kept]);
    }
}

// =============================================================================
// Ownership: live elements always equal len(), nothing survives the ring
// =============================================================================

/// Element that keeps a shared count of its live instances.
struct Counted {
    live: Rc<Cell<isize>>,
}

impl Counted {
    fn new(live: &Rc<Cell<isize>>) -> Self {
        live.set(live.get() + 1);
        Self { live: Rc::clone(live) }
    }
}

impl Clone for Counted {
    fn clone(&self) -> Self {
        Self::new(&self.live)
    }
}

impl Drop for Counted {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

proptest! {
    #[test]
    fn prop_live_elements_track_len(
        initial in 0usize..8,
        ops in prop::collection::vec(op_strategy(), 1..200),
    ) {
        let live = Rc::new(Cell::new(0isize));
        let mut ring = RingBuffer::with_capacity(initial).unwrap();

        for op in ops {
            match op {
                Op::Push(_) => {
                    // A rejected element comes back inside the error and is dropped here
                    let _ = ring.push(Counted::new(&live));
                }
                Op::PushSlice(items) => {
                    let batch: Vec<Counted> = items.iter().map(|_| Counted::new(&live)).collect();
                    let _ = ring.push_slice(&batch);
                    drop(batch);
                }
                Op::Pop => {
                    let _ = ring.pop();
                }
                Op::Reserve(k) => {
                    ring.reserve(k).unwrap();
                }
            }
            prop_assert_eq!(live.get(), ring.len() as isize);
        }

        drop(ring);
        prop_assert_eq!(live.get(), 0);
    }
}
