/// Optional counters for monitoring ring buffer activity.
///
/// All mutation goes through `&mut RingBuffer`, so plain integers suffice.
#[derive(Debug, Default)]
pub(crate) struct Metrics {
    pushed: u64,
    popped: u64,
    rejected: u64,
    reallocations: u64,
    truncated: u64,
}

/// Point-in-time copy of the ring's counters, see `RingBuffer::metrics`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Elements written into the buffer (single and bulk pushes)
    pub pushed: u64,
    /// Elements moved out by `pop`
    pub popped: u64,
    /// Push/pop calls refused with an error
    pub rejected: u64,
    /// Storage swaps performed by `reserve`
    pub reallocations: u64,
    /// Elements dropped by shrinking `reserve` calls
    pub truncated: u64,
}

impl Metrics {
    pub(crate) const fn new() -> Self {
        Self {
            pushed: 0,
            popped: 0,
            rejected: 0,
            reallocations: 0,
            truncated: 0,
        }
    }

    #[inline]
    pub(crate) fn add_pushed(&mut self, n: u64) {
        self.pushed += n;
    }

    #[inline]
    pub(crate) fn add_popped(&mut self, n: u64) {
        self.popped += n;
    }

    #[inline]
    pub(crate) fn add_rejected(&mut self) {
        self.rejected += 1;
    }

    #[inline]
    pub(crate) fn add_reallocation(&mut self, truncated: u64) {
        self.reallocations += 1;
        self.truncated += truncated;
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            pushed: self.pushed,
            popped: self.popped,
            rejected: self.rejected,
            reallocations: self.reallocations,
            truncated: self.truncated,
        }
    }
}
