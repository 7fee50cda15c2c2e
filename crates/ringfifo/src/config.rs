/// Configuration for [`RingBuffer`](crate::RingBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Number of slots allocated up front (0 = no storage until `reserve`)
    pub capacity: usize,
    /// Enable metrics collection (slight overhead)
    pub enable_metrics: bool,
}

impl Config {
    /// Creates a new configuration with custom settings.
    pub const fn new(capacity: usize, enable_metrics: bool) -> Self {
        Self {
            capacity,
            enable_metrics,
        }
    }

    /// Returns a copy with the given initial capacity.
    #[inline]
    pub const fn with_capacity(self, capacity: usize) -> Self {
        Self { capacity, ..self }
    }

    /// Returns a copy with metrics collection switched on or off.
    #[inline]
    pub const fn with_metrics(self, enable_metrics: bool) -> Self {
        Self {
            enable_metrics,
            ..self
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 0,
            enable_metrics: false,
        }
    }
}

/// Small configuration (64 slots, fits a handful of cache lines for word-sized T)
pub const SMALL_CONFIG: Config = Config::new(64, false);

/// Large configuration (64K slots)
pub const LARGE_CONFIG: Config = Config::new(1 << 16, false);
