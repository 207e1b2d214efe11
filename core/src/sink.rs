use std::time::{SystemTime, UNIX_EPOCH};

/// Source of each run's seed and final consumer of its result.
///
/// Owned by the runner and passed explicitly; it keeps the optimiser from
/// proving any run's result unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sink {
    value: u32,
}

impl Sink {
    pub const fn with_seed(value: u32) -> Self {
        Self { value }
    }

    /// Seed from the wall clock in milliseconds, truncated to 32 bits.
    pub fn from_clock() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self::with_seed(millis as u32)
    }

    #[inline]
    pub fn produce(&self) -> u32 {
        self.value
    }

    #[inline]
    pub fn consume(&mut self, v: u32) {
        self.value ^= v;
    }

    pub fn value(&self) -> u32 {
        self.value
    }
}
