//! Heap counters sampled around each case.
//!
//! A binary opts in by installing [`CountingAllocator`] as its
//! `#[global_allocator]`. Without it every snapshot reads zero and the report
//! simply shows no heap activity.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;

static ALLOCATIONS: AtomicU64 = AtomicU64::new(0);
static ALLOC_NANOS: AtomicU64 = AtomicU64::new(0);
static TIMING: AtomicBool = AtomicBool::new(false);

/// `System` wrapper counting allocation events and, when timing is enabled,
/// the nanoseconds spent inside `alloc`/`dealloc`.
pub struct CountingAllocator;

impl CountingAllocator {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for CountingAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn timed<R>(f: impl FnOnce() -> R) -> R {
    if TIMING.load(Ordering::Relaxed) {
        let start = Instant::now();
        let out = f();
        ALLOC_NANOS.fetch_add(start.elapsed().as_nanos() as u64, Ordering::Relaxed);
        out
    } else {
        f()
    }
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = timed(|| unsafe { System.alloc(layout) });
        if !ptr.is_null() {
            ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        timed(|| unsafe { System.dealloc(ptr, layout) });
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = timed(|| unsafe { System.alloc_zeroed(layout) });
        if !ptr.is_null() {
            ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn realloc(&self, ptr: *mut u8, old_layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = timed(|| unsafe { System.realloc(ptr, old_layout, new_size) });
        if !new_ptr.is_null() {
            ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
        }
        new_ptr
    }
}

/// Turn allocator timing on or off for the whole process.
pub fn set_timing(enabled: bool) {
    TIMING.store(enabled, Ordering::Relaxed);
}

pub fn timing_enabled() -> bool {
    TIMING.load(Ordering::Relaxed)
}

/// Point-in-time reading of the process-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeapCounters {
    pub events: u64,
    pub nanos: u64,
}

impl HeapCounters {
    pub fn snapshot() -> Self {
        Self {
            events: ALLOCATIONS.load(Ordering::Relaxed),
            nanos: ALLOC_NANOS.load(Ordering::Relaxed),
        }
    }

    /// Counters accumulated between `earlier` and `self`.
    pub fn since(&self, earlier: &HeapCounters) -> HeapCounters {
        HeapCounters {
            events: self.events.saturating_sub(earlier.events),
            nanos: self.nanos.saturating_sub(earlier.nanos),
        }
    }

    pub fn millis(&self) -> u64 {
        self.nanos / 1_000_000
    }
}
