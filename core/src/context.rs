//! Slots a callee can write its result pair into instead of returning it.
//!
//! None of these carry any synchronization. [`ExecContext`] is owned by the
//! execution unit that created it, [`TlsSlot`] goes through the thread-local
//! machinery, and [`UnsyncGlobalSlot`] is shared by the whole process.

use std::cell::Cell;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread::LocalKey;

use crate::pair::Pair;

thread_local! {
    static PAIR_TLS: Cell<Pair> = const { Cell::new(Pair::new(0, 0)) };
}

static GLOBAL_A: AtomicU32 = AtomicU32::new(0);
static GLOBAL_B: AtomicU32 = AtomicU32::new(0);

/// Process-wide result slot. **Single-thread only.**
///
/// Two units storing through this slot at the same time interleave their
/// halves and read back torn pairs. Nothing prevents that; the benchmark
/// measures exactly this unguarded path. The halves are relaxed atomics so a
/// race yields wrong values rather than undefined behaviour.
#[derive(Debug, Clone, Copy)]
pub struct UnsyncGlobalSlot {
    _private: (),
}

impl UnsyncGlobalSlot {
    /// Obtain the slot. The caller promises no other thread uses it while
    /// this handle is in use.
    pub const fn single_threaded() -> Self {
        Self { _private: () }
    }

    #[inline(always)]
    pub fn store(&self, pair: Pair) {
        GLOBAL_A.store(pair.a, Ordering::Relaxed);
        GLOBAL_B.store(pair.b, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn load(&self) -> Pair {
        Pair {
            a: GLOBAL_A.load(Ordering::Relaxed),
            b: GLOBAL_B.load(Ordering::Relaxed),
        }
    }
}

/// Handle to a per-thread pair living behind `thread_local!`.
///
/// Every access goes through [`LocalKey::with`], i.e. one lookup of the
/// current thread's storage per read or write.
#[derive(Clone, Copy)]
pub struct TlsSlot {
    key: &'static LocalKey<Cell<Pair>>,
}

impl TlsSlot {
    pub fn new() -> Self {
        Self { key: &PAIR_TLS }
    }

    #[inline(always)]
    pub fn set(&self, pair: Pair) {
        self.key.with(|slot| slot.set(pair));
    }

    #[inline(always)]
    pub fn get(&self) -> Pair {
        self.key.with(Cell::get)
    }
}

impl Default for TlsSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TlsSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsSlot").field("current", &self.get()).finish()
    }
}

/// Caller-owned out-parameter for the container strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Container {
    pub a: u32,
    pub b: u32,
}

impl Container {
    #[inline(always)]
    pub fn pair(&self) -> Pair {
        Pair::new(self.a, self.b)
    }
}

/// State owned by one execution unit and injected when the unit starts.
///
/// `slot` plays the role of fields hung off the running thread: a callee
/// writes there and the caller on the same unit reads it straight back.
#[derive(Debug)]
pub struct ExecContext {
    pub slot: Pair,
    pub tls: TlsSlot,
    pub global: UnsyncGlobalSlot,
}

impl ExecContext {
    pub fn new() -> Self {
        Self {
            slot: Pair::default(),
            tls: TlsSlot::new(),
            global: UnsyncGlobalSlot::single_threaded(),
        }
    }
}

impl Default for ExecContext {
    fn default() -> Self {
        Self::new()
    }
}
