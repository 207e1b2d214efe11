use once_cell::sync::Lazy;
use std::sync::{Mutex, MutexGuard};

// Serializes tests that go through the process-wide global slot.
static GLOBAL_SLOT_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub(crate) fn global_slot_guard() -> MutexGuard<'static, ()> {
    GLOBAL_SLOT_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
