//! Overrun and queue-full counters
//!
//! Process-wide degradation counters. Both are monotone and never reset;
//! they are the only producer-visible signal that reports were folded or
//! dropped, since `emit` itself never fails observably.

use core::sync::atomic::{AtomicU32, Ordering};

/// Counters exposing reporting degradation.
///
/// Increments use a plain load/store pair rather than a read-modify-write:
/// the target cores do not all provide atomic RMW, and an occasionally
/// lost increment under interrupt contention is tolerated. These counters
/// are approximate observability, not a system invariant.
pub struct ReportStats {
    overruns: AtomicU32,
    queue_full: AtomicU32,
}

impl ReportStats {
    pub(crate) const fn new() -> Self {
        Self {
            overruns: AtomicU32::new(0),
            queue_full: AtomicU32::new(0),
        }
    }

    /// Number of times a source emitted before its previous report was
    /// collected.
    pub fn overrun_count(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }

    /// Number of reports dropped because the delivery queue was full.
    pub fn queue_full_count(&self) -> u32 {
        self.queue_full.load(Ordering::Relaxed)
    }

    pub(crate) fn note_overrun(&self) {
        let n = self.overruns.load(Ordering::Relaxed);
        self.overruns.store(n.wrapping_add(1), Ordering::Relaxed);
    }

    pub(crate) fn note_queue_full(&self) {
        let n = self.queue_full.load(Ordering::Relaxed);
        self.queue_full.store(n.wrapping_add(1), Ordering::Relaxed);
    }
}
