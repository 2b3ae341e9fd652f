//! Per-source report storage
//!
//! Each source owns one [`ReportSlot`] holding at most one pending normal
//! report and one pending overrun report. The delivery queue carries
//! references to these branches, not copies, so the slot is the memory
//! bound: a source can never have more than two reports in flight.
//!
//! # Branch state machine
//!
//! ```text
//! FREE (time_in == 0) --stage--> PENDING (time_in = now)
//! PENDING --collect--> FREE (time_in reset, time_out stamped)
//! ```
//!
//! A second `stage` while the normal branch is PENDING diverts to the
//! overrun branch instead of overwriting the normal record.

use core::cell::Cell;

use critical_section::Mutex;

use super::types::{EventKind, Report, SourceId};

/// Which branch of a slot a queued reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotBranch {
    /// The ordinary report branch.
    Normal,
    /// The overrun branch, written when the normal branch is still pending.
    Overrun,
}

/// Reference to one pending slot branch, as carried by the delivery queue.
///
/// Holds the registry index of the owning source rather than a pointer,
/// so queued items stay `Copy` and never dangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRef {
    pub(crate) index: u8,
    pub(crate) branch: SlotBranch,
}

/// Storage for one source's pending reports.
///
/// Both branches are guarded by short critical sections so `stage` is
/// safe to call from interrupt context while the consumer collects on a
/// thread. No operation blocks or allocates.
pub struct ReportSlot {
    normal: Mutex<Cell<Report>>,
    overrun: Mutex<Cell<Report>>,
}

impl ReportSlot {
    /// Create a slot with both branches free.
    pub const fn new() -> Self {
        Self {
            normal: Mutex::new(Cell::new(Report::empty())),
            overrun: Mutex::new(Cell::new(Report::empty())),
        }
    }

    /// Stage a report for delivery, returning the branch that was written.
    ///
    /// If the normal branch still holds an uncollected report this is an
    /// overrun: the overrun branch is written with
    /// `kind = EventKind::Overrun` and the superseded event's kind folded
    /// into the payload. The payload of the event that triggered the fold
    /// is discarded; that information loss is the memory bound.
    ///
    /// An overrun branch that is itself still pending is overwritten.
    pub fn stage(&self, kind: EventKind, source: SourceId, payload: i32, now_us: u64) -> SlotBranch {
        critical_section::with(|cs| {
            let normal = self.normal.borrow(cs);
            if !normal.get().is_free() {
                self.overrun.borrow(cs).set(Report {
                    kind: EventKind::Overrun,
                    source,
                    time_in: now_us,
                    time_out: 0,
                    payload: kind as u8 as i32,
                });
                SlotBranch::Overrun
            } else {
                normal.set(Report {
                    kind,
                    source,
                    time_in: now_us,
                    time_out: 0,
                    payload,
                });
                SlotBranch::Normal
            }
        })
    }

    /// Collect a pending branch: copy the record out, stamp `time_out` on
    /// both the copy and the stored record, and reset the stored record's
    /// `time_in` to zero.
    ///
    /// This is the sole reclamation mechanism; it is what makes the next
    /// `stage` on this branch a normal report rather than an overrun.
    pub fn collect(&self, branch: SlotBranch, now_us: u64) -> Report {
        let cell = match branch {
            SlotBranch::Normal => &self.normal,
            SlotBranch::Overrun => &self.overrun,
        };
        critical_section::with(|cs| {
            let cell = cell.borrow(cs);
            let mut stored = cell.get();
            let delivered = Report {
                time_out: now_us,
                ..stored
            };
            stored.time_out = now_us;
            stored.time_in = 0;
            cell.set(stored);
            delivered
        })
    }

    /// Whether the given branch holds an uncollected report.
    pub fn is_pending(&self, branch: SlotBranch) -> bool {
        let cell = match branch {
            SlotBranch::Normal => &self.normal,
            SlotBranch::Overrun => &self.overrun,
        };
        critical_section::with(|cs| !cell.borrow(cs).get().is_free())
    }
}

impl Default for ReportSlot {
    fn default() -> Self {
        Self::new()
    }
}
