//! Report sources
//!
//! A source is a registered emitter of reports, one per device instance.
//! The [`Emitter`] handle is the per-device state the reporting core
//! hands back at registration; device drivers embed it and implement the
//! [`Source`] trait on top.

use super::slot::{SlotBranch, SlotRef};
use super::types::{EventKind, SourceId, SourceKind};
use super::ReportContext;

/// Per-device reporting handle, returned by registration.
///
/// Holds the reporting context and the device's registry entry, so a
/// driver can report events without touching any other global state.
#[derive(Clone, Copy)]
pub struct Emitter<'c> {
    ctx: &'c ReportContext,
    index: u8,
    id: SourceId,
}

impl<'c> Emitter<'c> {
    pub(crate) fn new(ctx: &'c ReportContext, index: u8, id: SourceId) -> Self {
        Self { ctx, index, id }
    }

    /// Identity of this source.
    pub fn id(&self) -> SourceId {
        self.id
    }

    pub(crate) fn index(&self) -> u8 {
        self.index
    }

    /// Report an event.
    ///
    /// Callable from any execution context, including interrupt handlers:
    /// never blocks, never allocates, and completes in bounded time. If a
    /// previous report from this source has not been collected, an
    /// overrun report is staged instead (see
    /// [`ReportSlot::stage`](super::ReportSlot::stage)). If the delivery
    /// queue is full the reference is dropped and only the queue-full
    /// counter records it.
    ///
    /// A dropped reference still leaves the staged record marked
    /// outstanding, so the next emit on that branch is treated as an
    /// overrun even though nothing was delivered. That is the existing
    /// contract: the hot path carries no retry or backpressure logic.
    pub fn emit(&self, kind: EventKind, payload: i32) {
        // Clamp so a report staged at clock zero is not mistaken for a
        // free slot.
        let now = self.ctx.clock().now_us().max(1);
        let entry = self.ctx.registry().entry(self.index);
        let branch = entry.slot.stage(kind, self.id, payload, now);
        if branch == SlotBranch::Overrun {
            self.ctx.stats().note_overrun();
        }
        let slot_ref = SlotRef {
            index: self.index,
            branch,
        };
        if self.ctx.queue().try_send(slot_ref).is_err() {
            self.ctx.stats().note_queue_full();
        }
    }
}

/// Interface every report source exposes to the rest of the system.
///
/// Device drivers implement this over their embedded [`Emitter`]. The
/// boot traversal ([`ReportContext::initialize_all`]) calls
/// [`Source::initialize`] once per attached device, in registration
/// order.
pub trait Source: Sync {
    /// The reporting handle this device registered with.
    fn emitter(&self) -> &Emitter<'static>;

    /// Discriminator for this device family.
    fn kind(&self) -> SourceKind;

    /// One-time setup hook driven by the boot traversal. Default does
    /// nothing.
    fn initialize(&self) {}

    /// Identity of this source.
    fn id(&self) -> SourceId {
        self.emitter().id()
    }
}
