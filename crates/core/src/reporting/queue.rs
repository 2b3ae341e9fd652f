//! Shared delivery queue
//!
//! Fixed-capacity FIFO carrying [`SlotRef`]s from every producer to the
//! single consumer. Send is non-blocking and safe from interrupt context;
//! at capacity it fails immediately with no eviction. References are
//! delivered in admission order.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};

use super::slot::SlotRef;
use super::types::REPORT_QUEUE_DEPTH;

pub(crate) struct ReportQueue {
    channel: Channel<CriticalSectionRawMutex, SlotRef, REPORT_QUEUE_DEPTH>,
}

impl ReportQueue {
    pub(crate) const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Non-blocking send; fails at capacity.
    pub(crate) fn try_send(&self, slot: SlotRef) -> Result<(), TrySendError<SlotRef>> {
        self.channel.try_send(slot)
    }

    /// Non-blocking receive.
    pub(crate) fn try_recv(&self) -> Option<SlotRef> {
        self.channel.try_receive().ok()
    }

    /// Wait until a reference is available.
    pub(crate) async fn recv(&self) -> SlotRef {
        self.channel.receive().await
    }
}
