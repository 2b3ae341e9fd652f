//! Event reporting core
//!
//! Bounded, interrupt-safe delivery of timestamped device events to a
//! single consumer.
//!
//! # Components
//!
//! - [`types`]: Report record, event and source kinds, identities
//! - [`slot`]: Per-source two-branch pending-report storage
//! - [`registry`]: Append-only, registration-ordered source registry
//! - [`source`]: The [`Source`] trait and per-device [`Emitter`] handle
//! - [`stats`]: Overrun / queue-full counters
//! - [`ReportContext`]: The process-wide context tying them together
//!
//! # Control flow
//!
//! A driver calls [`Emitter::emit`]. The report is written into the
//! source's own slot (normal or overrun branch) and a reference is sent,
//! non-blocking, into the shared queue. The consumer thread receives
//! references in FIFO order, copies each report out, stamps it, and frees
//! the slot branch.
//!
//! # Example
//!
//! ```
//! use railcab_core::reporting::{EventKind, ReportContext, SourceKind};
//! use railcab_core::traits::MockTime;
//!
//! static CLOCK: MockTime = MockTime::with_initial(1_000);
//!
//! let ctx = ReportContext::new(&CLOCK);
//! let ranger = ctx.register(SourceKind::Range).unwrap();
//!
//! ranger.emit(EventKind::RangeClose, 87);
//!
//! let report = ctx.try_recv().unwrap();
//! assert_eq!(report.kind, EventKind::RangeClose);
//! assert_eq!(report.source, ranger.id());
//! assert_eq!(report.payload, 87);
//! ```

pub mod registry;
pub mod slot;
pub mod source;
pub mod stats;
pub mod types;

mod queue;

pub use registry::{Registered, RegistryError, SourceRegistry};
pub use slot::{ReportSlot, SlotBranch, SlotRef};
pub use source::{Emitter, Source};
pub use stats::ReportStats;
pub use types::{EventKind, Report, SourceId, SourceKind, MAX_SOURCES, REPORT_QUEUE_DEPTH};

use embassy_time::{with_timeout, Duration};
use heapless::Vec;

use crate::traits::TimeSource;
use queue::ReportQueue;

/// Process-wide reporting state: registry, delivery queue, counters, and
/// the clock used to stamp reports.
///
/// Constructed explicitly at startup and passed by reference; there is no
/// teardown, the target runs until reset. `new` is `const`, so firmware
/// can place the context in a `static`:
///
/// ```ignore
/// static REPORTS: ReportContext = ReportContext::new(&CLOCK);
/// ```
///
/// Registration and attachment must finish, on a single thread, before
/// concurrent emission begins; see [`registry`].
pub struct ReportContext {
    registry: SourceRegistry,
    queue: ReportQueue,
    stats: ReportStats,
    clock: &'static dyn TimeSource,
}

impl ReportContext {
    /// Create an empty context stamping reports with `clock`.
    pub const fn new(clock: &'static dyn TimeSource) -> Self {
        Self {
            registry: SourceRegistry::new(),
            queue: ReportQueue::new(),
            stats: ReportStats::new(),
            clock,
        }
    }

    /// Register a new source, assigning the next sequential id.
    pub fn register(&self, kind: SourceKind) -> Result<Emitter<'_>, RegistryError> {
        let (index, id) = self.registry.register(kind)?;
        Ok(Emitter::new(self, index, id))
    }

    /// Register a new source with a caller-supplied id.
    ///
    /// Intended only for sources requiring stable well-known ids; the id
    /// is not checked for collisions.
    pub fn register_with_id(
        &self,
        kind: SourceKind,
        id: SourceId,
    ) -> Result<Emitter<'_>, RegistryError> {
        let (index, id) = self.registry.register_with_id(kind, id)?;
        Ok(Emitter::new(self, index, id))
    }

    /// Bind a device to its registry entry so [`Self::initialize_all`]
    /// can reach its initialization hook.
    ///
    /// The device must have registered through this context.
    pub fn attach(&self, device: &'static dyn Source) {
        self.registry.bind(device.emitter().index(), device);
    }

    /// Boot traversal: invoke [`Source::initialize`] once on every
    /// attached device, in registration order.
    pub fn initialize_all(&self) {
        let mut current = self.registry.first();
        while let Some(entry) = current {
            if let Some(device) = entry.device() {
                device.initialize();
            }
            current = entry.next();
        }
    }

    /// The source registry, for traversal.
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Degradation counters.
    pub fn stats(&self) -> &ReportStats {
        &self.stats
    }

    /// Poll for a report without waiting.
    ///
    /// On success the report is copied out, `time_out` is stamped on both
    /// the copy and the source's record, and the slot branch is freed.
    pub fn try_recv(&self) -> Option<Report> {
        self.queue.try_recv().map(|slot| self.collect(slot))
    }

    /// Wait until a report is available.
    ///
    /// This is the consumer's only suspension point. There must be a
    /// single logical consumer.
    pub async fn recv(&self) -> Report {
        let slot = self.queue.recv().await;
        self.collect(slot)
    }

    /// Wait up to `timeout` for a report.
    ///
    /// A timed-out receive returns `None` and invalidates nothing; any
    /// pending send stays queued and retry is the caller's choice.
    /// Timeout expiry is the only cancellation.
    pub async fn recv_timeout(&self, timeout: Duration) -> Option<Report> {
        with_timeout(timeout, self.recv()).await.ok()
    }

    /// Drain every currently queued report without waiting.
    pub fn drain(&self) -> Vec<Report, REPORT_QUEUE_DEPTH> {
        let mut reports = Vec::new();
        while let Some(report) = self.try_recv() {
            // Queue depth bounds the drain; push cannot fail.
            if reports.push(report).is_err() {
                break;
            }
        }
        reports
    }

    pub(crate) fn clock(&self) -> &dyn TimeSource {
        self.clock
    }

    pub(crate) fn queue(&self) -> &ReportQueue {
        &self.queue
    }

    fn collect(&self, slot: SlotRef) -> Report {
        let now = self.clock.now_us().max(1);
        self.registry.entry(slot.index).slot.collect(slot.branch, now)
    }
}
