//! Event consumer loop.
//!
//! The single logical consumer of the delivery queue: drains reports with
//! a timed wait so it can notice the shutdown flag, logs each one, and
//! tallies a summary for the end of the run.

use std::sync::atomic::{AtomicBool, Ordering};

use embassy_futures::block_on;
use embassy_time::Duration;
use log::{debug, warn};

use railcab_core::reporting::{EventKind, Report, ReportContext};

const RECV_TIMEOUT: Duration = Duration::from_millis(20);

/// What the consumer saw over one run.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsumerSummary {
    /// Total reports collected.
    pub received: u64,
    /// Overrun reports among them.
    pub overruns: u64,
    /// Worst queue latency observed (us).
    pub max_latency_us: u64,
}

/// Drain the queue until `shutdown` is set and no reports remain.
///
/// A timed-out wait just re-checks the flag; it cancels nothing, so a
/// report emitted during the timeout window is picked up by the next
/// iteration.
pub fn run_consumer(ctx: &'static ReportContext, shutdown: &AtomicBool) -> ConsumerSummary {
    let mut summary = ConsumerSummary::default();
    loop {
        match block_on(ctx.recv_timeout(RECV_TIMEOUT)) {
            Some(report) => handle(&mut summary, report),
            None => {
                if shutdown.load(Ordering::Relaxed) {
                    // Flag is up and the queue stayed empty for a full
                    // timeout window; nothing left to collect.
                    break;
                }
            }
        }
    }
    summary
}

fn handle(summary: &mut ConsumerSummary, report: Report) {
    summary.received += 1;
    let latency = report.time_out.saturating_sub(report.time_in);
    if latency > summary.max_latency_us {
        summary.max_latency_us = latency;
    }

    if report.kind == EventKind::Overrun {
        summary.overruns += 1;
        let superseded = EventKind::from_raw(report.payload as u8);
        warn!(
            "overrun on {}: superseded {:?}, {} us in queue",
            report.source, superseded, latency
        );
    } else {
        debug!(
            "{} {:?} payload={} {} us in queue",
            report.source, report.kind, report.payload, latency
        );
    }
}
