//! Host integration tests for the reporting core.
//!
//! Async receive paths are driven by `embassy_futures::block_on` with the
//! `embassy-time` std driver supplying timeouts.

use embassy_futures::block_on;
use embassy_time::Duration;

use railcab_core::reporting::{
    EventKind, Report, ReportContext, Source, SourceId, SourceKind, REPORT_QUEUE_DEPTH,
};
use railcab_core::traits::{MockTime, TimeSource};

fn leak_clock(start_us: u64) -> &'static MockTime {
    Box::leak(Box::new(MockTime::with_initial(start_us)))
}

fn leak_ctx(clock: &'static MockTime) -> &'static ReportContext {
    Box::leak(Box::new(ReportContext::new(clock)))
}

#[test]
fn round_trip_preserves_report_fields() {
    let clock = leak_clock(1_000);
    let ctx = ReportContext::new(clock);
    let ranger = ctx.register(SourceKind::Range).unwrap();

    ranger.emit(EventKind::RangeClose, 87);
    clock.advance(250);

    let report = block_on(ctx.recv());
    assert_eq!(report.kind, EventKind::RangeClose);
    assert_eq!(report.source, ranger.id());
    assert_eq!(report.payload, 87);
    assert!(report.time_in > 0);
    assert!(report.time_out >= report.time_in);
}

#[test]
fn overrun_scenario_range_42_then_7() {
    let clock = leak_clock(1_000);
    let ctx = ReportContext::new(clock);
    let ranger = ctx.register(SourceKind::Range).unwrap();

    ranger.emit(EventKind::RangeNormal, 42);
    clock.advance(10);
    ranger.emit(EventKind::RangeNormal, 7);

    assert_eq!(ctx.stats().overrun_count(), 1);

    let drained: Vec<Report> = ctx.drain().into_iter().collect();
    assert_eq!(drained.len(), 2);

    // Original normal report first, then the overrun record whose payload
    // is the kind of the second emission. The payload 7 is lost by design.
    assert_eq!(drained[0].kind, EventKind::RangeNormal);
    assert_eq!(drained[0].payload, 42);
    assert_eq!(drained[1].kind, EventKind::Overrun);
    assert_eq!(drained[1].payload, EventKind::RangeNormal as u8 as i32);
    assert_eq!(
        EventKind::from_raw(drained[1].payload as u8),
        Some(EventKind::RangeNormal)
    );
    assert_eq!(drained[1].source, ranger.id());
}

#[test]
fn slot_is_reclaimed_after_receive() {
    let clock = leak_clock(5_000);
    let ctx = ReportContext::new(clock);
    let odometer = ctx.register(SourceKind::Odometer).unwrap();

    odometer.emit(EventKind::LocoStop, 0);
    assert!(ctx.try_recv().is_some());

    // Branch went back to FREE: exactly one more emit lands on the normal
    // branch without triggering an overrun.
    odometer.emit(EventKind::LocoStop, 1);
    assert_eq!(ctx.stats().overrun_count(), 0);
    let report = ctx.try_recv().unwrap();
    assert_eq!(report.kind, EventKind::LocoStop);
    assert_eq!(report.payload, 1);
}

#[test]
fn seventeenth_report_hits_queue_full() {
    let clock = leak_clock(1_000);
    let ctx = ReportContext::new(clock);

    let emitters: Vec<_> = (0..REPORT_QUEUE_DEPTH + 1)
        .map(|_| ctx.register(SourceKind::Accessory).unwrap())
        .collect();

    for emitter in &emitters {
        emitter.emit(EventKind::AccessoryStateChange, 0);
    }

    assert_eq!(ctx.stats().queue_full_count(), 1);
    assert_eq!(ctx.stats().overrun_count(), 0);
    assert_eq!(ctx.drain().len(), REPORT_QUEUE_DEPTH);
}

#[test]
fn queue_full_leaves_branch_outstanding() {
    // Documented contract, not a bug to correct: a report dropped on a
    // full queue still marks its slot branch outstanding, so the source's
    // next emission is counted as an overrun even though nothing was
    // delivered.
    let clock = leak_clock(1_000);
    let ctx = ReportContext::new(clock);

    let fillers: Vec<_> = (0..REPORT_QUEUE_DEPTH)
        .map(|_| ctx.register(SourceKind::Accessory).unwrap())
        .collect();
    let victim = ctx.register(SourceKind::Range).unwrap();

    for filler in &fillers {
        filler.emit(EventKind::AccessoryStateChange, 0);
    }
    victim.emit(EventKind::RangeNormal, 42);
    assert_eq!(ctx.stats().queue_full_count(), 1);

    // Drain the sixteen delivered reports; the victim's report was
    // dropped, so nothing of it arrives.
    let drained = ctx.drain();
    assert_eq!(drained.len(), REPORT_QUEUE_DEPTH);
    assert!(drained.iter().all(|r| r.source != victim.id()));

    // The spurious overrun: the victim's normal branch was never freed.
    victim.emit(EventKind::RangeClose, 7);
    assert_eq!(ctx.stats().overrun_count(), 1);
    let report = ctx.try_recv().unwrap();
    assert_eq!(report.kind, EventKind::Overrun);
    assert_eq!(report.payload, EventKind::RangeClose as u8 as i32);
}

#[test]
fn registry_traversal_in_construction_order() {
    let clock = leak_clock(1_000);
    let ctx = ReportContext::new(clock);

    let a = ctx.register(SourceKind::Servo).unwrap();
    let b = ctx.register(SourceKind::Nfc).unwrap();
    let c = ctx.register(SourceKind::Ble).unwrap();

    let first = ctx.registry().first().unwrap();
    assert_eq!(first.id(), a.id());
    let second = first.next().unwrap();
    assert_eq!(second.id(), b.id());
    let third = second.next().unwrap();
    assert_eq!(third.id(), c.id());
    assert!(third.next().is_none());
}

#[test]
fn recv_timeout_expires_on_empty_queue() {
    let clock = leak_clock(1_000);
    let ctx = ReportContext::new(clock);
    ctx.register(SourceKind::Range).unwrap();

    let received = block_on(ctx.recv_timeout(Duration::from_millis(10)));
    assert!(received.is_none());
}

#[test]
fn recv_timeout_delivers_pending_report() {
    let clock = leak_clock(1_000);
    let ctx = ReportContext::new(clock);
    let ranger = ctx.register(SourceKind::Range).unwrap();

    ranger.emit(EventKind::RangeOutOfRange, -1);
    let received = block_on(ctx.recv_timeout(Duration::from_millis(100)));
    let report = received.expect("report was queued before the wait");
    assert_eq!(report.kind, EventKind::RangeOutOfRange);
    assert_eq!(report.payload, -1);
}

#[test]
fn timestamps_track_the_clock() {
    let clock = leak_clock(10_000);
    let ctx = ReportContext::new(clock);
    let quad = ctx.register(SourceKind::QuadDecoder).unwrap();

    quad.emit(EventKind::QuadRotate, 1);
    clock.advance(500);
    let report = ctx.try_recv().unwrap();

    assert_eq!(report.time_in, 10_000);
    assert_eq!(report.time_out, 10_500);
    assert_eq!(clock.elapsed_since(report.time_in), 500);
}

struct BootProbe {
    emitter: railcab_core::reporting::Emitter<'static>,
    kind: SourceKind,
    boot_log: &'static std::sync::Mutex<Vec<SourceId>>,
}

impl Source for BootProbe {
    fn emitter(&self) -> &railcab_core::reporting::Emitter<'static> {
        &self.emitter
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn initialize(&self) {
        self.boot_log.lock().unwrap().push(self.id());
    }
}

#[test]
fn initialize_all_visits_attached_devices_in_order() {
    let clock = leak_clock(1_000);
    let ctx = leak_ctx(clock);
    let boot_log: &'static std::sync::Mutex<Vec<SourceId>> =
        Box::leak(Box::new(std::sync::Mutex::new(Vec::new())));

    let probe = |kind| {
        let emitter = ctx.register(kind).unwrap();
        let device: &'static BootProbe = Box::leak(Box::new(BootProbe {
            emitter,
            kind,
            boot_log,
        }));
        ctx.attach(device);
        device
    };

    let servo = probe(SourceKind::Servo);
    // An entry registered but never attached is skipped by the traversal.
    let unbound = ctx.register(SourceKind::Accessory).unwrap();
    let ble = probe(SourceKind::Ble);

    ctx.initialize_all();

    let visited = boot_log.lock().unwrap().clone();
    assert_eq!(visited, vec![servo.id(), ble.id()]);
    assert_ne!(unbound.id(), servo.id());
}

#[test]
fn explicit_id_source_reports_under_that_id() {
    let clock = leak_clock(1_000);
    let ctx = ReportContext::new(clock);

    let well_known = ctx
        .register_with_id(SourceKind::Automaton, SourceId::new(240))
        .unwrap();
    well_known.emit(EventKind::SetAuto, 1);

    let report = ctx.try_recv().unwrap();
    assert_eq!(report.source, SourceId::new(240));
}
