//! Simulated reporting run.
//!
//! Brings up the reporting context with three simulated devices (range
//! sensor, odometer, quadrature decoder), drives them from producer
//! threads for a fixed duration, and drains everything on a consumer
//! thread, printing the run summary and degradation counters at the end.
//!
//! Usage:
//!   cargo run -p railcab-sitl --bin report_monitor -- [OPTIONS]
//!
//! Options:
//!   -d, --duration-ms <MS>   Run duration in milliseconds (default: 2000)
//!   --tick-us <US>           Producer tick interval in microseconds (default: 500)

use std::env;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration as StdDuration;

use static_cell::StaticCell;

use railcab_core::reporting::{ReportContext, SourceKind};
use railcab_sitl::{
    run_consumer, HostClock, SimOdometer, SimQuadDecoder, SimRangeSensor, SitlError,
};

static CLOCK: HostClock = HostClock::new();
static REPORTS: ReportContext = ReportContext::new(&CLOCK);
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

static RANGE: StaticCell<SimRangeSensor> = StaticCell::new();
static ODOMETER: StaticCell<SimOdometer> = StaticCell::new();
static QUAD: StaticCell<SimQuadDecoder> = StaticCell::new();

struct Args {
    duration_ms: u64,
    tick_us: u64,
}

fn parse_args() -> Args {
    let mut args = Args {
        duration_ms: 2000,
        tick_us: 500,
    };

    let raw: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < raw.len() {
        match raw[i].as_str() {
            "-d" | "--duration-ms" => {
                i += 1;
                args.duration_ms = parse_u64_arg(&raw, i, "duration-ms");
            }
            "--tick-us" => {
                i += 1;
                args.tick_us = parse_u64_arg(&raw, i, "tick-us");
            }
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {other}");
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    if args.tick_us == 0 {
        eprintln!("Error: tick-us must be at least 1");
        process::exit(1);
    }

    args
}

fn parse_u64_arg(raw: &[String], i: usize, name: &str) -> u64 {
    raw.get(i)
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| {
            eprintln!("Error: invalid value for --{name}");
            process::exit(1);
        })
}

fn print_usage() {
    println!("Usage: report_monitor [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -d, --duration-ms <MS>   Run duration in milliseconds (default: 2000)");
    println!("  --tick-us <US>           Producer tick interval in microseconds (default: 500)");
    println!("  -h, --help               Show this help");
}

fn main() {
    env_logger::init();
    let args = parse_args();
    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), SitlError> {
    let range = &*RANGE.init(SimRangeSensor::new(REPORTS.register(SourceKind::Range)?));
    let odometer = &*ODOMETER.init(SimOdometer::new(REPORTS.register(SourceKind::Odometer)?));
    let quad = &*QUAD.init(SimQuadDecoder::new(REPORTS.register(SourceKind::QuadDecoder)?));

    REPORTS.attach(range);
    REPORTS.attach(odometer);
    REPORTS.attach(quad);
    REPORTS.initialize_all();

    let consumer = thread::spawn(|| run_consumer(&REPORTS, &SHUTDOWN));

    let ticks = (args.duration_ms * 1000) / args.tick_us;
    let tick_interval = StdDuration::from_micros(args.tick_us);

    let producers = [
        thread::spawn(move || {
            for tick in 0..ticks as u32 {
                range.step(tick);
                thread::sleep(tick_interval);
            }
        }),
        thread::spawn(move || {
            for tick in 0..ticks as u32 {
                odometer.step(tick);
                thread::sleep(tick_interval);
            }
        }),
        thread::spawn(move || {
            for tick in 0..ticks as u32 {
                quad.step(tick);
                thread::sleep(tick_interval);
            }
        }),
    ];

    for producer in producers {
        producer
            .join()
            .map_err(|_| SitlError::ThreadPanicked("producer"))?;
    }
    SHUTDOWN.store(true, Ordering::Relaxed);
    let summary = consumer
        .join()
        .map_err(|_| SitlError::ThreadPanicked("consumer"))?;

    let stats = REPORTS.stats();
    println!("received:        {}", summary.received);
    println!("overrun reports: {}", summary.overruns);
    println!("max latency:     {} us", summary.max_latency_us);
    println!("overrun count:   {}", stats.overrun_count());
    println!("queue full:      {}", stats.queue_full_count());

    Ok(())
}
