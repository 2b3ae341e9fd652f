//! railcab_sitl - Host-side simulation harness for the reporting core
//!
//! Stands in for the hardware bring-up on a development machine: simulated
//! device drivers emit reports from plain threads (the interrupt-context
//! analog), and a consumer loop drains the shared queue the way the
//! firmware's event task would.

pub mod clock;
pub mod consumer;
pub mod devices;
pub mod error;

pub use clock::HostClock;
pub use consumer::{run_consumer, ConsumerSummary};
pub use devices::{SimOdometer, SimQuadDecoder, SimRangeSensor};
pub use error::SitlError;
