//! Core traits for platform-agnostic reporting functionality.
//!
//! Trait definitions here are pure and have no feature gates. Mock
//! implementations are always available for host testing; platform
//! implementations (Embassy instant, host clock) live in the firmware and
//! SITL crates.

pub mod time;

pub use time::{MockTime, TimeSource};
