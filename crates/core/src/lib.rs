//! railcab_core - Event-reporting core for the railcab locomotive firmware
//!
//! This crate contains the bounded, interrupt-safe event delivery path that
//! every device driver (servo, range sensor, NFC, odometer, quadrature
//! decoder, BLE, automaton) reports through, and the registry that
//! enumerates those devices at boot. It is platform-agnostic and can be
//! tested on host.
//!
//! # Design Principles
//!
//! - **Pure no_std**: no std library dependencies
//! - **Allocation-free**: all storage is fixed-capacity and owned up front
//! - **ISR-safe producers**: `emit` never blocks, never allocates, and runs
//!   in bounded time
//! - **Trait abstractions**: platform services injected via traits
//!
//! # Modules
//!
//! - [`traits`]: Platform-agnostic trait abstractions (TimeSource)
//! - [`reporting`]: Report types, per-source slots, source registry, the
//!   shared delivery queue, and overrun/queue-full statistics

#![no_std]

pub mod reporting;
pub mod traits;
