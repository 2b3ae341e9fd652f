//! Simulated device drivers.
//!
//! Each driver embeds the [`Emitter`] it registered with and implements
//! [`Source`]. `step(tick)` is called by a producer thread and emits the
//! deterministic event pattern for that device family; determinism keeps
//! simulation runs reproducible without a random-number dependency.

use log::info;

use railcab_core::reporting::{Emitter, EventKind, Source, SourceKind};

/// VL53-style IR time-of-flight range sensor.
///
/// Sweeps a triangle wave of distances through the critical threshold and
/// injects a periodic out-of-range read.
pub struct SimRangeSensor {
    emitter: Emitter<'static>,
    critical_mm: i32,
}

impl SimRangeSensor {
    pub fn new(emitter: Emitter<'static>) -> Self {
        Self {
            emitter,
            critical_mm: 120,
        }
    }

    pub fn step(&self, tick: u32) {
        if tick % 37 == 0 {
            self.emitter.emit(EventKind::RangeOutOfRange, -1);
            return;
        }
        // Triangle wave between 40 mm and 400 mm.
        let phase = (tick % 80) as i32;
        let distance = 40 + (phase - 40).abs() * 9;
        if distance < self.critical_mm {
            self.emitter.emit(EventKind::RangeClose, distance);
        } else {
            self.emitter.emit(EventKind::RangeNormal, distance);
        }
    }
}

impl Source for SimRangeSensor {
    fn emitter(&self) -> &Emitter<'static> {
        &self.emitter
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Range
    }

    fn initialize(&self) {
        info!("range sensor {} online, critical {} mm", self.id(), self.critical_mm);
    }
}

/// Odometer: reports a locomotive stop with the accumulated distance
/// every few hundred ticks.
pub struct SimOdometer {
    emitter: Emitter<'static>,
    mm_per_tick: i32,
}

impl SimOdometer {
    pub fn new(emitter: Emitter<'static>) -> Self {
        Self {
            emitter,
            mm_per_tick: 7,
        }
    }

    pub fn step(&self, tick: u32) {
        if tick > 0 && tick % 250 == 0 {
            let travelled = tick as i32 * self.mm_per_tick;
            self.emitter.emit(EventKind::LocoStop, travelled);
        }
    }
}

impl Source for SimOdometer {
    fn emitter(&self) -> &Emitter<'static> {
        &self.emitter
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Odometer
    }

    fn initialize(&self) {
        info!("odometer {} online", self.id());
    }
}

/// Quadrature rotary decoder: alternating rotation direction with an
/// occasional double-change fault.
pub struct SimQuadDecoder {
    emitter: Emitter<'static>,
}

impl SimQuadDecoder {
    pub fn new(emitter: Emitter<'static>) -> Self {
        Self { emitter }
    }

    pub fn step(&self, tick: u32) {
        if tick % 97 == 0 {
            self.emitter.emit(EventKind::QuadFault, 0);
        } else {
            let direction = if (tick / 16) % 2 == 0 { 1 } else { -1 };
            self.emitter.emit(EventKind::QuadRotate, direction);
        }
    }
}

impl Source for SimQuadDecoder {
    fn emitter(&self) -> &Emitter<'static> {
        &self.emitter
    }

    fn kind(&self) -> SourceKind {
        SourceKind::QuadDecoder
    }

    fn initialize(&self) {
        info!("quadrature decoder {} online", self.id());
    }
}
