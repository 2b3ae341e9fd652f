//! Core types for event reporting
//!
//! This module defines the fundamental types carried through the delivery
//! queue:
//! - Event kinds (what happened)
//! - Source kinds and identities (which device it happened on)
//! - The report record itself (timestamped event)

use core::fmt;

/// Fixed capacity of the shared delivery queue.
pub const REPORT_QUEUE_DEPTH: usize = 16;

/// Maximum number of sources the registry can hold.
pub const MAX_SOURCES: usize = 32;

/// Kind of a reported event.
///
/// The event consumer dispatches on this tag. Most kinds are specific to
/// one device family; [`EventKind::Overrun`] is synthesized by the
/// reporting core itself when a source emits before its previous report
/// was collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EventKind {
    /// Previous report from this source has not been processed.
    Overrun = 0,

    /// Locomotive has stopped.
    LocoStop,

    /// Distance read - below the critical distance.
    RangeClose,
    /// Distance read - above the critical distance.
    RangeNormal,
    /// Range read error indicating out of range.
    RangeOutOfRange,
    /// Range read error indicating a hardware problem.
    RangeFault,

    /// NTAG21x target found with NDEF content.
    NtagNdef,
    /// NTAG21x target found with null NDEF.
    NtagBlank,

    /// MIFARE Classic 1K target found.
    MifareClassicFound,
    /// DEP target found.
    DepFound,
    /// DEP message received (either direction).
    DepMessage,
    /// Found as a DEP passive target.
    DepPassive,
    /// Other recognised NFC tag found.
    NfcOtherFound,
    /// NFC tag found - type unknown.
    NfcUnknownTag,

    /// Discovered accessory for this remote.
    RaDiscovered,
    /// Remote accessory status update.
    RaStateChange,
    /// Remote accessory now connected.
    RaConnected,
    /// Remote accessory disconnected.
    RaDisconnected,

    /// BLE scan started.
    BleScanStart,
    /// BLE scan completed.
    BleScanDone,
    /// BLE peer found by scan.
    BlePeerFound,
    /// BLE central connection made, discovery still required.
    BleConnected,
    /// BLE central connection completely open, services ready.
    BleServicesReady,
    /// BLE central connection open failed.
    BleConnectFail,
    /// BLE central disconnected.
    BleDisconnected,

    /// Local accessory status update.
    AccessoryStateChange,

    /// Rotary switch rotation.
    QuadRotate,
    /// Rotary switch double change (error).
    QuadFault,

    /// Set locomotive driver auto mode.
    SetAuto,
}

impl EventKind {
    /// Recover an event kind from its raw discriminant.
    ///
    /// Overrun reports carry the superseded event's kind in their payload
    /// field as an `i32`; the consumer uses this to map it back.
    pub fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => EventKind::Overrun,
            1 => EventKind::LocoStop,
            2 => EventKind::RangeClose,
            3 => EventKind::RangeNormal,
            4 => EventKind::RangeOutOfRange,
            5 => EventKind::RangeFault,
            6 => EventKind::NtagNdef,
            7 => EventKind::NtagBlank,
            8 => EventKind::MifareClassicFound,
            9 => EventKind::DepFound,
            10 => EventKind::DepMessage,
            11 => EventKind::DepPassive,
            12 => EventKind::NfcOtherFound,
            13 => EventKind::NfcUnknownTag,
            14 => EventKind::RaDiscovered,
            15 => EventKind::RaStateChange,
            16 => EventKind::RaConnected,
            17 => EventKind::RaDisconnected,
            18 => EventKind::BleScanStart,
            19 => EventKind::BleScanDone,
            20 => EventKind::BlePeerFound,
            21 => EventKind::BleConnected,
            22 => EventKind::BleServicesReady,
            23 => EventKind::BleConnectFail,
            24 => EventKind::BleDisconnected,
            25 => EventKind::AccessoryStateChange,
            26 => EventKind::QuadRotate,
            27 => EventKind::QuadFault,
            28 => EventKind::SetAuto,
            _ => return None,
        })
    }
}

/// Kind of a report source, one per device family.
///
/// The discriminants are the single-letter codes used in console output
/// and accessory messages, covering both static accessory and mobile
/// usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SourceKind {
    /// Servo driver.
    Servo = b'S',
    /// IR time-of-flight distance sensor (VL53).
    Range = b'V',
    /// Near field comms controller.
    Nfc = b'N',
    /// NFC NTAG target.
    Ntag = b'U',
    /// NFC DEP target.
    Dep = b'D',
    /// Odometer.
    Odometer = b'O',
    /// Remote accessory.
    RemoteAccessory = b'R',
    /// Local accessory.
    Accessory = b'A',
    /// Quadrature decoder.
    QuadDecoder = b'Q',
    /// Locomotive automaton.
    Automaton = b'L',
    /// BLE layer.
    Ble = b'B',
}

impl SourceKind {
    /// Single-letter code for logs and accessory messages.
    pub fn letter(self) -> char {
        self as u8 as char
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Identity of a registered source.
///
/// Ids are assigned sequentially from 1 at registration, or supplied by
/// the caller for stable well-known ids. Reports carry the id rather than
/// a reference to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceId(u8);

impl SourceId {
    /// Wrap a raw id value.
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Raw id value.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single timestamped event record.
///
/// `time_in == 0` denotes a free slot branch; a nonzero value denotes a
/// report written but not yet collected by the consumer. The clock is
/// clamped to at least 1 us at emit time so a report stamped at boot
/// cannot masquerade as a free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    /// What happened.
    pub kind: EventKind,
    /// Which source reported it.
    pub source: SourceId,
    /// Time the report was staged for delivery (us). Zero means free.
    pub time_in: u64,
    /// Time the report was collected by the consumer (us).
    pub time_out: u64,
    /// Additional information; usage depends on the report kind. For
    /// overrun reports this holds the superseded event's kind.
    pub payload: i32,
}

impl Report {
    /// An unoccupied record, used to initialize slot storage.
    pub const fn empty() -> Self {
        Self {
            kind: EventKind::Overrun,
            source: SourceId::new(0),
            time_in: 0,
            time_out: 0,
            payload: 0,
        }
    }

    /// Whether this record denotes a free slot branch.
    pub const fn is_free(&self) -> bool {
        self.time_in == 0
    }
}
