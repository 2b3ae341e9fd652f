//! Source registry
//!
//! Arena-owned, append-only collection of every report source, ordered by
//! registration time. The registry owns each source's slot storage and
//! registration metadata; devices hold index-based handles
//! ([`Emitter`](super::Emitter)) rather than intrusive links, so nothing
//! dangles.
//!
//! # Precondition
//!
//! Registration and device binding happen during single-threaded startup,
//! before any interrupt or thread emits. The registry therefore takes no
//! lock around the traversal path; this keeps the emit hot path free of
//! any lock a lower-priority context might hold. Reimplementations must
//! preserve this staging rather than add locking.

use core::cell::Cell;
use core::fmt;

use critical_section::Mutex;

use super::slot::ReportSlot;
use super::source::Source;
use super::types::{SourceId, SourceKind, MAX_SOURCES};

/// Errors that can occur during source registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// Registry already holds [`MAX_SOURCES`] sources.
    Full,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Full => write!(f, "source registry is full"),
        }
    }
}

#[derive(Clone, Copy)]
struct EntryMeta {
    id: SourceId,
    kind: SourceKind,
}

pub(crate) struct SourceEntry {
    meta: Mutex<Cell<Option<EntryMeta>>>,
    pub(crate) slot: ReportSlot,
    device: Mutex<Cell<Option<&'static dyn Source>>>,
}

impl SourceEntry {
    const fn new() -> Self {
        Self {
            meta: Mutex::new(Cell::new(None)),
            slot: ReportSlot::new(),
            device: Mutex::new(Cell::new(None)),
        }
    }

    fn meta(&self) -> Option<EntryMeta> {
        critical_section::with(|cs| self.meta.borrow(cs).get())
    }
}

#[derive(Clone, Copy)]
struct RegState {
    len: u8,
    last_id: u8,
}

/// Registry of all report sources, in registration order.
///
/// There is no removal operation: sources are created once during system
/// initialization and live for the process lifetime.
pub struct SourceRegistry {
    entries: [SourceEntry; MAX_SOURCES],
    state: Mutex<Cell<RegState>>,
}

impl SourceRegistry {
    pub(crate) const fn new() -> Self {
        const ENTRY: SourceEntry = SourceEntry::new();
        Self {
            entries: [ENTRY; MAX_SOURCES],
            state: Mutex::new(Cell::new(RegState { len: 0, last_id: 0 })),
        }
    }

    /// Append a source, assigning the next sequential id (starting at 1).
    pub(crate) fn register(&self, kind: SourceKind) -> Result<(u8, SourceId), RegistryError> {
        critical_section::with(|cs| {
            let state = self.state.borrow(cs);
            let mut st = state.get();
            if st.len as usize == MAX_SOURCES {
                return Err(RegistryError::Full);
            }
            st.last_id += 1;
            let id = SourceId::new(st.last_id);
            let index = st.len;
            st.len += 1;
            state.set(st);
            self.entries[index as usize]
                .meta
                .borrow(cs)
                .set(Some(EntryMeta { id, kind }));
            Ok((index, id))
        })
    }

    /// Append a source with a caller-supplied id.
    ///
    /// Uniqueness is not checked, and the sequential counter is not
    /// advanced; the caller is responsible for keeping explicit ids out of
    /// the automatically assigned range.
    pub(crate) fn register_with_id(
        &self,
        kind: SourceKind,
        id: SourceId,
    ) -> Result<(u8, SourceId), RegistryError> {
        critical_section::with(|cs| {
            let state = self.state.borrow(cs);
            let mut st = state.get();
            if st.len as usize == MAX_SOURCES {
                return Err(RegistryError::Full);
            }
            let index = st.len;
            st.len += 1;
            state.set(st);
            self.entries[index as usize]
                .meta
                .borrow(cs)
                .set(Some(EntryMeta { id, kind }));
            Ok((index, id))
        })
    }

    /// Bind the device behind an entry so the boot traversal can invoke
    /// its initialization hook.
    pub(crate) fn bind(&self, index: u8, device: &'static dyn Source) {
        critical_section::with(|cs| {
            self.entries[index as usize].device.borrow(cs).set(Some(device));
        });
    }

    pub(crate) fn entry(&self, index: u8) -> &SourceEntry {
        &self.entries[index as usize]
    }

    /// Number of registered sources.
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.state.borrow(cs).get().len) as usize
    }

    /// Whether no source has registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First registered source, if any.
    pub fn first(&self) -> Option<Registered<'_>> {
        if self.is_empty() {
            None
        } else {
            Some(Registered {
                registry: self,
                index: 0,
            })
        }
    }

    /// Iterate over registered sources in registration order.
    pub fn iter(&self) -> impl Iterator<Item = Registered<'_>> {
        let len = self.len();
        (0..len).map(move |index| Registered {
            registry: self,
            index,
        })
    }
}

/// Handle to one registered source, yielded by registry traversal.
#[derive(Clone, Copy)]
pub struct Registered<'a> {
    registry: &'a SourceRegistry,
    index: usize,
}

impl<'a> Registered<'a> {
    /// Identity of this source.
    pub fn id(&self) -> SourceId {
        // Meta is written at registration, before any traversal can
        // observe the entry through `len`.
        match self.registry.entries[self.index].meta() {
            Some(meta) => meta.id,
            None => SourceId::new(0),
        }
    }

    /// Kind recorded at registration.
    pub fn kind(&self) -> Option<SourceKind> {
        self.registry.entries[self.index].meta().map(|m| m.kind)
    }

    /// The bound device, if one was attached.
    pub fn device(&self) -> Option<&'static dyn Source> {
        critical_section::with(|cs| {
            self.registry.entries[self.index].device.borrow(cs).get()
        })
    }

    /// Next source in registration order, or `None` if this is the last.
    pub fn next(&self) -> Option<Registered<'a>> {
        let next = self.index + 1;
        if next < self.registry.len() {
            Some(Registered {
                registry: self.registry,
                index: next,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_from_one() {
        let registry = SourceRegistry::new();
        let (_, a) = registry.register(SourceKind::Range).unwrap();
        let (_, b) = registry.register(SourceKind::Odometer).unwrap();
        assert_eq!(a, SourceId::new(1));
        assert_eq!(b, SourceId::new(2));
    }

    #[test]
    fn traversal_follows_registration_order() {
        let registry = SourceRegistry::new();
        registry.register(SourceKind::Range).unwrap();
        registry.register(SourceKind::Nfc).unwrap();
        registry.register(SourceKind::Ble).unwrap();

        let first = registry.first().unwrap();
        assert_eq!(first.kind(), Some(SourceKind::Range));
        let second = first.next().unwrap();
        assert_eq!(second.kind(), Some(SourceKind::Nfc));
        let third = second.next().unwrap();
        assert_eq!(third.kind(), Some(SourceKind::Ble));
        assert!(third.next().is_none());
    }

    #[test]
    fn empty_registry_has_no_first() {
        let registry = SourceRegistry::new();
        assert!(registry.first().is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn explicit_id_does_not_advance_sequence() {
        let registry = SourceRegistry::new();
        registry
            .register_with_id(SourceKind::Accessory, SourceId::new(200))
            .unwrap();
        let (_, id) = registry.register(SourceKind::Servo).unwrap();
        assert_eq!(id, SourceId::new(1));
    }

    #[test]
    fn registry_fills_at_capacity() {
        let registry = SourceRegistry::new();
        for _ in 0..MAX_SOURCES {
            registry.register(SourceKind::Accessory).unwrap();
        }
        assert_eq!(
            registry.register(SourceKind::Accessory),
            Err(RegistryError::Full)
        );
        assert_eq!(registry.len(), MAX_SOURCES);
    }
}
