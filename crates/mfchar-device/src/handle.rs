//! Handle arena.
//!
//! Every open handle is a key into a [`HandleTable`]; the table owns the
//! handle's slot behind its own mutex. The table lock is held only while
//! inserting, looking up, or removing an entry.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mfchar_slot::Slot;

use crate::config::BufferMode;
use crate::error::{DeviceError, Result};

/// Opaque token identifying one open session on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fh-{}", self.0)
    }
}

/// Slot shared between the table and in-flight operations.
pub type SlotRef = Arc<Mutex<Slot>>;

/// Lock a slot, recovering from poisoning.
///
/// `stage` and `drain` leave the slot consistent between statements, so a
/// panic in another holder never leaves a torn `valid_length`.
pub fn lock_slot(slot: &SlotRef) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Arena of open handles.
pub struct HandleTable {
    entries: Mutex<HashMap<HandleId, SlotRef>>,
    shared: Option<SlotRef>,
    max_open: usize,
    next_id: AtomicU64,
}

impl HandleTable {
    pub fn new(mode: BufferMode, max_open: usize) -> Self {
        let shared = match mode {
            BufferMode::PerHandle => None,
            BufferMode::Shared => Some(Arc::new(Mutex::new(Slot::new()))),
        };
        Self {
            entries: Mutex::new(HashMap::new()),
            shared,
            max_open,
            next_id: AtomicU64::new(1),
        }
    }

    /// Allocate handle state and return its key.
    pub fn insert(&self) -> Result<HandleId> {
        let mut entries = self.entries();
        let open = entries.len();
        if open >= self.max_open || entries.try_reserve(1).is_err() {
            return Err(DeviceError::OutOfMemory {
                open,
                max: self.max_open,
            });
        }

        let slot = match &self.shared {
            Some(shared) => Arc::clone(shared),
            None => Arc::new(Mutex::new(Slot::new())),
        };
        let id = HandleId(self.next_id.fetch_add(1, Ordering::Relaxed));
        entries.insert(id, slot);
        Ok(id)
    }

    /// Slot owned by `id`.
    pub fn get(&self, id: HandleId) -> Result<SlotRef> {
        self.entries()
            .get(&id)
            .cloned()
            .ok_or(DeviceError::BadHandle(id))
    }

    /// Detach `id` from the table and hand back its slot.
    pub fn remove(&self, id: HandleId) -> Result<SlotRef> {
        self.entries()
            .remove(&id)
            .ok_or(DeviceError::BadHandle(id))
    }

    /// Number of open handles.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_open(&self) -> usize {
        self.max_open
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<HandleId, SlotRef>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_and_never_reused() {
        let table = HandleTable::new(BufferMode::PerHandle, 8);
        let first = table.insert().unwrap();
        let second = table.insert().unwrap();
        assert_eq!(first.as_raw(), 1);
        assert_eq!(second.as_raw(), 2);

        table.remove(first).unwrap();
        let third = table.insert().unwrap();
        assert_eq!(third.as_raw(), 3);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn per_handle_mode_allocates_distinct_slots() {
        let table = HandleTable::new(BufferMode::PerHandle, 8);
        let a = table.get(table.insert().unwrap()).unwrap();
        let b = table.get(table.insert().unwrap()).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn shared_mode_hands_out_one_slot() {
        let table = HandleTable::new(BufferMode::Shared, 8);
        let a = table.get(table.insert().unwrap()).unwrap();
        let b = table.get(table.insert().unwrap()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn full_table_reports_out_of_memory() {
        let table = HandleTable::new(BufferMode::PerHandle, 1);
        let id = table.insert().unwrap();
        assert!(matches!(
            table.insert(),
            Err(DeviceError::OutOfMemory { open: 1, max: 1 })
        ));

        table.remove(id).unwrap();
        assert!(table.insert().is_ok());
    }

    #[test]
    fn unknown_handle_is_rejected() {
        let table = HandleTable::new(BufferMode::PerHandle, 1);
        let missing = HandleId::from_raw(42);
        assert!(matches!(table.get(missing), Err(DeviceError::BadHandle(id)) if id == missing));
        assert!(matches!(table.remove(missing), Err(DeviceError::BadHandle(_))));
    }

    #[test]
    fn handle_display() {
        assert_eq!(HandleId::from_raw(7).to_string(), "fh-7");
    }
}
