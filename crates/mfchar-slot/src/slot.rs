/// Capacity of a slot in bytes.
pub const MAX_BUF_SIZE: usize = 128;

/// Observable state of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Nothing staged (`valid_length == 0`).
    Empty,
    /// Bytes staged and not yet drained.
    Staged,
}

/// Per-handle state: a fixed buffer and the number of staged bytes in it.
///
/// `valid_length` never exceeds [`MAX_BUF_SIZE`]. Only [`crate::stage`] and
/// [`crate::drain`] mutate it.
#[derive(Clone)]
pub struct Slot {
    pub(crate) buffer: [u8; MAX_BUF_SIZE],
    pub(crate) valid_length: usize,
}

impl Slot {
    /// Create a zeroed, empty slot.
    pub fn new() -> Self {
        Self {
            buffer: [0u8; MAX_BUF_SIZE],
            valid_length: 0,
        }
    }

    /// Number of staged bytes.
    pub fn len(&self) -> usize {
        self.valid_length
    }

    pub fn is_empty(&self) -> bool {
        self.valid_length == 0
    }

    pub fn state(&self) -> SlotState {
        if self.is_empty() {
            SlotState::Empty
        } else {
            SlotState::Staged
        }
    }

    /// Staged bytes, without draining them.
    pub fn staged(&self) -> &[u8] {
        &self.buffer[..self.valid_length]
    }

    /// Capacity of the slot.
    pub const fn capacity(&self) -> usize {
        MAX_BUF_SIZE
    }
}

impl Default for Slot {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot")
            .field("valid_length", &self.valid_length)
            .field("capacity", &MAX_BUF_SIZE)
            .finish()
    }
}
