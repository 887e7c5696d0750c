use bytes::Bytes;
use mfchar_slot::{BoundedSink, UserSink, UserSource, MAX_BUF_SIZE};
use tracing::{debug, info};

use crate::config::{BufferMode, DeviceConfig};
use crate::error::Result;
use crate::handle::{lock_slot, HandleId, HandleTable};
use crate::ops::FileOperations;

/// A single-slot character device.
///
/// Writes stage at most [`MAX_BUF_SIZE`] bytes per handle; reads drain them
/// once. Each handle's operations are serialized by that handle's slot lock.
pub struct CharDevice {
    config: DeviceConfig,
    handles: HandleTable,
}

impl CharDevice {
    pub fn new(config: DeviceConfig) -> Self {
        let handles = HandleTable::new(config.buffer_mode, config.max_open_handles);
        Self { config, handles }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn buffer_mode(&self) -> BufferMode {
        self.config.buffer_mode
    }

    /// Slot capacity in bytes.
    pub const fn capacity(&self) -> usize {
        MAX_BUF_SIZE
    }

    /// Number of currently open handles.
    pub fn open_handles(&self) -> usize {
        self.handles.len()
    }

    /// Stage `data`, truncated to capacity. Returns the accepted count.
    pub fn write_bytes(&self, handle: HandleId, data: &[u8]) -> Result<usize> {
        let mut src = data;
        self.write(handle, &mut src)
    }

    /// Drain up to `capacity` staged bytes.
    pub fn read_bytes(&self, handle: HandleId, capacity: usize) -> Result<Bytes> {
        let mut sink = BoundedSink::new(capacity);
        self.read(handle, &mut sink)?;
        Ok(sink.into_bytes())
    }
}

impl FileOperations for CharDevice {
    fn open(&self) -> Result<HandleId> {
        let handle = self.handles.insert()?;
        info!(device = %self.config.name, %handle, "device opened");
        Ok(handle)
    }

    fn release(&self, handle: HandleId) -> Result<()> {
        let slot = self.handles.remove(handle)?;
        // Wait out any stage/drain still running on this handle.
        drop(lock_slot(&slot));
        info!(device = %self.config.name, %handle, "device closed");
        Ok(())
    }

    fn write(&self, handle: HandleId, src: &mut dyn UserSource) -> Result<usize> {
        let slot = self.handles.get(handle)?;
        let mut state = lock_slot(&slot);
        let accepted = mfchar_slot::stage(&mut *state, src)?;
        debug!(%handle, accepted, "write");
        Ok(accepted)
    }

    fn read(&self, handle: HandleId, sink: &mut dyn UserSink) -> Result<usize> {
        let slot = self.handles.get(handle)?;
        let mut state = lock_slot(&slot);
        let delivered = mfchar_slot::drain(&mut *state, sink)?;
        debug!(%handle, delivered, "read");
        Ok(delivered)
    }
}

impl std::fmt::Debug for CharDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharDevice")
            .field("name", &self.config.name)
            .field("buffer_mode", &self.config.buffer_mode)
            .field("open_handles", &self.open_handles())
            .finish()
    }
}
