//! In-process channel registration.
//!
//! Stands in for the host's device-number allocation and node creation:
//! a device registered under `name` gets a dynamic major number and becomes
//! reachable at `/dev/<name>` until it is unregistered.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use mfchar_slot::{BoundedSink, UserSink, UserSource};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{DeviceError, RegistrationError, Result};
use crate::handle::HandleId;
use crate::ops::FileOperations;

/// Highest dynamically assigned major number.
pub const DYNAMIC_MAJOR_MAX: u32 = 254;
/// Lowest dynamically assigned major number.
pub const DYNAMIC_MAJOR_MIN: u32 = 234;
/// First minor number handed to every registration.
pub const BASE_MINOR: u32 = 0;

/// Major/minor device number pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DevNum {
    pub major: u32,
    pub minor: u32,
}

impl fmt::Display for DevNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.major, self.minor)
    }
}

/// Proof that a device is published; returned by [`Registrar::register`].
#[derive(Debug, PartialEq, Eq)]
pub struct Registration {
    name: String,
    devnum: DevNum,
}

impl Registration {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn devnum(&self) -> DevNum {
        self.devnum
    }

    pub fn path(&self) -> String {
        format!("/dev/{}", self.name)
    }
}

/// Publishes devices so callers can reach their [`FileOperations`].
pub trait Registrar: Send + Sync {
    /// Allocate a device number and publish `ops` under `name`.
    fn register(
        &self,
        name: &str,
        ops: Arc<dyn FileOperations>,
    ) -> std::result::Result<Registration, RegistrationError>;

    /// Revoke a published device. Callers must release every handle first.
    fn unregister(&self, registration: Registration) -> std::result::Result<(), RegistrationError>;
}

struct Node {
    devnum: DevNum,
    ops: Arc<dyn FileOperations>,
}

/// Registry of device nodes held in memory.
#[derive(Default)]
pub struct NodeRegistry {
    nodes: Mutex<BTreeMap<String, Node>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the device published at `path` (`/dev/<name>` or a bare name).
    pub fn open(&self, path: &str) -> Result<OpenFile> {
        let ops = self.lookup(path)?;
        let handle = ops.open()?;
        Ok(OpenFile {
            ops,
            handle,
            path: path.to_string(),
            closed: false,
        })
    }

    /// Device number of the node at `path`.
    pub fn devnum(&self, path: &str) -> Option<DevNum> {
        let name = node_name(path);
        self.nodes().get(name).map(|node| node.devnum)
    }

    /// Published node paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.nodes().keys().map(|name| format!("/dev/{name}")).collect()
    }

    fn lookup(&self, path: &str) -> Result<Arc<dyn FileOperations>> {
        let name = node_name(path);
        self.nodes()
            .get(name)
            .map(|node| Arc::clone(&node.ops))
            .ok_or_else(|| DeviceError::NoSuchNode(path.to_string()))
    }

    fn nodes(&self) -> MutexGuard<'_, BTreeMap<String, Node>> {
        self.nodes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Registrar for NodeRegistry {
    fn register(
        &self,
        name: &str,
        ops: Arc<dyn FileOperations>,
    ) -> std::result::Result<Registration, RegistrationError> {
        if name.is_empty() || name.contains('/') {
            return Err(RegistrationError::InvalidName(name.to_string()));
        }

        let mut nodes = self.nodes();
        if nodes.contains_key(name) {
            return Err(RegistrationError::NameTaken(name.to_string()));
        }

        let major = (DYNAMIC_MAJOR_MIN..=DYNAMIC_MAJOR_MAX)
            .rev()
            .find(|major| nodes.values().all(|node| node.devnum.major != *major))
            .ok_or(RegistrationError::NoDeviceNumbers)?;
        let devnum = DevNum {
            major,
            minor: BASE_MINOR,
        };

        nodes.insert(name.to_string(), Node { devnum, ops });
        debug!(name, %devnum, "device node added");

        Ok(Registration {
            name: name.to_string(),
            devnum,
        })
    }

    fn unregister(&self, registration: Registration) -> std::result::Result<(), RegistrationError> {
        let mut nodes = self.nodes();
        let published = nodes
            .get(&registration.name)
            .is_some_and(|node| node.devnum == registration.devnum);
        if !published {
            return Err(RegistrationError::NotRegistered(registration.name));
        }

        nodes.remove(&registration.name);
        debug!(name = %registration.name, devnum = %registration.devnum, "device node removed");
        Ok(())
    }
}

fn node_name(path: &str) -> &str {
    path.strip_prefix("/dev/").unwrap_or(path)
}

/// A caller's open session on a published device.
///
/// Dropping an `OpenFile` without calling [`OpenFile::close`] releases the
/// handle anyway.
pub struct OpenFile {
    ops: Arc<dyn FileOperations>,
    handle: HandleId,
    path: String,
    closed: bool,
}

impl OpenFile {
    pub fn handle(&self) -> HandleId {
        self.handle
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Write `data`. Returns how many bytes the device accepted.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        let mut src = data;
        self.ops.write(self.handle, &mut src)
    }

    /// Write from an arbitrary caller region.
    pub fn write_from(&mut self, src: &mut dyn UserSource) -> Result<usize> {
        self.ops.write(self.handle, src)
    }

    /// Read up to `capacity` bytes.
    pub fn read(&mut self, capacity: usize) -> Result<Bytes> {
        let mut sink = BoundedSink::new(capacity);
        self.ops.read(self.handle, &mut sink)?;
        Ok(sink.into_bytes())
    }

    /// Read into an arbitrary caller region.
    pub fn read_into(&mut self, sink: &mut dyn UserSink) -> Result<usize> {
        self.ops.read(self.handle, sink)
    }

    /// Release the handle.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.ops.release(self.handle)
    }
}

impl Drop for OpenFile {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(err) = self.ops.release(self.handle) {
            warn!(path = %self.path, handle = %self.handle, %err, "release on drop failed");
        } else {
            info!(path = %self.path, handle = %self.handle, "handle released on drop");
        }
    }
}

impl fmt::Debug for OpenFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenFile")
            .field("path", &self.path)
            .field("handle", &self.handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeviceConfig;
    use crate::device::CharDevice;

    fn ops() -> Arc<dyn FileOperations> {
        Arc::new(CharDevice::new(DeviceConfig::default()))
    }

    #[test]
    fn majors_are_allocated_from_the_top_of_the_range() {
        let registry = NodeRegistry::new();
        let a = registry.register("a", ops()).unwrap();
        let b = registry.register("b", ops()).unwrap();

        assert_eq!(a.devnum(), DevNum { major: 254, minor: 0 });
        assert_eq!(b.devnum(), DevNum { major: 253, minor: 0 });
        assert_eq!(registry.paths(), vec!["/dev/a".to_string(), "/dev/b".to_string()]);
    }

    #[test]
    fn freed_major_is_reused() {
        let registry = NodeRegistry::new();
        let a = registry.register("a", ops()).unwrap();
        let _b = registry.register("b", ops()).unwrap();
        registry.unregister(a).unwrap();

        let c = registry.register("c", ops()).unwrap();
        assert_eq!(c.devnum().major, 254);
    }

    #[test]
    fn major_range_exhaustion() {
        let registry = NodeRegistry::new();
        let count = (DYNAMIC_MAJOR_MAX - DYNAMIC_MAJOR_MIN + 1) as usize;
        for i in 0..count {
            registry.register(&format!("dev{i}"), ops()).unwrap();
        }
        assert_eq!(
            registry.register("one-too-many", ops()).unwrap_err(),
            RegistrationError::NoDeviceNumbers
        );
    }

    #[test]
    fn rejects_duplicate_and_invalid_names() {
        let registry = NodeRegistry::new();
        registry.register("mfchar", ops()).unwrap();

        assert_eq!(
            registry.register("mfchar", ops()).unwrap_err(),
            RegistrationError::NameTaken("mfchar".to_string())
        );
        assert!(matches!(
            registry.register("", ops()),
            Err(RegistrationError::InvalidName(_))
        ));
        assert!(matches!(
            registry.register("a/b", ops()),
            Err(RegistrationError::InvalidName(_))
        ));
    }

    #[test]
    fn open_by_path_or_name() {
        let registry = NodeRegistry::new();
        registry.register("mfchar", ops()).unwrap();

        let by_path = registry.open("/dev/mfchar").unwrap();
        let by_name = registry.open("mfchar").unwrap();
        assert_ne!(by_path.handle(), by_name.handle());
        assert_eq!(registry.devnum("/dev/mfchar").map(|d| d.major), Some(254));
    }

    #[test]
    fn unregistered_node_cannot_be_opened() {
        let registry = NodeRegistry::new();
        let reg = registry.register("mfchar", ops()).unwrap();
        registry.unregister(reg).unwrap();

        assert!(matches!(
            registry.open("/dev/mfchar"),
            Err(DeviceError::NoSuchNode(path)) if path == "/dev/mfchar"
        ));
    }

    #[test]
    fn unregister_unknown_registration() {
        let registry = NodeRegistry::new();
        let other = NodeRegistry::new();
        let reg = other.register("elsewhere", ops()).unwrap();
        assert_eq!(
            registry.unregister(reg).unwrap_err(),
            RegistrationError::NotRegistered("elsewhere".to_string())
        );
    }

    #[test]
    fn open_file_write_read_close() {
        let registry = NodeRegistry::new();
        let dev = Arc::new(CharDevice::new(DeviceConfig::default()));
        registry.register("mfchar", dev.clone()).unwrap();

        let mut file = registry.open("/dev/mfchar").unwrap();
        assert_eq!(file.write(b"Hello Kernel!").unwrap(), 13);
        assert_eq!(file.read(128).unwrap().as_ref(), b"Hello Kernel!");
        assert!(file.read(128).unwrap().is_empty());
        file.close().unwrap();
        assert_eq!(dev.open_handles(), 0);
    }

    #[test]
    fn dropping_open_file_releases_handle() {
        let registry = NodeRegistry::new();
        let dev = Arc::new(CharDevice::new(DeviceConfig::default()));
        registry.register("mfchar", dev.clone()).unwrap();

        {
            let _file = registry.open("/dev/mfchar").unwrap();
            assert_eq!(dev.open_handles(), 1);
        }
        assert_eq!(dev.open_handles(), 0);
    }
}
