//! A single-slot character device.
//!
//! mfchar publishes one device node. A caller opens it, writes up to 128 bytes,
//! and reads them back exactly once; every open handle has its own slot.
//!
//! # Crate Structure
//!
//! - [`slot`]: Handle state and the stage/drain transfer rules
//! - [`device`]: Lifecycle hooks, handle arena, node registration, module host
//!
//! ```
//! use std::sync::Arc;
//!
//! use mfchar::device::{DeviceConfig, Module, NodeRegistry};
//!
//! let registry = Arc::new(NodeRegistry::new());
//! let mut module = Module::init(registry.clone(), DeviceConfig::default()).unwrap();
//!
//! let mut file = registry.open("/dev/mfchar").unwrap();
//! assert_eq!(file.write(b"Hello Kernel!").unwrap(), 13);
//! assert_eq!(file.read(128).unwrap().as_ref(), b"Hello Kernel!");
//! assert!(file.read(128).unwrap().is_empty());
//! file.close().unwrap();
//!
//! module.exit().unwrap();
//! ```

/// Re-export slot types.
pub mod slot {
    pub use mfchar_slot::*;
}

/// Re-export device types.
pub mod device {
    pub use mfchar_device::*;
}
