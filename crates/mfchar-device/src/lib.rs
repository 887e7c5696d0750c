//! Character-device lifecycle, handle arena and node registration.
//!
//! Builds on [`mfchar_slot`]: every open handle owns a slot in a
//! [`HandleTable`], and [`CharDevice`] dispatches open/write/read/release
//! through the [`FileOperations`] trait. [`NodeRegistry`] publishes devices at
//! `/dev/<name>` and [`Module`] drives load/unload.

pub mod config;
pub mod device;
pub mod error;
pub mod handle;
pub mod module;
pub mod ops;
pub mod registry;

pub use config::{BufferMode, DeviceConfig, DEFAULT_DEVICE_NAME, DEFAULT_MAX_OPEN_HANDLES};
pub use device::CharDevice;
pub use error::{DeviceError, RegistrationError, Result};
pub use handle::{HandleId, HandleTable};
pub use module::Module;
pub use ops::FileOperations;
pub use registry::{DevNum, NodeRegistry, OpenFile, Registrar, Registration};
