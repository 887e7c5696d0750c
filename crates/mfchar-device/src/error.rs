use mfchar_slot::TransferError;

use crate::handle::HandleId;

/// Errors raised by the channel registration service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// Node names must be non-empty and must not contain `/`.
    #[error("invalid device name {0:?}")]
    InvalidName(String),

    /// Another device already owns this node name.
    #[error("device name {0:?} is already registered")]
    NameTaken(String),

    /// Every dynamic major number is in use.
    #[error("no free major numbers")]
    NoDeviceNumbers,

    /// The registration is unknown to this registrar.
    #[error("device {0:?} is not registered")]
    NotRegistered(String),

    /// Teardown was requested while handles are still open.
    #[error("device busy ({open} open handles)")]
    Busy { open: usize },
}

/// Errors that can occur in device operations.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// No handle state could be allocated.
    #[error("out of memory allocating handle state ({open} open, max {max})")]
    OutOfMemory { open: usize, max: usize },

    /// Caller memory could not be accessed during a write or read.
    #[error(transparent)]
    CopyFault(#[from] TransferError),

    /// The handle is not open on this device.
    #[error("bad file handle {0}")]
    BadHandle(HandleId),

    /// No device is published at the given path.
    #[error("no such device node: {0}")]
    NoSuchNode(String),

    /// Registration-level failure, propagated unchanged.
    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),
}

pub type Result<T> = std::result::Result<T, DeviceError>;
