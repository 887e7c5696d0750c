use std::ffi::c_void;
use std::sync::Arc;

use mfchar_device::CharDevice;

/// Status code returned by every `mf_*` call.
///
/// `NoSuchNode`, `RegistrationError` and `Busy` are reserved: the current exports
/// drive a bare device without a registrar and never return them. They keep
/// their values so node-level exports can be added without renumbering.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MfResult {
    Ok = 0,
    InvalidArgument = 1,
    OutOfMemory = 2,
    CopyFault = 3,
    BadHandle = 4,
    /// Reserved; maps to `-ENODEV`.
    NoSuchNode = 5,
    /// Reserved; a node name already in use, maps to `-EEXIST`.
    RegistrationError = 6,
    /// Reserved; maps to `-EBUSY`.
    Busy = 7,
    Internal = 99,
}

impl MfResult {
    /// Result for a raw code received from C, if it names one.
    pub fn from_code(code: i32) -> Option<Self> {
        let result = match code {
            0 => Self::Ok,
            1 => Self::InvalidArgument,
            2 => Self::OutOfMemory,
            3 => Self::CopyFault,
            4 => Self::BadHandle,
            5 => Self::NoSuchNode,
            6 => Self::RegistrationError,
            7 => Self::Busy,
            99 => Self::Internal,
            _ => return None,
        };
        Some(result)
    }
}

#[allow(dead_code)]
pub const MF_OK: MfResult = MfResult::Ok;
#[allow(dead_code)]
pub const MF_ERR_INVALID_ARGUMENT: MfResult = MfResult::InvalidArgument;
#[allow(dead_code)]
pub const MF_ERR_OUT_OF_MEMORY: MfResult = MfResult::OutOfMemory;
#[allow(dead_code)]
pub const MF_ERR_COPY_FAULT: MfResult = MfResult::CopyFault;
#[allow(dead_code)]
pub const MF_ERR_BAD_HANDLE: MfResult = MfResult::BadHandle;
#[allow(dead_code)]
pub const MF_ERR_NO_SUCH_NODE: MfResult = MfResult::NoSuchNode;
#[allow(dead_code)]
pub const MF_ERR_REGISTRATION: MfResult = MfResult::RegistrationError;
#[allow(dead_code)]
pub const MF_ERR_BUSY: MfResult = MfResult::Busy;
#[allow(dead_code)]
pub const MF_ERR_INTERNAL: MfResult = MfResult::Internal;

/// Slot capacity exposed to C callers.
pub const MF_MAX_BUF_SIZE: usize = mfchar_slot::MAX_BUF_SIZE;

pub type MfDeviceHandle = *mut c_void;

pub(crate) struct DeviceHandle {
    pub(crate) device: Arc<CharDevice>,
}
