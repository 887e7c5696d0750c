use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;

use mfchar_device::{DeviceError, RegistrationError};

use crate::types::MfResult;

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::default());
}

pub(crate) fn clear_error_state() {
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::default();
    });
}

pub(crate) fn set_error_message(message: impl Into<String>) {
    // Interior NULs would truncate the message on the C side.
    let bytes = message.into().replace('\0', "?").into_bytes();
    let text = CString::new(bytes).unwrap_or_default();
    LAST_ERROR.with(|state| *state.borrow_mut() = text);
}

pub(crate) fn set_invalid_argument(message: impl Into<String>) -> MfResult {
    set_error_message(message);
    MfResult::InvalidArgument
}

pub(crate) fn set_panic_error() {
    set_error_message("panic across FFI boundary");
}

pub(crate) fn map_device_error(err: &DeviceError) -> MfResult {
    set_error_message(err.to_string());
    match err {
        DeviceError::OutOfMemory { .. } => MfResult::OutOfMemory,
        DeviceError::CopyFault(_) => MfResult::CopyFault,
        DeviceError::BadHandle(_) => MfResult::BadHandle,
        DeviceError::NoSuchNode(_) => MfResult::NoSuchNode,
        DeviceError::Registration(RegistrationError::InvalidName(_)) => MfResult::InvalidArgument,
        DeviceError::Registration(RegistrationError::NameTaken(_)) => MfResult::RegistrationError,
        DeviceError::Registration(RegistrationError::NotRegistered(_)) => MfResult::NoSuchNode,
        // The kernel reports an exhausted major range as -EBUSY.
        DeviceError::Registration(
            RegistrationError::NoDeviceNumbers | RegistrationError::Busy { .. },
        ) => MfResult::Busy,
    }
}

/// Negative errno equivalent of a result code, as a kernel handler would return it.
pub(crate) fn errno_for(result: MfResult) -> i32 {
    match result {
        MfResult::Ok => 0,
        MfResult::InvalidArgument => -libc::EINVAL,
        MfResult::OutOfMemory => -libc::ENOMEM,
        MfResult::CopyFault => -libc::EFAULT,
        MfResult::BadHandle => -libc::EBADF,
        MfResult::NoSuchNode => -libc::ENODEV,
        MfResult::RegistrationError => -libc::EEXIST,
        MfResult::Busy => -libc::EBUSY,
        MfResult::Internal => -libc::EIO,
    }
}

pub(crate) fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|state| state.borrow().as_ptr())
}
