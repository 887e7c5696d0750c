//! mfchar-ffi: C-ABI exports for the mfchar device.

mod device;
mod error;
mod types;
mod user;

use std::panic::AssertUnwindSafe;

pub use device::{mf_device_create, mf_device_free, mf_open, mf_read, mf_release, mf_write};
pub use types::{
    MfDeviceHandle, MfResult, MF_ERR_BAD_HANDLE, MF_ERR_BUSY, MF_ERR_COPY_FAULT,
    MF_ERR_INTERNAL, MF_ERR_INVALID_ARGUMENT, MF_ERR_NO_SUCH_NODE, MF_ERR_OUT_OF_MEMORY,
    MF_ERR_REGISTRATION, MF_MAX_BUF_SIZE, MF_OK,
};

fn ffi_boundary<T>(on_panic: T, f: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error::set_panic_error();
            tracing::error!("panic caught at FFI boundary");
            on_panic
        }
    }
}

#[no_mangle]
pub extern "C" fn mf_last_error() -> *const std::os::raw::c_char {
    ffi_boundary(std::ptr::null(), error::last_error_ptr)
}

/// Negative errno for a result code (`0` for `MF_OK`), e.g. `-EFAULT` for a copy fault.
///
/// Unknown codes map to `-EINVAL`.
#[no_mangle]
pub extern "C" fn mf_result_errno(code: std::os::raw::c_int) -> std::os::raw::c_int {
    ffi_boundary(-libc::EIO, || match MfResult::from_code(code) {
        Some(result) => error::errno_for(result),
        None => -libc::EINVAL,
    })
}
