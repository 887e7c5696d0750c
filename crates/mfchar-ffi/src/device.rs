use std::os::raw::c_char;
use std::sync::Arc;

use mfchar_device::{CharDevice, DeviceConfig, FileOperations, HandleId};

use crate::error;
use crate::types::{DeviceHandle, MfDeviceHandle, MfResult};
use crate::user::{required_str_arg, RawSink, RawSource};

fn with_device(handle: MfDeviceHandle, f: impl FnOnce(&CharDevice) -> MfResult) -> MfResult {
    if handle.is_null() {
        return error::set_invalid_argument("device handle cannot be null");
    }

    let device_handle = {
        // SAFETY: Pointer validity is guaranteed by the caller.
        unsafe { &*(handle as *const DeviceHandle) }
    };

    f(&device_handle.device)
}

fn store<T>(out: *mut T, value: T, name: &str) -> MfResult {
    if out.is_null() {
        return error::set_invalid_argument(format!("{name} cannot be null"));
    }
    // SAFETY: Pointer validity is guaranteed by the caller.
    unsafe {
        *out = value;
    }
    MfResult::Ok
}

/// Create a device named `name` with default configuration.
///
/// Returns null on failure; see `mf_last_error`.
///
/// # Safety
/// `name` must be a non-null pointer to a valid UTF-8, NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn mf_device_create(name: *const c_char) -> MfDeviceHandle {
    crate::ffi_boundary(std::ptr::null_mut(), || {
        error::clear_error_state();

        let name = {
            // SAFETY: We validate null and UTF-8 in helper.
            match unsafe { required_str_arg(name, "name") } {
                Some(v) => v,
                None => return std::ptr::null_mut(),
            }
        };
        if name.is_empty() || name.contains('/') {
            let _ = error::set_invalid_argument(format!("invalid device name {name:?}"));
            return std::ptr::null_mut();
        }

        let device = Arc::new(CharDevice::new(DeviceConfig::new(name)));
        Box::into_raw(Box::new(DeviceHandle { device })) as MfDeviceHandle
    })
}

/// Free a device handle.
///
/// # Safety
/// `device` must be null or a handle previously returned by `mf_device_create`.
#[no_mangle]
pub unsafe extern "C" fn mf_device_free(device: MfDeviceHandle) {
    crate::ffi_boundary((), || {
        if device.is_null() {
            return;
        }

        // SAFETY: Caller guarantees this handle was allocated by mf_device_create.
        unsafe {
            drop(Box::from_raw(device as *mut DeviceHandle));
        }
    });
}

/// Open a session and store its file handle in `out_fh`.
///
/// # Safety
/// `device` must be a valid device handle; `out_fh` must be writable.
#[no_mangle]
pub unsafe extern "C" fn mf_open(device: MfDeviceHandle, out_fh: *mut u64) -> MfResult {
    crate::ffi_boundary(MfResult::Internal, || {
        error::clear_error_state();

        if out_fh.is_null() && !device.is_null() {
            return error::set_invalid_argument("out_fh cannot be null");
        }

        with_device(device, |device| match device.open() {
            Ok(fh) => store(out_fh, fh.as_raw(), "out_fh"),
            Err(err) => error::map_device_error(&err),
        })
    })
}

/// Release a session.
///
/// # Safety
/// `device` must be a valid device handle.
#[no_mangle]
pub unsafe extern "C" fn mf_release(device: MfDeviceHandle, fh: u64) -> MfResult {
    crate::ffi_boundary(MfResult::Internal, || {
        error::clear_error_state();

        with_device(device, |device| match device.release(HandleId::from_raw(fh)) {
            Ok(()) => MfResult::Ok,
            Err(err) => error::map_device_error(&err),
        })
    })
}

/// Write `len` bytes from `data`; at most `MF_MAX_BUF_SIZE` are accepted.
///
/// A null `data` with `len > 0` fails with `CopyFault`.
///
/// # Safety
/// `device` must be a valid device handle. If `data` is non-null it must be readable for `len`
/// bytes. `out_written` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn mf_write(
    device: MfDeviceHandle,
    fh: u64,
    data: *const u8,
    len: usize,
    out_written: *mut usize,
) -> MfResult {
    crate::ffi_boundary(MfResult::Internal, || {
        error::clear_error_state();

        with_device(device, |device| {
            // SAFETY: Readability of non-null `data` for `len` bytes is guaranteed by the caller.
            let mut src = unsafe { RawSource::new(data, len) };
            match device.write(HandleId::from_raw(fh), &mut src) {
                Ok(_) if out_written.is_null() => MfResult::Ok,
                Ok(written) => store(out_written, written, "out_written"),
                Err(err) => error::map_device_error(&err),
            }
        })
    })
}

/// Read up to `cap` staged bytes into `buf`.
///
/// # Safety
/// `device` must be a valid device handle. If `buf` is non-null it must be writable for `cap`
/// bytes. `out_read` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn mf_read(
    device: MfDeviceHandle,
    fh: u64,
    buf: *mut u8,
    cap: usize,
    out_read: *mut usize,
) -> MfResult {
    crate::ffi_boundary(MfResult::Internal, || {
        error::clear_error_state();

        with_device(device, |device| {
            // SAFETY: Writability of non-null `buf` for `cap` bytes is guaranteed by the caller.
            let mut sink = unsafe { RawSink::new(buf, cap) };
            match device.read(HandleId::from_raw(fh), &mut sink) {
                Ok(_) if out_read.is_null() => MfResult::Ok,
                Ok(read) => store(out_read, read, "out_read"),
                Err(err) => error::map_device_error(&err),
            }
        })
    })
}
