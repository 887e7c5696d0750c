use std::ffi::CStr;
use std::os::raw::c_char;

use mfchar_slot::{BadAddress, UserSink, UserSource};

use crate::error;

/// Caller-owned readable region given as pointer + length.
///
/// A null pointer with a non-zero length is an unreachable region: the copy
/// faults instead of dereferencing it.
pub(crate) struct RawSource {
    ptr: *const u8,
    len: usize,
}

impl RawSource {
    /// # Safety
    /// If `ptr` is non-null it must be readable for `len` bytes for the
    /// lifetime of the value.
    pub(crate) unsafe fn new(ptr: *const u8, len: usize) -> Self {
        Self { ptr, len }
    }
}

impl UserSource for RawSource {
    fn len(&self) -> usize {
        self.len
    }

    fn read_into(&mut self, dst: &mut [u8]) -> Result<(), BadAddress> {
        if dst.is_empty() {
            return Ok(());
        }
        if self.ptr.is_null() || dst.len() > self.len {
            return Err(BadAddress);
        }
        // SAFETY: `ptr` is non-null and readable for `len >= dst.len()` bytes per `new`.
        let src = unsafe { std::slice::from_raw_parts(self.ptr, dst.len()) };
        dst.copy_from_slice(src);
        Ok(())
    }
}

/// Caller-owned writable region given as pointer + capacity.
pub(crate) struct RawSink {
    ptr: *mut u8,
    cap: usize,
}

impl RawSink {
    /// # Safety
    /// If `ptr` is non-null it must be writable for `cap` bytes for the
    /// lifetime of the value.
    pub(crate) unsafe fn new(ptr: *mut u8, cap: usize) -> Self {
        Self { ptr, cap }
    }
}

impl UserSink for RawSink {
    fn capacity(&self) -> usize {
        self.cap
    }

    fn write_from(&mut self, src: &[u8]) -> Result<(), BadAddress> {
        if src.is_empty() {
            return Ok(());
        }
        if self.ptr.is_null() || src.len() > self.cap {
            return Err(BadAddress);
        }
        // SAFETY: `ptr` is non-null and writable for `cap >= src.len()` bytes per `new`.
        let dst = unsafe { std::slice::from_raw_parts_mut(self.ptr, src.len()) };
        dst.copy_from_slice(src);
        Ok(())
    }
}

/// Convert a required C string argument into UTF-8 `&str`.
///
/// # Safety
/// `value` must be null or point to a valid NUL-terminated C string.
pub(crate) unsafe fn required_str_arg<'a>(value: *const c_char, name: &str) -> Option<&'a str> {
    if value.is_null() {
        let _ = error::set_invalid_argument(format!("{name} cannot be null"));
        return None;
    }

    let as_cstr = {
        // SAFETY: The caller guarantees `value` points to a valid NUL-terminated C string.
        unsafe { CStr::from_ptr(value) }
    };

    match as_cstr.to_str() {
        Ok(v) => Some(v),
        Err(_) => {
            let _ = error::set_invalid_argument(format!("{name} must be valid UTF-8"));
            None
        }
    }
}
