use std::fmt;
use std::io;

use mfchar_device::{DeviceError, RegistrationError};

// Exit codes follow sysexits(3) where one applies.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const RESOURCE_EXHAUSTED: i32 = 71;
pub const BUSY: i32 = 75;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::InvalidInput => USAGE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn device_error(context: &str, err: DeviceError) -> CliError {
    let code = match &err {
        DeviceError::OutOfMemory { .. } => RESOURCE_EXHAUSTED,
        DeviceError::CopyFault(_) => DATA_INVALID,
        DeviceError::BadHandle(_) => INTERNAL,
        DeviceError::NoSuchNode(_) => USAGE,
        DeviceError::Registration(RegistrationError::Busy { .. }) => BUSY,
        DeviceError::Registration(RegistrationError::InvalidName(_)) => USAGE,
        DeviceError::Registration(_) => FAILURE,
    };
    CliError::new(code, format!("{context}: {err}"))
}
