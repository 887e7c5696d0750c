use std::fmt;

/// Which side of a copy touched caller memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Copying a caller payload into the slot (write).
    FromCaller,
    /// Copying staged bytes out to the caller (read).
    ToCaller,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::FromCaller => f.write_str("from caller"),
            Direction::ToCaller => f.write_str("to caller"),
        }
    }
}

/// Errors that can occur while moving bytes between a slot and caller memory.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    /// The caller-supplied region could not be accessed.
    #[error("copy fault {direction} ({len} bytes)")]
    CopyFault { direction: Direction, len: usize },
}

pub type Result<T> = std::result::Result<T, TransferError>;
