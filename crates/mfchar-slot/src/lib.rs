//! Fixed-capacity byte slot with one-shot stage/drain semantics.
//!
//! This is the lowest layer of mfchar. A [`Slot`] holds at most
//! [`MAX_BUF_SIZE`] bytes written by a caller:
//! - [`stage`] copies a caller payload in, truncating silently at capacity
//! - [`drain`] copies the staged bytes out once and empties the slot
//!
//! Caller memory is reached only through the [`UserSource`] and [`UserSink`]
//! traits, so a faulting caller region surfaces as [`TransferError::CopyFault`].

pub mod error;
pub mod slot;
pub mod transfer;
pub mod user;

pub use error::{Direction, Result, TransferError};
pub use slot::{Slot, SlotState, MAX_BUF_SIZE};
pub use transfer::{drain, stage};
pub use user::{BadAddress, BoundedSink, SliceSink, UserSink, UserSource};
