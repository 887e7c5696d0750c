use tracing::{debug, warn};

use crate::error::{Direction, Result, TransferError};
use crate::slot::{Slot, MAX_BUF_SIZE};
use crate::user::{UserSink, UserSource};

/// Stage a caller payload into `slot`.
///
/// Accepts `min(src.len(), MAX_BUF_SIZE)` bytes and overwrites whatever was
/// staged before; bytes beyond capacity are dropped without an error.
/// Returns the accepted count.
///
/// On a copy fault the slot is left empty: a partially copied payload is never
/// visible to a later drain.
pub fn stage<S: UserSource + ?Sized>(slot: &mut Slot, src: &mut S) -> Result<usize> {
    let requested = src.len();
    let accepted = requested.min(MAX_BUF_SIZE);

    if src.read_into(&mut slot.buffer[..accepted]).is_err() {
        slot.valid_length = 0;
        warn!(requested, "copy fault while staging payload");
        return Err(TransferError::CopyFault {
            direction: Direction::FromCaller,
            len: accepted,
        });
    }

    slot.valid_length = accepted;
    if accepted < requested {
        debug!(requested, accepted, "payload truncated to slot capacity");
    } else {
        debug!(accepted, "payload staged");
    }
    Ok(accepted)
}

/// Drain staged bytes from `slot` into `sink`.
///
/// Delivers `min(sink.capacity(), slot.len())` bytes and then empties the slot,
/// even when the sink was too small for everything staged. Draining an empty
/// slot delivers 0 bytes. On a copy fault the staged length is unchanged.
pub fn drain<K: UserSink + ?Sized>(slot: &mut Slot, sink: &mut K) -> Result<usize> {
    let capacity = sink.capacity();
    let deliver = capacity.min(slot.valid_length);

    if sink.write_from(&slot.buffer[..deliver]).is_err() {
        warn!(deliver, "copy fault while draining slot");
        return Err(TransferError::CopyFault {
            direction: Direction::ToCaller,
            len: deliver,
        });
    }

    let discarded = slot.valid_length - deliver;
    slot.valid_length = 0;
    debug!(deliver, discarded, "slot drained");
    Ok(deliver)
}
