use mfchar_slot::{UserSink, UserSource};

use crate::error::Result;
use crate::handle::HandleId;

/// Entry points a registered device exposes to its callers.
///
/// The registration layer dispatches caller requests here; the device never
/// initiates these calls itself. Implementations must be safe to call from
/// many threads at once.
pub trait FileOperations: Send + Sync {
    /// Allocate state for a new session.
    fn open(&self) -> Result<HandleId>;

    /// Destroy the state owned by `handle`. The handle is invalid afterwards.
    fn release(&self, handle: HandleId) -> Result<()>;

    /// Stage the caller's bytes. Returns the number of bytes accepted.
    fn write(&self, handle: HandleId, src: &mut dyn UserSource) -> Result<usize>;

    /// Drain staged bytes into the caller's region. Returns the number delivered.
    fn read(&self, handle: HandleId, sink: &mut dyn UserSink) -> Result<usize>;
}
