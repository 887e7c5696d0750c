//! Caller memory regions.
//!
//! A write hands the device a [`UserSource`]; a read hands it a [`UserSink`].
//! Implementations decide whether the region is reachable; a region that is
//! not reports [`BadAddress`] and the transfer fails with a copy fault.

use bytes::{Bytes, BytesMut};

/// The caller region could not be accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadAddress;

/// A readable caller region.
pub trait UserSource {
    /// Number of bytes the caller offers.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the first `dst.len()` bytes of the region into `dst`.
    ///
    /// `dst.len()` never exceeds [`UserSource::len`].
    fn read_into(&mut self, dst: &mut [u8]) -> Result<(), BadAddress>;
}

/// A writable caller region.
pub trait UserSink {
    /// Number of bytes the caller is prepared to receive.
    fn capacity(&self) -> usize;

    /// Copy `src` into the start of the region.
    ///
    /// `src.len()` never exceeds [`UserSink::capacity`].
    fn write_from(&mut self, src: &[u8]) -> Result<(), BadAddress>;
}

impl UserSource for &[u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn read_into(&mut self, dst: &mut [u8]) -> Result<(), BadAddress> {
        let src = self.get(..dst.len()).ok_or(BadAddress)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

/// Sink over a caller-owned mutable slice.
#[derive(Debug)]
pub struct SliceSink<'a> {
    buf: &'a mut [u8],
    filled: usize,
}

impl<'a> SliceSink<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, filled: 0 }
    }

    /// Bytes written by the last successful copy.
    pub fn filled(&self) -> &[u8] {
        &self.buf[..self.filled]
    }
}

impl UserSink for SliceSink<'_> {
    fn capacity(&self) -> usize {
        self.buf.len()
    }

    fn write_from(&mut self, src: &[u8]) -> Result<(), BadAddress> {
        let dst = self.buf.get_mut(..src.len()).ok_or(BadAddress)?;
        dst.copy_from_slice(src);
        self.filled = src.len();
        Ok(())
    }
}

/// Sink that collects up to `limit` bytes into an owned buffer.
#[derive(Debug)]
pub struct BoundedSink {
    limit: usize,
    buf: BytesMut,
}

impl BoundedSink {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            buf: BytesMut::new(),
        }
    }

    /// Consume the sink and return the collected bytes.
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

impl UserSink for BoundedSink {
    fn capacity(&self) -> usize {
        self.limit
    }

    fn write_from(&mut self, src: &[u8]) -> Result<(), BadAddress> {
        if src.len() > self.limit {
            return Err(BadAddress);
        }
        self.buf.clear();
        self.buf.extend_from_slice(src);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_source_copies_prefix() {
        let mut src: &[u8] = b"abcdef";
        let mut dst = [0u8; 3];
        src.read_into(&mut dst).unwrap();
        assert_eq!(&dst, b"abc");
        assert_eq!(UserSource::len(&src), 6);
    }

    #[test]
    fn slice_sink_tracks_filled_prefix() {
        let mut backing = [0xFFu8; 8];
        let mut sink = SliceSink::new(&mut backing);
        assert_eq!(sink.capacity(), 8);
        sink.write_from(b"hi").unwrap();
        assert_eq!(sink.filled(), b"hi");
        assert_eq!(&backing[..3], &[b'h', b'i', 0xFF]);
    }

    #[test]
    fn slice_sink_rejects_overflow() {
        let mut backing = [0u8; 2];
        let mut sink = SliceSink::new(&mut backing);
        assert_eq!(sink.write_from(b"abc"), Err(BadAddress));
    }

    #[test]
    fn bounded_sink_freezes_into_bytes() {
        let mut sink = BoundedSink::new(4);
        sink.write_from(b"data").unwrap();
        assert_eq!(sink.into_bytes().as_ref(), b"data");
    }
}
