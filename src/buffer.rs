//! Reusable read buffers for part uploads.
//!
//! Every non-final partition of a plan has the same length, so the buffers the
//! part uploads read into can be handed from one task to the next instead of
//! allocated per part.  This is purely an allocation optimization: [`NoPool`]
//! behaves identically apart from allocating every time.
use bytes::BytesMut;
use std::fmt::{self, Debug, Formatter};
use std::sync::{Arc, Mutex};

/// A source of byte buffers for reading partitions into.
pub trait BufferPool: Send + Sync {
    /// Returns a buffer of exactly `len` bytes.
    ///
    /// The contents are unspecified and must be written before they are read.
    fn acquire(&self, len: usize) -> BytesMut;

    /// Give a buffer back once its bytes have been copied out.
    fn release(&self, buf: BytesMut);
}

impl<P: BufferPool + ?Sized> BufferPool for Arc<P> {
    fn acquire(&self, len: usize) -> BytesMut {
        (**self).acquire(len)
    }

    fn release(&self, buf: BytesMut) {
        (**self).release(buf)
    }
}

/// A `BufferPool` that allocates a new buffer on every `acquire`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPool;

impl BufferPool for NoPool {
    fn acquire(&self, len: usize) -> BytesMut {
        BytesMut::zeroed(len)
    }

    fn release(&self, _: BytesMut) {}
}

/// A `BufferPool` that keeps released buffers for reuse.
///
/// Reuse is opportunistic: when no idle buffer is large enough, a new one is
/// allocated.  At most `max_idle` buffers are retained.
pub struct SharedPool {
    idle: Mutex<Vec<BytesMut>>,
    max_idle: usize,
}

impl SharedPool {
    /// Create an empty pool retaining at most `max_idle` buffers.
    pub fn new(max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(max_idle)),
            max_idle,
        }
    }

    /// Number of buffers currently waiting to be reused.
    pub fn idle(&self) -> usize {
        self.idle.lock().map_or(0, |idle| idle.len())
    }
}

impl Default for SharedPool {
    fn default() -> Self {
        Self::new(32)
    }
}

impl BufferPool for SharedPool {
    fn acquire(&self, len: usize) -> BytesMut {
        let reused = self.idle.lock().ok().and_then(|mut idle| {
            let pos = idle.iter().position(|b| b.capacity() >= len)?;
            Some(idle.swap_remove(pos))
        });

        match reused {
            Some(mut buf) => {
                // `release` cleared the buffer, so this zero-fills all of it
                // within the existing allocation.
                buf.resize(len, 0);
                buf
            }
            None => BytesMut::zeroed(len),
        }
    }

    fn release(&self, mut buf: BytesMut) {
        // A buffer that was split or frozen elsewhere can't be reclaimed
        // in full; `clear` keeps the allocation for the next `acquire`.
        buf.clear();
        if let Ok(mut idle) = self.idle.lock() {
            if idle.len() < self.max_idle {
                idle.push(buf);
            }
        }
    }
}

impl Debug for SharedPool {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedPool")
            .field("idle", &self.idle())
            .field("max_idle", &self.max_idle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_has_requested_len() {
        let pool = SharedPool::default();
        assert_eq!(pool.acquire(16).len(), 16);
        assert_eq!(NoPool.acquire(16).len(), 16);
    }

    #[test]
    fn released_buffer_is_reused() {
        let pool = SharedPool::default();
        let buf = pool.acquire(64);
        let ptr = buf.as_ptr();
        pool.release(buf);
        assert_eq!(pool.idle(), 1);

        let again = pool.acquire(64);
        assert_eq!(again.as_ptr(), ptr);
        assert_eq!(again.len(), 64);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn too_small_buffer_not_reused() {
        let pool = SharedPool::default();
        pool.release(BytesMut::zeroed(8));
        let buf = pool.acquire(64);
        assert_eq!(buf.len(), 64);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn idle_is_bounded() {
        let pool = SharedPool::new(2);
        for _ in 0..4 {
            pool.release(BytesMut::zeroed(4));
        }
        assert_eq!(pool.idle(), 2);
    }

    #[test]
    fn reused_buffer_is_zeroed() {
        let pool = SharedPool::default();
        let mut buf = pool.acquire(8);
        buf.copy_from_slice(b"ABCDEFGH");
        pool.release(buf);

        let again = pool.acquire(6);
        assert_eq!(&again[..], &[0u8; 6]);
    }
}
