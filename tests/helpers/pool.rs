use aws_compose_upload::BufferPool;
use bytes::BytesMut;
use std::sync::Mutex;

/// A `BufferPool` that allocates every time and records the lengths asked
/// for.
#[derive(Debug, Default)]
pub struct CountingPool {
    acquired: Mutex<Vec<usize>>,
    released: Mutex<usize>,
}

impl CountingPool {
    /// Lengths passed to `acquire`, sorted.
    pub fn acquired(&self) -> Vec<usize> {
        let mut lens = self.acquired.lock().unwrap().clone();
        lens.sort_unstable();
        lens
    }

    pub fn released(&self) -> usize {
        *self.released.lock().unwrap()
    }
}

impl BufferPool for CountingPool {
    fn acquire(&self, len: usize) -> BytesMut {
        self.acquired.lock().unwrap().push(len);
        BytesMut::zeroed(len)
    }

    fn release(&self, _: BytesMut) {
        *self.released.lock().unwrap() += 1;
    }
}
