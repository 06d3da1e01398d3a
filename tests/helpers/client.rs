use aws_compose_upload::error::{Error, Result};
use aws_compose_upload::request::{ComposeRequest, ComposedObject, PutPartRequest, UploadedPart};
use aws_compose_upload::{MemoryClient, ObjectUri, SendRequest};

use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A `MemoryClient` that can be told to fail or slow down, and that records
/// the compose requests it receives.
#[derive(Debug, Default)]
pub struct TestClient {
    pub store: MemoryClient,
    fail_put: Option<usize>,
    drop_index: Option<usize>,
    fail_compose: bool,
    put_delay: Option<Duration>,
    index_delay: Option<(usize, Duration)>,
    completed: Mutex<Vec<usize>>,
    composed: Mutex<Vec<Vec<ObjectUri>>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl TestClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the put of partition `index`.
    pub fn fail_put(self, index: usize) -> Self {
        Self {
            fail_put: Some(index),
            ..self
        }
    }

    /// Fail the put of partition `index` with an error that doesn't name
    /// the partition, like a plain transport error.
    pub fn drop_connection(self, index: usize) -> Self {
        Self {
            drop_index: Some(index),
            ..self
        }
    }

    pub fn fail_compose(self) -> Self {
        Self {
            fail_compose: true,
            ..self
        }
    }

    /// Every put that isn't failed waits this long first.
    pub fn put_delay(self, delay: Duration) -> Self {
        Self {
            put_delay: Some(delay),
            ..self
        }
    }

    /// Partition `index` of `parts` waits `(parts - index) * step`, so later
    /// partitions finish first.
    pub fn reverse_completion(self, parts: usize, step: Duration) -> Self {
        Self {
            index_delay: Some((parts, step)),
            ..self
        }
    }

    pub fn with_max_compose_sources(self, limit: usize) -> Self {
        Self {
            store: self.store.with_max_compose_sources(limit),
            ..self
        }
    }

    /// The sources of every compose request received, in request order.
    pub fn compose_requests(&self) -> Vec<Vec<ObjectUri>> {
        self.composed.lock().unwrap().clone()
    }

    /// Partition indexes in the order their puts finished.
    pub fn completion_order(&self) -> Vec<usize> {
        self.completed.lock().unwrap().clone()
    }

    /// The most puts that were in flight at the same time.
    pub fn max_active_puts(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.store
            .get(&ObjectUri::from((bucket, key)))
            .map(|b| b.to_vec())
    }
}

impl SendRequest for TestClient {
    async fn send_put_part_request(&self, req: PutPartRequest) -> Result<UploadedPart> {
        if self.fail_put == Some(req.index()) {
            return Err(Error::part_write(
                req.index(),
                req.uri(),
                "injected write failure",
            ));
        }

        if self.drop_index == Some(req.index()) {
            return Err(Error::from_dyn(io::Error::other("connection reset")));
        }

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.put_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some((parts, step)) = self.index_delay {
            let remaining = parts.saturating_sub(req.index()) as u32;
            tokio::time::sleep(step * remaining).await;
        }
        let index = req.index();
        let res = self.store.send_put_part_request(req).await;
        self.completed.lock().unwrap().push(index);
        self.active.fetch_sub(1, Ordering::SeqCst);
        res
    }

    async fn send_compose_request(&self, req: ComposeRequest) -> Result<ComposedObject> {
        let sources = req.sources().uris().cloned().collect();
        self.composed.lock().unwrap().push(sources);
        if self.fail_compose {
            return Err(Error::compose(
                req.uri(),
                req.sources().count(),
                "injected compose failure",
            ));
        }
        self.store.send_compose_request(req).await
    }

    fn max_compose_sources(&self) -> usize {
        self.store.max_compose_sources()
    }
}
