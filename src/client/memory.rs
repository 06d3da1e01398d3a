use super::part::{ComposedObject, EntityTag, UploadedPart};
use super::request::{ComposeRequest, PutPartRequest};
use super::{DEFAULT_MAX_COMPOSE_SOURCES, SendRequest};
use crate::error::{Error, Result};
use crate::uri::ObjectUri;

use bytes::{Bytes, BytesMut};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

/// A client that keeps objects in memory.
///
/// Composing concatenates the source objects in request order.  Useful for
/// testing and for trying out an upload without a bucket.
#[derive(Debug)]
pub struct MemoryClient {
    objects: RwLock<BTreeMap<ObjectUri, Bytes>>,
    max_sources: usize,
    puts: AtomicUsize,
    composes: AtomicUsize,
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryClient {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            max_sources: DEFAULT_MAX_COMPOSE_SOURCES,
            puts: AtomicUsize::new(0),
            composes: AtomicUsize::new(0),
        }
    }

    /// Set the most sources a compose request may name.
    pub fn with_max_compose_sources(self, limit: usize) -> Self {
        Self {
            max_sources: limit,
            ..self
        }
    }

    /// The contents of the object at `uri`.
    pub fn get(&self, uri: &ObjectUri) -> Option<Bytes> {
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        objects.get(uri).cloned()
    }

    /// The URIs of all stored objects.
    pub fn uris(&self) -> Vec<ObjectUri> {
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        objects.keys().cloned().collect()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        objects.len()
    }

    /// Returns true if no object is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of part objects written so far.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Number of compose requests received so far.
    pub fn compose_count(&self) -> usize {
        self.composes.load(Ordering::SeqCst)
    }

    fn etag(data: &[u8]) -> EntityTag {
        // FNV-1a; only needs to differ between different contents in tests.
        let hash = data.iter().fold(0xcbf29ce484222325u64, |h, b| {
            (h ^ u64::from(*b)).wrapping_mul(0x100000001b3)
        });
        EntityTag::from(format!("{hash:016x}"))
    }
}

impl SendRequest for MemoryClient {
    async fn send_put_part_request(&self, req: PutPartRequest) -> Result<UploadedPart> {
        req.validate()?;
        let PutPartRequest { index, uri, body } = req;
        let etag = Self::etag(&body);
        let size = body.size() as u64;

        let mut objects = self.objects.write().unwrap_or_else(PoisonError::into_inner);
        objects.insert(uri.clone(), body.into_bytes());
        self.puts.fetch_add(1, Ordering::SeqCst);

        Ok(UploadedPart::new(index, uri, etag, size))
    }

    async fn send_compose_request(&self, req: ComposeRequest) -> Result<ComposedObject> {
        req.validate()?;
        self.composes.fetch_add(1, Ordering::SeqCst);
        let uri = req.uri();
        let n = req.sources().count();
        if n > self.max_sources {
            return Err(Error::compose(uri, n, "too many source objects"));
        }

        let mut objects = self.objects.write().unwrap_or_else(PoisonError::into_inner);
        let mut composed = BytesMut::with_capacity(req.sources().size() as usize);
        for source in req.sources().uris() {
            let data = objects
                .get(source)
                .ok_or_else(|| Error::compose(uri, n, format!("source object {source} not found")))?;
            composed.extend_from_slice(data);
        }

        let composed = composed.freeze();
        let etag = Self::etag(&composed);
        let size = composed.len() as u64;
        objects.insert(uri.clone(), composed);

        Ok(ComposedObject::new(uri.clone(), etag, n, size))
    }

    fn max_compose_sources(&self) -> usize {
        self.max_sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::part::{PartBody, UploadedParts};
    use crate::error::ErrorKind;

    async fn put(client: &MemoryClient, index: usize, key: &str, data: &[u8]) -> UploadedPart {
        let req = PutPartRequest::new(index, ("b", key).into(), PartBody::copy_from_slice(data));
        client.send_put_part_request(req).await.unwrap()
    }

    #[tokio::test]
    async fn compose_concatenates_in_order() {
        let client = MemoryClient::new();
        let second = put(&client, 1, "f-1.txt", b"DEF").await;
        let first = put(&client, 0, "f-0.txt", b"ABC").await;

        let req = ComposeRequest::new(("b", "f").into(), UploadedParts::new(vec![second, first]));
        let composed = client.send_compose_request(req).await.unwrap();

        assert_eq!(composed.size, 6);
        assert_eq!(client.get(&("b", "f").into()).unwrap(), &b"ABCDEF"[..]);
        assert_eq!(client.put_count(), 2);
        assert_eq!(client.compose_count(), 1);
        assert_eq!(client.len(), 3);
    }

    #[tokio::test]
    async fn compose_missing_source_fails() {
        let client = MemoryClient::new();
        let part = put(&client, 0, "f-0.txt", b"ABC").await;
        let ghost = UploadedPart::new(1, ("b", "f-1.txt").into(), EntityTag::from("x".to_string()), 3);

        let req = ComposeRequest::new(("b", "f").into(), UploadedParts::new(vec![part, ghost]));
        let err = client.send_compose_request(req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Compose);
        assert!(client.get(&("b", "f").into()).is_none());
    }

    #[tokio::test]
    async fn compose_over_limit_fails() {
        let client = MemoryClient::new().with_max_compose_sources(1);
        let a = put(&client, 0, "f-0", b"A").await;
        let b = put(&client, 1, "f-1", b"B").await;

        let req = ComposeRequest::new(("b", "f").into(), UploadedParts::new(vec![a, b]));
        let err = client.send_compose_request(req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Compose);
    }
}
