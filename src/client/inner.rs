use super::SendRequest;
use super::part::{ComposedObject, UploadedPart};
use super::request::{ComposeRequest, PutPartRequest};
use crate::error::Result;

use futures::future::BoxFuture;

/// Object-safe `SendRequest`.
pub(crate) trait BoxedSendRequest: Send + Sync + 'static {
    /// Write one part object.
    fn send_put_part(&self, req: PutPartRequest) -> BoxFuture<'_, Result<UploadedPart>>;

    /// Compose part objects.
    fn send_compose(&self, req: ComposeRequest) -> BoxFuture<'_, Result<ComposedObject>>;

    fn max_compose_sources(&self) -> usize;
}

/// Implements `BoxedSendRequest` for the public `SendRequest`.
pub(super) struct SendRequestInner<T>(T);

impl<T: SendRequest> SendRequestInner<T> {
    pub(super) fn new(inner: T) -> Self {
        Self(inner)
    }
}

impl<T: SendRequest + 'static> BoxedSendRequest for SendRequestInner<T> {
    fn send_put_part(&self, req: PutPartRequest) -> BoxFuture<'_, Result<UploadedPart>> {
        Box::pin(self.0.send_put_part_request(req))
    }

    fn send_compose(&self, req: ComposeRequest) -> BoxFuture<'_, Result<ComposedObject>> {
        Box::pin(self.0.send_compose_request(req))
    }

    fn max_compose_sources(&self) -> usize {
        self.0.max_compose_sources()
    }
}
