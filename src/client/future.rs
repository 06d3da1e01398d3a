use super::UploadClient;
use super::part::{ComposedObject, UploadedPart};
use super::request::{ComposeRequest, PutPartRequest};
use crate::error::Result;

use futures::future::BoxFuture;
use std::fmt::{self, Debug, Formatter};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Future representing a request to write one part object.
pub struct SendPutPart(BoxFuture<'static, Result<UploadedPart>>);

impl SendPutPart {
    /// Create the part upload request to send.
    pub fn new(client: &UploadClient, req: PutPartRequest) -> Self {
        let inner = client.inner.clone();
        Self(Box::pin(async move { inner.send_put_part(req).await }))
    }
}

impl Future for SendPutPart {
    type Output = Result<UploadedPart>;
    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.0.as_mut().poll(cx)
    }
}

impl Debug for SendPutPart {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SendPutPart")
            .field(&"Future<Output = Result<UploadedPart>>")
            .finish()
    }
}

/// Future representing a request to compose uploaded parts.
pub struct SendCompose(BoxFuture<'static, Result<ComposedObject>>);

impl SendCompose {
    /// Create the compose request to send.
    pub fn new(client: &UploadClient, req: ComposeRequest) -> Self {
        let inner = client.inner.clone();
        Self(Box::pin(async move { inner.send_compose(req).await }))
    }
}

impl Future for SendCompose {
    type Output = Result<ComposedObject>;
    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.0.as_mut().poll(cx)
    }
}

impl Debug for SendCompose {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SendCompose")
            .field(&"Future<Output = Result<ComposedObject>>")
            .finish()
    }
}
