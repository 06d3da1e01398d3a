//! This module contains `SendRequest`, which defines the store operations
//! needed to upload parts and compose them.
use self::inner::{BoxedSendRequest, SendRequestInner};
use self::part::{ComposedObject, UploadedPart};
use self::request::{ComposeRequest, PutPartRequest};
use crate::error::Result;

use futures::future::Future;
use std::fmt::{self, Debug, Formatter};
use std::ops::Deref;
use std::sync::Arc;

mod future;
pub use future::{SendCompose, SendPutPart};

mod inner;

mod memory;
pub use memory::MemoryClient;

pub mod part;
pub mod request;

mod sdk;
pub use sdk::SdkClient;

/// The number of sources a compose request may name unless the client says
/// otherwise.
pub const DEFAULT_MAX_COMPOSE_SOURCES: usize = 32;

/// `SendRequest` represents the remote operations of an upload: writing one
/// part object, and composing part objects into one.
pub trait SendRequest: Send + Sync {
    /// Send a request to create the object for one part, returning the
    /// [`UploadedPart`] that identifies it.
    fn send_put_part_request(
        &self,
        req: PutPartRequest,
    ) -> impl Future<Output = Result<UploadedPart>> + Send;

    /// Send a request to concatenate the source objects, in the order given,
    /// into the target object.
    fn send_compose_request(
        &self,
        req: ComposeRequest,
    ) -> impl Future<Output = Result<ComposedObject>> + Send;

    /// The most source objects a single compose request can name.
    fn max_compose_sources(&self) -> usize {
        DEFAULT_MAX_COMPOSE_SOURCES
    }
}

impl<D, T> SendRequest for T
where
    D: SendRequest,
    T: Deref<Target = D> + Send + Sync,
{
    async fn send_put_part_request(&self, req: PutPartRequest) -> Result<UploadedPart> {
        self.deref().send_put_part_request(req).await
    }

    async fn send_compose_request(&self, req: ComposeRequest) -> Result<ComposedObject> {
        self.deref().send_compose_request(req).await
    }

    fn max_compose_sources(&self) -> usize {
        self.deref().max_compose_sources()
    }
}

/// `UploadClient` holds a type that can implement the interface of
/// [`SendRequest`].
///
/// It is cheap to clone and can be moved into the task uploading each part.
#[derive(Clone)]
pub struct UploadClient {
    pub(crate) inner: Arc<dyn BoxedSendRequest + Send + Sync>,
}

impl UploadClient {
    /// Create a new `UploadClient`.
    pub fn new<C>(client: C) -> Self
    where
        C: SendRequest + Send + Sync + 'static,
    {
        let inner = SendRequestInner::new(client);
        Self {
            inner: Arc::new(inner),
        }
    }

    /// The most source objects a single compose request can name.
    pub fn max_compose_sources(&self) -> usize {
        self.inner.max_compose_sources()
    }
}

impl Debug for UploadClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadClient")
            .field("inner", &"SendRequest")
            .field("max_compose_sources", &self.max_compose_sources())
            .finish()
    }
}
