#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

//! # Description
//!
//! Upload a large local file to S3 by splitting it into contiguous byte
//! ranges, writing every range to its own part object concurrently, and then
//! composing the part objects into one object equal to the original file.
//!
//! The part objects for the file `data.bin` split into `N` parts are written
//! to the keys `data.bin-0..bin` through `data.bin-{N-1}..bin`, and the
//! composed object to the key `data.bin`.
//!
//! # Examples
//!
//! ```rust
//! # async fn f() -> aws_compose_upload::error::Result<()> {
//! use aws_compose_upload::{MemoryClient, SourceFile, UploadBuilder};
//! use bytes::Bytes;
//! use std::sync::Arc;
//!
//! /// An in-memory store; use `SdkClient::defaults().await` for S3.
//! let store = Arc::new(MemoryClient::new());
//!
//! /// Any `ReadAt` can be the source; `SourceFile::open` opens a path.
//! let data = Bytes::from_static(b"ABCDEFGHI");
//! let source = SourceFile::from_reader(data, 9, "letters.txt", ".txt");
//!
//! let upload = UploadBuilder::new(store.clone())
//!     .bucket("a-bucket-us-east-1")
//!     .part_count(3)
//!     .build();
//!
//! let composed = upload.upload(&source).await?;
//! println!("created {} with entity tag {}", composed.uri, composed.etag);
//!
//! assert_eq!(store.get(&composed.uri).as_deref(), Some(&b"ABCDEFGHI"[..]));
//! #     Ok(())
//! # }
//! ```
use aws_sdk::operation::abort_multipart_upload as abort_upload;
use aws_sdk::operation::complete_multipart_upload as complete_upload;
use aws_sdk::operation::create_multipart_upload as create_upload;
use aws_sdk::operation::put_object;
use aws_sdk::operation::upload_part_copy as copy_part;

#[doc(hidden)]
pub extern crate aws_config;
#[doc(hidden)]
pub extern crate aws_sdk_s3 as aws_sdk;

#[macro_use]
mod trace;

pub mod buffer;
pub use buffer::{BufferPool, NoPool, SharedPool};

mod client;
pub use client::{
    DEFAULT_MAX_COMPOSE_SOURCES, MemoryClient, SdkClient, SendCompose, SendPutPart, SendRequest,
    UploadClient,
};

pub mod error;

pub mod plan;
pub use plan::{PartRange, PartitionPlan};

pub mod request {
    //! Request interface of the store.
    //!
    //! This module contains the trait [`RequestBuilder`] for customizing the
    //! SDK request objects sent by [`SdkClient`](crate::SdkClient), and the
    //! types appearing in request or response objects.
    pub use super::client::part::*;
    pub use super::client::request::*;
}

pub mod source;
pub use source::{ReadAt, SourceFile};

pub mod upload;
pub use upload::ComposeUpload;

pub mod uri;
#[doc(inline)]
pub use uri::ObjectUri;

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Number of parts a file is split into unless configured otherwise.
pub const DEFAULT_PART_COUNT: usize = 5;

/// Configures and builds a [`ComposeUpload`].
#[non_exhaustive]
pub struct UploadBuilder {
    client: UploadClient,
    bucket: uri::Bucket,
    part_count: usize,
    max_tasks: Option<usize>,
    pool: Arc<dyn BufferPool>,
    cancel: CancellationToken,
}

impl UploadBuilder {
    /// Create an `UploadBuilder` from a [`SendRequest`] client.
    pub fn new<C>(client: C) -> Self
    where
        C: SendRequest + 'static,
    {
        Self {
            client: UploadClient::new(client),
            bucket: uri::Bucket::default(),
            part_count: DEFAULT_PART_COUNT,
            max_tasks: None,
            pool: Arc::new(SharedPool::default()),
            cancel: CancellationToken::new(),
        }
    }

    /// Set the bucket to write the part objects and the composed object to.
    pub fn bucket<T: Into<uri::Bucket>>(self, bucket: T) -> Self {
        Self {
            bucket: bucket.into(),
            ..self
        }
    }

    /// Set the number of parts to split a file into.
    ///
    /// This is checked when an upload starts: it must be at least 1 and at
    /// most the number of sources the client can compose in one request.
    pub fn part_count(self, parts: usize) -> Self {
        Self {
            part_count: parts,
            ..self
        }
    }

    /// Set the maximum number of parts being uploaded at one time.
    ///
    /// By default every part is uploaded at once.  A limit of `0` is treated
    /// as `1`, so the parts are uploaded one after another.
    pub fn max_active_tasks(self, limit: usize) -> Self {
        Self {
            max_tasks: Some(limit),
            ..self
        }
    }

    /// Set the pool that read buffers are taken from.
    pub fn buffer_pool<P: BufferPool + 'static>(self, pool: P) -> Self {
        Self {
            pool: Arc::new(pool),
            ..self
        }
    }

    /// Cancel uploads when `token` is cancelled.
    ///
    /// In-flight part uploads stop and the upload returns a cancellation
    /// error.  This is also how a deadline can be imposed from outside.
    pub fn with_cancellation(self, token: CancellationToken) -> Self {
        Self {
            cancel: token,
            ..self
        }
    }

    /// Build a [`ComposeUpload`] from this configuration.
    pub fn build(self) -> ComposeUpload {
        ComposeUpload {
            client: self.client,
            bucket: self.bucket,
            part_count: self.part_count,
            max_tasks: self.max_tasks,
            pool: self.pool,
            cancel: self.cancel,
        }
    }
}

impl Debug for UploadBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadBuilder")
            .field("client", &self.client)
            .field("bucket", &self.bucket)
            .field("part_count", &self.part_count)
            .field("max_tasks", &self.max_tasks)
            .field("pool", &"BufferPool")
            .finish()
    }
}

/// Upload `source` to `bucket` in `parts` concurrently written parts and
/// compose them into one object.
pub async fn upload_and_compose<C, B>(
    client: C,
    source: &SourceFile,
    bucket: B,
    parts: usize,
) -> error::Result<request::ComposedObject>
where
    C: SendRequest + 'static,
    B: Into<uri::Bucket>,
{
    UploadBuilder::new(client)
        .bucket(bucket)
        .part_count(parts)
        .build()
        .upload(source)
        .await
}
