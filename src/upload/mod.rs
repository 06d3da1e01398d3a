//! The upload-and-compose operation.
//!
//! An upload runs in three phases:
//!
//! 1. Plan: split the file into [`ComposeUpload::part_count`] contiguous
//!    ranges with [`PartitionPlan`].  Nothing is sent before this succeeds.
//! 2. Upload: write every range to its own part object, all concurrently.
//!    The first failure cancels the rest and ends the operation.
//! 3. Compose: concatenate the part objects in partition order into one
//!    object named after the source file.
//!
//! Part objects are not deleted, neither after a successful compose nor after
//! a failure.  A failed upload can leave up to `part_count` part objects in
//! the bucket, and running the upload again writes all of them again.
use crate::buffer::BufferPool;
use crate::client::UploadClient;
use crate::client::part::{ComposedObject, UploadedParts};
use crate::error::{ErrorRepr, Result};
use crate::plan::PartitionPlan;
use crate::source::SourceFile;
use crate::uri::Bucket;

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

mod compose;

mod coordinator;
use self::coordinator::Coordinator;

mod part;

/// Uploads local files as concurrently written parts composed into one
/// object.
///
/// Build with [`UploadBuilder`](crate::UploadBuilder).
#[derive(Clone)]
pub struct ComposeUpload {
    pub(crate) client: UploadClient,
    pub(crate) bucket: Bucket,
    pub(crate) part_count: usize,
    pub(crate) max_tasks: Option<usize>,
    pub(crate) pool: Arc<dyn BufferPool>,
    pub(crate) cancel: CancellationToken,
}

impl ComposeUpload {
    /// The bucket the part objects and the composed object are written to.
    pub fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    /// The number of parts each file is split into.
    pub fn part_count(&self) -> usize {
        self.part_count
    }

    /// Upload `source` and compose it into the object named
    /// [`source.name()`](SourceFile::name).
    ///
    /// If the file ends before its declared size inside the final partition,
    /// the bytes that were read are uploaded and the composed object is
    /// shorter than `source.size()`.  Compare it with
    /// [`ComposedObject::size`] to detect a file truncated mid-upload.
    pub async fn upload(&self, source: &SourceFile) -> Result<ComposedObject> {
        let plan = self.plan(source)?;
        let parts = self.upload_parts(source, &plan).await?;
        self.compose(source, parts).await
    }

    /// Compute the partition plan for `source`.
    pub fn plan(&self, source: &SourceFile) -> Result<PartitionPlan> {
        if self.bucket.is_empty() {
            return Err(ErrorRepr::Missing("UploadBuilder", "bucket").into());
        }
        let limit = self.client.max_compose_sources();
        let plan = PartitionPlan::new(source.size(), self.part_count, limit)?;
        debug!(
            name = source.name(),
            size = source.size(),
            parts = plan.len(),
            part_size = plan.standard_len(),
            final_size = plan.final_len(),
            "planned upload",
        );
        Ok(plan)
    }

    /// Upload each range of `plan` to its part object.
    ///
    /// On success the parts are in partition order.
    pub async fn upload_parts(&self, source: &SourceFile, plan: &PartitionPlan) -> Result<UploadedParts> {
        let coordinator = Coordinator {
            client: &self.client,
            bucket: &self.bucket,
            pool: &self.pool,
            max_tasks: self.max_tasks,
            parent: &self.cancel,
        };
        coordinator.run(source, plan).await
    }

    /// Compose uploaded `parts` into the object named after `source`.
    pub async fn compose(&self, source: &SourceFile, parts: UploadedParts) -> Result<ComposedObject> {
        compose::compose(&self.client, &self.bucket, source.name(), parts).await
    }
}

impl Debug for ComposeUpload {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposeUpload")
            .field("client", &self.client)
            .field("bucket", &self.bucket)
            .field("part_count", &self.part_count)
            .field("max_tasks", &self.max_tasks)
            .field("pool", &"BufferPool")
            .field("cancel", &self.cancel)
            .finish()
    }
}
