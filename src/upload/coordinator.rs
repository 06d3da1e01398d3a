use super::part::PartUpload;
use crate::buffer::BufferPool;
use crate::client::UploadClient;
use crate::client::part::{UploadedPart, UploadedParts};
use crate::error::{Error, ErrorKind, ErrorRepr, Result};
use crate::plan::PartitionPlan;
use crate::source::SourceFile;
use crate::uri::Bucket;

use futures::FutureExt as _;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Runs one task per partition of a plan and gathers the uploaded parts.
pub(crate) struct Coordinator<'a> {
    pub(crate) client: &'a UploadClient,
    pub(crate) bucket: &'a Bucket,
    pub(crate) pool: &'a Arc<dyn BufferPool>,
    pub(crate) max_tasks: Option<usize>,
    pub(crate) parent: &'a CancellationToken,
}

impl Coordinator<'_> {
    /// Upload every partition of `plan` concurrently.
    ///
    /// The first failure cancels the tasks still running.  All tasks have
    /// finished when this returns, either with the first error or with every
    /// part in partition order.
    pub(crate) async fn run(&self, source: &SourceFile, plan: &PartitionPlan) -> Result<UploadedParts> {
        let cancel = self.parent.child_token();
        let limit = self.max_tasks.map(|n| Arc::new(Semaphore::new(n.max(1))));
        let mut tasks = JoinSet::new();
        let mut ids = HashMap::with_capacity(plan.len());

        for range in plan {
            let part = PartUpload {
                range: *range,
                is_final: plan.is_final(range),
                source: source.clone(),
                bucket: self.bucket.clone(),
                client: self.client.clone(),
                pool: Arc::clone(self.pool),
                cancel: cancel.clone(),
            };
            let limit = limit.clone();
            let cancel = cancel.clone();

            let index = range.index;
            let handle = tasks.spawn(async move {
                let uri = part.uri();
                let _permit = match limit {
                    Some(sem) => sem.acquire_owned().await.ok(),
                    None => None,
                };
                let res = AssertUnwindSafe(part.run())
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        Err(ErrorRepr::Task {
                            index,
                            msg: "task panicked".into(),
                        }
                        .into())
                    })
                    .map_err(|e| e.in_part(index, &uri));
                // Stop the siblings as soon as this one fails.
                if res.is_err() {
                    cancel.cancel();
                }
                (index, res)
            });
            ids.insert(handle.id(), index);
        }

        let mut slots: Vec<Option<UploadedPart>> = vec![None; plan.len()];
        let mut first_err: Option<Error> = None;

        while let Some(joined) = tasks.join_next().await {
            let (index, res) = match joined {
                Ok(out) => out,
                Err(e) => {
                    cancel.cancel();
                    let err = match ids.get(&e.id()) {
                        Some(&index) => ErrorRepr::Task {
                            index,
                            msg: e.to_string(),
                        }
                        .into(),
                        None => Error::from_dyn(e),
                    };
                    record(&mut first_err, err);
                    continue;
                }
            };
            match res {
                Ok(part) => {
                    debug!(index, uri = %part.uri, size = part.size, "uploaded part");
                    slots[index] = Some(part);
                }
                Err(e) => {
                    if !e.is_cancelled() {
                        warn!(index, error = %e, "part upload failed, cancelling remaining parts");
                    }
                    record(&mut first_err, e);
                }
            }
        }

        if let Some(e) = first_err {
            return Err(e);
        }

        let parts: Vec<UploadedPart> = slots.into_iter().flatten().collect();
        if parts.len() != plan.len() {
            return Err(Error::from_kind(ErrorKind::Unknown, "part upload finished without a result"));
        }
        Ok(UploadedParts::new(parts))
    }
}

/// Keep the first error, unless it is a cancellation and `e` is the failure
/// that caused it.
fn record(first: &mut Option<Error>, e: Error) {
    match first {
        None => *first = Some(e),
        Some(prev) if prev.is_cancelled() && !e.is_cancelled() => *first = Some(e),
        Some(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_replaces_cancellation() {
        let mut first = None;
        record(&mut first, ErrorRepr::Cancelled { index: 4 }.into());
        record(&mut first, ErrorRepr::Cancelled { index: 0 }.into());
        assert_eq!(first.as_ref().and_then(Error::part_index), Some(4));

        let io = std::io::Error::other("boom");
        record(&mut first, ErrorRepr::from_read_err(2, 8, 4)(io).into());
        assert_eq!(first.as_ref().map(Error::kind), Some(ErrorKind::Read));

        record(&mut first, ErrorRepr::Cancelled { index: 1 }.into());
        assert_eq!(first.as_ref().and_then(Error::part_index), Some(2));
    }
}
