use crate::buffer::BufferPool;
use crate::client::part::{PartBody, UploadedPart};
use crate::client::request::PutPartRequest;
use crate::client::{SendPutPart, UploadClient};
use crate::error::{ErrorRepr, Result};
use crate::plan::PartRange;
use crate::source::SourceFile;
use crate::uri::{Bucket, ObjectUri, part_key};

use bytes::BytesMut;
use std::io;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Uploads one partition of the source file as one part object.
pub(crate) struct PartUpload {
    pub(crate) range: PartRange,
    pub(crate) is_final: bool,
    pub(crate) source: SourceFile,
    pub(crate) bucket: Bucket,
    pub(crate) client: UploadClient,
    pub(crate) pool: Arc<dyn BufferPool>,
    pub(crate) cancel: CancellationToken,
}

impl PartUpload {
    /// The object this partition is written to.
    pub(crate) fn uri(&self) -> ObjectUri {
        let key = part_key(self.source.name(), self.range.index, self.source.extension());
        ObjectUri::new(self.bucket.clone(), key)
    }

    pub(crate) async fn run(self) -> Result<UploadedPart> {
        let index = self.range.index;
        self.check_cancelled()?;

        let body = self.read().await?;
        self.check_cancelled()?;

        let uri = self.uri();
        trace!(index, %uri, size = body.size(), "sending part");
        let req = PutPartRequest::new(index, uri, body);
        let send = SendPutPart::new(&self.client, req);

        // Dropping the request before it completes leaves no object behind:
        // the part object only exists once the put has been committed.
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ErrorRepr::Cancelled { index }.into()),
            res = send => res,
        }
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(ErrorRepr::Cancelled {
                index: self.range.index,
            }
            .into());
        }
        Ok(())
    }

    /// Read the range into a buffer and copy out the bytes that were read.
    async fn read(&self) -> Result<PartBody> {
        let PartRange { index, offset, len } = self.range;
        let read_err = ErrorRepr::from_read_err(index, offset, len);

        let size = match usize::try_from(len) {
            Ok(size) => size,
            Err(e) => return Err(read_err(io::Error::other(e)).into()),
        };

        // Only non-final ranges share the standard length the pool serves.
        let buf = if self.is_final {
            BytesMut::zeroed(size)
        } else {
            self.pool.acquire(size)
        };

        let (buf, res) = self.source.read_at(offset, buf).await;
        let read = match res {
            Ok(read) => read,
            Err(e) => {
                self.recycle(buf);
                return Err(read_err(e).into());
            }
        };

        if read < size && !self.is_final {
            self.recycle(buf);
            let e = io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("end of file after {read} of {size} bytes"),
            );
            return Err(read_err(e).into());
        }
        if read < size {
            warn!(index, read, expected = size, "source ended early in final part");
        }

        let body = PartBody::copy_from_slice(&buf[..read]);
        self.recycle(buf);
        Ok(body)
    }

    fn recycle(&self, buf: BytesMut) {
        if !self.is_final {
            self.pool.release(buf);
        }
    }
}

