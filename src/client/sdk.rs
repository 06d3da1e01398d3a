use super::SendRequest;
use super::part::{ComposedObject, EntityTag, UploadedPart};
use super::request::*;
use crate::error::{Error, ErrorRepr, Result};

use aws_config::SdkConfig;
use aws_sdk_s3 as s3;
use aws_sdk_s3::types::CompletedPart;
use futures::future::try_join_all;

// https://docs.aws.amazon.com/AmazonS3/latest/userguide/qfacts.html
const AWS_MAX_PARTS: usize = 10_000;

/// S3 [`Client`] type from the AWS SDK.
///
/// Part objects are written with `PutObject`.  S3 has no native compose
/// operation, so a compose request is carried out as a multipart upload of
/// the target object where every part is an `UploadPartCopy` of one source
/// object.  The copies happen inside S3; no part data passes through this
/// client a second time.
///
/// The multipart upload rules apply to the copies: every source object but
/// the last must be at least 5 MiB, so files split with this client should be
/// at least `5 MiB * (parts - 1)` in size.
///
/// [`Client`]: aws_sdk_s3::Client
#[derive(Debug, Clone)]
pub struct SdkClient<B = DefaultRequestBuilder>(s3::Client, B);

impl SdkClient {
    /// Create a new `SdkClient` from an existing SDK `Client`.
    ///
    /// [`Client`]: aws_sdk_s3::Client
    pub fn new(client: s3::Client) -> Self {
        SdkClient(client, DefaultRequestBuilder)
    }

    /// Create a new `SdkClient` from an [`SdkConfig`].
    ///
    /// [`SdkConfig`]: aws_config::SdkConfig
    pub fn from_sdk_config(config: SdkConfig) -> Self {
        let client = s3::Client::new(&config);
        Self::new(client)
    }

    /// Create a new `SdkClient` from a loader of the SDK configuration.
    pub async fn from_config(loader: aws_config::ConfigLoader) -> Self {
        let config = loader.load().await;
        Self::from_sdk_config(config)
    }

    /// Create a new `SdkClient` with configuration from the environment.
    pub async fn defaults() -> Self {
        let config = aws_config::load_from_env().await;
        Self::from_sdk_config(config)
    }

    /// Set a request builder for this S3 client.
    pub fn request_builder<B: RequestBuilder>(self, builder: B) -> SdkClient<B> {
        SdkClient(self.0, builder)
    }
}

impl<B: RequestBuilder> SdkClient<B> {
    async fn copy_parts(&self, req: &ComposeRequest, upload_id: &str) -> Result<Vec<CompletedPart>> {
        let uri = req.uri();
        let n = req.sources().count();
        let copies = req.sources().iter().map(|source| {
            let builder = req.with_copy_part_builder(upload_id, source, self.0.upload_part_copy());
            let request = self.1.with_copy_part_builder(builder);
            async move {
                let out = request
                    .send()
                    .await
                    .map_err(ErrorRepr::from_compose_err(uri, n))?;
                let etag = out
                    .copy_part_result
                    .and_then(|r| r.e_tag)
                    .ok_or_else(|| Error::compose(uri, n, "UploadPartCopy response missing e_tag"))?;
                trace!(%uri, source = %source.uri, %etag, "copied part");
                Ok::<_, Error>(
                    CompletedPart::builder()
                        .e_tag(etag)
                        .part_number(source.index as i32 + 1)
                        .build(),
                )
            }
        });

        // Output order follows input order, which is partition order.
        try_join_all(copies).await
    }

    async fn abort(&self, req: &ComposeRequest, upload_id: &str) {
        let uri = req.uri();
        let builder = self
            .0
            .abort_multipart_upload()
            .bucket(&*uri.bucket)
            .key(&*uri.key)
            .upload_id(upload_id);
        let request = self.1.with_abort_builder(builder);
        if let Err(e) = request.send().await {
            warn!(%uri, upload_id, error = %e, "failed to abort compose");
        }
    }
}

impl<B: RequestBuilder> SendRequest for SdkClient<B> {
    async fn send_put_part_request(&self, req: PutPartRequest) -> Result<UploadedPart> {
        req.validate()?;
        let builder = req.with_builder(self.0.put_object());
        let request = self.1.with_put_part_builder(builder);

        let uri = req.uri();
        let index = req.index();
        let out = request
            .send()
            .await
            .map_err(ErrorRepr::from_put_err(index, uri))?;
        let etag = out.e_tag.map(EntityTag::from).unwrap_or_default();

        Ok(UploadedPart::new(index, uri.clone(), etag, req.body().size() as u64))
    }

    async fn send_compose_request(&self, req: ComposeRequest) -> Result<ComposedObject> {
        req.validate()?;
        let uri = req.uri();
        let n = req.sources().count();

        let builder = req.with_create_builder(self.0.create_multipart_upload());
        let request = self.1.with_create_builder(builder);
        let upload_id = request
            .send()
            .await
            .map_err(ErrorRepr::from_compose_err(uri, n))?
            .upload_id
            .ok_or_else(|| Error::compose(uri, n, "CreateMultipartUpload response missing upload_id"))?;

        let parts = match self.copy_parts(&req, &upload_id).await {
            Ok(parts) => parts,
            Err(e) => {
                self.abort(&req, &upload_id).await;
                return Err(e);
            }
        };

        let builder = req.with_complete_builder(&upload_id, parts, self.0.complete_multipart_upload());
        let request = self.1.with_complete_builder(builder);
        let out = match request.send().await {
            Ok(out) => out,
            Err(e) => {
                self.abort(&req, &upload_id).await;
                return Err(ErrorRepr::from_compose_err(uri, n)(e).into());
            }
        };
        let etag = out.e_tag.map(EntityTag::from).unwrap_or_default();

        Ok(ComposedObject::new(uri.clone(), etag, n, req.sources().size()))
    }

    fn max_compose_sources(&self) -> usize {
        AWS_MAX_PARTS
    }
}
