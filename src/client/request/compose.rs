use super::{CompleteRequestBuilder, CopyPartRequestBuilder, CreateRequestBuilder};
use crate::client::part::{UploadedPart, UploadedParts};
use crate::error::{ErrorRepr, Result};
use crate::uri::ObjectUri;

use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters of a key left as is in a copy source; `/` separates segments.
const COPY_SOURCE_KEY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Request object for composing part objects into one object.
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    pub(crate) uri: ObjectUri,
    pub(crate) sources: UploadedParts,
}

impl ComposeRequest {
    /// Create a new `ComposeRequest` writing `sources`, in order, to `uri`.
    pub fn new(uri: ObjectUri, sources: UploadedParts) -> Self {
        Self { uri, sources }
    }

    /// Set the required properties on the SDK request starting the compose.
    pub fn with_create_builder(&self, builder: CreateRequestBuilder) -> CreateRequestBuilder {
        builder.bucket(&*self.uri.bucket).key(&*self.uri.key)
    }

    /// Set the required properties on the SDK request copying `source` into
    /// the composed object.
    ///
    /// The S3 part number is the partition index plus one.  The source key is
    /// percent-encoded, as S3 requires of the copy source.
    pub fn with_copy_part_builder(
        &self,
        upload_id: &str,
        source: &UploadedPart,
        builder: CopyPartRequestBuilder,
    ) -> CopyPartRequestBuilder {
        let key = utf8_percent_encode(&source.uri.key, COPY_SOURCE_KEY);
        let copy_source = format!("{}/{key}", source.uri.bucket);
        builder
            .bucket(&*self.uri.bucket)
            .key(&*self.uri.key)
            .upload_id(upload_id)
            .part_number(source.index as i32 + 1)
            .copy_source(copy_source)
    }

    /// Set the required properties on the SDK request completing the compose.
    pub fn with_complete_builder(
        &self,
        upload_id: &str,
        parts: Vec<CompletedPart>,
        builder: CompleteRequestBuilder,
    ) -> CompleteRequestBuilder {
        let upload = CompletedMultipartUpload::builder()
            .set_parts(Some(parts))
            .build();
        builder
            .bucket(&*self.uri.bucket)
            .key(&*self.uri.key)
            .upload_id(upload_id)
            .multipart_upload(upload)
    }

    /// Returns a reference to the `ObjectUri` of the composed object.
    pub fn uri(&self) -> &ObjectUri {
        &self.uri
    }

    /// Returns the source objects in the order they are concatenated.
    pub fn sources(&self) -> &UploadedParts {
        &self.sources
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.uri.is_empty() {
            return Err(ErrorRepr::Missing("ComposeRequest", "empty bucket and/or key").into());
        }
        if self.sources.is_empty() {
            return Err(ErrorRepr::Missing("ComposeRequest", "source objects").into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::part::EntityTag;
    use aws_sdk_s3::config::{BehaviorVersion, Region};

    fn s3_client() -> aws_sdk_s3::Client {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();
        aws_sdk_s3::Client::from_conf(config)
    }

    fn part(index: usize, key: &str) -> UploadedPart {
        UploadedPart::new(index, ("bucket", key).into(), EntityTag::from("etag"), 3)
    }

    #[test]
    fn copy_source_key_is_percent_encoded() {
        let source = part(0, "dir/my data+1%.csv-0..csv");
        let req = ComposeRequest::new(("bucket", "dir/my data+1%.csv").into(), UploadedParts::new(vec![source.clone()]));

        let builder = req.with_copy_part_builder("upload-id", &source, s3_client().upload_part_copy());

        assert_eq!(
            builder.get_copy_source().as_deref(),
            Some("bucket/dir/my%20data%2B1%25.csv-0..csv")
        );
        assert_eq!(builder.get_key().as_deref(), Some("dir/my data+1%.csv"));
        assert_eq!(builder.get_part_number(), &Some(1));
    }

    #[test]
    fn copy_source_plain_key_unchanged() {
        let source = part(2, "letters.txt-2..txt");
        let req = ComposeRequest::new(("bucket", "letters.txt").into(), UploadedParts::new(vec![source.clone()]));

        let builder = req.with_copy_part_builder("upload-id", &source, s3_client().upload_part_copy());

        assert_eq!(builder.get_copy_source().as_deref(), Some("bucket/letters.txt-2..txt"));
        assert_eq!(builder.get_part_number(), &Some(3));
    }
}
