use super::PutPartRequestBuilder;
use crate::client::part::PartBody;
use crate::error::{ErrorRepr, Result};
use crate::uri::ObjectUri;

/// Request object for writing one part object.
#[derive(Debug, Clone)]
pub struct PutPartRequest {
    pub(crate) index: usize,
    pub(crate) uri: ObjectUri,
    pub(crate) body: PartBody,
}

impl PutPartRequest {
    /// Create a new `PutPartRequest` for partition `index`.
    pub fn new(index: usize, uri: ObjectUri, body: PartBody) -> Self {
        Self { index, uri, body }
    }

    /// Set the required properties on the SDK request builder for the operation.
    pub fn with_builder(&self, builder: PutPartRequestBuilder) -> PutPartRequestBuilder {
        builder
            .bucket(&*self.uri.bucket)
            .key(&*self.uri.key)
            .content_length(self.body.size() as i64)
            .body(self.body.as_sdk_body())
    }

    /// Returns the partition index of this part.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns a reference to the `ObjectUri` of the part object.
    pub fn uri(&self) -> &ObjectUri {
        &self.uri
    }

    /// Returns a reference to the `PartBody` for this request.
    pub fn body(&self) -> &PartBody {
        &self.body
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.uri.is_empty() {
            return Err(ErrorRepr::Missing("PutPartRequest", "empty bucket and/or key").into());
        }
        Ok(())
    }
}
