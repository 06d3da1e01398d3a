pub use crate::abort_upload::builders::AbortMultipartUploadFluentBuilder as AbortRequestBuilder;
pub use crate::complete_upload::builders::CompleteMultipartUploadFluentBuilder as CompleteRequestBuilder;
pub use crate::copy_part::builders::UploadPartCopyFluentBuilder as CopyPartRequestBuilder;
pub use crate::create_upload::builders::CreateMultipartUploadFluentBuilder as CreateRequestBuilder;
pub use crate::put_object::builders::PutObjectFluentBuilder as PutPartRequestBuilder;

mod compose;
pub use compose::ComposeRequest;

mod put_part;
pub use put_part::PutPartRequest;

/// Add additional properties to the SDK request objects being sent.
///
/// [`SdkClient`] applies a `RequestBuilder` after the required properties
/// have been set, e.g., to add a storage class or server-side encryption.
///
/// [`SdkClient`]: crate::SdkClient
pub trait RequestBuilder: Send + Sync {
    /// Set additional properties on the request writing a part object.
    fn with_put_part_builder(&self, builder: PutPartRequestBuilder) -> PutPartRequestBuilder {
        builder
    }

    /// Set additional properties on the multipart upload that a compose
    /// request is carried out as.  This is the request that determines the
    /// properties of the composed object.
    fn with_create_builder(&self, builder: CreateRequestBuilder) -> CreateRequestBuilder {
        builder
    }

    /// Set additional properties on the request copying one part object into
    /// the composed object.
    fn with_copy_part_builder(&self, builder: CopyPartRequestBuilder) -> CopyPartRequestBuilder {
        builder
    }

    /// Set additional properties on the request completing a compose.
    fn with_complete_builder(&self, builder: CompleteRequestBuilder) -> CompleteRequestBuilder {
        builder
    }

    /// Set additional properties on the request aborting a failed compose.
    fn with_abort_builder(&self, builder: AbortRequestBuilder) -> AbortRequestBuilder {
        builder
    }
}

/// Default implementation of [`RequestBuilder`] that doesn't modify the request
/// object at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRequestBuilder;
impl RequestBuilder for DefaultRequestBuilder {}
