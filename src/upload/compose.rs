use crate::client::part::{ComposedObject, UploadedParts};
use crate::client::request::ComposeRequest;
use crate::client::{SendCompose, UploadClient};
use crate::error::{Error, Phase, Result};
use crate::uri::{Bucket, Key, ObjectUri};

/// Send the one compose request that concatenates `parts`, in order, into the
/// object `name` in `bucket`.
///
/// Not retried.  Any failure, including one the client reports as something
/// other than a compose error, is returned as a compose error.
pub(crate) async fn compose(
    client: &UploadClient,
    bucket: &Bucket,
    name: &str,
    parts: UploadedParts,
) -> Result<ComposedObject> {
    let uri = ObjectUri::new(bucket.clone(), Key::from(name));
    let sources = parts.count();
    debug!(%uri, sources, size = parts.size(), "composing parts");

    let req = ComposeRequest::new(uri.clone(), parts);
    let composed = SendCompose::new(client, req).await.map_err(|e| match e.phase() {
        Phase::Compose => e,
        _ => Error::compose(&uri, sources, e),
    })?;

    debug!(uri = %composed.uri, etag = %composed.etag, size = composed.size, "composed object");
    Ok(composed)
}
