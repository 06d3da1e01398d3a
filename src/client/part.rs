use crate::uri::ObjectUri;

use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

/// Body of the request writing one part object.
///
/// The bytes are copied out of the read buffer when the body is created, so
/// the buffer can go back to its pool before the request is sent.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PartBody(Bytes);

impl PartBody {
    /// Construct a body from [`Bytes`].
    pub fn new(bytes: Bytes) -> Self {
        Self(bytes)
    }

    /// Construct a body holding a copy of `data`.
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(data))
    }

    /// Current size in bytes of the `PartBody`.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Convert this type into a [`ByteStream`], the body type of SDK requests.
    ///
    /// This only increments the reference count of the inner bytes.
    pub fn as_sdk_body(&self) -> ByteStream {
        ByteStream::from(self.0.clone())
    }

    /// Returns the inner bytes.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<Bytes> for PartBody {
    fn from(value: Bytes) -> Self {
        Self(value)
    }
}

impl From<&'static [u8]> for PartBody {
    fn from(value: &'static [u8]) -> Self {
        Self(Bytes::from_static(value))
    }
}

impl Deref for PartBody {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for PartBody {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Entity tag of an object.
///
/// An opaque identifier of the object's contents assigned by the store when
/// the object is written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EntityTag(Cow<'static, str>);

impl EntityTag {
    /// Create a new `EntityTag`.
    pub fn new<T: Into<Cow<'static, str>>>(etag: T) -> Self {
        Self(etag.into())
    }
}

impl Deref for EntityTag {
    type Target = str;

    fn deref(&self) -> &str {
        self.0.deref()
    }
}

impl AsRef<str> for EntityTag {
    fn as_ref(&self) -> &str {
        self.deref()
    }
}

impl Display for EntityTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for EntityTag {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl From<String> for EntityTag {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

/// A part object that was written successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPart {
    /// Index of the partition this object holds.
    pub index: usize,
    /// Where the part object was written.
    pub uri: ObjectUri,
    /// Entity tag of the part object.
    pub etag: EntityTag,
    /// Size of the part object in bytes.
    pub size: u64,
}

impl UploadedPart {
    /// Create a new value.
    pub fn new(index: usize, uri: ObjectUri, etag: EntityTag, size: u64) -> Self {
        Self {
            index,
            uri,
            etag,
            size,
        }
    }
}

/// Every part object of an upload, in partition order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedParts(Vec<UploadedPart>);

impl UploadedParts {
    /// Collect parts, sorting them by partition index.
    pub fn new(mut parts: Vec<UploadedPart>) -> Self {
        parts.sort_by_key(|p| p.index);
        Self(parts)
    }

    /// Returns the number of parts.
    pub fn count(&self) -> usize {
        self.0.len()
    }

    /// Returns the sum of the sizes of the parts.
    pub fn size(&self) -> u64 {
        self.0.iter().map(|p| p.size).sum()
    }

    /// The part object URIs in partition order.
    pub fn uris(&self) -> impl Iterator<Item = &ObjectUri> {
        self.0.iter().map(|p| &p.uri)
    }
}

impl Deref for UploadedParts {
    type Target = [UploadedPart];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for UploadedParts {
    type Item = UploadedPart;
    type IntoIter = std::vec::IntoIter<UploadedPart>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The object created by composing the parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposedObject {
    /// The URI of the composed object.
    pub uri: ObjectUri,
    /// The entity tag of the composed object.
    pub etag: EntityTag,
    /// How many part objects it was composed from.
    pub parts: usize,
    /// Size of the composed object in bytes.
    pub size: u64,
}

impl ComposedObject {
    /// Create a new value.
    pub fn new(uri: ObjectUri, etag: EntityTag, parts: usize, size: u64) -> Self {
        Self {
            uri,
            etag,
            parts,
            size,
        }
    }
}
