//! Object identity in the remote store.
//!
//! An [`ObjectUri`] is the handle of a remote object: the bucket it lives in
//! and its key.  Part objects are keyed from the source file's name and the
//! partition index with [`part_key`].
use std::borrow::Cow;
use std::fmt::{self, Formatter};
use std::ops::Deref;

/// The address of an object in S3.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectUri {
    /// The S3 bucket for the object.
    ///
    /// This should be the plain bucket name, e.g., "my-s3-bucket".
    pub bucket: Bucket,
    /// The full key of this object within the bucket.
    pub key: Key,
}

impl ObjectUri {
    /// Create a new `ObjectUri` from bucket and object key.
    pub fn new(bucket: Bucket, key: Key) -> Self {
        Self { bucket, key }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.bucket.is_empty() || self.key.is_empty()
    }
}

impl fmt::Display for ObjectUri {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", &self.bucket, &self.key)
    }
}

impl<T: Into<Bucket>, U: Into<Key>> From<(T, U)> for ObjectUri {
    fn from((b, k): (T, U)) -> Self {
        ObjectUri::new(b.into(), k.into())
    }
}

/// The bucket holding the part objects and the composed object.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bucket(Cow<'static, str>);

impl Bucket {
    /// Create a new `Bucket`.
    pub fn new<T: Into<Cow<'static, str>>>(bucket: T) -> Self {
        let bucket: Cow<'static, str> = bucket.into();
        match bucket.strip_suffix('/') {
            Some(v) => Self(Cow::Owned(v.to_string())),
            _ => Self(bucket),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for Bucket {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Bucket {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl From<String> for Bucket {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// The key within the associated bucket for this object.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(Cow<'static, str>);

impl Key {
    /// Create a new object `Key`.
    pub fn new<T: Into<Cow<'static, str>>>(key: T) -> Self {
        Self(key.into())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for Key {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

/// Key of the part object holding partition `index` of the file `name`.
///
/// The layout is `<name>-<index>.<extension>`, where `name` is the full file
/// name and `extension` keeps its leading dot.  So `data.bin` split in two is
/// stored as `data.bin-0..bin` and `data.bin-1..bin`, and `Makefile` as
/// `Makefile-0.`.  Part objects written by earlier uploaders use exactly this
/// layout, doubled dot included.
pub fn part_key(name: &str, index: usize, extension: &str) -> Key {
    Key::from(format!("{name}-{index}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_key_puts_extension_after_index() {
        assert_eq!(&*part_key("data.bin", 3, ".bin"), "data.bin-3..bin");
        assert_eq!(&*part_key("archive.tar.gz", 0, ".gz"), "archive.tar.gz-0..gz");
    }

    #[test]
    fn part_key_without_extension_keeps_trailing_dot() {
        assert_eq!(&*part_key("Makefile", 1, ""), "Makefile-1.");
    }

    #[test]
    fn bucket_trailing_slash() {
        let uri = ObjectUri::from(("my-bucket/", "a/b.txt"));
        assert_eq!(uri.to_string(), "s3://my-bucket/a/b.txt");
    }
}
