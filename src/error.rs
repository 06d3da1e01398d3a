//! Errors this crate can emit.
use crate::uri::ObjectUri;

use std::fmt::{self, Display, Formatter};
use std::io;

/// A specialized `Result` type for this crate.
pub type Result<T, E = Error> = ::std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The value returned in this crate when an error occurs.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error(pub(crate) ErrorRepr);

impl Error {
    /// The category of the error.
    pub fn kind(&self) -> ErrorKind {
        match self.0 {
            ErrorRepr::Missing(_, _) => ErrorKind::Config,
            ErrorRepr::NoParts | ErrorRepr::TooManyParts { .. } => ErrorKind::Plan,
            ErrorRepr::Source { .. } | ErrorRepr::Read { .. } => ErrorKind::Read,
            ErrorRepr::Write { .. } => ErrorKind::Write,
            ErrorRepr::Cancelled { .. } => ErrorKind::Cancelled,
            ErrorRepr::Task { .. } => ErrorKind::Unknown,
            ErrorRepr::Compose { .. } => ErrorKind::Compose,
            ErrorRepr::StdDyn(_) => ErrorKind::Unknown,
            ErrorRepr::Any { kind, .. } => kind,
        }
    }

    /// The phase of the operation that failed.
    pub fn phase(&self) -> Phase {
        match self.0 {
            ErrorRepr::Missing(_, _)
            | ErrorRepr::NoParts
            | ErrorRepr::TooManyParts { .. }
            | ErrorRepr::Source { .. } => Phase::Plan,
            ErrorRepr::Read { .. }
            | ErrorRepr::Write { .. }
            | ErrorRepr::Cancelled { .. }
            | ErrorRepr::Task { .. } => Phase::Upload,
            ErrorRepr::Compose { .. } => Phase::Compose,
            ErrorRepr::StdDyn(_) | ErrorRepr::Any { .. } => Phase::Upload,
        }
    }

    /// The index of the partition whose upload failed, if the error came from
    /// uploading a part.
    pub fn part_index(&self) -> Option<usize> {
        match self.0 {
            ErrorRepr::Read { index, .. }
            | ErrorRepr::Write { index, .. }
            | ErrorRepr::Cancelled { index }
            | ErrorRepr::Task { index, .. } => Some(index),
            _ => None,
        }
    }

    /// Wrap an arbitrary error.
    pub fn from_dyn<E>(e: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let err = Box::new(e);
        Self(ErrorRepr::StdDyn(err))
    }

    /// Create an error from a category and a message.
    pub fn from_kind(kind: ErrorKind, msg: &'static str) -> Self {
        Self(ErrorRepr::Any { kind, msg })
    }

    /// An error for a part upload that failed in the store client.
    ///
    /// Implementations of [`SendRequest`] use this to attach the partition
    /// index to their own errors.
    ///
    /// [`SendRequest`]: crate::SendRequest
    pub fn part_write<E>(index: usize, uri: &ObjectUri, e: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self(ErrorRepr::Write {
            index,
            uri: uri.clone(),
            source: e.into(),
        })
    }

    /// An error for a compose request that failed in the store client.
    pub fn compose<E>(uri: &ObjectUri, sources: usize, e: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self(ErrorRepr::Compose {
            uri: uri.clone(),
            sources,
            source: e.into(),
        })
    }

    /// Attach partition `index` to an error from uploading that partition,
    /// unless it already names one.
    pub(crate) fn in_part(self, index: usize, uri: &ObjectUri) -> Self {
        if self.part_index().is_some() {
            return self;
        }
        let source: BoxError = match self.0 {
            ErrorRepr::StdDyn(e) => e,
            other => Box::new(Self(other)),
        };
        Self(ErrorRepr::Write {
            index,
            uri: uri.clone(),
            source,
        })
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        matches!(self.0, ErrorRepr::Cancelled { .. })
    }
}

impl From<ErrorRepr> for Error {
    fn from(value: ErrorRepr) -> Self {
        Self(value)
    }
}

/// The category of the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The upload is missing required configuration, e.g., a bucket.
    Config,
    /// The part count can't be used to split the file.
    Plan,
    /// Opening or reading the source file failed.
    Read,
    /// Writing a part object failed.
    Write,
    /// The upload was cancelled before the part finished.
    Cancelled,
    /// Composing the part objects failed.
    Compose,
    /// Any other error.
    Unknown,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config => write!(f, "config"),
            Self::Plan => write!(f, "plan"),
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Compose => write!(f, "compose"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// The phase of the upload-and-compose operation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Validating configuration and computing the partition plan.  Nothing
    /// has been sent to the store yet.
    Plan,
    /// Uploading the part objects.
    Upload,
    /// Composing the part objects into the final object.
    Compose,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plan => write!(f, "plan"),
            Self::Upload => write!(f, "upload"),
            Self::Compose => write!(f, "compose"),
        }
    }
}

/// Internal error type that we are free to change at will.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ErrorRepr {
    #[error("{0} missing required field: {1}")]
    Missing(&'static str, &'static str),
    #[error("part count must be at least 1")]
    NoParts,
    #[error("part count {requested} exceeds the compose limit of {limit}")]
    TooManyParts { requested: usize, limit: usize },
    #[error("opening source file failed: {source}")]
    Source { source: io::Error },
    #[error("reading part {index} ({len} bytes at offset {offset}) failed: {source}")]
    Read {
        index: usize,
        offset: u64,
        len: u64,
        source: io::Error,
    },
    #[error("writing part {index} to {uri} failed: {source}")]
    Write {
        index: usize,
        uri: ObjectUri,
        source: BoxError,
    },
    #[error("upload of part {index} was cancelled")]
    Cancelled { index: usize },
    #[error("task uploading part {index} did not finish: {msg}")]
    Task { index: usize, msg: String },
    #[error("composing {sources} parts into {uri} failed: {source}")]
    Compose {
        uri: ObjectUri,
        sources: usize,
        source: BoxError,
    },
    #[error("{kind} error: {msg}")]
    Any { kind: ErrorKind, msg: &'static str },
    #[error(transparent)]
    StdDyn(BoxError),
}

impl ErrorRepr {
    pub(crate) fn from_read_err(index: usize, offset: u64, len: u64) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::Read {
            index,
            offset,
            len,
            source,
        }
    }

    pub(crate) fn from_put_err<E>(index: usize, uri: &ObjectUri) -> impl FnOnce(E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        move |e| Self::Write {
            index,
            uri: uri.clone(),
            source: Box::new(e),
        }
    }

    pub(crate) fn from_compose_err<E>(uri: &ObjectUri, sources: usize) -> impl FnOnce(E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        move |e| Self::Compose {
            uri: uri.clone(),
            sources,
            source: Box::new(e),
        }
    }
}
