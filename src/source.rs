//! The local file being uploaded.
use crate::error::{ErrorRepr, Result};

use bytes::{Bytes, BytesMut};
use std::fmt::{self, Debug, Formatter};
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;

/// Positional reads that don't move a shared cursor.
///
/// Part uploads read from the same value concurrently, each at its own
/// offset, without any locking.
pub trait ReadAt: Send + Sync + 'static {
    /// Read into `buf` starting at `offset`, returning how many bytes were
    /// read.  Returns `Ok(0)` at or past the end of the data.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;
}

impl ReadAt for File {
    #[cfg(unix)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::unix::fs::FileExt::read_at(self, buf, offset)
    }

    #[cfg(windows)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::windows::fs::FileExt::seek_read(self, buf, offset)
    }
}

impl ReadAt for Bytes {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(self.len());
        let n = buf.len().min(self.len() - start);
        buf[..n].copy_from_slice(&self[start..start + n]);
        Ok(n)
    }
}

/// A local file opened for upload.
///
/// Cloning is cheap and shares the same handle.
#[derive(Clone)]
pub struct SourceFile {
    reader: Arc<dyn ReadAt>,
    size: u64,
    name: String,
    extension: String,
}

impl SourceFile {
    /// Open the file at `path` and read its size.
    ///
    /// The name used for the composed object is the last component of the
    /// path, extension included.  The extension is the suffix of the name
    /// from its last `'.'`, dot included, or `""` if there is none.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or(ErrorRepr::Missing("SourceFile", "file name"))?;
        let extension = name.rfind('.').map(|i| name[i..].to_string()).unwrap_or_default();

        let file = File::open(path).map_err(|source| ErrorRepr::Source { source })?;
        let size = file
            .metadata()
            .map_err(|source| ErrorRepr::Source { source })?
            .len();

        Ok(Self::from_reader(file, size, name, extension))
    }

    /// Use a reader, e.g., a file that is already open, as the source.
    ///
    /// `size` is the number of bytes to upload and `extension` is given
    /// with its leading `'.'`, e.g., `".txt"`.
    pub fn from_reader<R, N, E>(reader: R, size: u64, name: N, extension: E) -> Self
    where
        R: ReadAt,
        N: Into<String>,
        E: Into<String>,
    {
        Self {
            reader: Arc::new(reader),
            size,
            name: name.into(),
            extension: extension.into(),
        }
    }

    /// Size of the file in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// File name, extension included.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File extension with its leading `'.'`, or `""`.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Fill `buf` with the bytes starting at `offset`, returning the buffer
    /// and the number of bytes read.
    ///
    /// Fewer bytes than `buf.len()` are read only if the end of the file was
    /// reached.  The read runs on the blocking thread pool.
    pub(crate) async fn read_at(&self, offset: u64, mut buf: BytesMut) -> (BytesMut, io::Result<usize>) {
        let reader = Arc::clone(&self.reader);
        let task = tokio::task::spawn_blocking(move || {
            let res = read_full_at(&*reader, &mut buf, offset);
            (buf, res)
        });

        match task.await {
            Ok(out) => out,
            Err(e) => (BytesMut::new(), Err(io::Error::other(e))),
        }
    }
}

impl Debug for SourceFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("reader", &"ReadAt")
            .field("size", &self.size)
            .field("name", &self.name)
            .field("extension", &self.extension)
            .finish()
    }
}

fn read_full_at(reader: &dyn ReadAt, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read_at(&mut buf[filled..], offset + filled as u64) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn temp_source(contents: &[u8], file_name: &str) -> (tempfile::TempDir, SourceFile) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(file_name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents).unwrap();
        let source = SourceFile::open(&path).unwrap();
        (dir, source)
    }

    #[test]
    fn open_reads_metadata() {
        let (_dir, source) = temp_source(b"ABCDEFGHI", "letters.txt");
        assert_eq!(source.size(), 9);
        assert_eq!(source.name(), "letters.txt");
        assert_eq!(source.extension(), ".txt");
    }

    #[test]
    fn extension_is_last_dot_suffix() {
        let (_dir, source) = temp_source(b"", "archive.tar.gz");
        assert_eq!(source.extension(), ".gz");
        let (_dir, source) = temp_source(b"", ".profile");
        assert_eq!(source.extension(), ".profile");
    }

    #[test]
    fn open_without_extension() {
        let (_dir, source) = temp_source(b"", "README");
        assert_eq!(source.name(), "README");
        assert_eq!(source.extension(), "");
    }

    #[test]
    fn open_missing_file_is_plan_error() {
        let err = SourceFile::open("/definitely/not/here.bin").unwrap_err();
        assert_eq!(err.phase(), crate::error::Phase::Plan);
    }

    #[tokio::test]
    async fn file_positional_reads() {
        let (_dir, source) = temp_source(b"ABCDEFGHI", "letters.txt");

        let (buf, n) = source.read_at(3, BytesMut::zeroed(3)).await;
        assert_eq!(n.unwrap(), 3);
        assert_eq!(&buf[..], b"DEF");

        let (buf, n) = source.read_at(6, BytesMut::zeroed(5)).await;
        assert_eq!(n.unwrap(), 3);
        assert_eq!(&buf[..3], b"GHI");

        let (_, n) = source.read_at(9, BytesMut::zeroed(2)).await;
        assert_eq!(n.unwrap(), 0);
    }

    #[test]
    fn bytes_read_at_past_end() {
        let data = Bytes::from_static(b"ABC");
        let mut buf = [0u8; 4];
        assert_eq!(data.read_at(&mut buf, 1).unwrap(), 2);
        assert_eq!(&buf[..2], b"BC");
        assert_eq!(data.read_at(&mut buf, 3).unwrap(), 0);
        assert_eq!(data.read_at(&mut buf, 100).unwrap(), 0);
    }
}
