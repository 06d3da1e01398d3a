use aws_compose_upload::{ReadAt, SourceFile};
use bytes::Bytes;
use std::io::{self, Write as _};
use tempfile::TempDir;

/// A source over in-memory bytes, declared to be `size` bytes long.
pub fn bytes_source(data: &'static [u8], size: u64, name: &str) -> SourceFile {
    let ext = name.rfind('.').map_or("", |i| &name[i..]);
    SourceFile::from_reader(Bytes::from_static(data), size, name, ext)
}

/// Write `data` to a file called `name` in a new temporary directory and open
/// it.  The directory is removed when the returned `TempDir` is dropped.
pub fn file_source(data: &[u8], name: &str) -> (TempDir, SourceFile) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(data).unwrap();
    f.sync_all().unwrap();
    let source = SourceFile::open(&path).unwrap();
    (dir, source)
}

/// Reads from in-memory bytes but fails any read starting inside
/// `[start, end)`.
#[derive(Debug, Clone)]
pub struct FailingReader {
    data: Bytes,
    start: u64,
    end: u64,
}

impl FailingReader {
    pub fn new(data: &'static [u8], start: u64, end: u64) -> Self {
        Self {
            data: Bytes::from_static(data),
            start,
            end,
        }
    }

    pub fn into_source(self, name: &str, ext: &str) -> SourceFile {
        let size = self.data.len() as u64;
        SourceFile::from_reader(self, size, name, ext)
    }
}

impl ReadAt for FailingReader {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        if (self.start..self.end).contains(&offset) {
            return Err(io::Error::other("injected read failure"));
        }
        self.data.read_at(buf, offset)
    }
}
