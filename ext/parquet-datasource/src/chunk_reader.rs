//! Cloneable random-access handle handed to the Parquet decoder
//!
//! Parquet keeps its schema and row-group layout in a trailing footer, so the
//! decoder needs to jump around the file. [`InputFile`] implements the parquet
//! `ChunkReader` trait over a local file, an in-memory buffer, or any
//! [`RandomAccessFile`]. Clones never share a cursor: local files are
//! reopened for every range read.

use bytes::Bytes;
use parquet::errors::ParquetError;
use parquet::file::reader::{ChunkReader, Length};
use std::fmt::Debug;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default capacity of buffered readers returned by [`InputFile`]
pub const DEFAULT_BUFFER_SIZE: usize = 16 * 1024;

/// Positional reads over a byte source of known length
///
/// Implement this to plug a custom storage backend into a
/// [`FileSystem`](crate::FileSystem).
pub trait RandomAccessFile: Debug + Send + Sync {
    fn size(&self) -> u64;

    /// Read up to `buf.len()` bytes starting at `offset`, returning the
    /// number of bytes read (0 at end of file)
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;
}

/// A seekable source that can be cloned for parallel reading
#[derive(Debug, Clone)]
pub enum InputFile {
    /// Local file, reopened for each read
    File(FileChunkReader),
    /// In-memory bytes
    Bytes(Bytes),
    /// Caller-provided positional reader
    Custom(CustomChunkReader),
}

/// File-based chunk reader that reopens the file for each read
#[derive(Debug, Clone)]
pub struct FileChunkReader {
    path: PathBuf,
    file_len: u64,
    buffer_size: usize,
}

impl FileChunkReader {
    pub fn new<P: AsRef<Path>>(path: P, buffer_size: usize) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = File::open(&path)?.metadata()?;
        if metadata.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} is a directory", path.display()),
            ));
        }

        Ok(FileChunkReader {
            path,
            file_len: metadata.len(),
            buffer_size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Chunk reader over a [`RandomAccessFile`]
#[derive(Debug, Clone)]
pub struct CustomChunkReader {
    inner: Arc<dyn RandomAccessFile>,
    buffer_size: usize,
}

/// Sequential cursor over a [`RandomAccessFile`]
struct PositionalCursor {
    inner: Arc<dyn RandomAccessFile>,
    pos: u64,
}

impl Read for PositionalCursor {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read_at(self.pos, buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for PositionalCursor {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(off) => Some(off),
            SeekFrom::Current(off) => self.pos.checked_add_signed(off),
            SeekFrom::End(off) => self.inner.size().checked_add_signed(off),
        };
        self.pos = target.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "Seek before start of file")
        })?;
        Ok(self.pos)
    }
}

/// A reader that reads a specific range from an underlying source
struct RangeReader<R> {
    inner: R,
    end: u64,
    pos: u64,
}

impl<R: Read + Seek> RangeReader<R> {
    fn new(mut inner: R, start: u64, length: u64) -> io::Result<Self> {
        inner.seek(SeekFrom::Start(start))?;
        Ok(RangeReader {
            inner,
            end: start + length,
            pos: start,
        })
    }
}

impl<R: Read> Read for RangeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = (self.end - self.pos) as usize;
        if remaining == 0 {
            return Ok(0);
        }

        let to_read = buf.len().min(remaining);
        let n = self.inner.read(&mut buf[..to_read])?;
        self.pos += n as u64;
        Ok(n)
    }
}

fn external(e: io::Error) -> ParquetError {
    ParquetError::External(Box::new(e))
}

fn check_range(start: u64, length: usize, len: u64) -> parquet::errors::Result<()> {
    if start.saturating_add(length as u64) > len {
        return Err(ParquetError::EOF(format!(
            "Requested range {}..{} exceeds file length {}",
            start,
            start.saturating_add(length as u64),
            len
        )));
    }
    Ok(())
}

/// Read `length` bytes at `start` from a seekable source
fn read_exact_at<R: Read + Seek>(mut source: R, start: u64, length: usize) -> io::Result<Bytes> {
    source.seek(SeekFrom::Start(start))?;
    let mut buf = vec![0; length];
    source.read_exact(&mut buf)?;
    Ok(Bytes::from(buf))
}

impl Length for FileChunkReader {
    fn len(&self) -> u64 {
        self.file_len
    }
}

impl Length for CustomChunkReader {
    fn len(&self) -> u64 {
        self.inner.size()
    }
}

impl Length for InputFile {
    fn len(&self) -> u64 {
        match self {
            InputFile::File(f) => f.len(),
            InputFile::Bytes(b) => b.len() as u64,
            InputFile::Custom(c) => c.len(),
        }
    }
}

impl ChunkReader for FileChunkReader {
    type T = Box<dyn Read + Send>;

    fn get_read(&self, start: u64) -> parquet::errors::Result<Self::T> {
        let file = File::open(&self.path).map_err(external)?;
        let reader = RangeReader::new(file, start, self.file_len.saturating_sub(start))
            .map_err(external)?;
        Ok(Box::new(BufReader::with_capacity(self.buffer_size, reader)))
    }

    fn get_bytes(&self, start: u64, length: usize) -> parquet::errors::Result<Bytes> {
        check_range(start, length, self.file_len)?;
        let file = File::open(&self.path).map_err(external)?;
        read_exact_at(file, start, length).map_err(external)
    }
}

impl ChunkReader for CustomChunkReader {
    type T = Box<dyn Read + Send>;

    fn get_read(&self, start: u64) -> parquet::errors::Result<Self::T> {
        let cursor = PositionalCursor {
            inner: self.inner.clone(),
            pos: 0,
        };
        let reader = RangeReader::new(cursor, start, self.len().saturating_sub(start))
            .map_err(external)?;
        Ok(Box::new(BufReader::with_capacity(self.buffer_size, reader)))
    }

    fn get_bytes(&self, start: u64, length: usize) -> parquet::errors::Result<Bytes> {
        check_range(start, length, self.len())?;
        let cursor = PositionalCursor {
            inner: self.inner.clone(),
            pos: 0,
        };
        read_exact_at(cursor, start, length).map_err(external)
    }
}

impl ChunkReader for InputFile {
    type T = Box<dyn Read + Send>;

    fn get_read(&self, start: u64) -> parquet::errors::Result<Self::T> {
        match self {
            InputFile::File(f) => f.get_read(start),
            InputFile::Custom(c) => c.get_read(start),
            InputFile::Bytes(b) => {
                let len = b.len();
                if start as usize > len {
                    return Err(ParquetError::IndexOutOfBound(start as usize, len));
                }
                Ok(Box::new(io::Cursor::new(b.slice(start as usize..))))
            }
        }
    }

    fn get_bytes(&self, start: u64, length: usize) -> parquet::errors::Result<Bytes> {
        match self {
            InputFile::File(f) => f.get_bytes(start, length),
            InputFile::Custom(c) => c.get_bytes(start, length),
            InputFile::Bytes(b) => {
                check_range(start, length, b.len() as u64)?;
                let start = start as usize;
                Ok(b.slice(start..start + length))
            }
        }
    }
}

impl InputFile {
    /// Open a local file for random access
    pub fn from_path<P: AsRef<Path>>(path: P, buffer_size: usize) -> io::Result<Self> {
        Ok(InputFile::File(FileChunkReader::new(path, buffer_size)?))
    }

    pub fn from_bytes(bytes: Bytes) -> Self {
        InputFile::Bytes(bytes)
    }

    pub fn from_random_access(inner: Arc<dyn RandomAccessFile>, buffer_size: usize) -> Self {
        InputFile::Custom(CustomChunkReader { inner, buffer_size })
    }

    /// Total length in bytes
    pub fn size(&self) -> u64 {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[derive(Debug)]
    struct SliceFile(Vec<u8>);

    impl RandomAccessFile for SliceFile {
        fn size(&self) -> u64 {
            self.0.len() as u64
        }

        fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
            let offset = (offset as usize).min(self.0.len());
            let n = buf.len().min(self.0.len() - offset);
            buf[..n].copy_from_slice(&self.0[offset..offset + n]);
            Ok(n)
        }
    }

    fn read_all(reader: &InputFile, start: u64) -> Vec<u8> {
        let mut out = Vec::new();
        reader.get_read(start).unwrap().read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_bytes_ranges() {
        let file = InputFile::from_bytes(Bytes::from_static(b"0123456789"));
        assert_eq!(file.size(), 10);
        assert_eq!(file.get_bytes(2, 3).unwrap().as_ref(), b"234");
        assert_eq!(read_all(&file, 7), b"789");
        assert!(file.get_bytes(8, 5).is_err());
    }

    #[test]
    fn test_file_clones_do_not_share_cursor() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"abcdefghij").unwrap();
        tmp.flush().unwrap();

        let file = InputFile::from_path(tmp.path(), 4).unwrap();
        let clone = file.clone();

        let mut first = file.get_read(5).unwrap();
        let mut buf = [0u8; 2];
        first.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"fg");

        assert_eq!(clone.get_bytes(0, 3).unwrap().as_ref(), b"abc");
        assert_eq!(read_all(&clone, 8), b"ij");
    }

    #[test]
    fn test_missing_file() {
        let err = InputFile::from_path("/definitely/not/here.parquet", DEFAULT_BUFFER_SIZE)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_custom_random_access() {
        let file = InputFile::from_random_access(
            Arc::new(SliceFile(b"hello world".to_vec())),
            DEFAULT_BUFFER_SIZE,
        );
        assert_eq!(file.size(), 11);
        assert_eq!(file.get_bytes(6, 5).unwrap().as_ref(), b"world");
        assert_eq!(read_all(&file, 4), b"o world");
    }
}
