//! File system abstraction the datasource reads from and writes to

use crate::chunk_reader::{InputFile, DEFAULT_BUFFER_SIZE};
use crate::error::{DatasourceError, IoResultExt, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// Per-open options forwarded from the datasource configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpenOptions {
    /// Capacity of buffered readers and writers, in bytes
    pub buffer_size: Option<usize>,
}

impl OpenOptions {
    pub fn buffer_size(&self) -> usize {
        self.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE)
    }
}

/// Provides access to a file system (real or virtual).
pub trait FileSystem: Debug + Send + Sync {
    /// Open a file for random access.
    ///
    /// File systems that can only stream bytes front to back keep this
    /// default, which refuses the open.
    fn open_input_file(&self, path: &str, options: &OpenOptions) -> Result<InputFile> {
        let _ = options;
        Err(DatasourceError::NotSeekable {
            path: path.to_string(),
            reason: "file system only provides sequential streams".to_string(),
        })
    }

    /// Open a file for sequential reading
    fn open_input_stream(&self, path: &str, options: &OpenOptions)
        -> Result<Box<dyn Read + Send>>;

    /// Create or truncate a file for writing
    fn open_output_file(&self, path: &str, options: &OpenOptions)
        -> Result<Box<dyn Write + Send>>;
}

/// The local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn open_input_file(&self, path: &str, options: &OpenOptions) -> Result<InputFile> {
        InputFile::from_path(path, options.buffer_size()).with_path(path)
    }

    fn open_input_stream(
        &self,
        path: &str,
        options: &OpenOptions,
    ) -> Result<Box<dyn Read + Send>> {
        let file = File::open(path).with_path(path)?;
        Ok(Box::new(BufReader::with_capacity(options.buffer_size(), file)))
    }

    fn open_output_file(
        &self,
        path: &str,
        options: &OpenOptions,
    ) -> Result<Box<dyn Write + Send>> {
        let file = File::create(path).with_path(path)?;
        Ok(Box::new(BufWriter::with_capacity(options.buffer_size(), file)))
    }
}

type FileMap = HashMap<String, Bytes>;

/// Thread-safe in-memory file system
///
/// Clones share the same files. Written files become visible when their
/// writer is flushed or dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: Arc<Mutex<FileMap>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> MutexGuard<'_, FileMap> {
        // A panic while holding the lock cannot leave the map half-updated
        self.files.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert(&self, path: impl Into<String>, contents: impl Into<Bytes>) {
        self.files().insert(path.into(), contents.into());
    }

    pub fn get(&self, path: &str) -> Option<Bytes> {
        self.files().get(path).cloned()
    }

    pub fn remove(&self, path: &str) -> Option<Bytes> {
        self.files().remove(path)
    }

    /// Sorted list of stored paths
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<_> = self.files().keys().cloned().collect();
        paths.sort();
        paths
    }

    fn lookup(&self, path: &str) -> Result<Bytes> {
        self.get(path).ok_or_else(|| {
            DatasourceError::from_io(path, io::Error::from(io::ErrorKind::NotFound))
        })
    }
}

impl FileSystem for MemoryFileSystem {
    fn open_input_file(&self, path: &str, _options: &OpenOptions) -> Result<InputFile> {
        Ok(InputFile::from_bytes(self.lookup(path)?))
    }

    fn open_input_stream(
        &self,
        path: &str,
        _options: &OpenOptions,
    ) -> Result<Box<dyn Read + Send>> {
        Ok(Box::new(io::Cursor::new(self.lookup(path)?)))
    }

    fn open_output_file(
        &self,
        path: &str,
        _options: &OpenOptions,
    ) -> Result<Box<dyn Write + Send>> {
        self.insert(path, Bytes::new());
        Ok(Box::new(MemoryWriter {
            path: path.to_string(),
            buffer: Vec::new(),
            files: self.files.clone(),
        }))
    }
}

/// Writer that publishes its buffer into a [`MemoryFileSystem`]
struct MemoryWriter {
    path: String,
    buffer: Vec<u8>,
    files: Arc<Mutex<FileMap>>,
}

impl MemoryWriter {
    fn commit(&self) {
        let mut files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        files.insert(self.path.clone(), Bytes::copy_from_slice(&self.buffer));
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.commit();
        Ok(())
    }
}

impl Drop for MemoryWriter {
    fn drop(&mut self) {
        self.commit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_options_deserialize() {
        let opts: OpenOptions = serde_json::from_str(r#"{"buffer_size": 4096}"#).unwrap();
        assert_eq!(opts.buffer_size(), 4096);

        let opts: OpenOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.buffer_size(), DEFAULT_BUFFER_SIZE);

        assert!(serde_json::from_str::<OpenOptions>(r#"{"buffer": 1}"#).is_err());
    }

    #[test]
    fn test_memory_writer_commits_on_drop() {
        let fs = MemoryFileSystem::new();
        {
            let mut out = fs.open_output_file("a.bin", &OpenOptions::default()).unwrap();
            out.write_all(b"abc").unwrap();
        }
        assert_eq!(fs.get("a.bin").unwrap().as_ref(), b"abc");
    }

    #[test]
    fn test_memory_writer_commits_on_flush() {
        let fs = MemoryFileSystem::new();
        let mut out = fs.open_output_file("b.bin", &OpenOptions::default()).unwrap();
        out.write_all(b"xyz").unwrap();
        assert_eq!(fs.get("b.bin").unwrap().len(), 0);
        out.flush().unwrap();
        assert_eq!(fs.get("b.bin").unwrap().as_ref(), b"xyz");
    }

    #[test]
    fn test_memory_not_found() {
        let fs = MemoryFileSystem::new();
        let err = fs
            .open_input_file("missing.parquet", &OpenOptions::default())
            .unwrap_err();
        assert!(matches!(err, DatasourceError::NotFound { ref path, .. } if path == "missing.parquet"));
    }

    #[test]
    fn test_memory_stream() {
        let fs = MemoryFileSystem::new();
        fs.insert("s.txt", &b"stream"[..]);

        let mut out = String::new();
        fs.open_input_stream("s.txt", &OpenOptions::default())
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "stream");
        assert_eq!(fs.paths(), vec!["s.txt".to_string()]);
    }

    #[test]
    fn test_local_not_found() {
        let err = LocalFileSystem
            .open_input_file("/no/such/dir/file.parquet", &OpenOptions::default())
            .unwrap_err();
        assert!(matches!(err, DatasourceError::NotFound { .. }));
    }
}
