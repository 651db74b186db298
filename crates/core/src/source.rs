//! Input stream abstraction feeding the lexer.
//!
//! The [`InputStream`] trait is a pull-based chunk source: the lexer asks for
//! more bytes whenever its buffer runs dry. [`StringInputStream`] serves an
//! in-memory document; [`ReaderInputStream`] (and its [`FileInputStream`]
//! alias) reads bounded, line-oriented chunks from any buffered reader.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::ParseError;

/// Pull-based source of document bytes.
pub trait InputStream {
    /// Return the next chunk of bytes. An empty chunk means nothing was
    /// produced by this call, not necessarily that the stream is finished.
    fn read(&mut self) -> std::io::Result<Vec<u8>>;

    /// True once the stream will never produce more bytes.
    fn is_end_of_stream(&self) -> bool;
}

impl<S: InputStream + ?Sized> InputStream for &mut S {
    fn read(&mut self) -> std::io::Result<Vec<u8>> {
        (**self).read()
    }

    fn is_end_of_stream(&self) -> bool {
        (**self).is_end_of_stream()
    }
}

impl<S: InputStream + ?Sized> InputStream for Box<S> {
    fn read(&mut self) -> std::io::Result<Vec<u8>> {
        (**self).read()
    }

    fn is_end_of_stream(&self) -> bool {
        (**self).is_end_of_stream()
    }
}

/// In-memory stream: yields the whole buffer once, then reports end-of-stream.
#[derive(Debug, Clone)]
pub struct StringInputStream {
    buffer: Vec<u8>,
    end_of_stream: bool,
}

impl StringInputStream {
    pub fn new(buffer: impl Into<Vec<u8>>) -> Self {
        Self {
            buffer: buffer.into(),
            end_of_stream: false,
        }
    }
}

impl InputStream for StringInputStream {
    fn read(&mut self) -> std::io::Result<Vec<u8>> {
        self.end_of_stream = true;
        Ok(std::mem::take(&mut self.buffer))
    }

    fn is_end_of_stream(&self) -> bool {
        self.end_of_stream
    }
}

/// Maximum number of bytes handed out by a single [`ReaderInputStream::read`].
pub const CHUNK_SIZE: usize = 4096;

/// Buffered backing-store stream.
///
/// Each read returns at most [`CHUNK_SIZE`] bytes and stops after the first
/// newline, so chunks follow the document's lines.
#[derive(Debug)]
pub struct ReaderInputStream<R> {
    reader: R,
    end_of_stream: bool,
}

/// File-backed stream.
pub type FileInputStream = ReaderInputStream<BufReader<File>>;

impl<R: BufRead> ReaderInputStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            end_of_stream: false,
        }
    }
}

impl FileInputStream {
    /// Open `path` for reading. Failure to open is fatal.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ParseError::stream(format!("failed to open file {}", path.display()), e)
        })?;
        Ok(ReaderInputStream::new(BufReader::new(file)))
    }
}

impl<R: BufRead> InputStream for ReaderInputStream<R> {
    fn read(&mut self) -> std::io::Result<Vec<u8>> {
        if self.end_of_stream {
            return Ok(Vec::new());
        }
        let mut chunk = Vec::new();
        let n = (&mut self.reader)
            .take(CHUNK_SIZE as u64)
            .read_until(b'\n', &mut chunk)?;
        if n == 0 {
            self.end_of_stream = true;
        }
        Ok(chunk)
    }

    fn is_end_of_stream(&self) -> bool {
        self.end_of_stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn string_stream_yields_buffer_once() {
        let mut stream = StringInputStream::new("name {}");
        assert!(!stream.is_end_of_stream());
        assert_eq!(stream.read().unwrap(), b"name {}");
        assert!(stream.is_end_of_stream());
        assert!(stream.read().unwrap().is_empty());
    }

    #[test]
    fn reader_stream_reads_line_by_line() {
        let mut stream = ReaderInputStream::new(Cursor::new("a {\n}\n"));
        assert_eq!(stream.read().unwrap(), b"a {\n");
        assert_eq!(stream.read().unwrap(), b"}\n");
        assert!(!stream.is_end_of_stream());
        assert!(stream.read().unwrap().is_empty());
        assert!(stream.is_end_of_stream());
    }

    #[test]
    fn reader_stream_bounds_long_lines() {
        let line = "x".repeat(CHUNK_SIZE + 10);
        let mut stream = ReaderInputStream::new(Cursor::new(line));
        assert_eq!(stream.read().unwrap().len(), CHUNK_SIZE);
        assert_eq!(stream.read().unwrap().len(), 10);
    }

    #[test]
    fn open_missing_file_is_stream_error() {
        let err = FileInputStream::open("/nonexistent/dir/doc.tdoc").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Stream);
        assert!(err.to_string().contains("failed to open file"));
    }
}
