//! Sequential I/O over Fortran framed records
//!
//! Unformatted ECLIPSE files are written by Fortran sequential I/O: every
//! record is surrounded by two 4-byte markers holding the payload length.
//!
//! ```text
//! [len: i32][payload: len bytes][len: i32]
//! ```
//!
//! The marker byte order is chosen when the handle is created. ECLIPSE
//! writes big-endian files, so on a little-endian host the usual value of
//! `endian_flip` is `true`.
//!
//! Formatted files have no markers; a "record" is one non-blank text line.
//!
//! # Example
//!
//! ```
//! use ecl_formats::record_io::RecordIo;
//! use std::io::Cursor;
//!
//! let mut io = RecordIo::new(Cursor::new(Vec::new()), false, true);
//! io.write_record(b"payload").expect("write");
//! io.rewind().expect("rewind");
//!
//! let record = io.read_record().expect("read");
//! assert_eq!(record, b"payload");
//! assert!(io.read_record().expect_err("eof").is_eof());
//! ```

mod error;

pub use error::{RecordIoError, RecordIoResult};

use binrw::Endian;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Size of one record marker in bytes
pub const MARKER_SIZE: u64 = 4;

/// Endian flip matching ECLIPSE's big-endian files on this host
pub const ECLIPSE_ENDIAN_FLIP: bool = cfg!(target_endian = "little");

/// Record handle backed by a buffered file reader
pub type FileReader = RecordIo<BufReader<File>>;

/// Record handle backed by a buffered file writer
pub type FileWriter = RecordIo<BufWriter<File>>;

/// Byte order of a file given the endian flip flag
pub const fn endian_from_flip(endian_flip: bool) -> Endian {
    match (endian_flip, Endian::NATIVE) {
        (false, native) => native,
        (true, Endian::Big) => Endian::Little,
        (true, Endian::Little) => Endian::Big,
    }
}

/// Sequential record reader/writer
///
/// All cursor state lives in the handle; there is no process-wide state.
#[derive(Debug)]
pub struct RecordIo<S> {
    stream: S,
    endian: Endian,
    formatted: bool,
    path: Option<PathBuf>,
    stream_len: Option<u64>,
}

impl<S> RecordIo<S> {
    /// Wrap a stream
    pub fn new(stream: S, formatted: bool, endian_flip: bool) -> Self {
        Self {
            stream,
            endian: endian_from_flip(endian_flip),
            formatted,
            path: None,
            stream_len: None,
        }
    }

    /// Byte order used for markers and numeric payloads
    pub const fn endian(&self) -> Endian {
        self.endian
    }

    /// Whether the handle is in formatted (ASCII) mode
    pub const fn is_formatted(&self) -> bool {
        self.formatted
    }

    /// Path the handle was opened from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Borrow the underlying stream
    pub const fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Unwrap the underlying stream
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl FileReader {
    /// Open a file for sequential record reading
    pub fn open_reader<P: AsRef<Path>>(
        path: P,
        formatted: bool,
        endian_flip: bool,
    ) -> RecordIoResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        debug!(
            "Opened {} for reading (formatted={}, endian_flip={})",
            path.display(),
            formatted,
            endian_flip
        );
        let mut io = Self::new(BufReader::new(file), formatted, endian_flip);
        io.path = Some(path.to_path_buf());
        Ok(io)
    }
}

impl FileWriter {
    /// Create (or truncate) a file for sequential record writing
    pub fn open_writer<P: AsRef<Path>>(
        path: P,
        formatted: bool,
        endian_flip: bool,
    ) -> RecordIoResult<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        debug!(
            "Opened {} for writing (formatted={}, endian_flip={})",
            path.display(),
            formatted,
            endian_flip
        );
        let mut io = Self::new(BufWriter::new(file), formatted, endian_flip);
        io.path = Some(path.to_path_buf());
        Ok(io)
    }
}

impl RecordIo<File> {
    /// Open an existing file for writing and truncation without clearing it
    pub fn open_update<P: AsRef<Path>>(
        path: P,
        formatted: bool,
        endian_flip: bool,
    ) -> RecordIoResult<Self> {
        let path = path.as_ref();
        let file = std::fs::OpenOptions::new().read(true).write(true).open(path)?;
        let mut io = Self::new(file, formatted, endian_flip);
        io.path = Some(path.to_path_buf());
        Ok(io)
    }
}

impl<S: Seek> RecordIo<S> {
    /// Current byte offset
    pub fn position(&mut self) -> RecordIoResult<u64> {
        Ok(self.stream.stream_position()?)
    }

    /// Move to an absolute byte offset
    pub fn seek(&mut self, offset: u64) -> RecordIoResult<()> {
        self.stream.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Move back to the start of the stream
    pub fn rewind(&mut self) -> RecordIoResult<()> {
        self.seek(0)
    }

    fn stream_len(&mut self) -> RecordIoResult<u64> {
        if let Some(len) = self.stream_len {
            return Ok(len);
        }
        let current = self.stream.stream_position()?;
        let len = self.stream.seek(SeekFrom::End(0))?;
        self.stream.seek(SeekFrom::Start(current))?;
        self.stream_len = Some(len);
        Ok(len)
    }

    /// True when no bytes remain after the current position
    pub fn at_eof(&mut self) -> RecordIoResult<bool> {
        let len = self.stream_len()?;
        Ok(self.position()? >= len)
    }

    fn decode_marker(&self, bytes: [u8; 4]) -> i32 {
        match self.endian {
            Endian::Big => i32::from_be_bytes(bytes),
            Endian::Little => i32::from_le_bytes(bytes),
        }
    }

    fn encode_marker(&self, value: i32) -> [u8; 4] {
        match self.endian {
            Endian::Big => value.to_be_bytes(),
            Endian::Little => value.to_le_bytes(),
        }
    }
}

impl<S: Read + Seek> RecordIo<S> {
    /// Read a head or tail marker; `None` on a clean EOF
    fn read_marker(&mut self) -> RecordIoResult<Option<i32>> {
        let offset = self.stream.stream_position()?;
        let mut buf = [0u8; 4];
        let mut filled = 0;
        while filled < buf.len() {
            match self.stream.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        match filled {
            0 => Ok(None),
            4 => Ok(Some(self.decode_marker(buf))),
            available => Err(RecordIoError::TruncatedMarker { offset, available }),
        }
    }

    /// Read and validate a head marker, returning `(offset, length)`
    fn begin_record(&mut self) -> RecordIoResult<(u64, i32)> {
        let offset = self.stream.stream_position()?;
        let Some(length) = self.read_marker()? else {
            return Err(RecordIoError::EndOfFile);
        };
        if length < 0 {
            return Err(RecordIoError::NegativeLength { offset, length });
        }

        let stream_len = self.stream_len()?;
        let available = stream_len.saturating_sub(offset + MARKER_SIZE);
        let declared = length as u64;
        if declared + MARKER_SIZE > available {
            return Err(RecordIoError::TruncatedRecord {
                offset,
                declared,
                available,
            });
        }
        Ok((offset, length))
    }

    fn end_record(&mut self, offset: u64, head: i32) -> RecordIoResult<()> {
        match self.read_marker()? {
            Some(tail) if tail == head => Ok(()),
            Some(tail) => Err(RecordIoError::MarkerMismatch { offset, head, tail }),
            None => Err(RecordIoError::TruncatedMarker {
                offset: self.stream.stream_position()?,
                available: 0,
            }),
        }
    }

    /// Payload length of the next record without consuming it
    pub fn peek_record_len(&mut self) -> RecordIoResult<Option<i32>> {
        let offset = self.stream.stream_position()?;
        let marker = self.read_marker();
        self.stream.seek(SeekFrom::Start(offset))?;
        marker
    }

    /// Skip over one binary record, verifying that head and tail agree
    ///
    /// Returns the payload length.
    pub fn skip_record(&mut self) -> RecordIoResult<usize> {
        let (offset, length) = self.begin_record()?;
        self.stream.seek(SeekFrom::Current(i64::from(length)))?;
        self.end_record(offset, length)?;
        Ok(length as usize)
    }

    fn read_binary_record(&mut self) -> RecordIoResult<Vec<u8>> {
        let (offset, length) = self.begin_record()?;
        let mut payload = vec![0u8; length as usize];
        self.stream.read_exact(&mut payload).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                RecordIoError::TruncatedRecord {
                    offset,
                    declared: length as u64,
                    available: 0,
                }
            } else {
                e.into()
            }
        })?;
        self.end_record(offset, length)?;
        Ok(payload)
    }
}

impl<S: BufRead + Seek> RecordIo<S> {
    /// Read the next record
    ///
    /// Binary mode returns the payload between the markers; formatted mode
    /// returns the next non-blank line without its line terminator.
    pub fn read_record(&mut self) -> RecordIoResult<Vec<u8>> {
        if self.formatted {
            self.read_line_record()
        } else {
            self.read_binary_record()
        }
    }

    fn read_line_record(&mut self) -> RecordIoResult<Vec<u8>> {
        let mut line = Vec::new();
        loop {
            line.clear();
            if self.stream.read_until(b'\n', &mut line)? == 0 {
                return Err(RecordIoError::EndOfFile);
            }
            while matches!(line.last(), Some(b'\n' | b'\r')) {
                line.pop();
            }
            if line.iter().any(|b| !b.is_ascii_whitespace()) {
                return Ok(line);
            }
        }
    }
}

impl<S: Write + Seek> RecordIo<S> {
    /// Write one record
    pub fn write_record(&mut self, payload: &[u8]) -> RecordIoResult<()> {
        self.stream_len = None;
        if self.formatted {
            self.stream.write_all(payload)?;
            self.stream.write_all(b"\n")?;
            return Ok(());
        }

        let length =
            i32::try_from(payload.len()).map_err(|_| RecordIoError::RecordTooLarge(payload.len()))?;
        let marker = self.encode_marker(length);
        self.stream.write_all(&marker)?;
        self.stream.write_all(payload)?;
        self.stream.write_all(&marker)?;
        Ok(())
    }

    /// Flush buffered output
    pub fn flush(&mut self) -> RecordIoResult<()> {
        self.stream.flush()?;
        Ok(())
    }
}

/// Streams whose length can be cut
pub trait Truncate {
    /// Set the stream length to `len` bytes
    fn truncate_to(&mut self, len: u64) -> std::io::Result<()>;
}

impl Truncate for File {
    fn truncate_to(&mut self, len: u64) -> std::io::Result<()> {
        self.set_len(len)
    }
}

impl Truncate for BufWriter<File> {
    fn truncate_to(&mut self, len: u64) -> std::io::Result<()> {
        self.flush()?;
        self.get_ref().set_len(len)
    }
}

impl Truncate for BufReader<File> {
    #[allow(clippy::seek_from_current)]
    fn truncate_to(&mut self, len: u64) -> std::io::Result<()> {
        self.get_ref().set_len(len)?;
        // Drop buffered bytes that may lie past the new end
        self.seek(SeekFrom::Current(0))?;
        Ok(())
    }
}

impl Truncate for Cursor<Vec<u8>> {
    fn truncate_to(&mut self, len: u64) -> std::io::Result<()> {
        let len = usize::try_from(len)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        self.get_mut().truncate(len);
        Ok(())
    }
}

impl<S: Truncate + Seek> RecordIo<S> {
    /// Cut the underlying file to `new_size` bytes
    ///
    /// The cursor is clamped to the new end when it lies beyond it.
    pub fn truncate(&mut self, new_size: u64) -> RecordIoResult<()> {
        self.stream.truncate_to(new_size)?;
        self.stream_len = None;
        if self.stream.stream_position()? > new_size {
            self.stream.seek(SeekFrom::Start(new_size))?;
        }
        Ok(())
    }
}

/// Guess the endian flip of an unformatted keyword file
///
/// The first record of a keyword file is the 16-byte block header, so the
/// first marker must decode to 16 in the file's byte order. The stream
/// position is restored.
pub fn guess_endian_flip<S: Read + Seek>(stream: &mut S) -> RecordIoResult<Option<bool>> {
    const HEADER_RECORD_LEN: i32 = 16;

    let start = stream.stream_position()?;
    let mut buf = [0u8; 4];
    let read = stream.read(&mut buf)?;
    stream.seek(SeekFrom::Start(start))?;
    if read < buf.len() {
        return Ok(None);
    }

    for flip in [false, true] {
        let value = match endian_from_flip(flip) {
            Endian::Big => i32::from_be_bytes(buf),
            Endian::Little => i32::from_le_bytes(buf),
        };
        if value == HEADER_RECORD_LEN {
            return Ok(Some(flip));
        }
    }
    Ok(None)
}

/// Guess whether a keyword file is formatted
///
/// Formatted keyword files start with a quoted keyword name.
pub fn guess_formatted<S: Read + Seek>(stream: &mut S) -> RecordIoResult<bool> {
    let start = stream.stream_position()?;
    let mut buf = [0u8; 64];
    let read = stream.read(&mut buf)?;
    stream.seek(SeekFrom::Start(start))?;
    Ok(buf[..read]
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'\''))
}
