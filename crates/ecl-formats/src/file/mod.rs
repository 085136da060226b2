//! Keyword files: ordered collections of typed blocks
//!
//! A keyword file (`.EGRID`, `.INIT`, `.UNRST`, ...) is a plain sequence of
//! blocks. Blocks are addressed by `(name, occurrence)` where occurrences
//! count from zero per name in file order, or by position.
//!
//! Opening an unformatted file walks every record once to build the index
//! and verify framing; block data is decoded on first access unless
//! [`OpenOptions::lazy`] is off. Formatted files are always read eagerly.
//!
//! ```no_run
//! use ecl_formats::file::KeywordFile;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let egrid = KeywordFile::open("CASE.EGRID")?;
//! let gridhead = egrid.get("GRIDHEAD", 0)?;
//! println!("nx = {:?}", gridhead.as_int().map(|h| h[1]));
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod view;

pub use config::OpenOptions;
pub use error::{FileError, FileResult};
pub use view::KeywordView;

use crate::block::{BlockHeader, BlockName, TypedBlock};
use crate::record_io::{self, ECLIPSE_ENDIAN_FLIP, RecordIo};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

/// Byte source a keyword file can be read from
trait Source: BufRead + Seek + Send {}

impl<T: BufRead + Seek + Send> Source for T {}

type SourceReader = RecordIo<Box<dyn Source>>;

struct Entry {
    header: BlockHeader,
    offset: u64,
    block: OnceLock<TypedBlock>,
}

/// Ordered, indexed collection of blocks from one file
pub struct KeywordFile {
    path: Option<PathBuf>,
    entries: Vec<Entry>,
    by_name: HashMap<BlockName, Vec<usize>>,
    reader: Mutex<Option<SourceReader>>,
}

impl fmt::Debug for KeywordFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeywordFile")
            .field("path", &self.path)
            .field("blocks", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl KeywordFile {
    /// Open a file, detecting formatted mode and byte order
    pub fn open<P: AsRef<Path>>(path: P) -> FileResult<Self> {
        Self::open_with(path, &OpenOptions::default())
    }

    /// Open a file with explicit options
    pub fn open_with<P: AsRef<Path>>(path: P, options: &OpenOptions) -> FileResult<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let (formatted, endian_flip) = Self::detect(&mut reader, options)?;
        let io = RecordIo::new(Box::new(reader) as Box<dyn Source>, formatted, endian_flip);
        let mut file = Self::index(io, options.lazy)?;
        info!(
            "Opened keyword file {} with {} blocks",
            path.display(),
            file.entries.len()
        );
        file.path = Some(path.to_path_buf());
        Ok(file)
    }

    /// Read an unformatted file held in memory
    pub fn from_bytes(bytes: Vec<u8>, endian_flip: bool) -> FileResult<Self> {
        let io = RecordIo::new(
            Box::new(Cursor::new(bytes)) as Box<dyn Source>,
            false,
            endian_flip,
        );
        Self::index(io, true)
    }

    /// Collection over already constructed blocks
    pub fn from_blocks(blocks: Vec<TypedBlock>) -> Self {
        let entries = blocks
            .into_iter()
            .map(|block| Entry {
                header: block.header(),
                offset: 0,
                block: OnceLock::from(block),
            })
            .collect();
        Self::with_entries(entries, None)
    }

    /// Resolve `(formatted, endian_flip)` from options and the file head
    fn detect<S: BufRead + Seek>(
        stream: &mut S,
        options: &OpenOptions,
    ) -> FileResult<(bool, bool)> {
        let formatted = match options.formatted {
            Some(formatted) => formatted,
            None => record_io::guess_formatted(stream)?,
        };
        let endian_flip = match options.endian_flip {
            Some(flip) => flip,
            None if formatted => false,
            None => record_io::guess_endian_flip(stream)?.unwrap_or(ECLIPSE_ENDIAN_FLIP),
        };
        debug!("Detected formatted={formatted}, endian_flip={endian_flip}");
        Ok((formatted, endian_flip))
    }

    fn with_entries(entries: Vec<Entry>, reader: Option<SourceReader>) -> Self {
        let mut by_name: HashMap<BlockName, Vec<usize>> = HashMap::new();
        for (index, entry) in entries.iter().enumerate() {
            by_name.entry(entry.header.name).or_default().push(index);
        }
        Self {
            path: None,
            entries,
            by_name,
            reader: Mutex::new(reader),
        }
    }

    /// Walk the whole stream, recording headers and offsets
    fn index(mut io: SourceReader, lazy: bool) -> FileResult<Self> {
        let lazy = lazy && !io.is_formatted();
        let mut entries = Vec::new();
        loop {
            let offset = io.position()?;
            let header = match TypedBlock::read_header(&mut io) {
                Ok(header) => header,
                Err(e) if e.is_eof() => break,
                Err(e) => return Err(e.into()),
            };
            let block = OnceLock::new();
            if lazy {
                TypedBlock::skip_data(&mut io, &header)?;
            } else {
                let data = TypedBlock::read_data(&mut io, &header)?;
                let _ = block.set(TypedBlock::new(header.name.as_str(), data)?);
            }
            entries.push(Entry {
                header,
                offset,
                block,
            });
        }
        debug!("Indexed {} blocks (lazy={lazy})", entries.len());
        Ok(Self::with_entries(entries, lazy.then_some(io)))
    }

    /// Path the file was opened from
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of blocks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the file holds no blocks
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn header_at(&self, index: usize) -> &BlockHeader {
        &self.entries[index].header
    }

    /// Number of blocks called `name`
    pub fn num_named(&self, name: &str) -> usize {
        BlockName::new(name)
            .ok()
            .and_then(|name| self.by_name.get(&name))
            .map_or(0, Vec::len)
    }

    /// True when at least one block is called `name`
    pub fn has(&self, name: &str) -> bool {
        self.num_named(name) > 0
    }

    /// Headers in file order with their per-name occurrence
    pub fn headers(&self) -> impl Iterator<Item = (BlockHeader, usize)> + '_ {
        let mut seen: HashMap<BlockName, usize> = HashMap::new();
        self.entries.iter().map(move |entry| {
            let occurrence = seen.entry(entry.header.name).or_insert(0);
            let current = *occurrence;
            *occurrence += 1;
            (entry.header, current)
        })
    }

    /// Distinct block names in order of first occurrence
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for entry in &self.entries {
            let name = entry.header.name.as_str();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Position of occurrence `occurrence` of `name`
    pub fn index_of(&self, name: &str, occurrence: usize) -> Option<usize> {
        let name = BlockName::new(name).ok()?;
        self.by_name.get(&name)?.get(occurrence).copied()
    }

    /// Occurrence `occurrence` of block `name`, loading it if needed
    pub fn get(&self, name: &str, occurrence: usize) -> FileResult<&TypedBlock> {
        let index = self
            .index_of(name, occurrence)
            .ok_or_else(|| FileError::NotFound {
                name: name.to_string(),
                occurrence,
            })?;
        self.iget(index)
    }

    /// Block at position `index`, loading it if needed
    pub fn iget(&self, index: usize) -> FileResult<&TypedBlock> {
        let entry = self.entries.get(index).ok_or(FileError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })?;
        if let Some(block) = entry.block.get() {
            return Ok(block);
        }

        let mut guard = self.reader.lock();
        // Another thread may have loaded it while we waited
        if let Some(block) = entry.block.get() {
            return Ok(block);
        }
        let io = guard.as_mut().ok_or(FileError::ReaderClosed(index))?;
        io.seek(entry.offset)?;
        let block = TypedBlock::read(io)?;
        if block.block_name() != &entry.header.name {
            return Err(FileError::HeaderChanged {
                offset: entry.offset,
                expected: entry.header.name.to_string(),
                found: block.name().to_string(),
            });
        }
        debug!("Loaded block {} ({} elements)", block.name(), block.count());
        Ok(entry.block.get_or_init(|| block))
    }

    /// Load every block and release the file reader
    pub fn load_all(&mut self) -> FileResult<()> {
        for index in 0..self.entries.len() {
            self.iget(index)?;
        }
        if self.reader.get_mut().take().is_some() {
            debug!("Released reader after loading {} blocks", self.entries.len());
        }
        Ok(())
    }

    /// Blocks from occurrence `occurrence` of `name` up to the next `name`
    pub fn block_view(&self, name: &str, occurrence: usize) -> FileResult<KeywordView<'_>> {
        let start = self
            .index_of(name, occurrence)
            .ok_or_else(|| FileError::NotFound {
                name: name.to_string(),
                occurrence,
            })?;
        let end = self
            .index_of(name, occurrence + 1)
            .unwrap_or(self.entries.len());
        Ok(KeywordView::new(self, start, end))
    }

    /// View over every block
    pub fn view(&self) -> KeywordView<'_> {
        KeywordView::new(self, 0, self.entries.len())
    }

    /// Write all blocks to a record handle
    pub fn write_to<S: Write + Seek>(&self, io: &mut RecordIo<S>) -> FileResult<()> {
        for index in 0..self.entries.len() {
            self.iget(index)?.write(io)?;
        }
        io.flush()?;
        Ok(())
    }

    /// Write all blocks to a new file
    pub fn write<P: AsRef<Path>>(
        &self,
        path: P,
        formatted: bool,
        endian_flip: bool,
    ) -> FileResult<()> {
        let path = path.as_ref();
        let mut io = RecordIo::open_writer(path, formatted, endian_flip)?;
        self.write_to(&mut io)?;
        info!("Wrote {} blocks to {}", self.entries.len(), path.display());
        Ok(())
    }
}
