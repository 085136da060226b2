//! Contiguous sub-range of a keyword file

use crate::block::TypedBlock;
use crate::file::error::{FileError, FileResult};
use crate::file::KeywordFile;

/// Blocks `start..end` of a [`KeywordFile`]
///
/// Occurrence numbers are relative to the view.
#[derive(Debug, Clone, Copy)]
pub struct KeywordView<'a> {
    file: &'a KeywordFile,
    start: usize,
    end: usize,
}

impl<'a> KeywordView<'a> {
    pub(crate) const fn new(file: &'a KeywordFile, start: usize, end: usize) -> Self {
        Self { file, start, end }
    }

    /// Number of blocks in the view
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// True when the view holds no blocks
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Index of the first block in the underlying file
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Number of blocks called `name` in the view
    pub fn num_named(&self, name: &str) -> usize {
        (self.start..self.end)
            .filter(|i| self.file.header_at(*i).name.matches(name))
            .count()
    }

    /// True when the view holds a block called `name`
    pub fn has(&self, name: &str) -> bool {
        self.num_named(name) > 0
    }

    /// Occurrence `occurrence` of `name` within the view
    pub fn get(&self, name: &str, occurrence: usize) -> FileResult<&'a TypedBlock> {
        let file = self.file;
        let index = (self.start..self.end)
            .filter(|i| file.header_at(*i).name.matches(name))
            .nth(occurrence)
            .ok_or_else(|| FileError::NotFound {
                name: name.to_string(),
                occurrence,
            })?;
        self.file.iget(index)
    }

    /// Block at position `index` within the view
    pub fn iget(&self, index: usize) -> FileResult<&'a TypedBlock> {
        if index >= self.len() {
            return Err(FileError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        self.file.iget(self.start + index)
    }
}
