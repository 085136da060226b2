//! Options for opening keyword files

use serde::{Deserialize, Serialize};

/// How a keyword file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenOptions {
    /// Formatted (ASCII) file; `None` detects it from the first byte
    pub formatted: Option<bool>,

    /// Byte order opposite to the host; `None` detects it from the first
    /// record marker
    pub endian_flip: Option<bool>,

    /// Defer reading block data until first access
    pub lazy: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            formatted: None,
            endian_flip: None,
            lazy: true,
        }
    }
}

impl OpenOptions {
    /// Auto-detecting, lazy options
    pub fn new() -> Self {
        Self::default()
    }

    /// Force formatted or unformatted mode
    #[must_use]
    pub const fn with_formatted(mut self, formatted: bool) -> Self {
        self.formatted = Some(formatted);
        self
    }

    /// Force the byte order
    #[must_use]
    pub const fn with_endian_flip(mut self, endian_flip: bool) -> Self {
        self.endian_flip = Some(endian_flip);
        self
    }

    /// Enable or disable lazy loading
    #[must_use]
    pub const fn with_lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }
}
