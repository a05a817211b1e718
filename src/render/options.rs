//! Rendering and saving options.

/// Options for writing a document back to a `.docx` package.
#[derive(Debug, Clone)]
pub struct SaveOptions {
    /// Compression used for every part
    pub compression: Compression,

    /// Set the core-properties modification date to the time of saving
    pub touch_modified: bool,
}

impl SaveOptions {
    /// Create new save options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compression method.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Store parts without compression.
    pub fn stored(mut self) -> Self {
        self.compression = Compression::Stored;
        self
    }

    /// Enable or disable updating the modification date.
    pub fn with_touch_modified(mut self, touch: bool) -> Self {
        self.touch_modified = touch;
        self
    }
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            compression: Compression::Deflated,
            touch_modified: false,
        }
    }
}

/// Zip compression for package parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Deflate (what Word writes)
    #[default]
    Deflated,
    /// No compression
    Stored,
}

/// Options for plain-text rendering.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Include header and footer text before and after the body
    pub include_headers_footers: bool,

    /// Render line breaks inside a paragraph as spaces
    pub join_line_breaks: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable header/footer text.
    pub fn with_headers_footers(mut self, include: bool) -> Self {
        self.include_headers_footers = include;
        self
    }

    /// Enable or disable joining in-paragraph line breaks.
    pub fn with_joined_line_breaks(mut self, join: bool) -> Self {
        self.join_line_breaks = join;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_headers_footers: true,
            join_line_breaks: false,
        }
    }
}
