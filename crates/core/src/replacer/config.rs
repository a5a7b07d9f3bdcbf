//! Configuration for the replacer module.

/// Configuration for the file system replacer.
#[derive(Debug, Clone)]
pub struct ReplacerConfig {
    /// Buffer size for cross-volume copies in bytes.
    pub buffer_size: usize,

    /// Whether to try a rename before copying.
    pub prefer_atomic_moves: bool,
}

impl Default for ReplacerConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1024 * 1024,
            prefer_atomic_moves: true,
        }
    }
}

impl ReplacerConfig {
    /// Sets whether to try a rename before copying.
    pub fn with_atomic_moves(mut self, enabled: bool) -> Self {
        self.prefer_atomic_moves = enabled;
        self
    }

    /// Sets the copy buffer size.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }
}
