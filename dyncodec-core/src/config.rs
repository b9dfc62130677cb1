//! Codec limits and tuning.

/// Default recursion ceiling for nested messages.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default cap on a decoded unbounded sequence count.
pub const DEFAULT_MAX_SEQUENCE_LEN: usize = 16 * 1024 * 1024;

/// Default cap on a decoded unbounded string length, in elements.
pub const DEFAULT_MAX_STRING_LEN: usize = 64 * 1024 * 1024;

/// Default cap on a decoded sequence of elements that occupy no wire bytes.
pub const DEFAULT_MAX_EMPTY_ELEMENTS: usize = 4096;

/// Default first reservation for an output buffer.
pub const DEFAULT_INITIAL_CAPACITY: usize = 256;

/// Limits applied by the adapter, serializer and deserializer.
///
/// # Example
/// ```
/// use dyncodec_core::CodecConfig;
///
/// let config = CodecConfig::new()
///     .max_depth(16)
///     .max_sequence_len(4096);
/// assert_eq!(config.depth_limit(), 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    max_depth: usize,
    max_sequence_len: usize,
    max_string_len: usize,
    max_empty_elements: usize,
    initial_capacity: usize,
}

impl CodecConfig {
    /// Creates a configuration with default limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_sequence_len: DEFAULT_MAX_SEQUENCE_LEN,
            max_string_len: DEFAULT_MAX_STRING_LEN,
            max_empty_elements: DEFAULT_MAX_EMPTY_ELEMENTS,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }

    /// Sets the recursion ceiling for nested messages.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the cap on a decoded unbounded sequence count.
    #[must_use]
    pub const fn max_sequence_len(mut self, len: usize) -> Self {
        self.max_sequence_len = len;
        self
    }

    /// Sets the cap on a decoded unbounded string length.
    #[must_use]
    pub const fn max_string_len(mut self, len: usize) -> Self {
        self.max_string_len = len;
        self
    }

    /// Sets the cap on a decoded sequence whose element type has no wire
    /// bytes. Such counts cannot be checked against the remaining input.
    #[must_use]
    pub const fn max_empty_elements(mut self, len: usize) -> Self {
        self.max_empty_elements = len;
        self
    }

    /// Sets the first reservation for output buffers.
    #[must_use]
    pub const fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Returns the recursion ceiling.
    #[must_use]
    pub const fn depth_limit(&self) -> usize {
        self.max_depth
    }

    /// Returns the unbounded sequence cap.
    #[must_use]
    pub const fn sequence_limit(&self) -> usize {
        self.max_sequence_len
    }

    /// Returns the unbounded string cap.
    #[must_use]
    pub const fn string_limit(&self) -> usize {
        self.max_string_len
    }

    /// Returns the zero-width element sequence cap.
    #[must_use]
    pub const fn empty_element_limit(&self) -> usize {
        self.max_empty_elements
    }

    /// Returns the first output reservation.
    #[must_use]
    pub const fn capacity_hint(&self) -> usize {
        self.initial_capacity
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::new()
    }
}
