//! Schema engine configuration.

use zephyr_core::DEFAULT_SEGMENT_SIZE;

/// Default bound on struct/message nesting during skip and dynamic decode.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default bound on array and map elements materialised by one dynamic
/// decode call.
pub const DEFAULT_MAX_ELEMENTS: usize = 1 << 24;

/// Tunables for a [`Schema`](crate::Schema) instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaOptions {
    /// Maximum nesting of struct and message bodies followed by a single
    /// skip or decode call. Schemas may reference themselves, so this caps
    /// stack use against hostile data.
    pub max_depth: usize,
    /// Default segment size of the arena holding schema names.
    pub arena_segment_size: usize,
    /// Maximum array and map elements one [`Schema::decode`](crate::Schema::decode)
    /// call may produce, counted across all nesting levels. Elements that
    /// occupy no bytes on the wire are otherwise unbounded by input size.
    pub max_elements: usize,
}

impl SchemaOptions {
    /// Creates options with the defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            arena_segment_size: DEFAULT_SEGMENT_SIZE,
            max_elements: DEFAULT_MAX_ELEMENTS,
        }
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the element limit for dynamic decoding.
    #[must_use]
    pub const fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = max_elements;
        self
    }

    /// Sets the arena segment size.
    #[must_use]
    pub const fn with_arena_segment_size(mut self, size: usize) -> Self {
        self.arena_segment_size = size;
        self
    }
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self::new()
    }
}
