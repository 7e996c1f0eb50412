//! Error types for Zephyr core operations.

use thiserror::Error;

/// Core error type for buffer reads and arena lookups.
///
/// Reads never roll the cursor back: when one of these is returned, any
/// bytes consumed by earlier sub-reads of the same primitive stay consumed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Buffer is too short for the requested read.
    #[error("buffer too short: required {required} bytes, available {available} bytes")]
    BufferTooShort {
        /// Bytes the read needed from the cursor.
        required: usize,
        /// Bytes left between the cursor and the end of the buffer.
        available: usize,
    },

    /// Invalid UTF-8 encoding in a string field.
    #[error("invalid UTF-8 at offset {offset}")]
    InvalidUtf8 {
        /// Byte offset where the string payload starts.
        offset: usize,
    },

    /// Span was handed out before the arena was last cleared.
    #[error("stale arena span: span generation {span}, arena generation {arena}")]
    StaleSpan {
        /// Generation recorded in the span.
        span: u32,
        /// Current generation of the arena.
        arena: u32,
    },
}

/// Result type alias for Zephyr core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_too_short_display() {
        let err = Error::BufferTooShort {
            required: 8,
            available: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("buffer too short"));
        assert!(msg.contains('8'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn test_stale_span_display() {
        let err = Error::StaleSpan { span: 1, arena: 2 };
        assert!(err.to_string().contains("stale arena span"));
    }
}
