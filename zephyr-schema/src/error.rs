//! Error types for schema parsing, skipping and dynamic decoding.

use thiserror::Error;

/// Error type for schema operations.
///
/// None of these roll the read cursor back; after an error the buffer is
/// positioned wherever the last successful read left it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Short read or malformed primitive in the underlying buffer.
    #[error("decode error: {0}")]
    Decode(#[from] zephyr_core::Error),

    /// Definition kind byte is not Enum, Struct or Message.
    #[error("invalid kind {kind} for definition {definition}")]
    InvalidKind {
        /// Index of the offending definition.
        definition: u32,
        /// Kind byte found on the wire.
        kind: u8,
    },

    /// Field type tag is neither a builtin nor a definition index in range.
    #[error("invalid type tag {tag} on field {field} of definition {definition}")]
    InvalidType {
        /// Index of the owning definition.
        definition: u32,
        /// Position of the field inside its definition.
        field: u32,
        /// Tag found on the wire.
        tag: i32,
    },

    /// Definition index is past the end of the table.
    #[error("definition index {index} out of range for {count} definitions")]
    DefinitionOutOfRange {
        /// Requested index.
        index: u32,
        /// Number of definitions in the schema.
        count: usize,
    },

    /// Field id is not declared on the definition.
    #[error("field id {field_id} not declared on definition {definition}")]
    UnknownField {
        /// Definition that was searched.
        definition: u32,
        /// Field id that was not found.
        field_id: u32,
    },

    /// No definition carries the requested name.
    #[error("definition '{name}' not found")]
    DefinitionNotFound {
        /// Name that was looked up.
        name: String,
    },

    /// The last parse failed; the definition table must not be queried.
    #[error("schema is not parsed")]
    NotParsed,

    /// Struct/message nesting went deeper than the configured limit.
    #[error("nesting depth limit of {limit} exceeded")]
    DepthLimitExceeded {
        /// Configured maximum depth.
        limit: usize,
    },

    /// A dynamic decode produced more array/map elements than allowed.
    #[error("element limit of {limit} exceeded")]
    ElementLimitExceeded {
        /// Configured maximum element count.
        limit: usize,
    },

    /// A dynamic value does not match the shape the schema declares.
    #[error("value mismatch: expected {expected}, found {found}")]
    ValueMismatch {
        /// Shape the schema declares.
        expected: String,
        /// Kind of value supplied.
        found: &'static str,
    },

    /// A struct value is missing one of the declared fields.
    #[error("missing field '{field}' in '{definition}'")]
    MissingField {
        /// Definition name.
        definition: String,
        /// Field name.
        field: String,
    },

    /// A value names a field the definition does not declare.
    #[error("no field named '{field}' in '{definition}'")]
    UnknownFieldName {
        /// Definition name.
        definition: String,
        /// Field name.
        field: String,
    },
}

impl SchemaError {
    /// Creates a value mismatch error.
    pub fn mismatch(expected: impl Into<String>, found: &'static str) -> Self {
        Self::ValueMismatch {
            expected: expected.into(),
            found,
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(definition: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            definition: definition.into(),
            field: field.into(),
        }
    }

    /// Creates an unknown field name error.
    pub fn unknown_field_name(definition: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownFieldName {
            definition: definition.into(),
            field: field.into(),
        }
    }

    /// Returns true if the error came from a short or malformed read.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Result type alias for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_core_error() {
        let err: SchemaError = zephyr_core::Error::BufferTooShort {
            required: 1,
            available: 0,
        }
        .into();
        assert!(err.is_decode());
        assert!(err.to_string().contains("buffer too short"));
    }

    #[test]
    fn test_helper_constructors() {
        let err = SchemaError::missing_field("Point", "x");
        assert_eq!(err.to_string(), "missing field 'x' in 'Point'");

        let err = SchemaError::mismatch("uint", "string");
        assert!(matches!(err, SchemaError::ValueMismatch { found: "string", .. }));
    }
}
