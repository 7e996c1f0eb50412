//! Schema validation utilities.
//!
//! Type tags are validated as they are read, so a schema that parsed is
//! guaranteed to only reference definitions inside its own table.

use crate::error::{Result, SchemaError};
use crate::types::{DefinitionKind, FieldType};

/// Resolves a type tag read for field `field` of definition `definition`.
///
/// # Errors
/// Returns [`SchemaError::InvalidType`] if the tag is neither a builtin nor
/// an index below `definition_count`.
pub fn resolve_type(
    tag: i32,
    definition_count: usize,
    definition: u32,
    field: u32,
) -> Result<FieldType> {
    FieldType::from_wire_tag(tag, definition_count).ok_or(SchemaError::InvalidType {
        definition,
        field,
        tag,
    })
}

/// Resolves a definition kind byte.
///
/// # Errors
/// Returns [`SchemaError::InvalidKind`] for anything but 0, 1 or 2.
pub fn resolve_kind(kind: u8, definition: u32) -> Result<DefinitionKind> {
    DefinitionKind::from_wire_value(kind).ok_or(SchemaError::InvalidKind { definition, kind })
}

#[cfg(test)]
mod tests {
    use super::*;
    use zephyr_core::BuiltinType;

    #[test]
    fn test_resolve_type_domain() {
        assert_eq!(
            resolve_type(-11, 0, 0, 0),
            Ok(FieldType::Builtin(BuiltinType::Uint64))
        );
        assert_eq!(resolve_type(0, 1, 0, 0), Ok(FieldType::Reference(0)));
        assert_eq!(
            resolve_type(1, 1, 0, 2),
            Err(SchemaError::InvalidType {
                definition: 0,
                field: 2,
                tag: 1
            })
        );
        assert!(resolve_type(-12, 5, 0, 0).is_err());
    }

    #[test]
    fn test_resolve_kind() {
        assert_eq!(resolve_kind(2, 0), Ok(DefinitionKind::Message));
        assert_eq!(
            resolve_kind(9, 4),
            Err(SchemaError::InvalidKind {
                definition: 4,
                kind: 9
            })
        );
    }
}
