//! Binary schema description parser.
//!
//! Layout of the description:
//! ```text
//! definitionCount     varuint32
//! per definition:
//!   name              string
//!   kind              byte (0 enum, 1 struct, 2 message)
//!   fieldCount        varuint32
//!   per field:
//!     name            string
//!     type            varint32 (negative builtin tag or definition index)
//!     isArray         byte
//!     isFixedArray    byte
//!     isMap           byte
//!     value           varuint32
//!     arraySize       varuint32, only if isFixedArray
//!     keyType         varint32, only if isMap
//! ```

use crate::error::{Result, SchemaError};
use crate::options::SchemaOptions;
use crate::types::{Definition, DefinitionIndex, Field, FieldShape, Schema, SchemaState};
use crate::validation::{resolve_kind, resolve_type};
use zephyr_core::{Arena, ByteBuffer};

impl Schema {
    /// Parses a binary schema description from a byte slice.
    ///
    /// # Errors
    /// Returns `SchemaError` on a short read, an invalid kind or an invalid
    /// type tag.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(bytes, SchemaOptions::default())
    }

    /// Parses a binary schema description with the given options.
    ///
    /// # Errors
    /// Returns `SchemaError` on a short read, an invalid kind or an invalid
    /// type tag.
    pub fn from_bytes_with_options(bytes: &[u8], options: SchemaOptions) -> Result<Self> {
        let mut schema = Self::with_options(options);
        schema.parse(&mut ByteBuffer::read_only(bytes))?;
        Ok(schema)
    }

    /// Parses a binary schema description, replacing the current table.
    ///
    /// The previous table and every name in the arena are discarded before
    /// reading starts. On failure the schema is left unusable: lookups and
    /// skips return [`SchemaError::NotParsed`] until a later parse succeeds.
    ///
    /// # Errors
    /// Returns `SchemaError` on a short read, an invalid kind or an invalid
    /// type tag.
    pub fn parse(&mut self, buffer: &mut ByteBuffer<'_>) -> Result<()> {
        self.definitions.clear();
        self.arena.clear();
        self.state = SchemaState::Failed;

        match read_definitions(buffer, &mut self.arena) {
            Ok(definitions) => {
                tracing::debug!(
                    definitions = definitions.len(),
                    fields = definitions.iter().map(|d| d.fields.len()).sum::<usize>(),
                    arena_bytes = self.arena.used_bytes(),
                    "schema parsed"
                );
                self.definitions = definitions;
                self.state = SchemaState::Ready;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, position = buffer.position(), "schema rejected");
                self.arena.clear();
                Err(err)
            }
        }
    }

    /// Finds a definition by exact byte equality of its name.
    ///
    /// # Errors
    /// Returns [`SchemaError::DefinitionNotFound`] on a miss, or
    /// [`SchemaError::NotParsed`] after a failed parse.
    pub fn find_definition(&self, name: impl AsRef<[u8]>) -> Result<DefinitionIndex> {
        let name = name.as_ref();
        self.table()?
            .iter()
            .position(|d| self.name(d.name) == name)
            .map(|index| index as DefinitionIndex)
            .ok_or_else(|| SchemaError::DefinitionNotFound {
                name: String::from_utf8_lossy(name).into_owned(),
            })
    }
}

fn read_definitions(buffer: &mut ByteBuffer<'_>, arena: &mut Arena) -> Result<Vec<Definition>> {
    let count = buffer.read_var_uint()? as usize;
    // A definition takes at least three bytes, so a hostile count cannot
    // force a large up-front allocation.
    let mut definitions = Vec::with_capacity(count.min(buffer.remaining()));

    for index in 0..count {
        let index = index as u32;
        let name = buffer.read_string_into(arena)?;
        let kind = buffer.read_byte()?;
        let field_count = buffer.read_var_uint()? as usize;
        let kind = resolve_kind(kind, index)?;

        let mut fields = Vec::with_capacity(field_count.min(buffer.remaining()));
        for position in 0..field_count {
            fields.push(read_field(buffer, arena, count, index, position as u32)?);
        }

        definitions.push(Definition { name, kind, fields });
    }

    Ok(definitions)
}

fn read_field(
    buffer: &mut ByteBuffer<'_>,
    arena: &mut Arena,
    definition_count: usize,
    definition: u32,
    position: u32,
) -> Result<Field> {
    let name = buffer.read_string_into(arena)?;
    let type_tag = buffer.read_var_int()?;
    let is_array = buffer.read_bool()?;
    let is_fixed_array = buffer.read_bool()?;
    let is_map = buffer.read_bool()?;
    let value = buffer.read_var_uint()?;
    let field_type = resolve_type(type_tag, definition_count, definition, position)?;

    let array_size = if is_fixed_array {
        Some(buffer.read_var_uint()?)
    } else {
        None
    };

    let key_type = if is_map {
        let key_tag = buffer.read_var_int()?;
        Some(resolve_type(key_tag, definition_count, definition, position)?)
    } else {
        None
    };

    Ok(Field {
        name,
        shape: FieldShape {
            field_type,
            is_array,
            array_size,
            key_type,
            value,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{FieldSpec, SchemaBuilder};
    use crate::types::{DefinitionKind, FieldType, Repetition};
    use zephyr_core::BuiltinType;

    fn sample_builder() -> SchemaBuilder {
        let mut builder = SchemaBuilder::new();
        let color = builder.definition("Color", DefinitionKind::Enum);
        let point = builder.definition("Point", DefinitionKind::Struct);
        let shape = builder.definition("Shape", DefinitionKind::Message);
        builder
            .field(color, FieldSpec::variant("RED", 0))
            .field(color, FieldSpec::variant("GREEN", 1))
            .field(point, FieldSpec::new("x", BuiltinType::Float32, 0))
            .field(point, FieldSpec::new("y", BuiltinType::Float32, 0))
            .field(shape, FieldSpec::new("color", FieldType::Reference(color), 1))
            .field(shape, FieldSpec::new("points", FieldType::Reference(point), 2).array())
            .field(
                shape,
                FieldSpec::new("tags", BuiltinType::String, 3).map(BuiltinType::Uint32),
            )
            .field(shape, FieldSpec::new("corners", BuiltinType::Byte, 4).fixed_array(4))
            .field(shape, FieldSpec::new("child", FieldType::Reference(shape), 5));
        builder
    }

    #[test]
    fn test_parse_sample_schema() {
        let schema = Schema::from_bytes(&sample_builder().to_bytes()).expect("parse");
        assert!(schema.is_ready());
        assert_eq!(schema.definition_count(), 3);

        let shape = schema.definition(2).unwrap();
        assert_eq!(shape.kind, DefinitionKind::Message);
        assert_eq!(schema.name(shape.name), b"Shape");
        assert_eq!(shape.fields.len(), 5);

        let points = shape.field_by_value(2).unwrap();
        assert_eq!(schema.name(points.name), b"points");
        assert_eq!(points.repetition(), Repetition::Array);
        assert_eq!(points.shape.field_type, FieldType::Reference(1));

        let tags = shape.field_by_value(3).unwrap();
        assert_eq!(
            tags.repetition(),
            Repetition::Map(FieldType::Builtin(BuiltinType::Uint32))
        );

        let corners = shape.field_by_value(4).unwrap();
        assert_eq!(corners.repetition(), Repetition::FixedArray(4));

        let child = shape.field_by_value(5).unwrap();
        assert_eq!(child.shape.field_type, FieldType::Reference(2));
    }

    #[test]
    fn test_find_definition() {
        let schema = Schema::from_bytes(&sample_builder().to_bytes()).unwrap();
        assert_eq!(schema.find_definition("Point"), Ok(1));
        assert_eq!(schema.find_definition(b"Shape"), Ok(2));
        assert_eq!(
            schema.find_definition("Poin"),
            Err(SchemaError::DefinitionNotFound {
                name: "Poin".to_string()
            })
        );
        assert_eq!(schema.definition_name(0).as_deref(), Some("Color"));
    }

    #[test]
    fn test_truncated_count_fails() {
        let mut schema = Schema::new();
        let result = schema.parse(&mut ByteBuffer::read_only(&[0x01]));
        assert!(matches!(result, Err(SchemaError::Decode(_))));
        assert!(!schema.is_ready());
        assert_eq!(schema.find_definition("anything"), Err(SchemaError::NotParsed));
    }

    #[test]
    fn test_every_truncation_fails() {
        let bytes = sample_builder().to_bytes();
        for len in 0..bytes.len() {
            assert!(
                Schema::from_bytes(&bytes[..len]).is_err(),
                "prefix of {len} bytes parsed"
            );
        }
    }

    #[test]
    fn test_invalid_kind_rejected() {
        let mut buffer = ByteBuffer::new();
        buffer.write_var_uint(1);
        buffer.write_string("Bad");
        buffer.write_byte(3);
        buffer.write_var_uint(0);
        assert_eq!(
            Schema::from_bytes(buffer.data()).unwrap_err(),
            SchemaError::InvalidKind {
                definition: 0,
                kind: 3
            }
        );
    }

    fn single_field_schema(type_tag: i32, key_tag: Option<i32>) -> Vec<u8> {
        let mut buffer = ByteBuffer::new();
        buffer.write_var_uint(1);
        buffer.write_string("Only");
        buffer.write_byte(DefinitionKind::Message.wire_value());
        buffer.write_var_uint(1);
        buffer.write_string("f");
        buffer.write_var_int(type_tag);
        buffer.write_bool(false);
        buffer.write_bool(false);
        buffer.write_bool(key_tag.is_some());
        buffer.write_var_uint(1);
        if let Some(key) = key_tag {
            buffer.write_var_int(key);
        }
        buffer.into_vec()
    }

    #[test]
    fn test_type_domain_checks() {
        assert!(Schema::from_bytes(&single_field_schema(0, None)).is_ok());
        assert!(Schema::from_bytes(&single_field_schema(-11, None)).is_ok());
        assert!(matches!(
            Schema::from_bytes(&single_field_schema(1, None)),
            Err(SchemaError::InvalidType { tag: 1, .. })
        ));
        assert!(matches!(
            Schema::from_bytes(&single_field_schema(-12, None)),
            Err(SchemaError::InvalidType { tag: -12, .. })
        ));
        assert!(matches!(
            Schema::from_bytes(&single_field_schema(-1, Some(5))),
            Err(SchemaError::InvalidType { tag: 5, .. })
        ));
    }

    #[test]
    fn test_reparse_replaces_table() {
        let mut schema = Schema::new();
        schema
            .parse(&mut ByteBuffer::read_only(&sample_builder().to_bytes()))
            .unwrap();
        let stale = schema.definition(0).unwrap().name;

        let mut other = SchemaBuilder::new();
        other.definition("Solo", DefinitionKind::Struct);
        schema
            .parse(&mut ByteBuffer::read_only(&other.to_bytes()))
            .unwrap();

        assert_eq!(schema.definition_count(), 1);
        assert_eq!(schema.find_definition("Solo"), Ok(0));
        assert!(schema.find_definition("Point").is_err());
        assert_eq!(schema.name(stale), b"");
    }

    #[test]
    fn test_failed_reparse_poisons_previous_table() {
        let mut schema = Schema::from_bytes(&sample_builder().to_bytes()).unwrap();
        assert!(schema.parse(&mut ByteBuffer::read_only(&[0x02])).is_err());
        assert!(schema.definitions().is_empty());
        assert_eq!(schema.find_definition("Point"), Err(SchemaError::NotParsed));
    }

    #[test]
    fn test_parse_consumes_exactly_the_description() {
        let mut bytes = sample_builder().to_bytes();
        let len = bytes.len();
        bytes.extend_from_slice(&[0xEE, 0xEE]);
        let mut buffer = ByteBuffer::read_only(&bytes);
        Schema::new().parse(&mut buffer).unwrap();
        assert_eq!(buffer.position(), len);
    }
}
