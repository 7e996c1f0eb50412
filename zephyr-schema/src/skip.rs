//! Schema-driven field skipping.
//!
//! Struct and message bodies carry no length prefix, so the only way past an
//! unread field is to walk its declared shape. Every walk below consumes
//! exactly the bytes a writer following the same schema would have produced.

use crate::error::Result;
use crate::types::{DefinitionIndex, DefinitionKind, FieldShape, FieldType, Repetition, Schema};
use zephyr_core::{BuiltinType, ByteBuffer};

impl Schema {
    /// Advances `buffer` past one encoded instance of field `field_id` of
    /// `definition`.
    ///
    /// For message fields the caller has already consumed the field id; the
    /// cursor is expected at the first byte of the value.
    ///
    /// # Arguments
    /// * `buffer` - Reader positioned at the field value
    /// * `definition` - Definition that declares the field
    /// * `field_id` - Wire id of the field
    ///
    /// # Errors
    /// Returns an error if the definition or field is unknown, a nested
    /// message carries an undeclared id, nesting exceeds
    /// [`SchemaOptions::max_depth`](crate::SchemaOptions::max_depth), or the
    /// buffer runs out. The cursor is not restored on failure.
    pub fn skip_field(
        &self,
        buffer: &mut ByteBuffer<'_>,
        definition: DefinitionIndex,
        field_id: u32,
    ) -> Result<()> {
        let field = self.lookup_field(definition, field_id)?;
        self.skip_shape(buffer, &field.shape, 0)
    }

    /// Advances `buffer` past one encoded value of `field_type`.
    ///
    /// # Errors
    /// Same conditions as [`Schema::skip_field`].
    pub fn skip_value(&self, buffer: &mut ByteBuffer<'_>, field_type: FieldType) -> Result<()> {
        self.table()?;
        self.skip_one(buffer, field_type, 0)
    }

    fn skip_shape(&self, buffer: &mut ByteBuffer<'_>, shape: &FieldShape, depth: usize) -> Result<()> {
        match shape.repetition() {
            Repetition::Single => self.skip_one(buffer, shape.field_type, depth),
            Repetition::Array => {
                let count = buffer.read_var_uint()?;
                self.skip_repeated(buffer, count, |schema, buffer| {
                    schema.skip_one(buffer, shape.field_type, depth)
                })
            }
            Repetition::FixedArray(count) => {
                self.skip_repeated(buffer, count, |schema, buffer| {
                    schema.skip_one(buffer, shape.field_type, depth)
                })
            }
            Repetition::Map(key_type) => {
                let count = buffer.read_var_uint()?;
                self.skip_repeated(buffer, count, |schema, buffer| {
                    schema.skip_one(buffer, key_type, depth)?;
                    schema.skip_one(buffer, shape.field_type, depth)
                })
            }
        }
    }

    /// Runs `skip` `count` times. An element that consumed nothing will
    /// consume nothing again, so the loop stops there.
    fn skip_repeated<F>(
        &self,
        buffer: &mut ByteBuffer<'_>,
        count: u32,
        mut skip: F,
    ) -> Result<()>
    where
        F: FnMut(&Self, &mut ByteBuffer<'_>) -> Result<()>,
    {
        for _ in 0..count {
            let before = buffer.position();
            skip(self, buffer)?;
            if buffer.position() == before {
                break;
            }
        }
        Ok(())
    }

    fn skip_one(&self, buffer: &mut ByteBuffer<'_>, field_type: FieldType, depth: usize) -> Result<()> {
        let index = match field_type {
            FieldType::Builtin(builtin) => return skip_builtin(buffer, builtin),
            FieldType::Reference(index) => index,
        };

        let definition = self.lookup(index)?;
        match definition.kind {
            DefinitionKind::Enum => {
                buffer.read_var_uint()?;
            }
            DefinitionKind::Struct => {
                let depth = self.descend(depth)?;
                for field in &definition.fields {
                    self.skip_shape(buffer, &field.shape, depth)?;
                }
            }
            DefinitionKind::Message => {
                let depth = self.descend(depth)?;
                loop {
                    let id = buffer.read_var_uint()?;
                    if id == 0 {
                        break;
                    }
                    let field = self.lookup_field(index, id)?;
                    self.skip_shape(buffer, &field.shape, depth)?;
                }
            }
        }
        Ok(())
    }
}

fn skip_builtin(buffer: &mut ByteBuffer<'_>, builtin: BuiltinType) -> Result<()> {
    match builtin {
        BuiltinType::Bool | BuiltinType::Byte => {
            buffer.read_byte()?;
        }
        BuiltinType::Int32 | BuiltinType::Uint32 => {
            buffer.read_var_uint()?;
        }
        BuiltinType::Float32 => {
            buffer.read_var_float()?;
        }
        BuiltinType::Float16 => {
            buffer.read_var_float16()?;
        }
        BuiltinType::Double => {
            buffer.read_double()?;
        }
        BuiltinType::String | BuiltinType::Bytes => {
            buffer.read_bytes()?;
        }
        BuiltinType::Int64 | BuiltinType::Uint64 => {
            buffer.read_var_uint64()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{FieldSpec, SchemaBuilder};
    use crate::error::SchemaError;
    use crate::options::SchemaOptions;

    fn tagged_schema() -> Schema {
        let mut builder = SchemaBuilder::new();
        let msg = builder.definition("Msg", DefinitionKind::Message);
        builder
            .field(msg, FieldSpec::new("id", BuiltinType::Uint32, 1))
            .field(msg, FieldSpec::new("name", BuiltinType::String, 2));
        builder.build().unwrap()
    }

    #[test]
    fn test_skip_string_leaves_cursor_at_terminator() {
        let schema = tagged_schema();
        let bytes = [2, 2, b'h', b'i', 0];
        let mut buffer = ByteBuffer::read_only(&bytes);

        assert_eq!(buffer.read_var_uint(), Ok(2));
        schema.skip_field(&mut buffer, 0, 2).unwrap();
        assert_eq!(buffer.position(), 4);
        assert_eq!(buffer.read_var_uint(), Ok(0));
    }

    #[test]
    fn test_skip_unknown_field_id_fails() {
        let schema = tagged_schema();
        let mut buffer = ByteBuffer::read_only(&[0]);
        assert_eq!(
            schema.skip_field(&mut buffer, 0, 3),
            Err(SchemaError::UnknownField {
                definition: 0,
                field_id: 3
            })
        );
        assert!(matches!(
            schema.skip_field(&mut buffer, 9, 1),
            Err(SchemaError::DefinitionOutOfRange { index: 9, .. })
        ));
    }

    #[test]
    fn test_skip_builtins_exact_widths() {
        let mut builder = SchemaBuilder::new();
        let all = builder.definition("All", DefinitionKind::Message);
        for (id, ty) in BuiltinType::ALL.into_iter().enumerate() {
            builder.field(all, FieldSpec::new(ty.schema_name(), ty, id as u32 + 1));
        }
        let schema = builder.build().unwrap();

        let mut buffer = ByteBuffer::new();
        buffer.write_bool(true);
        buffer.write_byte(9);
        buffer.write_var_int(-70_000);
        buffer.write_var_uint(300);
        buffer.write_var_float(1.5);
        buffer.write_var_float16(0.25);
        buffer.write_double(2.5);
        buffer.write_string("abc");
        buffer.write_bytes(&[1, 2, 3, 4]);
        buffer.write_var_int64(-1 << 40);
        buffer.write_var_uint64(u64::MAX);
        buffer.write_byte(0xEE);

        let mut reader = buffer.reader();
        for id in 1..=11 {
            schema.skip_field(&mut reader, all, id).unwrap();
        }
        assert_eq!(reader.read_byte(), Ok(0xEE));
    }

    #[test]
    fn test_skip_nested_shapes() {
        let mut builder = SchemaBuilder::new();
        let color = builder.definition("Color", DefinitionKind::Enum);
        let point = builder.definition("Point", DefinitionKind::Struct);
        let inner = builder.definition("Inner", DefinitionKind::Message);
        let outer = builder.definition("Outer", DefinitionKind::Message);
        builder
            .field(color, FieldSpec::variant("RED", 0))
            .field(point, FieldSpec::new("x", BuiltinType::Int32, 0))
            .field(point, FieldSpec::new("y", BuiltinType::Int32, 0))
            .field(inner, FieldSpec::new("label", BuiltinType::String, 1))
            .field(outer, FieldSpec::new("color", FieldType::Reference(color), 1))
            .field(outer, FieldSpec::new("path", FieldType::Reference(point), 2).array())
            .field(
                outer,
                FieldSpec::new("index", FieldType::Reference(inner), 3).map(BuiltinType::String),
            )
            .field(outer, FieldSpec::new("rgb", BuiltinType::Byte, 4).fixed_array(3));
        let schema = builder.build().unwrap();

        let mut buffer = ByteBuffer::new();
        // color
        buffer.write_var_uint(200);
        // path: two points
        buffer.write_var_uint(2);
        for v in [1, -1, 64, -65] {
            buffer.write_var_int(v);
        }
        // index: one entry, key "k" -> Inner { label: "v" }
        buffer.write_var_uint(1);
        buffer.write_string("k");
        buffer.write_var_uint(1);
        buffer.write_string("v");
        buffer.write_var_uint(0);
        // rgb
        buffer.write_byte(1);
        buffer.write_byte(2);
        buffer.write_byte(3);
        buffer.write_byte(0xEE);

        let mut reader = buffer.reader();
        for id in 1..=4 {
            schema.skip_field(&mut reader, outer, id).unwrap();
        }
        assert_eq!(reader.read_byte(), Ok(0xEE));
    }

    #[test]
    fn test_skip_message_with_undeclared_nested_id_fails() {
        let mut builder = SchemaBuilder::new();
        let inner = builder.definition("Inner", DefinitionKind::Message);
        let outer = builder.definition("Outer", DefinitionKind::Message);
        builder
            .field(inner, FieldSpec::new("a", BuiltinType::Uint32, 1))
            .field(outer, FieldSpec::new("inner", FieldType::Reference(inner), 1));
        let schema = builder.build().unwrap();

        let bytes = [1, 5, 7, 5, 0];
        let mut buffer = ByteBuffer::read_only(&bytes);
        assert_eq!(
            schema.skip_field(&mut buffer, outer, 1),
            Err(SchemaError::UnknownField {
                definition: inner,
                field_id: 7
            })
        );
    }

    #[test]
    fn test_skip_truncated_value_fails() {
        let schema = tagged_schema();
        let bytes = [5, b'h'];
        let mut buffer = ByteBuffer::read_only(&bytes);
        assert!(matches!(
            schema.skip_field(&mut buffer, 0, 2),
            Err(SchemaError::Decode(_))
        ));
    }

    #[test]
    fn test_recursive_message_hits_depth_limit() {
        let mut builder = SchemaBuilder::new();
        let node = builder.definition("Node", DefinitionKind::Message);
        builder.field(node, FieldSpec::new("child", FieldType::Reference(node), 1));
        let schema = builder
            .build_with_options(SchemaOptions::new().with_max_depth(8))
            .unwrap();

        // Seven levels below the root fit: child(1) ... then terminators.
        let mut ok = ByteBuffer::new();
        for _ in 0..7 {
            ok.write_var_uint(1);
        }
        for _ in 0..8 {
            ok.write_var_uint(0);
        }
        let mut reader = ok.reader();
        schema.skip_field(&mut reader, node, 1).unwrap();
        assert_eq!(reader.remaining(), 0);

        let deep = vec![1u8; 64];
        let mut reader = ByteBuffer::read_only(&deep);
        assert_eq!(
            schema.skip_field(&mut reader, node, 1),
            Err(SchemaError::DepthLimitExceeded { limit: 8 })
        );
    }

    #[test]
    fn test_empty_struct_array_does_not_spin() {
        let mut builder = SchemaBuilder::new();
        let unit = builder.definition("Unit", DefinitionKind::Struct);
        let holder = builder.definition("Holder", DefinitionKind::Message);
        builder.field(holder, FieldSpec::new("units", FieldType::Reference(unit), 1).array());
        let schema = builder.build().unwrap();

        let mut buffer = ByteBuffer::new();
        buffer.write_var_uint(u32::MAX);
        buffer.write_byte(0xEE);
        let mut reader = buffer.reader();
        schema.skip_field(&mut reader, holder, 1).unwrap();
        assert_eq!(reader.read_byte(), Ok(0xEE));
    }

    #[test]
    fn test_map_with_array_flag_reads_single_count() {
        let mut builder = SchemaBuilder::new();
        let msg = builder.definition("Msg", DefinitionKind::Message);
        builder.field(
            msg,
            FieldSpec::new("m", BuiltinType::Uint32, 1)
                .map(BuiltinType::String)
                .array(),
        );
        let schema = builder.build().unwrap();
        let field = schema.definition(msg).unwrap().field_by_value(1).unwrap();
        assert_eq!(field.repetition(), Repetition::Map);

        let mut buffer = ByteBuffer::new();
        buffer.write_var_uint(2);
        buffer.write_string("a");
        buffer.write_var_uint(1);
        buffer.write_string("b");
        buffer.write_var_uint(2);
        buffer.write_byte(0xEE);

        let mut reader = buffer.reader();
        schema.skip_field(&mut reader, msg, 1).unwrap();
        assert_eq!(reader.position(), 7);
        assert_eq!(reader.read_byte(), Ok(0xEE));
    }

    #[test]
    fn test_skip_on_failed_schema() {
        let mut schema = tagged_schema();
        assert!(schema.parse(&mut ByteBuffer::read_only(&[])).is_err());
        let mut buffer = ByteBuffer::read_only(&[0]);
        assert_eq!(schema.skip_field(&mut buffer, 0, 1), Err(SchemaError::NotParsed));
        assert_eq!(
            schema.skip_value(&mut buffer, BuiltinType::Byte.into()),
            Err(SchemaError::NotParsed)
        );
    }
}
