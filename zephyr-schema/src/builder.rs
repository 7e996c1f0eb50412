//! Binary schema description writer.
//!
//! [`SchemaBuilder`] assembles definitions in memory and writes the exact
//! layout [`Schema::parse`] reads. [`Schema::encode`] writes a parsed schema
//! back out through the same routines.

use crate::error::Result;
use crate::options::SchemaOptions;
use crate::types::{DefinitionIndex, DefinitionKind, FieldShape, FieldType, Schema};
use zephyr_core::{BuiltinType, ByteBuffer};

/// Field declaration used by [`SchemaBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    name: String,
    shape: FieldShape,
}

impl FieldSpec {
    /// Declares a single-valued field.
    ///
    /// # Arguments
    /// * `name` - Field name
    /// * `field_type` - Builtin or definition reference
    /// * `value` - Wire id for message fields; ignored on the wire for structs
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: impl Into<FieldType>, value: u32) -> Self {
        Self {
            name: name.into(),
            shape: FieldShape::new(field_type.into(), value),
        }
    }

    /// Declares an enum variant.
    #[must_use]
    pub fn variant(name: impl Into<String>, value: u32) -> Self {
        Self::new(name, BuiltinType::Uint32, value)
    }

    /// Marks the field as a variable-length array.
    #[must_use]
    pub fn array(mut self) -> Self {
        self.shape.is_array = true;
        self
    }

    /// Marks the field as a fixed array of `size` elements.
    #[must_use]
    pub fn fixed_array(mut self, size: u32) -> Self {
        self.shape.array_size = Some(size);
        self
    }

    /// Marks the field as a map keyed by `key_type`.
    #[must_use]
    pub fn map(mut self, key_type: impl Into<FieldType>) -> Self {
        self.shape.key_type = Some(key_type.into());
        self
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared shape.
    #[must_use]
    pub const fn shape(&self) -> &FieldShape {
        &self.shape
    }
}

#[derive(Debug, Clone)]
struct DefinitionSpec {
    name: String,
    kind: DefinitionKind,
    fields: Vec<FieldSpec>,
}

/// In-memory schema assembled definition by definition.
///
/// Definitions are indexed in the order they are declared, so a field may
/// reference a definition declared later, or its own definition.
///
/// # Example
/// ```
/// use zephyr_core::BuiltinType;
/// use zephyr_schema::{DefinitionKind, FieldSpec, SchemaBuilder};
///
/// let mut builder = SchemaBuilder::new();
/// let msg = builder.definition("Ping", DefinitionKind::Message);
/// builder.field(msg, FieldSpec::new("seq", BuiltinType::Uint32, 1));
///
/// let schema = builder.build().unwrap();
/// assert_eq!(schema.find_definition("Ping"), Ok(msg));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    definitions: Vec<DefinitionSpec>,
}

impl SchemaBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a definition and returns its index.
    pub fn definition(&mut self, name: impl Into<String>, kind: DefinitionKind) -> DefinitionIndex {
        let index = self.definitions.len() as DefinitionIndex;
        self.definitions.push(DefinitionSpec {
            name: name.into(),
            kind,
            fields: Vec::new(),
        });
        index
    }

    /// Appends a field to `definition`.
    ///
    /// # Panics
    /// Panics if `definition` was not returned by [`SchemaBuilder::definition`].
    pub fn field(&mut self, definition: DefinitionIndex, field: FieldSpec) -> &mut Self {
        let count = self.definitions.len();
        let Some(target) = self.definitions.get_mut(definition as usize) else {
            panic!("definition {definition} not declared ({count} definitions)");
        };
        target.fields.push(field);
        self
    }

    /// Returns the number of declared definitions.
    #[must_use]
    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    /// Writes the binary schema description.
    pub fn encode(&self, buffer: &mut ByteBuffer<'_>) {
        buffer.write_var_uint(self.definitions.len() as u32);
        for definition in &self.definitions {
            write_definition_header(
                buffer,
                definition.name.as_bytes(),
                definition.kind,
                definition.fields.len(),
            );
            for field in &definition.fields {
                write_field(buffer, field.name.as_bytes(), &field.shape);
            }
        }
    }

    /// Returns the binary schema description.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = ByteBuffer::new();
        self.encode(&mut buffer);
        buffer.into_vec()
    }

    /// Encodes and parses the schema.
    ///
    /// # Errors
    /// Returns [`SchemaError::InvalidType`](crate::SchemaError::InvalidType)
    /// if a field references a definition that was never declared.
    pub fn build(&self) -> Result<Schema> {
        self.build_with_options(SchemaOptions::default())
    }

    /// Encodes and parses the schema with the given options.
    ///
    /// # Errors
    /// Same as [`SchemaBuilder::build`].
    pub fn build_with_options(&self, options: SchemaOptions) -> Result<Schema> {
        Schema::from_bytes_with_options(&self.to_bytes(), options)
    }
}

impl Schema {
    /// Writes the binary schema description of this schema.
    ///
    /// The output is the canonical encoding of the parsed schema: flags are
    /// written as 0 or 1 and varints in their shortest form, so a
    /// description that spelled either differently is not reproduced
    /// byte for byte.
    ///
    /// # Errors
    /// Returns [`SchemaError::NotParsed`](crate::SchemaError::NotParsed)
    /// after a failed parse.
    pub fn encode(&self, buffer: &mut ByteBuffer<'_>) -> Result<()> {
        let table = self.table()?;
        buffer.write_var_uint(table.len() as u32);
        for definition in table {
            write_definition_header(
                buffer,
                self.name(definition.name),
                definition.kind,
                definition.fields.len(),
            );
            for field in &definition.fields {
                write_field(buffer, self.name(field.name), &field.shape);
            }
        }
        Ok(())
    }

    /// Returns the binary schema description of this schema.
    ///
    /// # Errors
    /// Same as [`Schema::encode`].
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = ByteBuffer::new();
        self.encode(&mut buffer)?;
        Ok(buffer.into_vec())
    }
}

fn write_definition_header(
    buffer: &mut ByteBuffer<'_>,
    name: &[u8],
    kind: DefinitionKind,
    field_count: usize,
) {
    buffer.write_bytes(name);
    buffer.write_byte(kind.wire_value());
    buffer.write_var_uint(field_count as u32);
}

fn write_field(buffer: &mut ByteBuffer<'_>, name: &[u8], shape: &FieldShape) {
    buffer.write_bytes(name);
    buffer.write_var_int(shape.field_type.wire_tag());
    buffer.write_bool(shape.is_array);
    buffer.write_bool(shape.is_fixed_array());
    buffer.write_bool(shape.is_map());
    buffer.write_var_uint(shape.value);
    if let Some(size) = shape.array_size {
        buffer.write_var_uint(size);
    }
    if let Some(key) = shape.key_type {
        buffer.write_var_int(key.wire_tag());
    }
}
