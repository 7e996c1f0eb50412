//! Dynamic schema-driven decoding and encoding.
//!
//! [`Value`] is a self-describing tree produced by walking a field's declared
//! shape, with the same rules [`Schema::skip_field`] follows. It lets tools
//! and tests read or write a message without generated accessors.

use crate::error::{Result, SchemaError};
use crate::types::{
    Definition, DefinitionIndex, DefinitionKind, FieldShape, FieldType, Repetition, Schema,
};
use zephyr_core::{BuiltinType, ByteBuffer};

/// Decoded value of any schema type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `bool`
    Bool(bool),
    /// `byte`
    Byte(u8),
    /// `int`
    Int(i32),
    /// `uint`
    Uint(u32),
    /// `float` or `float16`
    Float(f32),
    /// `double`
    Double(f64),
    /// `string`
    String(String),
    /// `bytes`
    Bytes(Vec<u8>),
    /// `int64`
    Int64(i64),
    /// `uint64`
    Uint64(u64),
    /// Enum value with the name of the matching variant, if any.
    Enum {
        /// Numeric value on the wire.
        value: u32,
        /// Declared variant name; `None` for values the schema does not list.
        name: Option<String>,
    },
    /// Struct fields in declaration order.
    Struct(Vec<(String, Value)>),
    /// Message fields in wire order.
    Message(Vec<(String, Value)>),
    /// Array or fixed array elements.
    Array(Vec<Value>),
    /// Map entries in wire order.
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Returns a short name for the kind of value.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Byte(_) => "byte",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Int64(_) => "int64",
            Self::Uint64(_) => "uint64",
            Self::Enum { .. } => "enum",
            Self::Struct(_) => "struct",
            Self::Message(_) => "message",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }

    /// Returns the first field named `name` of a struct or message value.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Struct(fields) | Self::Message(fields) => {
                fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    /// Returns the elements of an array value.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the text of a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Self::Byte(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Uint(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Uint64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

/// Running count of array and map elements produced by one decode call.
#[derive(Debug)]
struct ElementBudget {
    used: usize,
    limit: usize,
}

impl ElementBudget {
    const fn new(limit: usize) -> Self {
        Self { used: 0, limit }
    }

    fn charge(&mut self, elements: usize) -> Result<()> {
        let used = self.used.saturating_add(elements);
        if used > self.limit {
            tracing::warn!(limit = self.limit, "element limit exceeded");
            return Err(SchemaError::ElementLimitExceeded { limit: self.limit });
        }
        self.used = used;
        Ok(())
    }
}

impl Schema {
    /// Decodes one encoded instance of `definition`.
    ///
    /// Enums yield [`Value::Enum`], structs [`Value::Struct`] and messages
    /// [`Value::Message`] (the terminating 0 is consumed).
    ///
    /// # Errors
    /// Returns an error on a short read, invalid UTF-8 in a string, an
    /// undeclared message field id, a nesting depth past the limit or more
    /// array and map elements than [`SchemaOptions::max_elements`](crate::SchemaOptions::max_elements).
    pub fn decode(&self, buffer: &mut ByteBuffer<'_>, definition: DefinitionIndex) -> Result<Value> {
        let mut budget = ElementBudget::new(self.options.max_elements);
        self.decode_one(buffer, FieldType::Reference(definition), 0, &mut budget)
    }

    /// Decodes one encoded instance of field `field_id` of `definition`.
    ///
    /// Mirrors [`Schema::skip_field`]: the message field id must already be
    /// consumed.
    ///
    /// # Errors
    /// Same as [`Schema::decode`], plus an unknown field id.
    pub fn decode_field(
        &self,
        buffer: &mut ByteBuffer<'_>,
        definition: DefinitionIndex,
        field_id: u32,
    ) -> Result<Value> {
        let field = self.lookup_field(definition, field_id)?;
        let mut budget = ElementBudget::new(self.options.max_elements);
        self.decode_shape(buffer, &field.shape, 0, &mut budget)
    }

    /// Encodes `value` as one instance of `definition`.
    ///
    /// # Errors
    /// Returns an error if `value` does not fit the declared shape.
    ///
    /// # Panics
    /// Panics if `buffer` is read-only.
    pub fn encode_value(
        &self,
        buffer: &mut ByteBuffer<'_>,
        definition: DefinitionIndex,
        value: &Value,
    ) -> Result<()> {
        self.encode_one(buffer, FieldType::Reference(definition), value, 0)
    }

    /// Encodes the fields of a message as `id, value` pairs followed by the
    /// 0 terminator. Fields are written in the order given.
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownFieldName`] for a name the message does
    /// not declare, or a mismatch error for a value of the wrong shape.
    ///
    /// # Panics
    /// Panics if `buffer` is read-only.
    pub fn encode_message(
        &self,
        buffer: &mut ByteBuffer<'_>,
        definition: DefinitionIndex,
        fields: &[(String, Value)],
    ) -> Result<()> {
        let target = self.lookup_kind(definition, DefinitionKind::Message)?;
        self.write_message(buffer, definition, target, fields, 0)
    }

    /// Encodes every declared field of a struct in declaration order.
    ///
    /// # Errors
    /// Returns [`SchemaError::MissingField`] if a declared field has no value,
    /// [`SchemaError::UnknownFieldName`] for an undeclared name, or a
    /// mismatch error for a value of the wrong shape.
    ///
    /// # Panics
    /// Panics if `buffer` is read-only.
    pub fn encode_struct(
        &self,
        buffer: &mut ByteBuffer<'_>,
        definition: DefinitionIndex,
        fields: &[(String, Value)],
    ) -> Result<()> {
        let target = self.lookup_kind(definition, DefinitionKind::Struct)?;
        self.write_struct(buffer, definition, target, fields, 0)
    }

    /// Encodes `value` as one instance of field `field_id` of `definition`.
    /// The field id itself is not written.
    ///
    /// # Errors
    /// Returns an error for an unknown field id or a value that does not fit
    /// the declared shape.
    ///
    /// # Panics
    /// Panics if `buffer` is read-only.
    pub fn encode_field(
        &self,
        buffer: &mut ByteBuffer<'_>,
        definition: DefinitionIndex,
        field_id: u32,
        value: &Value,
    ) -> Result<()> {
        let field = self.lookup_field(definition, field_id)?;
        self.encode_shape(buffer, &field.shape, value, 0)
    }

    fn lookup_kind(&self, index: DefinitionIndex, kind: DefinitionKind) -> Result<&Definition> {
        let definition = self.lookup(index)?;
        if definition.kind != kind {
            return Err(SchemaError::mismatch(
                kind.keyword(),
                definition.kind.keyword(),
            ));
        }
        Ok(definition)
    }

    fn text(&self, span: zephyr_core::Span) -> String {
        String::from_utf8_lossy(self.name(span)).into_owned()
    }

    // ------------------------------------------------------------------
    // Decode
    // ------------------------------------------------------------------

    fn decode_shape(
        &self,
        buffer: &mut ByteBuffer<'_>,
        shape: &FieldShape,
        depth: usize,
        budget: &mut ElementBudget,
    ) -> Result<Value> {
        match shape.repetition() {
            Repetition::Single => self.decode_one(buffer, shape.field_type, depth, budget),
            Repetition::Array => {
                let count = buffer.read_var_uint()?;
                self.decode_repeated(buffer, count, budget, |schema, buffer, budget| {
                    schema.decode_one(buffer, shape.field_type, depth, budget)
                })
                .map(Value::Array)
            }
            Repetition::FixedArray(count) => self
                .decode_repeated(buffer, count, budget, |schema, buffer, budget| {
                    schema.decode_one(buffer, shape.field_type, depth, budget)
                })
                .map(Value::Array),
            Repetition::Map(key_type) => {
                let count = buffer.read_var_uint()?;
                self.decode_repeated(buffer, count, budget, |schema, buffer, budget| {
                    let key = schema.decode_one(buffer, key_type, depth, budget)?;
                    let value = schema.decode_one(buffer, shape.field_type, depth, budget)?;
                    Ok((key, value))
                })
                .map(Value::Map)
            }
        }
    }

    /// Decodes `count` elements. Once an element consumes no input the rest
    /// are copies of it; every copy, including the elements nested inside
    /// it, is charged against `budget`.
    fn decode_repeated<T, F>(
        &self,
        buffer: &mut ByteBuffer<'_>,
        count: u32,
        budget: &mut ElementBudget,
        mut decode: F,
    ) -> Result<Vec<T>>
    where
        T: Clone,
        F: FnMut(&Self, &mut ByteBuffer<'_>, &mut ElementBudget) -> Result<T>,
    {
        let count = count as usize;
        let mut items = Vec::with_capacity(count.min(buffer.remaining()));
        while items.len() < count {
            let position = buffer.position();
            let charged = budget.used;
            budget.charge(1)?;
            let item = decode(self, buffer, budget)?;
            if buffer.position() == position {
                let weight = budget.used - charged;
                let copies = count - items.len() - 1;
                budget.charge(weight.saturating_mul(copies))?;
                items.resize(count, item);
                break;
            }
            items.push(item);
        }
        Ok(items)
    }

    fn decode_one(
        &self,
        buffer: &mut ByteBuffer<'_>,
        field_type: FieldType,
        depth: usize,
        budget: &mut ElementBudget,
    ) -> Result<Value> {
        let index = match field_type {
            FieldType::Builtin(builtin) => return decode_builtin(buffer, builtin),
            FieldType::Reference(index) => index,
        };

        let definition = self.lookup(index)?;
        match definition.kind {
            DefinitionKind::Enum => {
                let value = buffer.read_var_uint()?;
                let name = definition.field_by_value(value).map(|f| self.text(f.name));
                Ok(Value::Enum { value, name })
            }
            DefinitionKind::Struct => {
                let depth = self.descend(depth)?;
                let mut fields = Vec::with_capacity(definition.fields.len());
                for field in &definition.fields {
                    let value = self.decode_shape(buffer, &field.shape, depth, budget)?;
                    fields.push((self.text(field.name), value));
                }
                Ok(Value::Struct(fields))
            }
            DefinitionKind::Message => {
                let depth = self.descend(depth)?;
                let mut fields = Vec::new();
                loop {
                    let id = buffer.read_var_uint()?;
                    if id == 0 {
                        break;
                    }
                    let field = self.lookup_field(index, id)?;
                    let value = self.decode_shape(buffer, &field.shape, depth, budget)?;
                    fields.push((self.text(field.name), value));
                }
                Ok(Value::Message(fields))
            }
        }
    }

    // ------------------------------------------------------------------
    // Encode
    // ------------------------------------------------------------------

    fn encode_shape(
        &self,
        buffer: &mut ByteBuffer<'_>,
        shape: &FieldShape,
        value: &Value,
        depth: usize,
    ) -> Result<()> {
        match (shape.repetition(), value) {
            (Repetition::Single, _) => self.encode_one(buffer, shape.field_type, value, depth),
            (Repetition::Array, Value::Array(items)) => {
                buffer.write_var_uint(wire_count(items.len())?);
                for item in items {
                    self.encode_one(buffer, shape.field_type, item, depth)?;
                }
                Ok(())
            }
            (Repetition::FixedArray(size), Value::Array(items)) => {
                if items.len() != size as usize {
                    return Err(SchemaError::mismatch(
                        format!("fixed array of {size}"),
                        "array of another length",
                    ));
                }
                for item in items {
                    self.encode_one(buffer, shape.field_type, item, depth)?;
                }
                Ok(())
            }
            (Repetition::Map(key_type), Value::Map(entries)) => {
                buffer.write_var_uint(wire_count(entries.len())?);
                for (key, item) in entries {
                    self.encode_one(buffer, key_type, key, depth)?;
                    self.encode_one(buffer, shape.field_type, item, depth)?;
                }
                Ok(())
            }
            (Repetition::Map(_), other) => Err(SchemaError::mismatch("map", other.kind_name())),
            (_, other) => Err(SchemaError::mismatch("array", other.kind_name())),
        }
    }

    fn encode_one(
        &self,
        buffer: &mut ByteBuffer<'_>,
        field_type: FieldType,
        value: &Value,
        depth: usize,
    ) -> Result<()> {
        let index = match field_type {
            FieldType::Builtin(builtin) => return encode_builtin(buffer, builtin, value),
            FieldType::Reference(index) => index,
        };

        let definition = self.lookup(index)?;
        match (definition.kind, value) {
            (DefinitionKind::Enum, Value::Enum { value, name }) => {
                let resolved = match name {
                    Some(name) => definition
                        .fields
                        .iter()
                        .find(|f| self.name(f.name) == name.as_bytes())
                        .map(|f| f.shape.value)
                        .ok_or_else(|| {
                            SchemaError::unknown_field_name(self.text(definition.name), name)
                        })?,
                    None => *value,
                };
                buffer.write_var_uint(resolved);
                Ok(())
            }
            (DefinitionKind::Enum, Value::Uint(value)) => {
                buffer.write_var_uint(*value);
                Ok(())
            }
            (DefinitionKind::Struct, Value::Struct(fields)) => {
                self.write_struct(buffer, index, definition, fields, depth)
            }
            (DefinitionKind::Message, Value::Message(fields)) => {
                self.write_message(buffer, index, definition, fields, depth)
            }
            (kind, other) => Err(SchemaError::mismatch(kind.keyword(), other.kind_name())),
        }
    }

    fn write_struct(
        &self,
        buffer: &mut ByteBuffer<'_>,
        index: DefinitionIndex,
        definition: &Definition,
        fields: &[(String, Value)],
        depth: usize,
    ) -> Result<()> {
        let depth = self.descend(depth)?;
        if let Some((name, _)) = fields.iter().find(|(name, _)| {
            !definition
                .fields
                .iter()
                .any(|f| self.name(f.name) == name.as_bytes())
        }) {
            return Err(SchemaError::unknown_field_name(
                self.text(definition.name),
                name.as_str(),
            ));
        }

        for field in &definition.fields {
            let name = self.name(field.name);
            let value = fields
                .iter()
                .find(|(n, _)| n.as_bytes() == name)
                .map(|(_, v)| v)
                .ok_or_else(|| {
                    SchemaError::missing_field(self.text(definition.name), self.text(field.name))
                })?;
            self.encode_shape(buffer, &field.shape, value, depth)?;
        }
        tracing::trace!(definition = index, fields = fields.len(), "struct encoded");
        Ok(())
    }

    fn write_message(
        &self,
        buffer: &mut ByteBuffer<'_>,
        index: DefinitionIndex,
        definition: &Definition,
        fields: &[(String, Value)],
        depth: usize,
    ) -> Result<()> {
        let depth = self.descend(depth)?;
        for (name, value) in fields {
            let field = definition
                .fields
                .iter()
                .find(|f| self.name(f.name) == name.as_bytes())
                .ok_or_else(|| {
                    SchemaError::unknown_field_name(self.text(definition.name), name.as_str())
                })?;
            buffer.write_var_uint(field.shape.value);
            self.encode_shape(buffer, &field.shape, value, depth)?;
        }
        buffer.write_var_uint(0);
        tracing::trace!(definition = index, fields = fields.len(), "message encoded");
        Ok(())
    }
}

fn wire_count(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| SchemaError::mismatch("at most u32::MAX elements", "collection"))
}

fn decode_builtin(buffer: &mut ByteBuffer<'_>, builtin: BuiltinType) -> Result<Value> {
    let value = match builtin {
        BuiltinType::Bool => Value::Bool(buffer.read_bool()?),
        BuiltinType::Byte => Value::Byte(buffer.read_byte()?),
        BuiltinType::Int32 => Value::Int(buffer.read_var_int()?),
        BuiltinType::Uint32 => Value::Uint(buffer.read_var_uint()?),
        BuiltinType::Float32 => Value::Float(buffer.read_var_float()?),
        BuiltinType::Float16 => Value::Float(buffer.read_var_float16()?),
        BuiltinType::Double => Value::Double(buffer.read_double()?),
        BuiltinType::String => Value::String(buffer.read_str()?.to_owned()),
        BuiltinType::Bytes => Value::Bytes(buffer.read_bytes()?.to_vec()),
        BuiltinType::Int64 => Value::Int64(buffer.read_var_int64()?),
        BuiltinType::Uint64 => Value::Uint64(buffer.read_var_uint64()?),
    };
    Ok(value)
}

fn encode_builtin(buffer: &mut ByteBuffer<'_>, builtin: BuiltinType, value: &Value) -> Result<()> {
    match (builtin, value) {
        (BuiltinType::Bool, Value::Bool(v)) => buffer.write_bool(*v),
        (BuiltinType::Byte, Value::Byte(v)) => buffer.write_byte(*v),
        (BuiltinType::Int32, Value::Int(v)) => buffer.write_var_int(*v),
        (BuiltinType::Uint32, Value::Uint(v)) => buffer.write_var_uint(*v),
        (BuiltinType::Float32, Value::Float(v)) => buffer.write_var_float(*v),
        (BuiltinType::Float16, Value::Float(v)) => buffer.write_var_float16(*v),
        (BuiltinType::Double, Value::Double(v)) => buffer.write_double(*v),
        (BuiltinType::String, Value::String(v)) => buffer.write_string(v),
        (BuiltinType::Bytes, Value::Bytes(v)) => buffer.write_bytes(v),
        (BuiltinType::Int64, Value::Int64(v)) => buffer.write_var_int64(*v),
        (BuiltinType::Uint64, Value::Uint64(v)) => buffer.write_var_uint64(*v),
        (builtin, other) => {
            return Err(SchemaError::mismatch(builtin.schema_name(), other.kind_name()));
        }
    }
    Ok(())
}
