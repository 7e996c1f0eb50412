//! Schema type definitions.
//!
//! This module contains the in-memory form of a parsed schema: the
//! [`Schema`] table itself, its [`Definition`]s and their [`Field`]s.

use crate::error::{Result, SchemaError};
use crate::options::SchemaOptions;
use zephyr_core::{Arena, BuiltinType, Span};

/// Stable index of a definition inside the schema table.
pub type DefinitionIndex = u32;

/// Kind of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    /// Named integer values; encoded as one varuint32.
    Enum,
    /// Fixed field list with no tags; every field is present in order.
    Struct,
    /// Tagged field list terminated by field id 0.
    Message,
}

impl DefinitionKind {
    /// Returns the kind byte used in the binary schema description.
    #[must_use]
    pub const fn wire_value(&self) -> u8 {
        match self {
            Self::Enum => 0,
            Self::Struct => 1,
            Self::Message => 2,
        }
    }

    /// Maps a kind byte back to its kind.
    #[must_use]
    pub const fn from_wire_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Enum),
            1 => Some(Self::Struct),
            2 => Some(Self::Message),
            _ => None,
        }
    }

    /// Returns the lowercase keyword for this kind.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Enum => "enum",
            Self::Struct => "struct",
            Self::Message => "message",
        }
    }
}

/// Type of a field: a builtin or a reference to another definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// One of the fixed primitive wire types.
    Builtin(BuiltinType),
    /// Index into the definition table.
    Reference(DefinitionIndex),
}

impl FieldType {
    /// Decodes a type tag. Negative tags are builtins, non-negative tags must
    /// be below `definition_count`.
    #[must_use]
    pub fn from_wire_tag(tag: i32, definition_count: usize) -> Option<Self> {
        if tag < 0 {
            return BuiltinType::from_wire_tag(tag).map(Self::Builtin);
        }
        let index = tag as u32;
        ((index as usize) < definition_count).then_some(Self::Reference(index))
    }

    /// Returns the signed tag written to the binary schema description.
    ///
    /// # Panics
    /// Panics if a reference index does not fit in `i32`.
    #[must_use]
    pub fn wire_tag(&self) -> i32 {
        match self {
            Self::Builtin(builtin) => builtin.wire_tag(),
            Self::Reference(index) => {
                i32::try_from(*index).expect("definition index exceeds i32::MAX")
            }
        }
    }
}

impl From<BuiltinType> for FieldType {
    fn from(builtin: BuiltinType) -> Self {
        Self::Builtin(builtin)
    }
}

/// How many instances of the field type one field occurrence holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repetition {
    /// Exactly one value.
    Single,
    /// A varuint32 count followed by that many values.
    Array,
    /// A schema-declared number of values with no count on the wire.
    FixedArray(u32),
    /// A varuint32 entry count followed by key/value pairs.
    Map(FieldType),
}

/// Wire shape of a field: its type, modifiers and wire id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldShape {
    /// Value type (the map value type for maps).
    pub field_type: FieldType,
    /// Variable-length array modifier.
    pub is_array: bool,
    /// Length of a fixed array; `Some` iff the fixed-array modifier is set.
    pub array_size: Option<u32>,
    /// Key type of a map; `Some` iff the map modifier is set.
    pub key_type: Option<FieldType>,
    /// Wire id (messages) or numeric value (enums).
    pub value: u32,
}

impl FieldShape {
    /// Creates a single-valued shape.
    #[must_use]
    pub const fn new(field_type: FieldType, value: u32) -> Self {
        Self {
            field_type,
            is_array: false,
            array_size: None,
            key_type: None,
            value,
        }
    }

    /// Returns true if the fixed-array modifier is set.
    #[must_use]
    pub const fn is_fixed_array(&self) -> bool {
        self.array_size.is_some()
    }

    /// Returns true if the map modifier is set.
    #[must_use]
    pub const fn is_map(&self) -> bool {
        self.key_type.is_some()
    }

    /// Resolves the modifiers into one repetition. Map wins over fixed
    /// array, which wins over array.
    #[must_use]
    pub const fn repetition(&self) -> Repetition {
        if let Some(key) = self.key_type {
            Repetition::Map(key)
        } else if let Some(size) = self.array_size {
            Repetition::FixedArray(size)
        } else if self.is_array {
            Repetition::Array
        } else {
            Repetition::Single
        }
    }
}

/// Named member of a definition. The name lives in the schema arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Arena span holding the field name.
    pub name: Span,
    /// Type, modifiers and wire id.
    pub shape: FieldShape,
}

impl Field {
    /// Shorthand for `shape.repetition()`.
    #[must_use]
    pub const fn repetition(&self) -> Repetition {
        self.shape.repetition()
    }
}

/// Named schema entity of kind Enum, Struct or Message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    /// Arena span holding the definition name.
    pub name: Span,
    /// Definition kind.
    pub kind: DefinitionKind,
    /// Fields in declaration order.
    pub fields: Vec<Field>,
}

impl Definition {
    /// Finds the field carrying wire id `value`.
    #[must_use]
    pub fn field_by_value(&self, value: u32) -> Option<&Field> {
        self.fields.iter().find(|f| f.shape.value == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SchemaState {
    Ready,
    Failed,
}

/// A parsed schema: the definition table and the arena holding its names.
///
/// One instance holds exactly one schema. Parsing again, successful or
/// not, drops the definition and field tables and clears the arena in the
/// same step, so no table outlives the names it points into. Not
/// synchronized: parse once, then share by reference.
#[derive(Debug)]
pub struct Schema {
    pub(crate) arena: Arena,
    pub(crate) definitions: Vec<Definition>,
    pub(crate) state: SchemaState,
    pub(crate) options: SchemaOptions,
}

impl Schema {
    /// Creates an empty schema with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(SchemaOptions::default())
    }

    /// Creates an empty schema with the given options.
    #[must_use]
    pub fn with_options(options: SchemaOptions) -> Self {
        Self {
            arena: Arena::with_segment_size(options.arena_segment_size),
            definitions: Vec::new(),
            state: SchemaState::Ready,
            options,
        }
    }

    /// Returns the options this schema was created with.
    #[must_use]
    pub const fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// Returns false after a failed parse.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == SchemaState::Ready
    }

    /// Returns the definition table. Empty after a failed parse.
    #[must_use]
    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    /// Returns the number of definitions.
    #[must_use]
    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    /// Returns the definition at `index`.
    #[must_use]
    pub fn definition(&self, index: DefinitionIndex) -> Option<&Definition> {
        self.definitions.get(index as usize)
    }

    /// Resolves a name span of this schema to its bytes.
    ///
    /// Spans from a previous parse resolve to an empty slice.
    #[must_use]
    pub fn name(&self, span: Span) -> &[u8] {
        self.arena.get(span).unwrap_or_default()
    }

    /// Returns the name of a definition as text, replacing invalid UTF-8.
    #[must_use]
    pub fn definition_name(&self, index: DefinitionIndex) -> Option<String> {
        self.definition(index)
            .map(|d| String::from_utf8_lossy(self.name(d.name)).into_owned())
    }

    /// Returns the table, or [`SchemaError::NotParsed`] after a failed parse.
    pub(crate) fn table(&self) -> Result<&[Definition]> {
        match self.state {
            SchemaState::Ready => Ok(&self.definitions),
            SchemaState::Failed => Err(SchemaError::NotParsed),
        }
    }

    /// Looks up a definition, failing if it is out of range.
    pub(crate) fn lookup(&self, index: DefinitionIndex) -> Result<&Definition> {
        let table = self.table()?;
        table
            .get(index as usize)
            .ok_or(SchemaError::DefinitionOutOfRange {
                index,
                count: table.len(),
            })
    }

    /// Looks up the field with wire id `field_id` on a definition.
    pub(crate) fn lookup_field(
        &self,
        definition: DefinitionIndex,
        field_id: u32,
    ) -> Result<&Field> {
        self.lookup(definition)?
            .field_by_value(field_id)
            .ok_or(SchemaError::UnknownField {
                definition,
                field_id,
            })
    }

    /// Returns `depth + 1`, or an error once the nesting limit is passed.
    pub(crate) fn descend(&self, depth: usize) -> Result<usize> {
        let next = depth + 1;
        if next > self.options.max_depth {
            tracing::warn!(limit = self.options.max_depth, "schema nesting limit exceeded");
            return Err(SchemaError::DepthLimitExceeded {
                limit: self.options.max_depth,
            });
        }
        Ok(next)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}
