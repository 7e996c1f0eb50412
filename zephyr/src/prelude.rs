//! Prelude module for convenient imports.
//!
//! ```
//! use zephyr::prelude::*;
//! ```

// Core types
pub use zephyr_core::{
    Arena, BuiltinType, ByteBuffer, Error as CoreError, Result as CoreResult, Span, WireDecode,
    WireEncode,
};

// Schema types
pub use zephyr_schema::{
    Definition, DefinitionIndex, DefinitionKind, Field, FieldShape, FieldSpec, FieldType,
    Repetition, Schema, SchemaBuilder, SchemaError, SchemaOptions, Value,
};
