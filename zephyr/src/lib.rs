//! # Zephyr
//!
//! Compact binary serialization with a self-describing schema engine.
//!
//! Zephyr encodes values with varints, zigzag integers, compact floats and
//! length-prefixed strings. A binary schema description, parsed once at
//! startup, lets a reader decode only the message fields it cares about and
//! skip the rest by walking their declared shape.
//!
//! ## Quick Start
//!
//! ```
//! use zephyr::prelude::*;
//!
//! let mut builder = SchemaBuilder::new();
//! let msg = builder.definition("Greeting", DefinitionKind::Message);
//! builder
//!     .field(msg, FieldSpec::new("id", BuiltinType::Uint32, 1))
//!     .field(msg, FieldSpec::new("text", BuiltinType::String, 2));
//! let schema = Schema::from_bytes(&builder.to_bytes())?;
//!
//! // Wire: only field 2 present, then the terminator.
//! let mut writer = ByteBuffer::new();
//! writer.write_var_uint(2);
//! writer.write_string("hi");
//! writer.write_var_uint(0);
//!
//! let mut reader = writer.reader();
//! let id = reader.read_var_uint()?;
//! schema.skip_field(&mut reader, msg, id)?;
//! assert_eq!(reader.read_var_uint()?, 0);
//! # Ok::<(), SchemaError>(())
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Byte buffer, wire encodings, arena, typed accessor traits
//! - [`schema`] - Schema parsing, lookup, skipping and dynamic values

pub mod prelude;

/// Byte buffer, wire encodings and arena.
pub mod core {
    pub use zephyr_core::*;
}

/// Schema engine.
pub mod schema {
    pub use zephyr_schema::*;
}

pub use zephyr_core::{Arena, ByteBuffer, Span, WireDecode, WireEncode};
pub use zephyr_schema::{Schema, SchemaBuilder, SchemaOptions, Value};
