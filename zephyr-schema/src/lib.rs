//! # Zephyr Schema
//!
//! Self-describing schema engine for the Zephyr serialization format.
//!
//! This crate provides:
//! - Binary schema description parsing into a table of enum, struct and
//!   message definitions
//! - Definition lookup by name
//! - Recursive, schema-driven skipping of unread fields
//! - A schema description writer ([`SchemaBuilder`])
//! - Dynamic decoding and encoding through [`Value`]
//!
//! Field names live in the schema's arena; definitions reference each other
//! by table index, so self and mutually recursive schemas are supported.

pub mod builder;
pub mod error;
pub mod options;
pub mod parser;
pub mod skip;
pub mod types;
pub mod validation;
pub mod value;

pub use builder::{FieldSpec, SchemaBuilder};
pub use error::{Result, SchemaError};
pub use options::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_ELEMENTS, SchemaOptions};
pub use types::{
    Definition, DefinitionIndex, DefinitionKind, Field, FieldShape, FieldType, Repetition, Schema,
};
pub use value::Value;
