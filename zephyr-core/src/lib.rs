//! # Zephyr Core
//!
//! Byte-level substrate of the Zephyr serialization format.
//!
//! This crate provides:
//! - [`ByteBuffer`], a growable or read-only byte region with a read cursor
//!   and the compact wire encodings (varints, zigzag, compact floats,
//!   length-prefixed strings, deltas, bit packing)
//! - [`Arena`], a segment bump allocator handing out generation-checked spans
//! - [`BuiltinType`], the fixed set of primitive wire types
//! - [`WireEncode`]/[`WireDecode`] for typed accessors
//! - Error types for reads and arena lookups

pub mod arena;
pub mod buffer;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod types;

pub use arena::{Arena, DEFAULT_SEGMENT_SIZE, Span};
pub use buffer::ByteBuffer;
pub use decoder::WireDecode;
pub use encoder::WireEncode;
pub use error::{Error, Result};
pub use types::BuiltinType;
