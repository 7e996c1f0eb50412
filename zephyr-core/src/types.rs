//! Builtin wire types and the zigzag helpers shared by the encoders.
//!
//! Each builtin is identified on the wire by a negative tag inside the binary
//! schema description (`-1` for `bool` down to `-11` for `uint64`). Non-negative
//! tags refer to definitions and are handled by the schema crate.

/// Builtin primitive type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    /// One byte, `0` is false and anything else is true.
    Bool,
    /// One raw byte.
    Byte,
    /// Zigzag varint, 32 bits.
    Int32,
    /// Varint, 32 bits.
    Uint32,
    /// Compact float: one zero byte or four rotated bytes.
    Float32,
    /// Half precision float stored in two bytes.
    Float16,
    /// Eight raw bytes.
    Double,
    /// Length-prefixed UTF-8 text.
    String,
    /// Length-prefixed raw bytes.
    Bytes,
    /// Zigzag varint, 64 bits.
    Int64,
    /// Varint, 64 bits.
    Uint64,
}

impl BuiltinType {
    /// Every builtin in wire-tag order.
    pub const ALL: [Self; 11] = [
        Self::Bool,
        Self::Byte,
        Self::Int32,
        Self::Uint32,
        Self::Float32,
        Self::Float16,
        Self::Double,
        Self::String,
        Self::Bytes,
        Self::Int64,
        Self::Uint64,
    ];

    /// Returns the negative tag used in the binary schema description.
    #[must_use]
    pub const fn wire_tag(&self) -> i32 {
        match self {
            Self::Bool => -1,
            Self::Byte => -2,
            Self::Int32 => -3,
            Self::Uint32 => -4,
            Self::Float32 => -5,
            Self::Float16 => -6,
            Self::Double => -7,
            Self::String => -8,
            Self::Bytes => -9,
            Self::Int64 => -10,
            Self::Uint64 => -11,
        }
    }

    /// Maps a negative wire tag back to its builtin.
    #[must_use]
    pub const fn from_wire_tag(tag: i32) -> Option<Self> {
        match tag {
            -1 => Some(Self::Bool),
            -2 => Some(Self::Byte),
            -3 => Some(Self::Int32),
            -4 => Some(Self::Uint32),
            -5 => Some(Self::Float32),
            -6 => Some(Self::Float16),
            -7 => Some(Self::Double),
            -8 => Some(Self::String),
            -9 => Some(Self::Bytes),
            -10 => Some(Self::Int64),
            -11 => Some(Self::Uint64),
            _ => None,
        }
    }

    /// Returns the name used for this type in schema source files.
    #[must_use]
    pub const fn schema_name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Int32 => "int",
            Self::Uint32 => "uint",
            Self::Float32 => "float",
            Self::Float16 => "float16",
            Self::Double => "double",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
        }
    }

    /// Parses a builtin from its schema source name.
    #[must_use]
    pub fn from_schema_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.schema_name() == name)
    }

    /// Returns the encoded size when it does not depend on the value.
    #[must_use]
    pub const fn fixed_size(&self) -> Option<usize> {
        match self {
            Self::Bool | Self::Byte => Some(1),
            Self::Float16 => Some(2),
            Self::Double => Some(8),
            _ => None,
        }
    }

    /// Returns true for the length-prefixed types.
    #[must_use]
    pub const fn is_length_prefixed(&self) -> bool {
        matches!(self, Self::String | Self::Bytes)
    }
}

impl std::fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.schema_name())
    }
}

/// Zigzag-encodes a 32-bit signed integer.
#[inline(always)]
#[must_use]
pub const fn zigzag_encode_32(value: i32) -> u32 {
    (value.wrapping_shl(1) ^ (value >> 31)) as u32
}

/// Reverses [`zigzag_encode_32`].
#[inline(always)]
#[must_use]
pub const fn zigzag_decode_32(value: u32) -> i32 {
    if value & 1 != 0 {
        !(value >> 1) as i32
    } else {
        (value >> 1) as i32
    }
}

/// Zigzag-encodes a 64-bit signed integer.
#[inline(always)]
#[must_use]
pub const fn zigzag_encode_64(value: i64) -> u64 {
    (value.wrapping_shl(1) ^ (value >> 63)) as u64
}

/// Reverses [`zigzag_encode_64`].
#[inline(always)]
#[must_use]
pub const fn zigzag_decode_64(value: u64) -> i64 {
    if value & 1 != 0 {
        !(value >> 1) as i64
    } else {
        (value >> 1) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_tags_round_trip() {
        for ty in BuiltinType::ALL {
            assert_eq!(BuiltinType::from_wire_tag(ty.wire_tag()), Some(ty));
        }
        assert_eq!(BuiltinType::from_wire_tag(0), None);
        assert_eq!(BuiltinType::from_wire_tag(-12), None);
    }

    #[test]
    fn test_schema_names() {
        assert_eq!(BuiltinType::from_schema_name("uint"), Some(BuiltinType::Uint32));
        assert_eq!(BuiltinType::from_schema_name("float16"), Some(BuiltinType::Float16));
        assert_eq!(BuiltinType::from_schema_name("uint32"), None);
        assert_eq!(BuiltinType::Int64.to_string(), "int64");
    }

    #[test]
    fn test_fixed_sizes() {
        assert_eq!(BuiltinType::Bool.fixed_size(), Some(1));
        assert_eq!(BuiltinType::Float16.fixed_size(), Some(2));
        assert_eq!(BuiltinType::Double.fixed_size(), Some(8));
        assert_eq!(BuiltinType::Uint32.fixed_size(), None);
        assert!(BuiltinType::Bytes.is_length_prefixed());
        assert!(!BuiltinType::Float32.is_length_prefixed());
    }

    #[test]
    fn test_zigzag_table() {
        assert_eq!(zigzag_encode_32(0), 0);
        assert_eq!(zigzag_encode_32(-1), 1);
        assert_eq!(zigzag_encode_32(1), 2);
        assert_eq!(zigzag_encode_32(-2), 3);
        assert_eq!(zigzag_encode_32(2), 4);
        assert_eq!(zigzag_encode_32(i32::MIN), u32::MAX);
        assert_eq!(zigzag_decode_32(u32::MAX), i32::MIN);
        assert_eq!(zigzag_decode_32(u32::MAX - 1), i32::MAX);
    }

    #[test]
    fn test_zigzag_64_extremes() {
        assert_eq!(zigzag_encode_64(i64::MIN), u64::MAX);
        assert_eq!(zigzag_decode_64(zigzag_encode_64(i64::MAX)), i64::MAX);
        assert_eq!(zigzag_decode_64(zigzag_encode_64(-123_456_789)), -123_456_789);
    }
}
