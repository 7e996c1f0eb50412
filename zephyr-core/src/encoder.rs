//! Encoder trait for typed accessors.
//!
//! This module provides the [`WireEncode`] trait that hand-written or
//! generated accessors use to append values with the matching wire encoding.

use crate::buffer::ByteBuffer;

/// Trait for values that append themselves to a [`ByteBuffer`].
///
/// # Example
/// ```
/// use zephyr_core::{ByteBuffer, WireEncode};
///
/// let mut buffer = ByteBuffer::new();
/// 300u32.encode(&mut buffer);
/// "ab".to_string().encode(&mut buffer);
/// assert_eq!(buffer.data(), [0xAC, 0x02, 0x02, b'a', b'b']);
/// ```
pub trait WireEncode {
    /// Appends the wire encoding of `self`.
    ///
    /// # Panics
    /// Panics if `buffer` is read-only.
    fn encode(&self, buffer: &mut ByteBuffer<'_>);

    /// Encodes `self` into a fresh growable buffer and returns its bytes.
    #[must_use]
    fn to_wire_bytes(&self) -> Vec<u8> {
        let mut buffer = ByteBuffer::new();
        self.encode(&mut buffer);
        buffer.into_vec()
    }
}

impl WireEncode for bool {
    fn encode(&self, buffer: &mut ByteBuffer<'_>) {
        buffer.write_bool(*self);
    }
}

impl WireEncode for u8 {
    fn encode(&self, buffer: &mut ByteBuffer<'_>) {
        buffer.write_byte(*self);
    }
}

impl WireEncode for i32 {
    fn encode(&self, buffer: &mut ByteBuffer<'_>) {
        buffer.write_var_int(*self);
    }
}

impl WireEncode for u32 {
    fn encode(&self, buffer: &mut ByteBuffer<'_>) {
        buffer.write_var_uint(*self);
    }
}

/// `f32` uses the compact float32 encoding; call
/// [`ByteBuffer::write_var_float16`] directly for half precision fields.
impl WireEncode for f32 {
    fn encode(&self, buffer: &mut ByteBuffer<'_>) {
        buffer.write_var_float(*self);
    }
}

impl WireEncode for f64 {
    fn encode(&self, buffer: &mut ByteBuffer<'_>) {
        buffer.write_double(*self);
    }
}

impl WireEncode for i64 {
    fn encode(&self, buffer: &mut ByteBuffer<'_>) {
        buffer.write_var_int64(*self);
    }
}

impl WireEncode for u64 {
    fn encode(&self, buffer: &mut ByteBuffer<'_>) {
        buffer.write_var_uint64(*self);
    }
}

impl WireEncode for str {
    fn encode(&self, buffer: &mut ByteBuffer<'_>) {
        buffer.write_string(self);
    }
}

impl WireEncode for String {
    fn encode(&self, buffer: &mut ByteBuffer<'_>) {
        buffer.write_string(self);
    }
}

/// Arrays are a varuint32 count followed by each element.
impl<T: WireEncode> WireEncode for [T] {
    fn encode(&self, buffer: &mut ByteBuffer<'_>) {
        let count = u32::try_from(self.len()).expect("array count exceeds u32");
        buffer.write_var_uint(count);
        for item in self {
            item.encode(buffer);
        }
    }
}

impl<T: WireEncode> WireEncode for Vec<T> {
    fn encode(&self, buffer: &mut ByteBuffer<'_>) {
        self.as_slice().encode(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_encodings() {
        assert_eq!(true.to_wire_bytes(), [1]);
        assert_eq!(0xABu8.to_wire_bytes(), [0xAB]);
        assert_eq!((-2i32).to_wire_bytes(), [0x03]);
        assert_eq!(300u32.to_wire_bytes(), [0xAC, 0x02]);
        assert_eq!(0.0f32.to_wire_bytes(), [0x00]);
        assert_eq!(1.0f64.to_wire_bytes().len(), 8);
        assert_eq!((-1i64).to_wire_bytes(), [0x01]);
        assert_eq!(u64::MAX.to_wire_bytes().len(), 9);
    }

    #[test]
    fn test_string_encoding() {
        assert_eq!("ab".to_wire_bytes(), [0x02, b'a', b'b']);
        assert_eq!(String::new().to_wire_bytes(), [0x00]);
    }

    #[test]
    fn test_array_encoding() {
        let values: Vec<u32> = vec![1, 300];
        assert_eq!(values.to_wire_bytes(), [0x02, 0x01, 0xAC, 0x02]);
        assert_eq!(Vec::<bool>::new().to_wire_bytes(), [0x00]);
    }
}
