//! Decoder trait for typed accessors.
//!
//! This module provides the [`WireDecode`] trait, the read-side counterpart
//! of [`WireEncode`](crate::encoder::WireEncode).

use crate::buffer::ByteBuffer;
use crate::error::Result;

/// Trait for values that read themselves from a [`ByteBuffer`].
///
/// A failed decode leaves the cursor wherever the last successful sub-read
/// left it; treat the error as terminal for the decode pass.
///
/// # Example
/// ```
/// use zephyr_core::{ByteBuffer, WireDecode};
///
/// let bytes = [0xAC, 0x02, 0x02, b'a', b'b'];
/// let mut buffer = ByteBuffer::read_only(&bytes);
/// assert_eq!(u32::decode(&mut buffer).unwrap(), 300);
/// assert_eq!(String::decode(&mut buffer).unwrap(), "ab");
/// ```
pub trait WireDecode: Sized {
    /// Reads one value at the cursor.
    ///
    /// # Errors
    /// Returns an error on a short read or malformed payload.
    fn decode(buffer: &mut ByteBuffer<'_>) -> Result<Self>;
}

impl WireDecode for bool {
    fn decode(buffer: &mut ByteBuffer<'_>) -> Result<Self> {
        buffer.read_bool()
    }
}

impl WireDecode for u8 {
    fn decode(buffer: &mut ByteBuffer<'_>) -> Result<Self> {
        buffer.read_byte()
    }
}

impl WireDecode for i32 {
    fn decode(buffer: &mut ByteBuffer<'_>) -> Result<Self> {
        buffer.read_var_int()
    }
}

impl WireDecode for u32 {
    fn decode(buffer: &mut ByteBuffer<'_>) -> Result<Self> {
        buffer.read_var_uint()
    }
}

impl WireDecode for f32 {
    fn decode(buffer: &mut ByteBuffer<'_>) -> Result<Self> {
        buffer.read_var_float()
    }
}

impl WireDecode for f64 {
    fn decode(buffer: &mut ByteBuffer<'_>) -> Result<Self> {
        buffer.read_double()
    }
}

impl WireDecode for i64 {
    fn decode(buffer: &mut ByteBuffer<'_>) -> Result<Self> {
        buffer.read_var_int64()
    }
}

impl WireDecode for u64 {
    fn decode(buffer: &mut ByteBuffer<'_>) -> Result<Self> {
        buffer.read_var_uint64()
    }
}

impl WireDecode for String {
    fn decode(buffer: &mut ByteBuffer<'_>) -> Result<Self> {
        buffer.read_str().map(str::to_owned)
    }
}

impl<T: WireDecode> WireDecode for Vec<T> {
    fn decode(buffer: &mut ByteBuffer<'_>) -> Result<Self> {
        let count = buffer.read_var_uint()? as usize;
        // Each element takes at least one byte, so the remaining length caps
        // the preallocation for hostile counts.
        let mut items = Vec::with_capacity(count.min(buffer.remaining()));
        for _ in 0..count {
            items.push(T::decode(buffer)?);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::WireEncode;
    use crate::error::Error;

    #[test]
    fn test_decode_scalars() {
        let mut out = ByteBuffer::new();
        true.encode(&mut out);
        (-7i32).encode(&mut out);
        1.25f32.encode(&mut out);
        i64::MIN.encode(&mut out);

        let mut buffer = out.reader();
        assert!(bool::decode(&mut buffer).unwrap());
        assert_eq!(i32::decode(&mut buffer).unwrap(), -7);
        assert_eq!(f32::decode(&mut buffer).unwrap(), 1.25);
        assert_eq!(i64::decode(&mut buffer).unwrap(), i64::MIN);
        assert_eq!(buffer.remaining(), 0);
    }

    #[test]
    fn test_decode_nested_arrays() {
        let values = vec![vec!["a".to_string()], vec![], vec!["bc".to_string(), "d".to_string()]];
        let bytes = values.to_wire_bytes();
        let mut buffer = ByteBuffer::read_only(&bytes);
        assert_eq!(Vec::<Vec<String>>::decode(&mut buffer).unwrap(), values);
    }

    #[test]
    fn test_decode_hostile_count() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0x0F, 0x01];
        let mut buffer = ByteBuffer::read_only(&bytes);
        assert!(matches!(
            Vec::<u8>::decode(&mut buffer),
            Err(Error::BufferTooShort { .. })
        ));
    }
}
