//! Cursor-based byte buffer with the compact Zephyr wire encodings.
//!
//! A [`ByteBuffer`] is either growable (owns a `Vec<u8>`, appends at the end)
//! or read-only (borrows a slice). Both kinds carry a read cursor that only
//! moves forward. Every read validates the remaining length before touching
//! memory and returns [`Error::BufferTooShort`] on a short read; bytes consumed
//! by an earlier sub-read of the same primitive are not given back, so a
//! failed read ends the decode pass.
//!
//! Wire encodings:
//! - varuint32: base-128 groups, low group first, at most 5 groups read
//! - varint32/varint64: zigzag over the unsigned forms
//! - varuint64: up to 8 groups, then a 9th byte carrying the top 8 bits verbatim
//! - compact float32: rotated IEEE bits, or a single zero byte for a zero exponent
//! - float16: half precision with clamped exponent, two bytes little-endian
//! - double: 8 raw bytes in native order
//! - string/bytes: varuint32 length then the raw payload
//! - bits: LSB-first packing into an accumulator byte

use crate::arena::{Arena, Span};
use crate::error::{Error, Result};
use crate::types::{zigzag_decode_32, zigzag_decode_64, zigzag_encode_32, zigzag_encode_64};

/// Initial capacity of a growable buffer in bytes.
pub const INITIAL_CAPACITY: usize = 256;

/// Factor applied to the required size when a growable buffer overflows.
pub const GROWTH_FACTOR: usize = 2;

#[derive(Debug)]
enum Storage<'a> {
    Owned(Vec<u8>),
    Borrowed(&'a [u8]),
}

/// Growable or read-only byte region with a forward-only read cursor.
///
/// Invariant: `position() <= len() <= capacity()`.
#[derive(Debug)]
pub struct ByteBuffer<'a> {
    storage: Storage<'a>,
    index: usize,
    bit_buffer: u8,
    bit_offset: u8,
}

impl ByteBuffer<'static> {
    /// Creates an empty growable buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Creates an empty growable buffer with room for `capacity` bytes.
    ///
    /// # Arguments
    /// * `capacity` - Initial capacity in bytes
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_storage(Storage::Owned(Vec::with_capacity(capacity)))
    }

    /// Wraps existing bytes in a growable buffer; the cursor starts at 0.
    #[must_use]
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self::from_storage(Storage::Owned(data))
    }
}

impl<'a> ByteBuffer<'a> {
    /// Wraps a borrowed region read-only. Writes panic.
    #[must_use]
    pub fn read_only(data: &'a [u8]) -> Self {
        Self::from_storage(Storage::Borrowed(data))
    }

    fn from_storage(storage: Storage<'a>) -> Self {
        Self {
            storage,
            index: 0,
            bit_buffer: 0,
            bit_offset: 0,
        }
    }

    /// Returns the logical contents of the buffer.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        match &self.storage {
            Storage::Owned(v) => v,
            Storage::Borrowed(s) => s,
        }
    }

    /// Returns the logical size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Returns true if the buffer holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the allocated capacity. Equals `len()` for read-only buffers.
    #[must_use]
    pub fn capacity(&self) -> usize {
        match &self.storage {
            Storage::Owned(v) => v.capacity(),
            Storage::Borrowed(s) => s.len(),
        }
    }

    /// Returns the read cursor.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.index
    }

    /// Returns the number of unread bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.len() - self.index
    }

    /// Returns true if the buffer borrows its bytes and rejects writes.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        matches!(self.storage, Storage::Borrowed(_))
    }

    /// Returns the pending bit state as `(partial byte, bit offset)`.
    #[must_use]
    pub const fn bit_state(&self) -> (u8, u8) {
        (self.bit_buffer, self.bit_offset)
    }

    /// Consumes the buffer and returns its bytes.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        match self.storage {
            Storage::Owned(v) => v,
            Storage::Borrowed(s) => s.to_vec(),
        }
    }

    /// Returns a read-only buffer over the same bytes with a fresh cursor.
    #[must_use]
    pub fn reader(&self) -> ByteBuffer<'_> {
        ByteBuffer::read_only(self.data())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    #[inline]
    fn take(&mut self, count: usize) -> Result<&[u8]> {
        let available = self.remaining();
        if count > available {
            return Err(Error::BufferTooShort {
                required: count,
                available,
            });
        }
        let start = self.index;
        self.index += count;
        Ok(&self.data()[start..start + count])
    }

    /// Reads one raw byte.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] at the end of the buffer.
    #[inline]
    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Reads one byte as a boolean (`byte != 0`).
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] at the end of the buffer.
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_byte()? != 0)
    }

    /// Reads a compact float32.
    ///
    /// A lone zero byte decodes to `0.0`; anything else is the first of four
    /// rotated bytes.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] on a short read. The first byte stays
    /// consumed when the remaining three are missing.
    pub fn read_var_float(&mut self) -> Result<f32> {
        let first = self.read_byte()?;
        if first == 0 {
            return Ok(0.0);
        }
        let rest = self.take(3)?;
        let bits = u32::from_le_bytes([first, rest[0], rest[1], rest[2]]);
        Ok(f32::from_bits(bits.rotate_right(9)))
    }

    /// Reads a half precision float and widens it to `f32`.
    ///
    /// A stored exponent of 0 decodes to signed zero and 31 to infinity/NaN.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if fewer than 2 bytes remain.
    pub fn read_var_float16(&mut self) -> Result<f32> {
        let bytes = self.take(2)?;
        let half = u16::from_le_bytes([bytes[0], bytes[1]]) as u32;

        let sign = (half >> 15) & 0x1;
        let exp = (half >> 10) & 0x1F;
        let mantissa = half & 0x3FF;

        let bits = match exp {
            0 => sign << 31,
            31 => (sign << 31) | 0x7F80_0000 | (mantissa << 13),
            _ => (sign << 31) | ((exp + 112) << 23) | (mantissa << 13),
        };
        Ok(f32::from_bits(bits))
    }

    /// Reads 8 raw bytes as a native-order double.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if fewer than 8 bytes remain.
    pub fn read_double(&mut self) -> Result<f64> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(f64::from_ne_bytes(raw))
    }

    /// Reads a varuint32.
    ///
    /// At most 5 groups are read; bits shifted past 32 are dropped.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if the buffer ends mid-value.
    pub fn read_var_uint(&mut self) -> Result<u32> {
        let mut result: u32 = 0;
        let mut shift = 0u32;
        loop {
            let byte = self.read_byte()?;
            result |= ((byte & 127) as u32) << shift;
            shift += 7;
            if byte & 128 == 0 || shift >= 35 {
                return Ok(result);
            }
        }
    }

    /// Reads a zigzag varint32.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if the buffer ends mid-value.
    pub fn read_var_int(&mut self) -> Result<i32> {
        Ok(zigzag_decode_32(self.read_var_uint()?))
    }

    /// Reads a varuint64.
    ///
    /// After 8 continuation groups the 9th byte supplies the top 8 bits
    /// verbatim.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if the buffer ends mid-value.
    pub fn read_var_uint64(&mut self) -> Result<u64> {
        let mut result: u64 = 0;
        let mut shift = 0u32;
        loop {
            let byte = self.read_byte()?;
            if byte & 128 == 0 || shift >= 56 {
                return Ok(result | ((byte as u64) << shift));
            }
            result |= ((byte & 127) as u64) << shift;
            shift += 7;
        }
    }

    /// Reads a zigzag varint64.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if the buffer ends mid-value.
    pub fn read_var_int64(&mut self) -> Result<i64> {
        Ok(zigzag_decode_64(self.read_var_uint64()?))
    }

    /// Reads a length-prefixed string as a byte view into the buffer.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if the prefix or payload is short.
    /// The prefix stays consumed when the payload is short.
    pub fn read_string(&mut self) -> Result<&[u8]> {
        let len = self.read_var_uint()? as usize;
        self.take(len)
    }

    /// Reads a length-prefixed string and validates it as UTF-8.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] on a short read or
    /// [`Error::InvalidUtf8`] if the payload is not UTF-8.
    pub fn read_str(&mut self) -> Result<&str> {
        let len = self.read_var_uint()? as usize;
        let offset = self.index;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8 { offset })
    }

    /// Reads a length-prefixed string and copies it into `arena`.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if the prefix or payload is short.
    pub fn read_string_into(&mut self, arena: &mut Arena) -> Result<Span> {
        let bytes = self.read_string()?;
        Ok(arena.alloc_bytes(bytes))
    }

    /// Reads a length-prefixed byte array as a view into the buffer.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if the prefix or payload is short.
    pub fn read_bytes(&mut self) -> Result<&[u8]> {
        self.read_string()
    }

    /// Reads a delta-coded varint32 and folds it into `last`.
    ///
    /// # Arguments
    /// * `last` - Running value of the sequence, updated on success
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if the buffer ends mid-value;
    /// `last` is left untouched in that case.
    pub fn read_var_int_delta(&mut self, last: &mut i32) -> Result<i32> {
        let delta = self.read_var_int()?;
        *last = last.wrapping_add(delta);
        Ok(*last)
    }

    /// Reads `bit_count` bits, LSB first, from the pending bit byte.
    ///
    /// A fresh byte is pulled from the stream whenever the bit offset is 0.
    /// Bits of a value that would straddle two bytes are not carried over.
    ///
    /// # Panics
    /// Panics if `bit_count > 8`.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if a fresh byte is needed and none
    /// remain.
    pub fn read_bits(&mut self, bit_count: u8) -> Result<u8> {
        assert!(bit_count <= 8, "bit count must be 0..=8, got {bit_count}");
        if self.bit_offset == 0 {
            self.bit_buffer = self.read_byte()?;
        }

        let mask = ((1u16 << bit_count) - 1) as u8;
        let value = self.bit_buffer.checked_shr(self.bit_offset as u32).unwrap_or(0) & mask;
        self.bit_offset += bit_count;
        if self.bit_offset >= 8 {
            self.bit_offset = 0;
        }
        Ok(value)
    }

    /// Drops any pending bit state so the next bit read pulls a fresh byte.
    pub fn reset_bits(&mut self) {
        self.bit_buffer = 0;
        self.bit_offset = 0;
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    fn owned(&mut self) -> &mut Vec<u8> {
        match &mut self.storage {
            Storage::Owned(v) => v,
            Storage::Borrowed(_) => panic!("write to a read-only ByteBuffer"),
        }
    }

    fn grow_by(&mut self, amount: usize) -> &mut [u8] {
        let data = self.owned();
        let start = data.len();
        let required = start + amount;
        if required > data.capacity() {
            let new_capacity = required * GROWTH_FACTOR;
            tracing::trace!(from = data.capacity(), to = new_capacity, "byte buffer grow");
            data.reserve_exact(new_capacity - start);
        }
        data.resize(required, 0);
        &mut data[start..]
    }

    /// Appends one raw byte.
    ///
    /// # Panics
    /// Panics if the buffer is read-only.
    #[inline]
    pub fn write_byte(&mut self, value: u8) {
        self.grow_by(1)[0] = value;
    }

    /// Appends a boolean as one byte.
    ///
    /// # Panics
    /// Panics if the buffer is read-only.
    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.write_byte(u8::from(value));
    }

    /// Appends a compact float32.
    ///
    /// Values whose biased exponent is zero (signed zero and every subnormal)
    /// are written as a single zero byte and read back as `0.0`.
    ///
    /// # Panics
    /// Panics if the buffer is read-only.
    pub fn write_var_float(&mut self, value: f32) {
        let bits = value.to_bits().rotate_left(9);
        if bits & 255 == 0 {
            self.write_byte(0);
            return;
        }
        self.grow_by(4).copy_from_slice(&bits.to_le_bytes());
    }

    /// Appends a half precision float narrowed from `value`.
    ///
    /// Zero and subnormal inputs collapse to signed zero. Exponents outside
    /// the half range are clamped into `0..=31` rather than rounded to
    /// infinity or zero.
    ///
    /// # Panics
    /// Panics if the buffer is read-only.
    pub fn write_var_float16(&mut self, value: f32) {
        let bits = value.to_bits();
        let sign = (bits >> 31) & 0x1;
        let exp = (bits >> 23) & 0xFF;
        let mantissa = (bits >> 13) & 0x3FF;

        let half = match exp {
            0 => sign << 15,
            255 => (sign << 15) | 0x7C00 | mantissa,
            _ => {
                let exp_half = (exp as i32 - 112).clamp(0, 31) as u32;
                (sign << 15) | (exp_half << 10) | mantissa
            }
        };
        self.grow_by(2).copy_from_slice(&(half as u16).to_le_bytes());
    }

    /// Appends 8 raw bytes in native order.
    ///
    /// # Panics
    /// Panics if the buffer is read-only.
    pub fn write_double(&mut self, value: f64) {
        self.grow_by(8).copy_from_slice(&value.to_ne_bytes());
    }

    /// Appends a varuint32.
    ///
    /// # Panics
    /// Panics if the buffer is read-only.
    pub fn write_var_uint(&mut self, mut value: u32) {
        loop {
            let byte = (value & 127) as u8;
            value >>= 7;
            if value == 0 {
                self.write_byte(byte);
                return;
            }
            self.write_byte(byte | 128);
        }
    }

    /// Appends a zigzag varint32.
    ///
    /// # Panics
    /// Panics if the buffer is read-only.
    pub fn write_var_int(&mut self, value: i32) {
        self.write_var_uint(zigzag_encode_32(value));
    }

    /// Appends a varuint64 of at most 9 bytes.
    ///
    /// # Panics
    /// Panics if the buffer is read-only.
    pub fn write_var_uint64(&mut self, mut value: u64) {
        let mut groups = 0;
        while value > 127 && groups < 8 {
            self.write_byte((value & 127) as u8 | 128);
            value >>= 7;
            groups += 1;
        }
        self.write_byte(value as u8);
    }

    /// Appends a zigzag varint64.
    ///
    /// # Panics
    /// Panics if the buffer is read-only.
    pub fn write_var_int64(&mut self, value: i64) {
        self.write_var_uint64(zigzag_encode_64(value));
    }

    /// Appends a length-prefixed string. No terminator is written.
    ///
    /// # Panics
    /// Panics if the buffer is read-only or the string exceeds `u32::MAX`
    /// bytes.
    pub fn write_string(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
    }

    /// Appends a length-prefixed byte array.
    ///
    /// # Panics
    /// Panics if the buffer is read-only or `value` exceeds `u32::MAX` bytes.
    pub fn write_bytes(&mut self, value: &[u8]) {
        let len = u32::try_from(value.len()).expect("length prefix exceeds u32");
        self.write_var_uint(len);
        self.grow_by(value.len()).copy_from_slice(value);
    }

    /// Appends `value - last` as a zigzag varint32 and stores `value` in `last`.
    ///
    /// # Panics
    /// Panics if the buffer is read-only.
    pub fn write_var_int_delta(&mut self, value: i32, last: &mut i32) {
        self.write_var_int(value.wrapping_sub(*last));
        *last = value;
    }

    /// Packs `bit_count` bits of `value`, LSB first, into the pending byte.
    ///
    /// The byte is appended once 8 bits have accumulated. A trailing partial
    /// byte stays pending until [`flush_bits`](Self::flush_bits).
    ///
    /// # Panics
    /// Panics if the buffer is read-only, `bit_count > 8`, or `value` does not
    /// fit in `bit_count` bits.
    pub fn write_bits(&mut self, value: u8, bit_count: u8) {
        assert!(!self.is_read_only(), "write to a read-only ByteBuffer");
        assert!(bit_count <= 8, "bit count must be 0..=8, got {bit_count}");
        assert!(
            (value as u16) < (1u16 << bit_count),
            "value {value} does not fit in {bit_count} bits"
        );

        self.bit_buffer |= value.checked_shl(self.bit_offset as u32).unwrap_or(0);
        self.bit_offset += bit_count;
        if self.bit_offset >= 8 {
            let byte = self.bit_buffer;
            self.write_byte(byte);
            self.reset_bits();
        }
    }

    /// Appends the pending partial bit byte, zero-padded, if any.
    ///
    /// # Panics
    /// Panics if the buffer is read-only.
    pub fn flush_bits(&mut self) {
        if self.bit_offset > 0 {
            let byte = self.bit_buffer;
            self.write_byte(byte);
            self.reset_bits();
        }
    }
}

impl Default for ByteBuffer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<[u8]> for ByteBuffer<'_> {
    fn as_ref(&self) -> &[u8] {
        self.data()
    }
}

impl<'a> From<&'a [u8]> for ByteBuffer<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self::read_only(data)
    }
}

impl From<Vec<u8>> for ByteBuffer<'static> {
    fn from(data: Vec<u8>) -> Self {
        Self::from_vec(data)
    }
}
