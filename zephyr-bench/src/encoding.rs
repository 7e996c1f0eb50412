//! Encoding/decoding timing helpers.

use zephyr_core::ByteBuffer;

/// Runs `encode_fn` `iterations` times against a buffer that is reset
/// between runs and returns the elapsed time.
pub fn benchmark_encode<F>(iterations: usize, mut encode_fn: F) -> std::time::Duration
where
    F: FnMut(&mut ByteBuffer<'static>),
{
    let start = std::time::Instant::now();

    for _ in 0..iterations {
        let mut buffer = ByteBuffer::with_capacity(1024);
        encode_fn(&mut buffer);
    }

    start.elapsed()
}

/// Runs `decode_fn` `iterations` times over a fresh reader on `data` and
/// returns the elapsed time.
pub fn benchmark_decode<F, T>(
    iterations: usize,
    data: &[u8],
    mut decode_fn: F,
) -> std::time::Duration
where
    F: FnMut(&mut ByteBuffer<'_>) -> T,
{
    let start = std::time::Instant::now();

    for _ in 0..iterations {
        let _ = decode_fn(&mut ByteBuffer::read_only(data));
    }

    start.elapsed()
}
