use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Load a file of little-endian `f32` values.
///
/// A length that is not a multiple of four is reported as `InvalidData`.
pub fn load_f32_file(path: impl AsRef<Path>) -> io::Result<Vec<f32>> {
    let mut buf = Vec::new();
    File::open(path.as_ref())?.read_to_end(&mut buf)?;
    decode_f32(&buf)
}

/// Decode raw little-endian `f32` bytes.
pub fn decode_f32(bytes: &[u8]) -> io::Result<Vec<f32>> {
    let chunks = bytes.chunks_exact(4);
    if !chunks.remainder().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} bytes is not a whole number of f32 values", bytes.len()),
        ));
    }
    Ok(chunks
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}
