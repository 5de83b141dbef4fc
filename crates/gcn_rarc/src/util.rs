//! Hashing, alignment and naming helpers shared by the reader and writer.

use crate::error::{Error, Result};

/// Alignment of every table and payload inside an archive
pub const BLOCK_ALIGNMENT: usize = 32;

/// Hash of a node or entry name as stored next to its string table offset.
///
/// Rolling `hash * 3 + byte` over the raw name bytes, stopping at the first
/// NUL.
pub fn name_hash(name: &[u8]) -> u16 {
    name.iter()
        .take_while(|&&b| b != 0)
        .fold(0u16, |hash, &b| hash.wrapping_mul(3).wrapping_add(b as u16))
}

/// Round `value` up to the next multiple of `alignment` (a power of two)
pub const fn align(value: usize, alignment: usize) -> usize {
    (value + alignment - 1) & !(alignment - 1)
}

/// Zero-fill `buffer` up to the next multiple of `alignment`
pub fn pad_to(buffer: &mut Vec<u8>, alignment: usize) {
    buffer.resize(align(buffer.len(), alignment), 0);
}

/// Node type tag for a directory: its name upper-cased, cut or space padded
/// to four characters.
pub fn node_kind(name: &str) -> [u8; 4] {
    let mut kind = [b' '; 4];
    name.bytes()
        .map(|b| b.to_ascii_uppercase())
        .take(4)
        .enumerate()
        .for_each(|(i, b)| kind[i] = b);
    kind
}

/// Check that a node or entry name can be used as a single path component
pub(crate) fn path_component(name: &str) -> Result<&str> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(Error::UnsafeName(name.to_owned()));
    }
    Ok(name)
}
