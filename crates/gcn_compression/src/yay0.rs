//! Yay0 ("SZP") compression, the short-form variant.
//!
//! The stream is split into three tables located by the header: control
//! bits packed in big-endian 32-bit words directly after the header, a table
//! of 16-bit reference pairs, and a table of literal bytes and extra length
//! bytes in the order the decoder consumes them.

use std::io::Cursor;

use binrw::{BinRead, BinWrite};
use byteorder::{BigEndian, WriteBytesExt};
use tracing::{instrument, trace};

use crate::error::{Error, Result};
use crate::lz::{self, Token, Tokens};
use crate::view::ByteView;
use crate::HEADER_SIZE;

/// Yay0 header
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(magic = b"Yay0", big)]
pub struct Yay0Header {
    /// Size of the data once decompressed
    pub decompressed_size: u32,

    /// Offset from the start of the buffer to the reference pair table
    pub link_offset: u32,

    /// Offset from the start of the buffer to the literal/extra byte table
    pub chunk_offset: u32,
}

/// Whether `data` carries a Yay0 header.
///
/// Never fails; short buffers simply are not Yay0.
pub fn is_yay0(data: &[u8]) -> bool {
    data.len() >= HEADER_SIZE && data.starts_with(b"Yay0")
}

/// Decompress a Yay0 buffer
#[instrument(skip_all, err, fields(size = data.len()))]
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    if !is_yay0(data) {
        return Err(Error::InvalidMagic("Yay0"));
    }

    let header = Yay0Header::read(&mut Cursor::new(data))?;
    let size = lz::check_declared_size(header.decompressed_size, data.len())?;
    trace!(
        size,
        link_offset = header.link_offset,
        chunk_offset = header.chunk_offset,
        "decoding yay0 stream"
    );

    let mut output = Vec::with_capacity(size);
    let mut masks = ByteView::at(data, HEADER_SIZE);
    let mut links = ByteView::at(data, header.link_offset as usize);
    let mut chunks = ByteView::at(data, header.chunk_offset as usize);
    let mut control = 0u8;
    let mut bits = 0;

    while output.len() < size {
        if bits == 0 {
            control = masks.read_u8()?;
            bits = 8;
        }

        if control & 0x80 != 0 {
            output.push(chunks.read_u8()?);
        } else {
            let pair = links.read_u16()?;
            let (distance, length) = lz::decode_reference(pair, || chunks.read_u8())?;
            lz::copy_back_reference(&mut output, distance, length, size)?;
        }

        control <<= 1;
        bits -= 1;
    }

    Ok(output)
}

/// Compress `data` into a Yay0 buffer.
///
/// Only inputs too large for the 32-bit size field are rejected.
#[instrument(skip_all, err, fields(size = data.len()))]
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let decompressed_size = crate::checked_size(data)?;

    let mut masks: Vec<u8> = Vec::with_capacity(data.len() / 8 + 4);
    let mut links: Vec<u8> = Vec::with_capacity(data.len() / 2);
    let mut chunks: Vec<u8> = Vec::with_capacity(data.len());
    let mut mask = 0u32;
    let mut bits = 0;

    for token in Tokens::new(data) {
        mask <<= 1;
        match token {
            Token::Literal(byte) => {
                mask |= 1;
                chunks.push(byte);
            }
            Token::Reference { distance, length } => {
                let (pair, extra) = Token::reference_bytes(distance, length);
                links.write_u16::<BigEndian>(pair)?;
                chunks.extend(extra);
            }
        }

        bits += 1;
        if bits == 32 {
            masks.write_u32::<BigEndian>(mask)?;
            mask = 0;
            bits = 0;
        }
    }

    if bits > 0 {
        mask <<= 32 - bits;
        masks.write_u32::<BigEndian>(mask)?;
    }

    let header = Yay0Header {
        decompressed_size,
        link_offset: crate::checked_u32(HEADER_SIZE + masks.len())?,
        chunk_offset: crate::checked_u32(HEADER_SIZE + masks.len() + links.len())?,
    };

    let mut output = Cursor::new(Vec::with_capacity(
        HEADER_SIZE + masks.len() + links.len() + chunks.len(),
    ));
    header.write(&mut output)?;
    let mut output = output.into_inner();
    output.append(&mut masks);
    output.append(&mut links);
    output.append(&mut chunks);

    trace!(compressed = output.len(), "encoded yay0 stream");
    Ok(output)
}
