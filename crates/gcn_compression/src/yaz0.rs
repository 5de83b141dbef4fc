//! Yaz0 ("SZS") compression, the long-form variant.
//!
//! The control byte for each group of eight decisions sits inline in the
//! stream, directly before the literals and reference pairs it describes.

use std::io::Cursor;

use binrw::{BinRead, BinWrite};
use byteorder::{BigEndian, WriteBytesExt};
use tracing::{instrument, trace};

use crate::error::{Error, Result};
use crate::lz::{self, Token, Tokens};
use crate::view::ByteView;
use crate::HEADER_SIZE;

/// Yaz0 header
///
/// Always starts with "Yaz0" followed by the big-endian size of the decoded
/// data and eight bytes of zeroed padding.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(magic = b"Yaz0", big)]
pub struct Yaz0Header {
    /// Size of the data once decompressed
    #[brw(pad_after = 8)]
    pub decompressed_size: u32,
}

/// Whether `data` carries a Yaz0 header.
///
/// Never fails; short buffers simply are not Yaz0.
pub fn is_yaz0(data: &[u8]) -> bool {
    data.len() >= HEADER_SIZE && data.starts_with(b"Yaz0")
}

/// Decompress a Yaz0 buffer
#[instrument(skip_all, err, fields(size = data.len()))]
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    if !is_yaz0(data) {
        return Err(Error::InvalidMagic("Yaz0"));
    }

    let header = Yaz0Header::read(&mut Cursor::new(data))?;
    let size = lz::check_declared_size(header.decompressed_size, data.len())?;
    trace!(size, "decoding yaz0 stream");

    let mut output = Vec::with_capacity(size);
    let mut stream = ByteView::at(data, HEADER_SIZE);
    let mut control = 0u8;
    let mut bits = 0;

    while output.len() < size {
        if bits == 0 {
            control = stream.read_u8()?;
            bits = 8;
        }

        if control & 0x80 != 0 {
            output.push(stream.read_u8()?);
        } else {
            let pair = stream.read_u16()?;
            let (distance, length) = lz::decode_reference(pair, || stream.read_u8())?;
            lz::copy_back_reference(&mut output, distance, length, size)?;
        }

        control <<= 1;
        bits -= 1;
    }

    Ok(output)
}

/// Compress `data` into a Yaz0 buffer.
///
/// Only inputs too large for the 32-bit size field are rejected.
#[instrument(skip_all, err, fields(size = data.len()))]
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let header = Yaz0Header {
        decompressed_size: crate::checked_size(data)?,
    };

    let mut output = Cursor::new(Vec::with_capacity(HEADER_SIZE + data.len() / 2));
    header.write(&mut output)?;
    let mut output = output.into_inner();

    let mut group = Vec::with_capacity(8 * 3);
    let mut control = 0u8;
    let mut bits = 0;

    for token in Tokens::new(data) {
        match token {
            Token::Literal(byte) => {
                control |= 0x80 >> bits;
                group.push(byte);
            }
            Token::Reference { distance, length } => {
                let (pair, extra) = Token::reference_bytes(distance, length);
                group.write_u16::<BigEndian>(pair)?;
                group.extend(extra);
            }
        }

        bits += 1;
        if bits == 8 {
            output.push(control);
            output.append(&mut group);
            control = 0;
            bits = 0;
        }
    }

    if bits > 0 {
        output.push(control);
        output.append(&mut group);
    }

    trace!(compressed = output.len(), "encoded yaz0 stream");
    Ok(output)
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::{BinRead, BinWrite};
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::error::{Error, Result};
    use crate::yaz0::{compress, decompress, is_yaz0, Yaz0Header};

    #[test]
    fn read_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x59, 0x61, 0x7A, 0x30,
            0x00, 0x00, 0x01, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ]);

        let expected = Yaz0Header {
            decompressed_size: 0x100,
        };

        assert_eq!(Yaz0Header::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn write_header() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0x59, 0x61, 0x7A, 0x30,
            0x00, 0x00, 0x00, 0x0A,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ];

        let mut actual = Vec::new();
        Yaz0Header {
            decompressed_size: 10,
        }
        .write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn detect() {
        assert!(is_yaz0(b"Yaz0\0\0\0\0\0\0\0\0\0\0\0\0"));
        assert!(!is_yaz0(b"Yaz0\0\0\0\0"));
        assert!(!is_yaz0(b"Yay0\0\0\0\0\0\0\0\0\0\0\0\0"));
        assert!(!is_yaz0(&[]));
    }

    #[traced_test]
    #[test]
    fn compress_run() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            // Header
            0x59, 0x61, 0x7A, 0x30,
            0x00, 0x00, 0x00, 0x0A,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            // Literal, then 9 bytes from distance 1
            0x80, 0x41, 0x70, 0x00,
        ];

        let actual = compress(b"AAAAAAAAAA")?;
        assert_eq!(actual, expected);
        assert_eq!(decompress(&actual)?, b"AAAAAAAAAA");

        Ok(())
    }

    #[traced_test]
    #[test]
    fn compress_long_match_uses_extra_byte() -> Result<()> {
        let input = vec![0x55u8; 40];

        #[rustfmt::skip]
        let expected = vec![
            0x59, 0x61, 0x7A, 0x30,
            0x00, 0x00, 0x00, 0x28,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            // Literal, then 39 bytes from distance 1 (39 - 0x12 = 0x15)
            0x80, 0x55, 0x00, 0x00, 0x15,
        ];

        let actual = compress(&input)?;
        assert_eq!(actual, expected);
        assert_eq!(decompress(&actual)?, input);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn compress_padding_around_marker() -> Result<()> {
        let mut input = vec![0u8; 300];
        input.push(0xAA);
        input.extend(std::iter::repeat(0u8).take(1000));

        #[rustfmt::skip]
        let expected_prefix = [
            0x59, 0x61, 0x7A, 0x30,
            0x00, 0x00, 0x05, 0x15,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x98,
            0x00,
            0x00, 0x00, 0xFF,
            0x01, 0x11, 0x08,
            0xAA,
            0x00,
            // the run after the marker copies from distance 1
            0x00, 0x00, 0xFF,
        ];

        let actual = compress(&input)?;
        assert_eq!(&actual[..expected_prefix.len()], &expected_prefix);
        assert_eq!(decompress(&actual)?, input);

        Ok(())
    }

    #[test]
    fn decompress_literals_across_groups() -> Result<()> {
        #[rustfmt::skip]
        let input = vec![
            0x59, 0x61, 0x7A, 0x30,
            0x00, 0x00, 0x00, 0x09,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0xFF, b'a', b'b', b'c', b'd', b'e', b'f', b'g', b'h',
            0x80, b'i',
        ];

        assert_eq!(decompress(&input)?, b"abcdefghi");

        Ok(())
    }

    #[test]
    fn decompress_empty() -> Result<()> {
        let compressed = compress(&[])?;
        assert_eq!(compressed.len(), 16);
        assert!(is_yaz0(&compressed));
        assert!(decompress(&compressed)?.is_empty());

        Ok(())
    }

    #[test]
    fn decompress_truncated_fails() {
        #[rustfmt::skip]
        let input = vec![
            0x59, 0x61, 0x7A, 0x30,
            0x00, 0x00, 0x00, 0x04,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0xFF, b'a', b'b',
        ];

        assert!(matches!(
            decompress(&input),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn decompress_rejects_oversized_header() {
        #[rustfmt::skip]
        let input = vec![
            0x59, 0x61, 0x7A, 0x30,
            0xFF, 0xFF, 0xFF, 0xFF,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00,
        ];

        assert!(matches!(
            decompress(&input),
            Err(Error::DecodedSizeTooLarge { .. })
        ));
    }

    #[test]
    fn decompress_wrong_magic_fails() {
        assert!(matches!(
            decompress(b"Yay0\0\0\0\0\0\0\0\0\0\0\0\0"),
            Err(Error::InvalidMagic("Yaz0"))
        ));
    }
}
