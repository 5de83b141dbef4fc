//! This library handles compressing and decompressing the **Yaz0** and **Yay0** formats used by
//! *GameCube* titles.
//!
//! # Compression Format Documentation
//!
//! Both formats are LZ77 derivatives sharing one token stream: each decision is a single control
//! bit, read most significant bit first. A set bit copies one literal byte to the output, a clear
//! bit copies a run of previously decoded bytes (a back-reference). The formats differ only in
//! where the control bits, back-references and literals are stored.
//!
//! Files compressed with Yaz0 are typically identified with the `.szs` extension, and files
//! compressed with Yay0 with the `.szp` extension.
//!
//! ## Back-references
//!
//! A back-reference is stored as two bytes, optionally followed by a third:
//!
//! | Bits           | Field       | Description                                              |
//! |----------------|-------------|----------------------------------------------------------|
//! | 15..12         | Length      | `length - 2`, or `0` when an extra length byte follows   |
//! | 11..0          | Distance    | `distance - 1`, reaching up to 4096 bytes back           |
//! | extra byte     | Long length | `length - 0x12`, covering lengths 18 to 273              |
//!
//! The copied range may overlap the bytes being written, so a distance of 1 repeats the previous
//! byte `length` times.
//!
//! ## Yaz0 (long-form)
//!
//! | Offset (bytes) | Field             | Description                                       |
//! |----------------|-------------------|---------------------------------------------------|
//! | 0x0000         | Magic number      | 4 bytes: "Yaz0"                                   |
//! | 0x0004         | Decompressed size | 4 bytes: Size of the decoded data                 |
//! | 0x0008         | Padding           | 8 bytes: Zero                                     |
//! | 0x0010         | Data              | Groups of one control byte and up to 8 tokens     |
//!
//! ## Yay0 (short-form)
//!
//! | Offset (bytes) | Field             | Description                                       |
//! |----------------|-------------------|---------------------------------------------------|
//! | 0x0000         | Magic number      | 4 bytes: "Yay0"                                   |
//! | 0x0004         | Decompressed size | 4 bytes: Size of the decoded data                 |
//! | 0x0008         | Link offset       | 4 bytes: Offset of the back-reference table       |
//! | 0x000C         | Chunk offset      | 4 bytes: Offset of the literal/extra byte table   |
//! | 0x0010         | Masks             | Control bits in 32-bit words                      |
//!
//! ## Additional Information
//!
//! - **Endianness**: Big-endian for all multi-byte integers
//! - The encoder reproduces the match selection of the reference tools, including their
//!   tie-breaking and one byte lookahead, so outputs are byte identical to them.
//!

use std::borrow::Cow;

pub mod error;
pub mod lz;
pub mod view;
pub mod yay0;
pub mod yaz0;

pub use view::ByteView;
pub use yay0::is_yay0;
pub use yaz0::is_yaz0;

use error::{Error, Result};

/// Size of the fixed header shared by both formats
pub const HEADER_SIZE: usize = 0x10;

/// Identifies the compression wrapped around a buffer
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum CompressionKind {
    /// Stores the data as it is
    #[default]
    None,

    /// Yay0, the short-form variant (`.szp`)
    Yay0,

    /// Yaz0, the long-form variant (`.szs`)
    Yaz0,
}

impl CompressionKind {
    /// Detect the compression of `data` from its magic
    pub fn detect(data: &[u8]) -> Self {
        if is_yay0(data) {
            CompressionKind::Yay0
        } else if is_yaz0(data) {
            CompressionKind::Yaz0
        } else {
            CompressionKind::None
        }
    }

    /// The file extension conventionally used for this compression
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            CompressionKind::None => None,
            CompressionKind::Yay0 => Some("szp"),
            CompressionKind::Yaz0 => Some("szs"),
        }
    }

    /// The compression requested by a file name's extension, if any
    pub fn from_file_name(name: &str) -> Self {
        match name.rsplit_once('.').map(|(_, ext)| ext) {
            Some("szp") => CompressionKind::Yay0,
            Some("szs") => CompressionKind::Yaz0,
            _ => CompressionKind::None,
        }
    }
}

/// Size a buffer will have once decoded, if it is compressed
pub fn decoded_size(data: &[u8]) -> Option<u32> {
    match CompressionKind::detect(data) {
        CompressionKind::None => None,
        _ => ByteView::new(data).u32_at(4).ok(),
    }
}

/// Compress `data` with the requested method
pub fn compress(kind: CompressionKind, data: &[u8]) -> Result<Cow<'_, [u8]>> {
    Ok(match kind {
        CompressionKind::None => Cow::Borrowed(data),
        CompressionKind::Yay0 => Cow::Owned(yay0::compress(data)?),
        CompressionKind::Yaz0 => Cow::Owned(yaz0::compress(data)?),
    })
}

/// Decompress `data` if it carries either header, otherwise hand it back untouched
pub fn decompress(data: &[u8]) -> Result<Cow<'_, [u8]>> {
    Ok(match CompressionKind::detect(data) {
        CompressionKind::None => Cow::Borrowed(data),
        CompressionKind::Yay0 => Cow::Owned(yay0::decompress(data)?),
        CompressionKind::Yaz0 => Cow::Owned(yaz0::decompress(data)?),
    })
}

pub(crate) fn checked_size(data: &[u8]) -> Result<u32> {
    checked_u32(data.len())
}

/// Narrow a size or offset into a 32-bit header field
pub(crate) fn checked_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::InputTooLarge(value))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::{checked_u32, compress, decoded_size, decompress, CompressionKind};

    #[test]
    fn header_fields_do_not_truncate() -> Result<()> {
        assert_eq!(checked_u32(0x10)?, 0x10);
        assert_eq!(checked_u32(u32::MAX as usize)?, u32::MAX);

        #[cfg(target_pointer_width = "64")]
        assert!(matches!(
            checked_u32(u32::MAX as usize + 1),
            Err(Error::InputTooLarge(_))
        ));

        Ok(())
    }

    #[test]
    fn detect_kinds() -> Result<()> {
        let data = b"hello hello hello hello";

        assert_eq!(CompressionKind::detect(data), CompressionKind::None);
        assert_eq!(
            CompressionKind::detect(&compress(CompressionKind::Yay0, data)?),
            CompressionKind::Yay0
        );
        assert_eq!(
            CompressionKind::detect(&compress(CompressionKind::Yaz0, data)?),
            CompressionKind::Yaz0
        );

        Ok(())
    }

    #[test]
    fn kinds_from_file_names() {
        assert_eq!(
            CompressionKind::from_file_name("model.szs"),
            CompressionKind::Yaz0
        );
        assert_eq!(
            CompressionKind::from_file_name("layout.arc.szp"),
            CompressionKind::Yay0
        );
        assert_eq!(
            CompressionKind::from_file_name("readme.txt"),
            CompressionKind::None
        );
        assert_eq!(CompressionKind::from_file_name("szs"), CompressionKind::None);
    }

    #[test]
    fn dispatch_round_trip() -> Result<()> {
        let data = [0x00, 0x00, 0x00, 0x01, 0x01, 0x01, 0x01, 0x05];

        for kind in [
            CompressionKind::None,
            CompressionKind::Yay0,
            CompressionKind::Yaz0,
        ] {
            let compressed = compress(kind, &data)?;
            assert_eq!(decoded_size(&compressed).unwrap_or(8), 8);
            assert_eq!(decompress(&compressed)?.as_ref(), &data);
        }

        Ok(())
    }
}
