//! Base types for structure of a RARC archive.

use std::ops::BitOr;

use binrw::{BinRead, BinWrite};

/// Offsets stored in the header are relative to the end of this first block
pub const HEADER_BLOCK_SIZE: u32 = 0x20;

/// Size of the full header on disk
pub const HEADER_SIZE: usize = 0x40;

/// Size of a node record on disk
pub const NODE_SIZE: usize = 0x10;

/// Size of an entry record on disk
pub const ENTRY_SIZE: usize = 0x14;

/// Id given to entries that link to a directory
pub const DIRECTORY_ID: u16 = 0xFFFF;

/// Node index stored by the root's `..` link
pub const NO_PARENT: u32 = u32::MAX;

/// Data size recorded for directory links
pub const DIRECTORY_DATA_SIZE: u32 = 0x10;

/// RARC header
///
/// Always starts with "RARC" and is stored big endian. Every offset after
/// `header_size` is relative to [`HEADER_BLOCK_SIZE`].
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(magic = b"RARC", big)]
pub struct RarcHeader {
    /// Size of the whole archive
    pub file_size: u32,

    /// Size of the first header block, always 0x20
    pub header_size: u32,

    /// Offset of the payload region
    pub data_offset: u32,

    /// Size of the payload region
    pub data_size: u32,

    /// Reserved, zero on disk
    pub memory_size: u32,

    /// Size of the payloads that go to the fast (ARAM) storage tier
    pub fast_tier_size: u32,

    /// Reserved, zero on disk
    pub disc_size: u32,

    /// Number of nodes
    pub node_count: u32,

    /// Offset of the node table
    pub node_offset: u32,

    /// Number of entries across all nodes
    pub entry_count: u32,

    /// Offset of the entry table
    pub entry_offset: u32,

    /// Size of the string table
    pub string_table_size: u32,

    /// Offset of the string table
    pub string_table_offset: u32,

    /// Repeats `entry_count` in the extended layout, zero in the legacy one
    pub secondary_entry_count: u16,

    /// Set when every file id equals its entry index
    #[brw(pad_after = 5)]
    pub synced_ids: u8,
}

/// Generations of the header found on disk
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HeaderLayout {
    /// Early archives that never fill in the storage tier fields
    Legacy,

    /// Archives recording the fast tier size and the secondary entry count
    Extended,
}

impl RarcHeader {
    /// Which header generation wrote this header
    pub fn layout(&self) -> HeaderLayout {
        if self.fast_tier_size == 0 && self.secondary_entry_count == 0 {
            HeaderLayout::Legacy
        } else {
            HeaderLayout::Extended
        }
    }

    /// Absolute offset of the node table
    pub fn node_start(&self) -> usize {
        (HEADER_BLOCK_SIZE as usize).saturating_add(self.node_offset as usize)
    }

    /// Absolute offset of the entry table
    pub fn entry_start(&self) -> usize {
        (HEADER_BLOCK_SIZE as usize).saturating_add(self.entry_offset as usize)
    }

    /// Absolute offset of the string table
    pub fn string_table_start(&self) -> usize {
        (HEADER_BLOCK_SIZE as usize).saturating_add(self.string_table_offset as usize)
    }

    /// Absolute offset of the payload region
    pub fn data_start(&self) -> usize {
        (HEADER_BLOCK_SIZE as usize).saturating_add(self.data_offset as usize)
    }
}

/// A directory in the archive
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(big)]
pub struct RarcNode {
    /// Four character type tag, "ROOT" for the root node
    pub kind: [u8; 4],

    /// Offset of the name in the string table
    pub name_offset: u32,

    /// Hash of the name
    pub name_hash: u16,

    /// Number of entries owned by this node, `.` and `..` included
    pub entry_count: u16,

    /// Index of the first owned entry in the entry table
    pub first_entry: u32,
}

/// A file or a directory link
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(big)]
pub struct RarcEntry {
    /// File id, [`DIRECTORY_ID`] for directory links
    pub id: u16,

    /// Hash of the name
    pub name_hash: u16,

    /// Type and storage flags
    pub flags: EntryFlags,

    /// Offset of the name in the string table, 24 bits on disk
    #[br(map = |b: [u8; 3]| u32::from_be_bytes([0, b[0], b[1], b[2]]))]
    #[bw(map = |v: &u32| { let b = v.to_be_bytes(); [b[1], b[2], b[3]] })]
    pub name_offset: u32,

    /// Payload offset for files, target node index for directory links
    pub data_offset: u32,

    /// Payload size for files
    pub data_size: u32,

    /// Runtime pointer slot, zero on disk
    pub reserved: u32,
}

/// Flag byte of an entry
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[brw(big)]
pub struct EntryFlags(pub u8);

impl EntryFlags {
    /// Regular file
    pub const FILE: Self = Self(0x01);
    /// Directory link
    pub const DIRECTORY: Self = Self(0x02);
    /// Payload is compressed
    pub const COMPRESSED: Self = Self(0x04);
    /// Loaded to main memory
    pub const MEMORY: Self = Self(0x10);
    /// Loaded to auxiliary memory, the fast tier
    pub const ARAM: Self = Self(0x20);
    /// Read from the disc on demand
    pub const DVD: Self = Self(0x40);
    /// Compressed payload uses Yaz0 rather than Yay0
    pub const YAZ0: Self = Self(0x80);

    /// Whether every bit of `other` is set
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Storage tier selected by these flags, if any
    pub fn tier(self) -> Option<StorageTier> {
        if self.contains(Self::MEMORY) {
            Some(StorageTier::Memory)
        } else if self.contains(Self::ARAM) {
            Some(StorageTier::Aram)
        } else if self.contains(Self::DVD) {
            Some(StorageTier::Dvd)
        } else {
            None
        }
    }
}

impl BitOr for EntryFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Where the game loads a file's payload
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StorageTier {
    /// Main memory
    Memory,
    /// Auxiliary memory
    Aram,
    /// Streamed from the disc
    Dvd,
}

impl From<StorageTier> for EntryFlags {
    fn from(tier: StorageTier) -> Self {
        match tier {
            StorageTier::Memory => EntryFlags::MEMORY,
            StorageTier::Aram => EntryFlags::ARAM,
            StorageTier::Dvd => EntryFlags::DVD,
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::BinRead;
    use binrw::BinWrite;
    use pretty_assertions::assert_eq;

    use crate::error::Result;
    use crate::types::{EntryFlags, HeaderLayout, RarcEntry, RarcHeader, RarcNode, StorageTier};

    #[rustfmt::skip]
    const HEADER: [u8; 0x40] = [
        0x52, 0x41, 0x52, 0x43,
        0x00, 0x00, 0x01, 0x20,
        0x00, 0x00, 0x00, 0x20,
        0x00, 0x00, 0x00, 0xE0,
        0x00, 0x00, 0x00, 0x20,
        0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x20,
        0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x02,
        0x00, 0x00, 0x00, 0x20,
        0x00, 0x00, 0x00, 0x05,
        0x00, 0x00, 0x00, 0x40,
        0x00, 0x00, 0x00, 0x20,
        0x00, 0x00, 0x00, 0xC0,
        0x00, 0x05, 0x01, 0x00,
        0x00, 0x00, 0x00, 0x00,
    ];

    fn header() -> RarcHeader {
        RarcHeader {
            file_size: 0x120,
            header_size: 0x20,
            data_offset: 0xE0,
            data_size: 0x20,
            fast_tier_size: 0x20,
            node_count: 2,
            node_offset: 0x20,
            entry_count: 5,
            entry_offset: 0x40,
            string_table_size: 0x20,
            string_table_offset: 0xC0,
            secondary_entry_count: 5,
            synced_ids: 1,
            ..Default::default()
        }
    }

    #[test]
    fn read_header() -> Result<()> {
        let mut input = Cursor::new(HEADER.to_vec());

        let actual = RarcHeader::read(&mut input)?;
        assert_eq!(actual, header());
        assert_eq!(actual.layout(), HeaderLayout::Extended);
        assert_eq!(actual.node_start(), 0x40);
        assert_eq!(actual.entry_start(), 0x60);
        assert_eq!(actual.string_table_start(), 0xE0);
        assert_eq!(actual.data_start(), 0x100);

        Ok(())
    }

    #[test]
    fn write_header() -> Result<()> {
        let mut actual = Vec::new();
        header().write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, HEADER.to_vec());

        Ok(())
    }

    #[test]
    fn legacy_layout() {
        let legacy = RarcHeader {
            fast_tier_size: 0,
            secondary_entry_count: 0,
            ..header()
        };

        assert_eq!(legacy.layout(), HeaderLayout::Legacy);
    }

    #[test]
    fn read_node() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x52, 0x4F, 0x4F, 0x54,
            0x00, 0x00, 0x00, 0x05,
            0x01, 0x6B, 0x00, 0x04,
            0x00, 0x00, 0x00, 0x00,
        ]);

        let expected = RarcNode {
            kind: *b"ROOT",
            name_offset: 5,
            name_hash: 0x016B,
            entry_count: 4,
            first_entry: 0,
        };

        assert_eq!(RarcNode::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn read_entry() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x00, 0x00, 0x01, 0x6B,
            0x95, 0x01, 0x02, 0x03,
            0x00, 0x00, 0x00, 0x40,
            0x00, 0x00, 0x00, 0x0B,
            0x00, 0x00, 0x00, 0x00,
        ]);

        let expected = RarcEntry {
            id: 0,
            name_hash: 0x016B,
            flags: EntryFlags::FILE | EntryFlags::COMPRESSED | EntryFlags::MEMORY | EntryFlags::YAZ0,
            name_offset: 0x010203,
            data_offset: 0x40,
            data_size: 11,
            reserved: 0,
        };

        assert_eq!(RarcEntry::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn write_entry() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0xFF, 0xFF, 0x00, 0xB8,
            0x02, 0x00, 0x00, 0x02,
            0xFF, 0xFF, 0xFF, 0xFF,
            0x00, 0x00, 0x00, 0x10,
            0x00, 0x00, 0x00, 0x00,
        ];

        let entry = RarcEntry {
            id: 0xFFFF,
            name_hash: 0xB8,
            flags: EntryFlags::DIRECTORY,
            name_offset: 2,
            data_offset: u32::MAX,
            data_size: 0x10,
            reserved: 0,
        };

        let mut actual = Vec::new();
        entry.write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn flags() {
        let flags = EntryFlags::FILE | EntryFlags::ARAM;

        assert!(flags.contains(EntryFlags::FILE));
        assert!(!flags.contains(EntryFlags::DIRECTORY));
        assert_eq!(flags.tier(), Some(StorageTier::Aram));
        assert_eq!(EntryFlags::DIRECTORY.tier(), None);
        assert_eq!(EntryFlags::from(StorageTier::Dvd), EntryFlags::DVD);
    }
}
