//! This library handles reading from and creating **RARC** archives used by *GameCube* titles.
//!
//! # RARC Archive Format Documentation
//!
//! A RARC archive stores a directory tree in a single file. Archives are typically identified
//! with the `.arc` extension, or `.arc.szs` / `.arc.szp` when the whole archive is wrapped in
//! Yaz0 or Yay0 compression (see [`gcn_compression`]).
//!
//! ## File Structure
//!
//! An archive consists of a header, a node table, an entry table, a string table and the file
//! payloads. Offsets stored in the header are relative to 0x20, the end of the first header
//! block.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "RARC"                                            |
//! | 0x0004         | File Size              | 4 bytes: Size of the whole archive                         |
//! | 0x0008         | Header Size            | 4 bytes: Always 0x20                                       |
//! | 0x000C         | Data Offset            | 4 bytes: Offset of the payload region                      |
//! | 0x0010         | Data Size              | 4 bytes: Size of the payload region                        |
//! | 0x0014         | Reserved               | 4 bytes: Zero                                              |
//! | 0x0018         | ARAM Size              | 4 bytes: Size of the payloads loaded to ARAM               |
//! | 0x001C         | Reserved               | 4 bytes: Zero                                              |
//! | 0x0020         | Node Count             | 4 bytes: Number of nodes                                   |
//! | 0x0024         | Node Offset            | 4 bytes: Offset of the node table, always 0x20             |
//! | 0x0028         | Entry Count            | 4 bytes: Number of entries                                 |
//! | 0x002C         | Entry Offset           | 4 bytes: Offset of the entry table                         |
//! | 0x0030         | String Table Size      | 4 bytes: Size of the string table                          |
//! | 0x0034         | String Table Offset    | 4 bytes: Offset of the string table                        |
//! | 0x0038         | Secondary Entry Count  | 2 bytes: Entry count again, zero in legacy headers         |
//! | 0x003A         | Synced Ids             | 1 byte: Set when file ids equal entry indices              |
//! | 0x003B         | Padding                | 5 bytes: Zero                                              |
//!
//! A *legacy* header leaves both the ARAM size and the secondary entry count at zero. An
//! *extended* header sets either of them, and then the secondary count has to match.
//!
//! ### Node Table
//!
//! Each directory is a node; the root node comes first. The table is padded to an even count.
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Type                   | 4 bytes: Uppercase name prefix, "ROOT" for the root     |
//! | 0x0004         | Name Offset            | 4 bytes: Offset of the name in the string table         |
//! | 0x0008         | Name Hash              | 2 bytes: Hash of the name                               |
//! | 0x000A         | Entry Count            | 2 bytes: Number of entries owned by the node            |
//! | 0x000C         | First Entry            | 4 bytes: Index of the first owned entry                 |
//!
//! ### Entry Table
//!
//! Entries of a node are contiguous: files, then links to subdirectories, then `.` and `..`.
//! The root's `..` links to node `0xFFFFFFFF`.
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Id                     | 2 bytes: File id, 0xFFFF for directory links            |
//! | 0x0002         | Name Hash              | 2 bytes: Hash of the name                               |
//! | 0x0004         | Flags                  | 1 byte: Type and storage flags                          |
//! | 0x0005         | Name Offset            | 3 bytes: Offset of the name in the string table         |
//! | 0x0008         | Data Offset            | 4 bytes: Payload offset, or node index for links        |
//! | 0x000C         | Data Size              | 4 bytes: Payload size, 0x10 for links                   |
//! | 0x0010         | Reserved               | 4 bytes: Zero                                           |
//!
//! - **Flags**:
//!   - `0x01`: File
//!   - `0x02`: Directory
//!   - `0x04`: Compressed
//!   - `0x10`: Loaded to main memory
//!   - `0x20`: Loaded to ARAM
//!   - `0x40`: Read from the DVD
//!   - `0x80`: Yaz0 when compressed, Yay0 otherwise
//!
//! ### String Table
//!
//! NUL terminated Shift-JIS names, starting with `.` and `..`. Names are hashed with
//! `hash = hash * 3 + byte` over 16 bits.
//!
//! ### Payloads
//!
//! File payloads are aligned to 32 bytes. Compressed payloads come first so the ARAM size
//! marks the end of the compressed run.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.arc`
//! - **Endianness**: Big-endian for all multi-byte integers
//! - **Alignment**: Every table and payload is aligned to 32 bytes
//!

pub mod error;
pub mod read;
pub mod types;
pub mod util;
pub mod write;

pub use read::RarcArchive;
pub use write::{RarcWriter, RarcWriterOptions, SourceDirectory, TierPolicy};
