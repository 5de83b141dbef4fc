//! Error types that can be emitted from this library

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// Transparent wrapper for [`walkdir::Error`]
    #[error(transparent)]
    WalkDirError(#[from] walkdir::Error),

    /// Transparent wrapper for [`gcn_compression::error::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    CompressionError(#[from] gcn_compression::error::Error),

    /// file is an invalid rarc archive
    #[error("file is an invalid rarc archive")]
    InvalidArchive,

    /// a table or payload lies outside of the archive
    #[error("{region} at offset {offset:#x} with {len} bytes exceeds archive of {size} bytes")]
    OutOfBounds {
        /// which part of the archive was being read
        region: &'static str,
        /// absolute offset of the read
        offset: usize,
        /// number of bytes requested
        len: usize,
        /// size of the archive
        size: usize,
    },

    /// a directory link references a node that does not exist
    #[error("entry {entry} links to node {node} but the archive only has {count} nodes")]
    InvalidNodeIndex {
        /// index of the offending entry
        entry: usize,
        /// referenced node index
        node: u32,
        /// number of nodes in the archive
        count: usize,
    },

    /// the redundant entry counts in the header disagree
    #[error("header declares {entries} entries but its secondary count is {secondary}")]
    EntryCountMismatch {
        /// entry count at offset 0x28
        entries: u32,
        /// entry count at offset 0x38
        secondary: u16,
    },

    /// an entry's reserved field is not zero
    #[error("entry {0} has a non-zero reserved field")]
    ReservedNotZero(usize),

    /// a name cannot be used as a single path component
    #[error("name {0:?} cannot be used as a path component")]
    #[diagnostic(help("names must not be empty, `.` or `..`, nor contain path separators"))]
    UnsafeName(String),

    /// payload was requested from a directory link
    #[error("entry {0:?} is not a file")]
    NotAFile(String),

    /// a directory is required but the path is not one
    #[error("{0} is not an existing directory")]
    NotADirectory(PathBuf),

    /// the archive has more of something than its fields can describe
    #[error("archive exceeds the format limit: {0}")]
    TooLarge(&'static str),

    /// unable to find requested file
    #[error("unable to find requested file")]
    FileNotFound(#[from] FileNotFoundError),
}

/// Error type to provide further information when a file has not been found
#[derive(Error, Diagnostic, Debug)]
#[error("unable to find requested file")]
pub enum FileNotFoundError {
    /// at index {0}
    #[error("at index {0}")]
    Index(usize),

    /// by path {0}
    #[error("by path {0}")]
    Path(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
