//! Error types that can be emitted from this library

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

    /// data does not start with the expected magic
    #[error("data is not {0} compressed")]
    InvalidMagic(&'static str),

    /// a size or offset does not fit a 32-bit header field
    #[error("{0} bytes is too large for a 32-bit header field")]
    InputTooLarge(usize),

    /// the header declares an output larger than the input could ever produce
    #[error("declared size {declared} exceeds the limit of {limit} bytes")]
    DecodedSizeTooLarge {
        /// size read from the header
        declared: u64,
        /// largest size accepted for this input
        limit: u64,
    },

    /// a read would go past the end of a buffer
    #[error("read of {len} bytes at offset {offset:#x} exceeds buffer of {size} bytes")]
    OutOfBounds {
        /// offset of the attempted read
        offset: usize,
        /// number of bytes requested
        len: usize,
        /// size of the buffer being read
        size: usize,
    },

    /// a back-reference points before the start of the output
    #[error("back-reference distance {distance} at output position {position} is out of range")]
    InvalidBackReference {
        /// distance of the back-reference
        distance: usize,
        /// output position the reference was decoded at
        position: usize,
    },

    /// a back-reference would write past the declared output size
    #[error("back-reference of {length} bytes at {position} overruns output of {size} bytes")]
    OutputOverrun {
        /// length of the copy
        length: usize,
        /// output position the copy starts at
        position: usize,
        /// declared output size
        size: usize,
    },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
