use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
/// Possible `libsrf` errors
pub enum Error {
    /// Error returned if a required companion file is absent
    #[error("required input file '{}' not found", path.display())]
    MissingInputFile {
        /// the missing file
        path: PathBuf,
    },
    /// Error returned if the first 16 bytes of a container do not
    /// match the SRF magic signature
    #[error("not an SRF container (bad magic signature)")]
    InvalidFormat,
    /// Error returned if the section count is 0 or greater than
    /// [`crate::MAX_SECTIONS`]
    #[error("section count {0} is out of range (expected 1..=9)")]
    SectionCountOutOfRange(u32),
    /// Error returned if a declared section lacks a width or height
    #[error("missing or invalid dimensions for section {section}")]
    MissingSectionDimension {
        /// one-based index of the offending section
        section: usize,
    },
    /// Error returned if the source canvas cannot hold every declared section
    #[error("canvas is too small for the declared sections: canvas {canvas:?}, required {required:?}")]
    CanvasTooSmall {
        /// canvas width/height
        canvas: (u32, u32),
        /// width/height required by the section table
        required: (u32, u32),
    },
    /// Error returned if an output file exists and overwriting was not requested
    #[error("output file '{}' already exists", path.display())]
    OutputAlreadyExists {
        /// the colliding file
        path: PathBuf,
    },
    /// Error returned by the opt-in trailer verification if the whole-file
    /// byte sum is not 0 modulo 256, or the file length is not a multiple
    /// of the 256-byte padding block
    #[error("container failed checksum verification (byte sum remainder {remainder}, length {length})")]
    ChecksumMismatch {
        /// whole-file additive byte sum modulo 256
        remainder: u8,
        /// total file length in bytes
        length: u64,
    },
    /// Unexpected i/o failure
    #[error("i/o error")]
    Io(#[from] std::io::Error),
}
