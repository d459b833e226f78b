//! # libsrf
//!
//!
//! This library provides datatypes and i/o functionality for the Garmin SRF file format, a
//! proprietary little-endian binary raster container (magic string `GARMIN BITMAP 01`) used for
//! vehicle icon bitmaps on legacy navigation devices.
//!
//! A container holds 1-9 vertically stacked image *sections*, each stored as a complete alpha
//! plane followed by a complete plane of 16-bit 5-5-5 color words. The file ends with 0xFF
//! padding up to a 256-byte boundary and a single check byte chosen so the additive sum of every
//! byte in the file is 0 modulo 256.
//!
//! ### History
//!
//! There is no public specification for the SRF format; everything here is reverse-engineered
//! from files accepted by the original consuming devices. Several header and section fields are
//! constants of unknown meaning. This library validates their presence but otherwise passes them
//! through bit-for-bit, since the devices are known to reject files that alter them.
//!
//! ### Limitations
//!
//! Only the two pixel encodings the format is known to use are supported: one alpha byte per
//! pixel (inverted, effectively 7-bit) and one 16-bit 5-5-5 color word per pixel. Decoding
//! parses a full file in one pass over a seekable stream; there is no streaming/partial decode.
//! The trailing check byte is write-time integrity only and is not verified when decoding; an
//! opt-in [`container::verify_reader`] helper is provided for callers that want a strict mode.
//!
//! ### Usage
//!
//! The primary use case for this library is converting between SRF containers and conventional
//! raster images plus a textual [`Sidecar`] describing the section layout.
//!
//! #### Converting an image to an SRF container
//!
//! ```rust
//! use image::{Rgba, RgbaImage};
//! use libsrf::SrfImageFile;
//!
//! fn main() -> Result<(), libsrf::Error> {
//!     // channel values with zero low 3 bits survive the 5-5-5 packing exactly
//!     let mut canvas = RgbaImage::new(4, 4);
//!     for p in canvas.pixels_mut() {
//!         *p = Rgba([248, 0, 0, 255]);
//!     }
//!     let srf = SrfImageFile::from_canvas(canvas, &[(4, 4)])?;
//!
//!     let path = std::env::temp_dir().join("libsrf_doc_single_section.srf");
//!     srf.into_file(&path)?;
//!
//!     let decoded = SrfImageFile::from_file(&path)?;
//!     assert_eq!((decoded.width(), decoded.height()), (4, 4));
//!     assert_eq!(decoded.canvas().get_pixel(0, 0), &Rgba([248, 0, 0, 255]));
//! #   std::fs::remove_file(&path)?;
//!     Ok(())
//! }
//! ```
//!
//! #### Describing the layout with a sidecar
//!
//! ```rust
//! use libsrf::Sidecar;
//!
//! fn main() -> Result<(), libsrf::Error> {
//!     let sidecar: Sidecar = "\
//! MaskFile: <none>
//! Width: 4
//! Height: 4
//! SectionCount: 1
//! SectionWidth1: 4
//! SectionHeight1: 4
//! "
//!     .parse()?;
//!     assert_eq!(sidecar.sections()?, vec![(4, 4)]);
//!     Ok(())
//! }
//! ```
//!

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

/// Module containing the binary container codec
pub mod container;
mod error;
/// Module containing the textual layout sidecar
pub mod sidecar;

pub use container::{Section, SrfHeader, SrfImageFile};
pub use error::Error;
pub use sidecar::Sidecar;

/// The fixed 16-byte magic signature opening every container
pub const MAGIC: [u8; 16] = *b"GARMIN BITMAP 01";

/// Hard cap on sections per container
///
/// The binary count field could hold more, but the original consumers reject
/// counts above 9, and the sidecar's one-digit label indexes cannot address a
/// tenth section either.
pub const MAX_SECTIONS: usize = 9;
