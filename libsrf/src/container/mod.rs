#![allow(clippy::module_name_repetitions)]

pub(crate) mod checksum;
pub(crate) mod directory;
pub(crate) mod header;
pub(crate) mod pixel;

pub use checksum::verify_reader;
pub use directory::Section;
pub use header::SrfHeader;
pub use pixel::{decode_alpha, decode_color, encode_alpha, encode_color};

use checksum::ChecksumWriter;
use image::{GrayImage, RgbImage, Rgba, RgbaImage};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Seek, Write},
    path::Path,
};
use tracing::{debug, info};

use crate::{Error, MAX_SECTIONS};

/// A typed representation of an SRF container file
///
/// Holds the pass-through header, the ordered section table, and one combined
/// RGBA canvas the sections stack into. All conversion state (canvas, section
/// table, checksum) is scoped to a single value; nothing is shared across
/// conversions.
#[derive(Debug, PartialEq, Eq)]
pub struct SrfImageFile {
    header: SrfHeader,
    sections: Vec<Section>,
    canvas: RgbaImage,
}

impl SrfImageFile {
    /// Creates a new [`SrfImageFile`] from a combined RGBA canvas and a list
    /// of per-section (width, height) pairs, stacked top to bottom.
    ///
    /// The canvas may be larger than the logical size the sections compute
    /// to; only the section rectangles are encoded.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::SectionCountOutOfRange`] for an empty or
    /// over-long section list, [`Error::MissingSectionDimension`] if any pair
    /// contains a zero, and [`Error::CanvasTooSmall`] if the canvas cannot
    /// hold every section.
    pub fn from_canvas(canvas: RgbaImage, dims: &[(u16, u16)]) -> Result<Self, Error> {
        if dims.is_empty() || dims.len() > MAX_SECTIONS {
            return Err(Error::SectionCountOutOfRange(dims.len() as u32));
        }
        for (i, &(width, height)) in dims.iter().enumerate() {
            if width == 0 || height == 0 {
                return Err(Error::MissingSectionDimension { section: i + 1 });
            }
        }
        let sections = directory::stack_sections(dims);
        let required = directory::canvas_size(&sections);
        if canvas.width() < required.0 || canvas.height() < required.1 {
            return Err(Error::CanvasTooSmall {
                canvas: (canvas.width(), canvas.height()),
                required,
            });
        }
        let header = SrfHeader::builder()
            .section_count(dims.len() as u32)
            .build();
        Ok(Self {
            header,
            sections,
            canvas,
        })
    }

    /// Creates a new [`SrfImageFile`] from a separate RGB image and a
    /// grayscale alpha mask.
    ///
    /// The mask's single channel becomes the alpha plane; pixels outside the
    /// mask's extent fall back to fully opaque.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_canvas`], with the mask held to the same minimum
    /// size as the RGB image.
    pub fn from_rgb_and_mask(
        rgb: &RgbImage,
        mask: &GrayImage,
        dims: &[(u16, u16)],
    ) -> Result<Self, Error> {
        let sections = directory::stack_sections(dims);
        let required = directory::canvas_size(&sections);
        if mask.width() < required.0 || mask.height() < required.1 {
            return Err(Error::CanvasTooSmall {
                canvas: (mask.width(), mask.height()),
                required,
            });
        }
        let canvas = RgbaImage::from_fn(rgb.width(), rgb.height(), |x, y| {
            let p = rgb.get_pixel(x, y);
            let a = mask.get_pixel_checked(x, y).map_or(255, |l| l[0]);
            Rgba([p[0], p[1], p[2], a])
        });
        Self::from_canvas(canvas, dims)
    }

    /// Tries to read a [`Self`] from a buffered, seekable reader.
    ///
    /// Decoding is a two-pass protocol: the section directory scan sizes the
    /// canvas first (headers only, payload skipped), then each section's
    /// alpha and color planes are streamed into the canvas. The trailer
    /// (padding and check byte) is never read; see
    /// [`verify_reader`] for the opt-in check.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidFormat`] on a bad magic signature,
    /// [`Error::SectionCountOutOfRange`] for a section count of 0 or more
    /// than 9, and [`Error::Io`] on a truncated stream.
    pub fn from_reader(mut r: impl BufRead + Seek) -> Result<Self, Error> {
        let header = header::read_header(&mut r)?;
        let sections = directory::scan_sections(&mut r, header.section_count)?;

        let (width, height) = directory::canvas_size(&sections);
        debug!("canvas size: {width}x{height}");
        let mut canvas = RgbaImage::new(width, height);

        for section in &sections {
            pixel::read_section(&mut r, &mut canvas, section)?;
        }

        Ok(Self {
            header,
            sections,
            canvas,
        })
    }

    /// Tries to read [`Self`] from a provided file path
    ///
    /// # Errors
    ///
    /// Fails with [`Error::MissingInputFile`] if the file does not exist;
    /// otherwise see [`Self::from_reader`]
    pub fn from_file<P: AsRef<Path>>(filename: P) -> Result<Self, Error> {
        let file = File::open(filename.as_ref()).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Error::MissingInputFile {
                    path: filename.as_ref().to_path_buf(),
                }
            } else {
                Error::Io(e)
            }
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Serializes the container to a writer: header, sections in order, then
    /// the padded, checksummed trailer.
    ///
    /// Every byte goes through the checksum accumulator, so the emitted
    /// file's additive byte sum is 0 modulo 256 and its length a multiple
    /// of 256.
    ///
    /// # Errors
    ///
    /// Surfaces any underlying write failure
    pub fn to_writer(&self, w: impl Write) -> Result<(), Error> {
        let mut w = ChecksumWriter::new(w);
        header::write_header(&mut w, &self.header)?;
        for section in &self.sections {
            pixel::write_section(&mut w, &self.canvas, section)?;
        }
        debug!(
            "payload complete: {} bytes, sum {}",
            w.bytes_written(),
            w.sum()
        );
        w.finalize()?;
        Ok(())
    }

    /// Attempts to serialize and save [`Self`] as a file at the provided path
    ///
    /// # Errors
    ///
    /// This will error if unable to open and/or write to the provided filename
    pub fn into_file(self, filename: impl AsRef<Path>) -> Result<(), Error> {
        let f = File::options()
            .create(true)
            .write(true)
            .truncate(true)
            .open(filename)?;
        self.to_writer(BufWriter::new(f))?;
        info!("finished writing container");
        Ok(())
    }

    /// Splits the combined canvas into an RGB image and a grayscale alpha
    /// mask, for the separate-mask output mode.
    #[must_use]
    pub fn to_rgb_and_mask(&self) -> (RgbImage, GrayImage) {
        let rgb = RgbImage::from_fn(self.canvas.width(), self.canvas.height(), |x, y| {
            let p = self.canvas.get_pixel(x, y);
            image::Rgb([p[0], p[1], p[2]])
        });
        let mask = GrayImage::from_fn(self.canvas.width(), self.canvas.height(), |x, y| {
            image::Luma([self.canvas.get_pixel(x, y)[3]])
        });
        (rgb, mask)
    }

    /// Returns a reference to the [`SrfHeader`]
    #[must_use]
    pub const fn header(&self) -> &SrfHeader {
        &self.header
    }

    /// Returns the ordered section table
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Returns a reference to the combined RGBA canvas
    #[must_use]
    pub const fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Consumes [`Self`], returning the combined RGBA canvas
    #[must_use]
    pub fn into_canvas(self) -> RgbaImage {
        self.canvas
    }

    /// Returns the logical canvas width
    #[must_use]
    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    /// Returns the logical canvas height
    #[must_use]
    pub fn height(&self) -> u32 {
        self.canvas.height()
    }
}
