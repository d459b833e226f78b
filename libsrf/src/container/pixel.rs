use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use image::{Rgba, RgbaImage};
use std::io::{Read, Write};
use tracing::{debug, trace};

use crate::{container::directory::Section, Error};

// Reserved section-header fields with unknown meaning. Every file produced by
// the original tooling carries exactly these values, so they are reproduced
// bit-for-bit and never interpreted.
const SECTION_RESERVED_HEAD: [u32; 3] = [0, 16, 0];
const SECTION_RESERVED_WORD: u16 = 2064;
const SECTION_RESERVED_TAIL: u32 = 0;

/// Chunk tag preceding a section's alpha plane
const ALPHA_TAG: u32 = 11;
/// Chunk tag preceding a section's color plane
const RGB_TAG: u32 = 1;

/// Packs a 24-bit RGB sample into the container's 16-bit 5-5-5 color word.
///
/// Layout: 5 bits red (bits 11-15), 5 bits green (bits 6-10), 5 bits blue
/// (bits 0-4). Bit 5 is always 0. Each channel keeps its top 5 bits.
#[must_use]
pub const fn encode_color(rgb: [u8; 3]) -> u16 {
    let r = (rgb[0] >> 3) as u16;
    let g = (rgb[1] >> 3) as u16;
    let b = (rgb[2] >> 3) as u16;
    (r << 11) | (g << 6) | b
}

/// Unpacks a 16-bit 5-5-5 color word back into RGB bytes.
///
/// Each channel is reconstructed into its top 5 bits with the low 3 bits
/// zero-filled, the exact inverse of the shift used to encode.
#[must_use]
pub const fn decode_color(word: u16) -> [u8; 3] {
    let r = ((word & 0xF800) >> 8) as u8;
    let g = ((word & 0x07C0) >> 3) as u8;
    let b = ((word & 0x001F) << 3) as u8;
    [r, g, b]
}

/// Converts an 8-bit alpha sample to the container's inverted 7-bit encoding.
///
/// 127 and 128 would otherwise both decode to the same value, so 127 is
/// reassigned to 128 to keep the mapping injective in its useful range.
#[must_use]
pub const fn encode_alpha(alpha: u8) -> u8 {
    let v = (255 - alpha) >> 1;
    if v == 127 {
        128
    } else {
        v
    }
}

/// Converts an inverted 7-bit alpha byte back to standard 8-bit alpha.
#[must_use]
pub const fn decode_alpha(byte: u8) -> u8 {
    let v = (byte as u16) << 1;
    let v = if v > 254 { 254 } else { v };
    (255 - v) as u8
}

/// Reads one 24-byte section header, returning (width, height).
///
/// The reserved fields are consumed and ignored; only their presence and
/// length are required.
pub(crate) fn read_section_header(r: &mut impl Read) -> Result<(u16, u16), Error> {
    let mut reserved = [0u8; 12];
    r.read_exact(&mut reserved)?;
    let height = r.read_u16::<LittleEndian>()?;
    let width = r.read_u16::<LittleEndian>()?;
    let word = r.read_u16::<LittleEndian>()?;
    let linebytes = r.read_u16::<LittleEndian>()?;
    let tail = r.read_u32::<LittleEndian>()?;
    trace!("section header: {width}x{height}, word {word}, linebytes {linebytes}, tail {tail}");
    Ok((width, height))
}

/// Number of payload bytes following a section header: the alpha chunk and
/// the RGB chunk, tag and length words included.
pub(crate) const fn payload_len(width: u16, height: u16) -> u64 {
    let pixels = width as u64 * height as u64;
    8 + pixels + 8 + pixels * 2
}

/// Streams one section's alpha and color planes into the shared canvas at
/// the section's vertical offset.
///
/// The full alpha plane precedes the full color plane; the planes are never
/// interleaved. Both are row-major, top-to-bottom, left-to-right.
pub(crate) fn read_section(
    r: &mut impl Read,
    canvas: &mut RgbaImage,
    section: &Section,
) -> Result<(), Error> {
    let (width, height) = read_section_header(r)?;
    debug!("image section dimensions: {width}x{height}");
    let pixels = usize::from(width) * usize::from(height);

    let tag = r.read_u32::<LittleEndian>()?;
    let len = r.read_u32::<LittleEndian>()?;
    trace!("alpha chunk tag {tag}, length {len}");
    let mut alpha = vec![0u8; pixels];
    r.read_exact(&mut alpha)?;

    let tag = r.read_u32::<LittleEndian>()?;
    let len = r.read_u32::<LittleEndian>()?;
    trace!("color chunk tag {tag}, length {len}");
    let mut pos = 0;
    for y in 0..u32::from(height) {
        for x in 0..u32::from(width) {
            let word = r.read_u16::<LittleEndian>()?;
            let [red, green, blue] = decode_color(word);
            let a = decode_alpha(alpha[pos]);
            canvas.put_pixel(x, section.y_offset + y, Rgba([red, green, blue, a]));
            pos += 1;
        }
    }
    Ok(())
}

/// Writes one section (header, alpha plane, color plane) from the shared
/// canvas at the section's vertical offset.
pub(crate) fn write_section(
    w: &mut impl Write,
    canvas: &RgbaImage,
    section: &Section,
) -> Result<(), Error> {
    let (width, height) = (section.width, section.height);
    debug!("writing image section: {width}x{height} at y offset {}", section.y_offset);
    for v in SECTION_RESERVED_HEAD {
        w.write_u32::<LittleEndian>(v)?;
    }
    w.write_u16::<LittleEndian>(height)?;
    w.write_u16::<LittleEndian>(width)?;
    w.write_u16::<LittleEndian>(SECTION_RESERVED_WORD)?;
    // linebytes, truncated to the 16-bit field like every other count here
    w.write_u16::<LittleEndian>(width.wrapping_mul(2))?;
    w.write_u32::<LittleEndian>(SECTION_RESERVED_TAIL)?;

    let pixels = u32::from(width) * u32::from(height);
    w.write_u32::<LittleEndian>(ALPHA_TAG)?;
    w.write_u32::<LittleEndian>(pixels)?;
    for y in 0..u32::from(height) {
        for x in 0..u32::from(width) {
            let sample = canvas.get_pixel(x, section.y_offset + y);
            w.write_u8(encode_alpha(sample[3]))?;
        }
    }

    w.write_u32::<LittleEndian>(RGB_TAG)?;
    w.write_u32::<LittleEndian>(pixels.wrapping_mul(2))?;
    for y in 0..u32::from(height) {
        for x in 0..u32::from(width) {
            let sample = canvas.get_pixel(x, section.y_offset + y);
            w.write_u16::<LittleEndian>(encode_color([sample[0], sample[1], sample[2]]))?;
        }
    }
    Ok(())
}
