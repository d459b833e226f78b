use std::io::Cursor;

use image::{Rgba, RgbaImage};
use libsrf::{container::verify_reader, Error, SrfImageFile, MAGIC};
use mktemp::Temp;

fn solid_canvas(width: u32, height: u32, pixel: Rgba<u8>) -> RgbaImage {
    let mut canvas = RgbaImage::new(width, height);
    for p in canvas.pixels_mut() {
        *p = pixel;
    }
    canvas
}

fn push_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn push_pstring(buf: &mut Vec<u8>, s: &str) {
    push_u32(buf, s.len() as u32);
    buf.extend_from_slice(s.as_bytes());
}

/// A syntactically valid container header with an arbitrary section count.
fn header_bytes(section_count: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&MAGIC);
    push_u32(&mut buf, 4);
    push_u32(&mut buf, 4);
    push_u32(&mut buf, section_count);
    push_u32(&mut buf, 5);
    push_pstring(&mut buf, "578");
    push_u32(&mut buf, 6);
    push_pstring(&mut buf, "1.00");
    push_u32(&mut buf, 7);
    push_pstring(&mut buf, "006-D0578-XX");
    buf
}

#[test]
fn worked_example_single_red_section() -> Result<(), Error> {
    let canvas = solid_canvas(4, 4, Rgba([255, 0, 0, 255]));
    let srf = SrfImageFile::from_canvas(canvas, &[(4, 4)])?;
    let mut buf = Vec::new();
    srf.to_writer(&mut buf)?;

    // header (71) + section header (24) + alpha chunk (8 + 16) + color
    // chunk (8 + 32) = 159 payload bytes, padded up to one 256-byte block
    assert_eq!(buf.len(), 256);
    assert_eq!(&buf[..16], &MAGIC);

    // section header: height 4, width 4, linebytes 8
    assert_eq!(&buf[83..85], &[4, 0]);
    assert_eq!(&buf[85..87], &[4, 0]);
    assert_eq!(&buf[89..91], &[8, 0]);

    // alpha chunk: tag 11, length 16, then encodeAlpha(255) == 0 throughout
    assert_eq!(&buf[95..99], &11u32.to_le_bytes());
    assert_eq!(&buf[99..103], &16u32.to_le_bytes());
    assert!(buf[103..119].iter().all(|&b| b == 0));

    // color chunk: tag 1, length 32, then encodeColor(red) == 0xF800 words
    assert_eq!(&buf[119..123], &1u32.to_le_bytes());
    assert_eq!(&buf[123..127], &32u32.to_le_bytes());
    assert!(buf[127..159].chunks(2).all(|w| w == [0x00, 0xF8]));

    // 0xFF fill up to one byte short of the block, then the check byte
    assert!(buf[159..255].iter().all(|&b| b == 0xFF));
    let sum = buf.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    assert_eq!(sum, 0);

    // and the file decodes back to a solid red, fully opaque 4x4 canvas
    // (red quantized to its top 5 bits, alpha exact at byte 0)
    let decoded = SrfImageFile::from_reader(Cursor::new(buf))?;
    assert_eq!((decoded.width(), decoded.height()), (4, 4));
    assert_eq!(decoded.sections().len(), 1);
    assert!(decoded
        .canvas()
        .pixels()
        .all(|p| *p == Rgba([248, 0, 0, 255])));
    Ok(())
}

#[test]
fn multi_section_round_trip_preserves_layout_and_pixels() -> Result<(), Error> {
    // channel values that are multiples of 8 and odd alphas survive the
    // 5-5-5 / inverted-7-bit quantization exactly
    let mut canvas = RgbaImage::new(4, 5);
    for (x, y, p) in canvas.enumerate_pixels_mut() {
        *p = Rgba([(x * 8) as u8, (y * 8) as u8, 248, (2 * (x + y) + 1) as u8]);
    }
    let dims = [(4u16, 2u16), (2u16, 3u16)];
    let srf = SrfImageFile::from_canvas(canvas.clone(), &dims)?;

    let mut buf = Vec::new();
    srf.to_writer(&mut buf)?;
    assert_eq!(buf.len() % 256, 0);
    assert_eq!(buf.iter().fold(0u8, |acc, &b| acc.wrapping_add(b)), 0);

    let decoded = SrfImageFile::from_reader(Cursor::new(buf))?;
    assert_eq!(decoded.sections().len(), 2);
    for (section, &(w, h)) in decoded.sections().iter().zip(&dims) {
        assert_eq!((section.width, section.height), (w, h));
    }
    assert_eq!(decoded.sections()[1].y_offset, 2);
    assert_eq!((decoded.width(), decoded.height()), (4, 5));

    // pixels inside each section rectangle round-trip exactly
    for y in 0..2 {
        for x in 0..4 {
            assert_eq!(decoded.canvas().get_pixel(x, y), canvas.get_pixel(x, y));
        }
    }
    for y in 2..5 {
        for x in 0..2 {
            assert_eq!(decoded.canvas().get_pixel(x, y), canvas.get_pixel(x, y));
        }
        // the second section is narrower; the margin stays at the canvas default
        for x in 2..4 {
            assert_eq!(decoded.canvas().get_pixel(x, y), &Rgba([0, 0, 0, 0]));
        }
    }
    Ok(())
}

#[test]
fn file_round_trip_through_temp_file() -> Result<(), Error> {
    let canvas = solid_canvas(8, 3, Rgba([0, 248, 0, 255]));
    let srf = SrfImageFile::from_canvas(canvas, &[(8, 3)])?;
    let tmp = Temp::new_file()?;
    srf.into_file(&tmp)?;

    let decoded = SrfImageFile::from_file(&tmp)?;
    assert_eq!((decoded.width(), decoded.height()), (8, 3));
    assert_eq!(decoded.header().revision, "1.00");
    assert_eq!(decoded.header().product_code, "006-D0578-XX");
    Ok(())
}

#[test]
fn missing_file_is_reported_as_such() {
    let result = SrfImageFile::from_file("definitely/not/here.srf");
    assert!(matches!(result, Err(Error::MissingInputFile { .. })));
}

#[test]
fn bad_magic_fails_with_invalid_format() {
    let mut bytes = b"GARMIN PIXMAP 01".to_vec();
    bytes.resize(256, 0xFF);
    assert!(matches!(
        SrfImageFile::from_reader(Cursor::new(bytes)),
        Err(Error::InvalidFormat)
    ));
}

#[test]
fn section_count_bounds_are_enforced() {
    for count in [0u32, 10, 250] {
        let bytes = header_bytes(count);
        assert!(
            matches!(
                SrfImageFile::from_reader(Cursor::new(bytes)),
                Err(Error::SectionCountOutOfRange(c)) if c == count
            ),
            "count {count} should be rejected"
        );
    }
}

#[test]
fn truncated_payload_surfaces_io_error() {
    // header promises one section but the stream ends immediately
    let bytes = header_bytes(1);
    assert!(matches!(
        SrfImageFile::from_reader(Cursor::new(bytes)),
        Err(Error::Io(_))
    ));
}

#[test]
fn encode_rejects_bad_section_tables() -> Result<(), Error> {
    let canvas = solid_canvas(4, 4, Rgba([0, 0, 0, 255]));
    assert!(matches!(
        SrfImageFile::from_canvas(canvas.clone(), &[]),
        Err(Error::SectionCountOutOfRange(0))
    ));
    assert!(matches!(
        SrfImageFile::from_canvas(canvas.clone(), &[(4, 2), (4, 0)]),
        Err(Error::MissingSectionDimension { section: 2 })
    ));
    assert!(matches!(
        SrfImageFile::from_canvas(canvas, &[(4, 40)]),
        Err(Error::CanvasTooSmall { .. })
    ));
    Ok(())
}

#[test]
fn verification_is_opt_in_and_detects_corruption() -> Result<(), Error> {
    let canvas = solid_canvas(6, 6, Rgba([96, 160, 32, 101]));
    let srf = SrfImageFile::from_canvas(canvas, &[(6, 2), (6, 4)])?;
    let mut buf = Vec::new();
    srf.to_writer(&mut buf)?;

    verify_reader(&buf[..])?;

    let mut corrupt = buf.clone();
    corrupt[100] = corrupt[100].wrapping_add(3);
    assert!(matches!(
        verify_reader(&corrupt[..]),
        Err(Error::ChecksumMismatch { remainder: 3, .. })
    ));

    // the default decode path never reads the trailer, so it still succeeds
    let decoded = SrfImageFile::from_reader(Cursor::new(buf))?;
    assert_eq!(decoded.sections().len(), 2);
    Ok(())
}

#[test]
fn separate_mask_splits_and_merges_consistently() -> Result<(), Error> {
    let mut canvas = RgbaImage::new(4, 4);
    for (x, y, p) in canvas.enumerate_pixels_mut() {
        *p = Rgba([(x * 64) as u8 & 0xF8, 128, (y * 64) as u8 & 0xF8, 255]);
    }
    let srf = SrfImageFile::from_canvas(canvas, &[(4, 4)])?;
    let (rgb, mask) = srf.to_rgb_and_mask();
    assert!(mask.pixels().all(|l| l[0] == 255));

    let rebuilt = SrfImageFile::from_rgb_and_mask(&rgb, &mask, &[(4, 4)])?;
    assert_eq!(rebuilt.canvas(), srf.canvas());
    Ok(())
}
