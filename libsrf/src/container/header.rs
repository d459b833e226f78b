use bon::Builder;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};
use tracing::{debug, info};

use crate::{Error, MAGIC};

// Reverse-engineered header constants with unknown meaning. The original
// consuming device expects them verbatim, in this order, so they are carried
// as opaque pass-through values.
const HEADER_PREFIX: [u32; 2] = [4, 4];
const TAG_PRODUCT_ID: u32 = 5;
const TAG_REVISION: u32 = 6;
const TAG_PRODUCT_CODE: u32 = 7;

/// Product id every known container carries
pub const DEFAULT_PRODUCT_ID: &str = "578";
/// Revision string every known container carries
pub const DEFAULT_REVISION: &str = "1.00";
/// Product code every known container carries
pub const DEFAULT_PRODUCT_CODE: &str = "006-D0578-XX";

/// SRF container header
///
/// Holds the section count and the three human-readable strings the format
/// embeds between its opaque integer tags. The strings have no known
/// semantics beyond "present and round-tripped"; the defaults match what the
/// original tooling always wrote.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[non_exhaustive]
pub struct SrfHeader {
    /// Number of vertically stacked image sections (1-9)
    pub section_count: u32,

    /// Opaque product id string (tag 5)
    #[builder(default = DEFAULT_PRODUCT_ID.to_owned())]
    pub product_id: String,

    /// Format revision string (tag 6)
    #[builder(default = DEFAULT_REVISION.to_owned())]
    pub revision: String,

    /// Product code string (tag 7)
    #[builder(default = DEFAULT_PRODUCT_CODE.to_owned())]
    pub product_code: String,
}

// Field strings in real containers are a handful of bytes; a longer length
// prefix means the stream is not positioned on a pstring.
const MAX_PSTRING_LEN: u32 = 255;

fn read_pstring(r: &mut impl Read) -> Result<String, Error> {
    let len = r.read_u32::<LittleEndian>()?;
    if len > MAX_PSTRING_LEN {
        return Err(Error::InvalidFormat);
    }
    let mut buf = vec![0u8; len as usize];
    r.read_exact(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn write_pstring(w: &mut impl Write, s: &str) -> Result<(), Error> {
    w.write_u32::<LittleEndian>(s.len() as u32)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

/// Reads and validates the container header.
///
/// The magic signature is compared byte-for-byte; the opaque integer tags are
/// consumed without interpretation; the three strings are kept for reporting
/// and round-tripping.
pub(crate) fn read_header(r: &mut impl Read) -> Result<SrfHeader, Error> {
    let mut magic = [0u8; 16];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(Error::InvalidFormat);
    }
    for _ in HEADER_PREFIX {
        let prefix = r.read_u32::<LittleEndian>()?;
        debug!("header prefix word: {prefix}");
    }
    let section_count = r.read_u32::<LittleEndian>()?;

    let _tag = r.read_u32::<LittleEndian>()?;
    let product_id = read_pstring(r)?;
    let _tag = r.read_u32::<LittleEndian>()?;
    let revision = read_pstring(r)?;
    let _tag = r.read_u32::<LittleEndian>()?;
    let product_code = read_pstring(r)?;

    info!("SRF revision: {revision}");
    info!("SRF product: {product_code}");
    info!("image sections: {section_count}");

    Ok(SrfHeader {
        section_count,
        product_id,
        revision,
        product_code,
    })
}

/// Writes the container header in the exact fixed field order the original
/// device accepts.
pub(crate) fn write_header(w: &mut impl Write, header: &SrfHeader) -> Result<(), Error> {
    w.write_all(&MAGIC)?;
    for v in HEADER_PREFIX {
        w.write_u32::<LittleEndian>(v)?;
    }
    w.write_u32::<LittleEndian>(header.section_count)?;
    w.write_u32::<LittleEndian>(TAG_PRODUCT_ID)?;
    write_pstring(w, &header.product_id)?;
    w.write_u32::<LittleEndian>(TAG_REVISION)?;
    write_pstring(w, &header.revision)?;
    w.write_u32::<LittleEndian>(TAG_PRODUCT_CODE)?;
    write_pstring(w, &header.product_code)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn header_round_trip() -> Result<(), Error> {
        let header = SrfHeader::builder().section_count(3).build();
        let mut buf = Vec::new();
        write_header(&mut buf, &header)?;
        let parsed = read_header(&mut Cursor::new(buf))?;
        assert_eq!(parsed, header);
        Ok(())
    }

    #[test]
    fn default_header_has_expected_length() -> Result<(), Error> {
        let header = SrfHeader::builder().section_count(1).build();
        let mut buf = Vec::new();
        write_header(&mut buf, &header)?;
        // 16 magic + 8 prefix + 4 count + 3 * (4 tag) + (4+3) + (4+4) + (4+12)
        assert_eq!(buf.len(), 71);
        Ok(())
    }

    #[test]
    fn bad_magic_is_invalid_format() {
        let bytes = *b"GARMIN PIXMAP 01 and some trailing garbage";
        assert!(matches!(
            read_header(&mut Cursor::new(bytes.to_vec())),
            Err(Error::InvalidFormat)
        ));
    }

    #[test]
    fn truncated_header_surfaces_io_error() {
        let bytes = b"GARMIN BITMAP 01".to_vec();
        assert!(matches!(
            read_header(&mut Cursor::new(bytes)),
            Err(Error::Io(_))
        ));
    }
}
