use std::io::{BufRead, Seek, SeekFrom};
use tracing::debug;

use crate::{container::pixel, Error, MAX_SECTIONS};

/// One vertically stacked sub-image of the container's logical canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    /// Section width in pixels
    pub width: u16,
    /// Section height in pixels
    pub height: u16,
    /// Vertical offset into the logical canvas: the sum of the heights of
    /// every preceding section
    pub y_offset: u32,
}

/// Builds the section table for the encode path by stacking the given
/// (width, height) pairs top to bottom.
pub(crate) fn stack_sections(dims: &[(u16, u16)]) -> Vec<Section> {
    let mut y_offset = 0;
    dims.iter()
        .map(|&(width, height)| {
            let section = Section {
                width,
                height,
                y_offset,
            };
            y_offset += u32::from(height);
            section
        })
        .collect()
}

/// Logical canvas size for a section table: width is the maximum section
/// width, height the sum of section heights.
pub(crate) fn canvas_size(sections: &[Section]) -> (u32, u32) {
    let width = sections.iter().map(|s| u32::from(s.width)).max().unwrap_or(0);
    let height = sections.iter().map(|s| u32::from(s.height)).sum();
    (width, height)
}

/// Lookahead pass over the section headers of a container.
///
/// Section headers are interleaved with pixel payload, but a canvas backing
/// store needs its final size at construction time. This scan reads each
/// fixed-size section header, skips forward over the payload bytes it
/// announces without materializing them, and rewinds to the starting
/// position once every section is sized.
///
/// # Errors
///
/// Returns [`Error::SectionCountOutOfRange`] if `section_count` is 0 or
/// greater than [`MAX_SECTIONS`], and [`Error::Io`] if the stream ends before
/// the declared sections do.
pub(crate) fn scan_sections(
    r: &mut (impl BufRead + Seek),
    section_count: u32,
) -> Result<Vec<Section>, Error> {
    if section_count == 0 || section_count > MAX_SECTIONS as u32 {
        return Err(Error::SectionCountOutOfRange(section_count));
    }
    // Save our spot so we can come back for the payload pass.
    let start = r.stream_position()?;

    let mut sections = Vec::with_capacity(section_count as usize);
    let mut y_offset = 0;
    for _ in 0..section_count {
        let (width, height) = pixel::read_section_header(r)?;
        r.seek(SeekFrom::Current(i64::try_from(pixel::payload_len(width, height)).unwrap_or(i64::MAX)))?;
        sections.push(Section {
            width,
            height,
            y_offset,
        });
        y_offset += u32::from(height);
    }
    debug!("section directory: {sections:?}");

    r.seek(SeekFrom::Start(start))?;
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacking_accumulates_offsets() {
        let sections = stack_sections(&[(4, 2), (2, 3), (3, 1)]);
        assert_eq!(
            sections.iter().map(|s| s.y_offset).collect::<Vec<_>>(),
            vec![0, 2, 5]
        );
        assert_eq!(canvas_size(&sections), (4, 6));
    }

    #[test]
    fn empty_table_has_zero_canvas() {
        assert_eq!(canvas_size(&[]), (0, 0));
    }
}
