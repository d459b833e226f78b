//! Textual sidecar describing a container's multi-section layout
//!
//! Plain line-oriented `Label: value` text. Decoding is tolerant: unknown
//! lines are ignored and unparseable integers default to 0 (later rejected by
//! validation as missing dimensions). Encoding writes exactly one line per
//! recognized field, in a fixed order.

mod label;

use bon::Builder;
use label::{int_or_zero, resolve, split_line, Label};
use std::{
    fmt::{self, Display},
    str::FromStr,
};
use tracing::warn;

use crate::{container::Section, Error, MAX_SECTIONS};

/// `MaskFile` value encoding "no separate mask"
pub const NO_MASK: &str = "<none>";

/// Parsed sidecar metadata
///
/// Section dimensions are kept in fixed nine-slot tables because the label
/// syntax indexes sections with a single digit; a zero slot below
/// `section_count` means the dimension was absent or unparseable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
#[non_exhaustive]
pub struct Sidecar {
    /// Referenced mask image file, if any
    pub mask_file: Option<String>,
    /// Declared overall canvas width
    #[builder(default)]
    pub width: u32,
    /// Declared overall canvas height
    #[builder(default)]
    pub height: u32,
    /// Declared number of sections
    #[builder(default)]
    pub section_count: u32,
    /// Per-section widths, slot N holding `SectionWidth<N+1>`
    #[builder(default)]
    pub section_widths: [u16; MAX_SECTIONS],
    /// Per-section heights, slot N holding `SectionHeight<N+1>`
    #[builder(default)]
    pub section_heights: [u16; MAX_SECTIONS],
}

impl Sidecar {
    /// Validates the declared layout and returns the per-section
    /// (width, height) list in stacking order.
    ///
    /// A disagreement between the declared overall dimensions and the ones
    /// the sections compute to is logged as a warning; the computed values
    /// win.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::SectionCountOutOfRange`] if the count is 0 or
    /// greater than 9, and [`Error::MissingSectionDimension`] if any declared
    /// section has a zero width or height.
    pub fn sections(&self) -> Result<Vec<(u16, u16)>, Error> {
        if self.section_count == 0 || self.section_count > MAX_SECTIONS as u32 {
            return Err(Error::SectionCountOutOfRange(self.section_count));
        }
        let count = self.section_count as usize;
        let mut dims = Vec::with_capacity(count);
        for i in 0..count {
            let (width, height) = (self.section_widths[i], self.section_heights[i]);
            if width == 0 || height == 0 {
                return Err(Error::MissingSectionDimension { section: i + 1 });
            }
            dims.push((width, height));
        }

        let computed_width = dims.iter().map(|&(w, _)| u32::from(w)).max().unwrap_or(0);
        let computed_height = dims.iter().map(|&(_, h)| u32::from(h)).sum::<u32>();
        if (self.width, self.height) != (computed_width, computed_height) {
            warn!(
                "declared image dimensions {}x{} don't match the sections' computed \
                 {computed_width}x{computed_height}; using the computed values",
                self.width, self.height
            );
        }
        Ok(dims)
    }

    /// Describes a decoded section table, for the container→image direction
    #[must_use]
    pub fn describe(mask_file: Option<String>, sections: &[Section]) -> Self {
        let mut section_widths = [0u16; MAX_SECTIONS];
        let mut section_heights = [0u16; MAX_SECTIONS];
        for (i, s) in sections.iter().take(MAX_SECTIONS).enumerate() {
            section_widths[i] = s.width;
            section_heights[i] = s.height;
        }
        let width = sections.iter().map(|s| u32::from(s.width)).max().unwrap_or(0);
        let height = sections.iter().map(|s| u32::from(s.height)).sum();
        Self {
            mask_file,
            width,
            height,
            section_count: sections.len() as u32,
            section_widths,
            section_heights,
        }
    }
}

impl FromStr for Sidecar {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut sidecar = Self::default();
        for line in s.lines() {
            let Ok((_, (raw_label, value))) = split_line(line) else {
                continue;
            };
            let Some((label, index)) = resolve(raw_label) else {
                continue;
            };
            match (label, index) {
                (Label::MaskFile, _) => {
                    if value != NO_MASK {
                        sidecar.mask_file = Some(value.to_owned());
                    }
                }
                (Label::Width, _) => sidecar.width = int_or_zero(value),
                (Label::Height, _) => sidecar.height = int_or_zero(value),
                (Label::SectionCount, _) => sidecar.section_count = int_or_zero(value),
                (Label::SectionWidth, Some(i)) => {
                    sidecar.section_widths[i - 1] = int_or_zero(value);
                }
                (Label::SectionHeight, Some(i)) => {
                    sidecar.section_heights[i - 1] = int_or_zero(value);
                }
                _ => {}
            }
        }
        Ok(sidecar)
    }
}

impl Display for Sidecar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {}",
            Label::MaskFile.as_str(),
            self.mask_file.as_deref().unwrap_or(NO_MASK)
        )?;
        writeln!(f, "{}: {}", Label::Width.as_str(), self.width)?;
        writeln!(f, "{}: {}", Label::Height.as_str(), self.height)?;
        writeln!(f, "{}: {}", Label::SectionCount.as_str(), self.section_count)?;
        let count = self.section_count.min(MAX_SECTIONS as u32) as usize;
        for i in 0..count {
            writeln!(
                f,
                "{}{}: {}",
                Label::SectionWidth.as_str(),
                i + 1,
                self.section_widths[i]
            )?;
            writeln!(
                f,
                "{}{}: {}",
                Label::SectionHeight.as_str(),
                i + 1,
                self.section_heights[i]
            )?;
        }
        Ok(())
    }
}
