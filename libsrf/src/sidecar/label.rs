use nom::{
    bytes::complete::{tag, take_till1},
    IResult,
};
use std::str::FromStr;
use strum::{EnumString, IntoStaticStr};

/// Recognized sidecar labels
///
/// `SectionWidth` and `SectionHeight` only appear with a one-digit section
/// index appended (`SectionWidth1` .. `SectionWidth9`).
#[derive(IntoStaticStr, EnumString, PartialEq, Eq, Debug, Copy, Clone)]
pub(super) enum Label {
    MaskFile,
    Width,
    Height,
    SectionCount,
    SectionWidth,
    SectionHeight,
}

impl Label {
    pub(super) fn as_str(self) -> &'static str {
        Into::<&'static str>::into(self)
    }
}

/// Splits one sidecar line into its raw label and value parts
pub(super) fn split_line(input: &str) -> IResult<&str, (&str, &str)> {
    let (rest, raw_label) = take_till1(|c| c == ':')(input)?;
    let (value, _) = tag(": ")(rest)?;
    Ok(("", (raw_label, value)))
}

/// Resolves a raw label, peeling the section index off the indexed labels.
///
/// The index is a single ASCII digit 1-9; the format cannot address a tenth
/// section. Anything unrecognized resolves to [`None`] and its line is
/// ignored.
pub(super) fn resolve(raw: &str) -> Option<(Label, Option<usize>)> {
    if let Ok(label) = Label::from_str(raw) {
        return match label {
            // a bare indexed label is not a valid line
            Label::SectionWidth | Label::SectionHeight => None,
            _ => Some((label, None)),
        };
    }
    let digit = raw.chars().last()?;
    if !digit.is_ascii_digit() || digit == '0' {
        return None;
    }
    let prefix = &raw[..raw.len() - 1];
    let index = digit.to_digit(10)? as usize;
    match Label::from_str(prefix) {
        Ok(label @ (Label::SectionWidth | Label::SectionHeight)) => Some((label, Some(index))),
        _ => None,
    }
}

/// Tolerant integer parse: anything unparseable becomes 0, which downstream
/// validation treats as a missing dimension.
pub(super) fn int_or_zero<T: FromStr + Default>(value: &str) -> T {
    value.trim().parse().unwrap_or_default()
}
