use std::path::PathBuf;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{StagecastError, StagecastResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FrameConversion {
    zero_pad: bool,
    width: usize,
}

/// Per-frame output path with a printf-style frame number, e.g. `out/frame_%04d.png`.
///
/// Exactly one `%d`, `%Nd` or `%0Nd` conversion is required; `%%` is a literal percent sign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputTemplate {
    raw: String,
    prefix: String,
    suffix: String,
    conversion: FrameConversion,
}

impl OutputTemplate {
    /// Parse a template.
    pub fn parse(raw: &str) -> StagecastResult<Self> {
        let err = |msg: &str| StagecastError::config(format!("output template '{raw}': {msg}"));

        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut conversion = None;
        let mut chars = raw.chars().peekable();
        while let Some(c) = chars.next() {
            let out = if conversion.is_some() {
                &mut suffix
            } else {
                &mut prefix
            };
            if c != '%' {
                out.push(c);
                continue;
            }
            if chars.peek() == Some(&'%') {
                chars.next();
                out.push('%');
                continue;
            }

            let zero_pad = chars.next_if_eq(&'0').is_some();
            let mut digits = String::new();
            while let Some(d) = chars.next_if(char::is_ascii_digit) {
                digits.push(d);
            }
            match chars.next() {
                Some('d') => {}
                Some(other) => {
                    return Err(err(&format!("unsupported conversion '%{digits}{other}'")));
                }
                None => return Err(err("dangling '%'")),
            }
            if conversion.is_some() {
                return Err(err("more than one frame conversion"));
            }
            let width = if digits.is_empty() {
                0
            } else {
                digits
                    .parse::<usize>()
                    .ok()
                    .filter(|w| *w <= 32)
                    .ok_or_else(|| err("field width out of range"))?
            };
            conversion = Some(FrameConversion { zero_pad, width });
        }

        let conversion = conversion.ok_or_else(|| err("missing frame conversion such as %04d"))?;
        Ok(Self {
            raw: raw.to_string(),
            prefix,
            suffix,
            conversion,
        })
    }

    /// Template text as given.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Output path for `frame`.
    pub fn path_for(&self, frame: FrameIndex) -> PathBuf {
        let FrameConversion { zero_pad, width } = self.conversion;
        let n = frame.0;
        let number = if zero_pad {
            format!("{n:0width$}")
        } else {
            format!("{n:width$}")
        };
        PathBuf::from(format!("{}{number}{}", self.prefix, self.suffix))
    }
}

impl std::fmt::Display for OutputTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/template.rs"]
mod tests;
