//! Fixed-width field extraction for TLE lines
//!
//! Every TLE field lives at a fixed column range. Extraction never panics
//! on a short or malformed line; coercion failures are explicit so the
//! decoder can report them instead of feeding garbage into orbit math.

use std::fmt;

/// A fixed-width field that failed to coerce
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// Zero-based start column of the field
    pub start: usize,
    /// Field width in columns
    pub length: usize,
    /// The trimmed token that failed to parse
    pub raw: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unparsable field {:?} at columns {}..{}",
            self.raw,
            self.start,
            self.start + self.length
        )
    }
}

impl std::error::Error for FieldError {}

/// Trimmed substring at `[start, start + length)`
///
/// Clamped to the line's bounds: a short line yields an empty string.
pub fn field_str(line: &str, start: usize, length: usize) -> &str {
    let end = (start + length).min(line.len());
    if start >= end {
        return "";
    }
    line.get(start..end).unwrap_or("").trim()
}

/// Integer field
pub fn parse_int(line: &str, start: usize, length: usize) -> Result<i64, FieldError> {
    let raw = field_str(line, start, length);
    raw.parse::<i64>().map_err(|_| FieldError {
        start,
        length,
        raw: raw.to_string(),
    })
}

/// Decimal field
pub fn parse_decimal(line: &str, start: usize, length: usize) -> Result<f64, FieldError> {
    let raw = field_str(line, start, length);
    raw.parse::<f64>().map_err(|_| FieldError {
        start,
        length,
        raw: raw.to_string(),
    })
}

/// Compact scientific field: `[sign]DDDDD[sign]E` means `0.DDDDD x 10^E`
///
/// The format drops the decimal point and the `e` to save columns, so
/// `18874-3` reads as 0.18874e-3. The exponent sign is the first `+`/`-`
/// found from the second character onward; the leading character may be
/// the mantissa's own sign. A token with no embedded sign is a plain
/// decimal value, and an empty field decodes as zero.
pub fn parse_compact_scientific(
    line: &str,
    start: usize,
    length: usize,
) -> Result<f64, FieldError> {
    let raw = field_str(line, start, length);
    if raw.is_empty() {
        return Ok(0.0);
    }

    let exp_pos = raw
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '+' || *c == '-')
        .map(|(i, _)| i);

    let Some(pos) = exp_pos else {
        return raw.parse::<f64>().map_err(|_| FieldError {
            start,
            length,
            raw: raw.to_string(),
        });
    };

    let mantissa: f64 = raw[..pos].parse().map_err(|_| FieldError {
        start,
        length,
        raw: raw.to_string(),
    })?;
    // A bare sign with no digits is printed by some feeds for zero.
    let exponent: i32 = raw[pos..].parse().unwrap_or(0);

    Ok(mantissa / 100_000.0 * 10f64.powi(exponent))
}
