//! TLE text decoding
//!
//! Real-world element feeds carry stale checksums and occasionally
//! truncated lines, so decoding is tolerant: every defect is reported as
//! a warning and the decode continues with a zero default. Callers that
//! want strictness can reject any result that is not clean.

use std::fmt;

use super::elements::ElementSet;
use super::epoch::epoch_datetime;
use super::fields::{field_str, parse_compact_scientific, parse_decimal, parse_int, FieldError};

/// Required length of a TLE data line
pub const LINE_LEN: usize = 69;

/// Non-fatal defect found while decoding
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeWarning {
    /// Line is not exactly 69 characters
    BadLineLength { line_no: u8, length: usize },
    /// Modulo-10 checksum does not match the declared digit
    ChecksumMismatch {
        line_no: u8,
        computed: u32,
        declared: Option<u32>,
    },
    /// A field failed to coerce and was defaulted to zero
    BadField {
        line_no: u8,
        field: &'static str,
        start: usize,
        length: usize,
        raw: String,
    },
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadLineLength { line_no, length } => {
                write!(
                    f,
                    "line {} is {} characters, expected {}",
                    line_no, length, LINE_LEN
                )
            }
            Self::ChecksumMismatch {
                line_no,
                computed,
                declared,
            } => match declared {
                Some(d) => write!(
                    f,
                    "line {} checksum is {}, declared {}",
                    line_no, computed, d
                ),
                None => write!(
                    f,
                    "line {} checksum is {}, declared digit missing",
                    line_no, computed
                ),
            },
            Self::BadField {
                line_no,
                field,
                start,
                length,
                raw,
            } => write!(
                f,
                "line {} {}: {:?} at columns {}..{} defaulted to zero",
                line_no,
                field,
                raw,
                start,
                start + length
            ),
        }
    }
}

impl std::error::Error for DecodeWarning {}

/// Outcome of a decode: always a best-effort record, plus any defects
#[derive(Debug, Clone)]
pub struct DecodeResult {
    pub elements: ElementSet,
    pub warnings: Vec<DecodeWarning>,
}

impl DecodeResult {
    /// True when decoding found nothing to complain about
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Modulo-10 checksum over the first 68 characters
///
/// Digits count their value, each minus sign counts one, everything else
/// counts zero.
pub fn line_checksum(line: &str) -> u32 {
    line.chars()
        .take(LINE_LEN - 1)
        .map(|c| match c {
            '0'..='9' => c as u32 - '0' as u32,
            '-' => 1,
            _ => 0,
        })
        .sum::<u32>()
        % 10
}

/// Checksum verdict for one data line
pub fn verify_checksum(line: &str) -> bool {
    line.chars().count() == LINE_LEN
        && line.chars().nth(LINE_LEN - 1).and_then(|c| c.to_digit(10))
            == Some(line_checksum(line))
}

fn check_line(line: &str, line_no: u8, warnings: &mut Vec<DecodeWarning>) {
    let length = line.chars().count();
    if length != LINE_LEN {
        warnings.push(DecodeWarning::BadLineLength { line_no, length });
        return;
    }

    let computed = line_checksum(line);
    let declared = line.chars().nth(LINE_LEN - 1).and_then(|c| c.to_digit(10));
    if declared != Some(computed) {
        warnings.push(DecodeWarning::ChecksumMismatch {
            line_no,
            computed,
            declared,
        });
    }
}

fn warn_field(
    warnings: &mut Vec<DecodeWarning>,
    line_no: u8,
    field: &'static str,
    err: FieldError,
) {
    warnings.push(DecodeWarning::BadField {
        line_no,
        field,
        start: err.start,
        length: err.length,
        raw: err.raw,
    });
}

fn int_field(
    line: &str,
    line_no: u8,
    field: &'static str,
    start: usize,
    length: usize,
    warnings: &mut Vec<DecodeWarning>,
) -> i64 {
    match parse_int(line, start, length) {
        Ok(v) => v,
        Err(e) => {
            warn_field(warnings, line_no, field, e);
            0
        }
    }
}

fn dec_field(
    line: &str,
    line_no: u8,
    field: &'static str,
    start: usize,
    length: usize,
    warnings: &mut Vec<DecodeWarning>,
) -> f64 {
    match parse_decimal(line, start, length) {
        Ok(v) => v,
        Err(e) => {
            warn_field(warnings, line_no, field, e);
            0.0
        }
    }
}

fn sci_field(
    line: &str,
    line_no: u8,
    field: &'static str,
    start: usize,
    length: usize,
    warnings: &mut Vec<DecodeWarning>,
) -> f64 {
    match parse_compact_scientific(line, start, length) {
        Ok(v) => v,
        Err(e) => {
            warn_field(warnings, line_no, field, e);
            0.0
        }
    }
}

/// Decode a name line plus the two data lines
pub fn decode_named(line0: &str, line1: &str, line2: &str) -> DecodeResult {
    let mut result = decode_lines(line1, line2);
    result.elements.name = line0.trim().to_string();
    result
}

/// Decode the two data lines; the record's name is left empty
///
/// Deterministic and total: malformed input produces warnings and zero
/// defaults, never a failure. Derived parameters are computed once, as
/// the final step, from the extracted mean motion.
pub fn decode_lines(line1: &str, line2: &str) -> DecodeResult {
    let mut warnings = Vec::new();
    check_line(line1, 1, &mut warnings);
    check_line(line2, 2, &mut warnings);

    let mut el = ElementSet {
        line1: line1.to_string(),
        line2: line2.to_string(),
        ..Default::default()
    };

    // Line 1
    el.norad_id = int_field(line1, 1, "norad id", 2, 5, &mut warnings).max(0) as u32;
    el.intl_designator = field_str(line1, 9, 8).to_string();
    let epoch_year = int_field(line1, 1, "epoch year", 18, 2, &mut warnings);
    el.epoch_year = epoch_year.max(0) as u32;
    el.epoch_day = dec_field(line1, 1, "epoch day", 20, 12, &mut warnings);
    el.mean_motion_dot = dec_field(line1, 1, "mean motion dot", 33, 10, &mut warnings);
    el.mean_motion_ddot = sci_field(line1, 1, "mean motion ddot", 44, 8, &mut warnings);
    el.bstar = sci_field(line1, 1, "b-star", 53, 8, &mut warnings);
    el.element_set_number =
        int_field(line1, 1, "element set number", 64, 4, &mut warnings).max(0) as u32;

    // Line 2
    el.inclination_deg = dec_field(line2, 2, "inclination", 8, 8, &mut warnings);
    el.raan_deg = dec_field(line2, 2, "raan", 17, 8, &mut warnings);
    // Seven digits with the leading "0." dropped to save a column
    el.eccentricity = dec_field(line2, 2, "eccentricity", 26, 7, &mut warnings) / 10_000_000.0;
    el.arg_of_perigee_deg = dec_field(line2, 2, "argument of perigee", 34, 8, &mut warnings);
    el.mean_anomaly_deg = dec_field(line2, 2, "mean anomaly", 43, 8, &mut warnings);
    el.mean_motion = dec_field(line2, 2, "mean motion", 52, 11, &mut warnings);
    el.revolution_number =
        int_field(line2, 2, "revolution number", 63, 5, &mut warnings).max(0) as u32;

    el.epoch = epoch_datetime(epoch_year, el.epoch_day);
    el.recompute_derived();

    for w in &warnings {
        log::warn!("TLE decode: {}", w);
    }

    DecodeResult {
        elements: el,
        warnings,
    }
}
