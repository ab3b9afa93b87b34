//! NORAD two-line element decoding
//!
//! Fixed-column field extraction, checksum validation, epoch resolution,
//! and the decoded element-set record with its derived Keplerian
//! quantities. Decoding is tolerant by design: defects become warnings,
//! never hard failures.

mod decode;
mod elements;
mod epoch;
mod fields;

pub use decode::*;
pub use elements::*;
pub use epoch::*;
pub use fields::*;
