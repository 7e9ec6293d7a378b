//! Line protocol spoken by the air-quality sensor board.
//!
//! One reading per line, eight comma separated fields:
//!
//! ```text
//! <pm1_0>,<pm2_5>,<pm10_0>,<temp_c>,<press_pa>,<humidity_pct>,<alt_m>,<checksum>
//! ```
//!
//! The first three fields are integer particulate counts, the next four are
//! decimal measurements. The checksum is the XOR of every character of the
//! first seven fields (separators excluded), written in hexadecimal.
//!
//! ## Example
//! ```
//! use sensor_frame::{encode, is_valid, parse, TelemetryRecord};
//!
//! let record = TelemetryRecord {
//!     pm1_0: 12,
//!     pm2_5: 34,
//!     pm10_0: 56,
//!     temp_c: 21.5,
//!     press_pa: 101325.0,
//!     humidity_pct: 45.0,
//!     alt_m: 120.3,
//! };
//!
//! let line = encode(&record);
//! assert!(is_valid(&line));
//! assert_eq!(parse(&line).unwrap(), record);
//! ```

mod checksum;
mod parse;
mod record;

pub use checksum::{ChecksumError, checksum, is_valid, validate};
pub use parse::{ParseError, parse};
pub use record::{FieldValue, NumericKind, RecordField, TelemetryRecord};

/// Fields in a frame, checksum included.
pub const FIELD_COUNT: usize = 8;

pub const SEPARATOR: char = ',';

/// Renders a record as a frame line (without line terminator), checksum appended
/// in uppercase hexadecimal.
pub fn encode(record: &TelemetryRecord) -> String {
    let data = RecordField::ALL
        .iter()
        .map(|field| match record.value(*field) {
            FieldValue::Integer(v) => v.to_string(),
            FieldValue::Float(v) => v.to_string(),
        })
        .collect::<Vec<_>>()
        .join(",");

    format!("{},{:X}", data, checksum(&data))
}
