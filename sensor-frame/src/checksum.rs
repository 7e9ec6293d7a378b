use crate::{FIELD_COUNT, SEPARATOR};
use std::fmt;

/// Reason a frame failed integrity validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumError {
    /// The frame did not split into exactly eight fields.
    FieldCount(usize),
    /// The trailing field is not a hexadecimal number.
    Unreadable(String),
    /// The transmitted checksum does not match the frame content.
    Mismatch { received: u32, computed: u32 },
}

impl fmt::Display for ChecksumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumError::FieldCount(n) => {
                write!(f, "expected {} fields, got {}", FIELD_COUNT, n)
            }
            ChecksumError::Unreadable(field) => write!(f, "unreadable checksum {:?}", field),
            ChecksumError::Mismatch { received, computed } => {
                write!(f, "received {:X}, computed {:X}", received, computed)
            }
        }
    }
}

impl std::error::Error for ChecksumError {}

/// XOR of the code points of every character in `data` except the separators.
pub fn checksum(data: &str) -> u32 {
    data.chars()
        .filter(|&c| c != SEPARATOR)
        .fold(0, |acc, c| acc ^ c as u32)
}

/// Checks the trailing checksum of a frame against its seven measurement fields.
pub fn validate(line: &str) -> Result<(), ChecksumError> {
    let fields: Vec<&str> = line.split(SEPARATOR).collect();
    if fields.len() != FIELD_COUNT {
        return Err(ChecksumError::FieldCount(fields.len()));
    }

    let received = parse_hex(fields[FIELD_COUNT - 1])
        .ok_or_else(|| ChecksumError::Unreadable(fields[FIELD_COUNT - 1].to_string()))?;

    let computed = checksum(&fields[..FIELD_COUNT - 1].join(","));

    if computed == received {
        Ok(())
    } else {
        Err(ChecksumError::Mismatch { received, computed })
    }
}

/// Boolean form of [`validate`].
pub fn is_valid(line: &str) -> bool {
    validate(line).is_ok()
}

fn parse_hex(field: &str) -> Option<u32> {
    let digits = field.trim();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);

    u32::from_str_radix(digits, 16).ok()
}
