use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ByteSizeError {
    #[error("Byte size is empty")]
    Empty,

    #[error("Byte size cannot be negative: {0}")]
    Negative(String),

    #[error("Byte size has no numeric part: {0}")]
    NoDigits(String),

    #[error("Byte size is too large: {0}")]
    Overflow(String),
}

const KIB: u64 = 1024;

/// Parse a human readable size such as `512k`, `10m`, `0x10g` or `+1Tb`.
///
/// The leading number is hexadecimal after `0x`, octal after a leading `0`,
/// decimal otherwise, and ends at the first character that is not a digit of
/// that radix. With trailing `b`s removed, the last character picks the unit.
pub fn parse_byte_size(input: &str) -> Result<u64, ByteSizeError> {
    let size = input.trim().to_lowercase();
    if size.is_empty() {
        return Err(ByteSizeError::Empty);
    }

    let unsigned = size.trim_start_matches('+');
    if unsigned.starts_with('-') {
        return Err(ByteSizeError::Negative(input.to_string()));
    }

    let (digits, radix) = match unsigned.strip_prefix("0x") {
        Some(hex) => (hex, 16),
        None if unsigned.starts_with('0') => (unsigned, 8),
        None => (unsigned, 10),
    };
    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if end == 0 {
        return Err(ByteSizeError::NoDigits(input.to_string()));
    }
    let value = u64::from_str_radix(&digits[..end], radix)
        .map_err(|_| ByteSizeError::Overflow(input.to_string()))?;

    let multiplier = match size.trim_end_matches('b').chars().last() {
        Some('t') => KIB.pow(4),
        Some('g') => KIB.pow(3),
        Some('m') => KIB.pow(2),
        Some('k') => KIB,
        _ => 1,
    };

    value
        .checked_mul(multiplier)
        .ok_or_else(|| ByteSizeError::Overflow(input.to_string()))
}
