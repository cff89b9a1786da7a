//! Snapshot wire format
//!
//! A snapshot is UTF-8 text holding exactly 7 decimal fields joined by a fixed delimiter:
//!
//! ```text
//! loadAverage,memoryTotal,memoryUsed,diskTotal,diskUsed,networkTotal,networkUsed
//! ```
//!
//! Decoding is all-or-nothing: a payload that fails any check never yields partial readings.

use std::fmt;

use crate::Readings;

/// Delimiter used when none is configured.
pub const DEFAULT_DELIMITER: char = ',';

/// Errors produced while decoding a snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Payload is not valid UTF-8
    InvalidEncoding,

    /// Payload does not split into exactly 7 fields
    FieldCount { expected: usize, found: usize },

    /// A field is not a finite decimal number
    NotANumber { token: String },

    /// A field holds a negative value
    NegativeValue { field: &'static str, value: f64 },
}

impl FormatError {
    /// Stable tag for the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            FormatError::InvalidEncoding => "invalid-encoding",
            FormatError::FieldCount { .. } => "field-count",
            FormatError::NotANumber { .. } => "not-a-number",
            FormatError::NegativeValue { .. } => "negative-value",
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::InvalidEncoding => write!(f, "invalid data format: payload is not UTF-8"),
            FormatError::FieldCount { expected, found } => write!(
                f,
                "invalid data format: expected {expected} values, got {found}"
            ),
            FormatError::NotANumber { token } => {
                write!(f, "invalid data format: {token:?} is not a number")
            }
            FormatError::NegativeValue { field, value } => {
                write!(f, "invalid data format: {field} is negative ({value})")
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// Decode a raw payload into readings.
pub fn decode(raw: &[u8], delimiter: char) -> Result<Readings, FormatError> {
    let text = std::str::from_utf8(raw).map_err(|_| FormatError::InvalidEncoding)?;
    decode_str(text, delimiter)
}

/// Decode a textual payload into readings.
pub fn decode_str(text: &str, delimiter: char) -> Result<Readings, FormatError> {
    let tokens = split(text.trim(), delimiter);

    if tokens.len() != Readings::FIELD_COUNT {
        return Err(FormatError::FieldCount {
            expected: Readings::FIELD_COUNT,
            found: tokens.len(),
        });
    }

    let mut fields = [0.0; Readings::FIELD_COUNT];
    for (field, token) in fields.iter_mut().zip(&tokens) {
        *field = parse_field(token)?;
    }

    if let Some((index, value)) = fields
        .iter()
        .copied()
        .enumerate()
        .find(|(_, value)| *value < 0.0)
    {
        return Err(FormatError::NegativeValue {
            field: Readings::FIELD_NAMES[index],
            value,
        });
    }

    Ok(Readings::from_fields(fields))
}

/// Render readings in wire format.
pub fn encode(readings: &Readings, delimiter: char) -> String {
    readings
        .fields()
        .iter()
        .map(|field| field.to_string())
        .collect::<Vec<_>>()
        .join(&delimiter.to_string())
}

fn split(text: &str, delimiter: char) -> Vec<&str> {
    if text.is_empty() {
        return vec![];
    }

    // runs of whitespace count as one separator
    if delimiter.is_whitespace() {
        return text.split_whitespace().collect();
    }

    text.split(delimiter).map(str::trim).collect()
}

fn parse_field(token: &str) -> Result<f64, FormatError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| FormatError::NotANumber {
            token: token.to_string(),
        })
}
