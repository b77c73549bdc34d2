/*!
Multi-base number conversion.

This module provides the [`Radix`] enumeration, digit-string validation and
the [`convert`] entry point that renders one arbitrary-precision value in all
four supported bases at once.
*/

use num_bigint::BigUint;
use num_traits::Zero;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

/// Numeric bases supported by the converter.
///
/// Declaration order is the display order of the four fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Radix {
    #[serde(rename = "dec")]
    Decimal,
    #[serde(rename = "bin")]
    Binary,
    #[serde(rename = "oct")]
    Octal,
    #[serde(rename = "hex")]
    Hexadecimal,
}

impl Radix {
    /// All supported radices in display order
    pub const ALL: [Radix; 4] = [Self::Decimal, Self::Binary, Self::Octal, Self::Hexadecimal];

    /// Numeric value of the base
    pub fn value(self) -> u32 {
        match self {
            Self::Binary => 2,
            Self::Octal => 8,
            Self::Decimal => 10,
            Self::Hexadecimal => 16,
        }
    }

    /// Canonical human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::Binary => "Binary",
            Self::Octal => "Octal",
            Self::Decimal => "Decimal",
            Self::Hexadecimal => "Hexadecimal",
        }
    }

    /// Short key used in serialized results and on the command line
    pub fn key(self) -> &'static str {
        match self {
            Self::Binary => "bin",
            Self::Octal => "oct",
            Self::Decimal => "dec",
            Self::Hexadecimal => "hex",
        }
    }

    /// Validation pattern matching a complete, non-empty digit string
    pub fn pattern(self) -> &'static Regex {
        static PATTERNS: OnceLock<[Regex; 4]> = OnceLock::new();

        let patterns = PATTERNS.get_or_init(|| {
            [
                Regex::new(r"^[0-9]+$").expect("decimal pattern is valid"),
                Regex::new(r"^[01]+$").expect("binary pattern is valid"),
                Regex::new(r"^[0-7]+$").expect("octal pattern is valid"),
                Regex::new(r"^[0-9a-fA-F]+$").expect("hexadecimal pattern is valid"),
            ]
        });

        &patterns[self as usize]
    }

    /// Radices other than this one, in display order
    pub fn others(self) -> impl Iterator<Item = Radix> {
        Self::ALL.into_iter().filter(move |&r| r != self)
    }
}

impl fmt::Display for Radix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Radix {
    type Err = ConvertError;

    /// Parse from the short key, the label or the base value (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bin" | "binary" | "2" => Ok(Self::Binary),
            "oct" | "octal" | "8" => Ok(Self::Octal),
            "dec" | "decimal" | "10" => Ok(Self::Decimal),
            "hex" | "hexadecimal" | "16" => Ok(Self::Hexadecimal),
            _ => Err(ConvertError::UnknownRadix { name: s.to_string() }),
        }
    }
}

/// Errors reported by validation and parsing.
///
/// The `Display` text is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConvertError {
    #[error("Invalid character for {radix} input.")]
    InvalidCharacter { radix: Radix },

    #[error("Number is too large or invalid.")]
    TooLargeOrInvalid { radix: Radix },

    #[error("Unknown radix: {name}")]
    UnknownRadix { name: String },

    #[error("Nothing to convert: input is empty")]
    Empty,
}

/// Check that every character of `digits` is a legal digit of `radix`.
///
/// The empty string passes; callers treat it as the cleared state.
pub fn validate(radix: Radix, digits: &str) -> Result<(), ConvertError> {
    if digits.is_empty() || radix.pattern().is_match(digits) {
        Ok(())
    } else {
        Err(ConvertError::InvalidCharacter { radix })
    }
}

/// Arbitrary-precision non-negative integer parsed from a digit string
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NumericValue(BigUint);

impl NumericValue {
    /// Validate and parse a non-empty digit string
    pub fn parse(radix: Radix, digits: &str) -> Result<Self, ConvertError> {
        if digits.is_empty() {
            return Err(ConvertError::Empty);
        }
        validate(radix, digits)?;

        BigUint::parse_bytes(digits.as_bytes(), radix.value())
            .map(Self)
            .ok_or(ConvertError::TooLargeOrInvalid { radix })
    }

    /// Canonical digits in `radix`: no prefix, no leading zeros, uppercase hex
    pub fn render(&self, radix: Radix) -> String {
        let digits = self.0.to_str_radix(radix.value());
        match radix {
            Radix::Hexadecimal => digits.to_ascii_uppercase(),
            _ => digits,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Borrow the underlying big integer
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }
}

impl From<BigUint> for NumericValue {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<u64> for NumericValue {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four renderings of one value, as shown in the converter fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    source: Radix,
    values: BTreeMap<Radix, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ConvertError>,
}

impl ConversionResult {
    /// All four fields empty, no error
    pub fn cleared(source: Radix) -> Self {
        Self {
            source,
            values: Radix::ALL.into_iter().map(|r| (r, String::new())).collect(),
            error: None,
        }
    }

    /// Every field rendered from `value`
    pub fn from_value(source: Radix, value: &NumericValue) -> Self {
        Self {
            source,
            values: Radix::ALL.into_iter().map(|r| (r, value.render(r))).collect(),
            error: None,
        }
    }

    /// Error state: the edited field keeps the raw input, the rest are cleared
    pub fn failed(source: Radix, raw: &str, error: ConvertError) -> Self {
        let mut result = Self::cleared(source);
        result.values.insert(source, raw.to_string());
        result.error = Some(error);
        result
    }

    /// Radix of the field that was edited
    pub fn source(&self) -> Radix {
        self.source
    }

    /// Rendering for one radix (empty when cleared or voided by an error)
    pub fn get(&self, radix: Radix) -> &str {
        self.values.get(&radix).map(String::as_str).unwrap_or("")
    }

    pub fn values(&self) -> &BTreeMap<Radix, String> {
        &self.values
    }

    pub fn error(&self) -> Option<&ConvertError> {
        self.error.as_ref()
    }

    /// User-facing error message, if any
    pub fn message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// True when there is a value and no error
    pub fn is_ok(&self) -> bool {
        self.error.is_none() && !self.is_cleared()
    }

    /// True for the empty-input state
    pub fn is_cleared(&self) -> bool {
        self.error.is_none() && self.values.values().all(String::is_empty)
    }

    /// Serialize for hosts that exchange JSON
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Convert a digit string typed into the `source` field into all four radices
pub fn convert(source: Radix, digits: &str) -> ConversionResult {
    if digits.is_empty() {
        debug!(source = source.key(), "empty input, clearing all fields");
        return ConversionResult::cleared(source);
    }

    match NumericValue::parse(source, digits) {
        Ok(value) => {
            debug!(source = source.key(), len = digits.len(), bits = value.as_biguint().bits(), "converted");
            ConversionResult::from_value(source, &value)
        }
        Err(error) => {
            debug!(source = source.key(), %error, "rejected input");
            ConversionResult::failed(source, digits, error)
        }
    }
}
