/*!
32-bit field parsing and manipulation.

This module provides the [`BitField32`] value type used by the bit
manipulator, together with the [`BitOp`] operations that transform it.
Index 0 is the most significant bit (position 31), index 31 the least
significant (position 0).
*/

use crate::word::{BIT_WIDTH, BYTE_BITS};
use num_bigint::{BigInt, Sign};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, trace};

const SIGN_BIT: u32 = 1 << 31;

/// Errors that can occur while addressing or driving the bit field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitFieldError {
    #[error("Bit index out of range: expected 0..32, got {0}")]
    IndexOutOfRange(usize),

    #[error("Unknown bit operation: {0}")]
    UnknownOperation(String),
}

/// A bit index in `0..32`, 0 being the most significant bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitIndex(u8);

impl BitIndex {
    pub fn new(index: usize) -> Option<Self> {
        (index < BIT_WIDTH).then(|| Self(index as u8))
    }

    /// Index into the most-significant-first sequence
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Bit position (weight exponent), 31 for index 0
    pub fn position(self) -> u32 {
        (BIT_WIDTH - 1 - self.index()) as u32
    }
}

impl TryFrom<usize> for BitIndex {
    type Error = BitFieldError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::new(index).ok_or(BitFieldError::IndexOutOfRange(index))
    }
}

/// Operations the manipulator exposes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitOp {
    Toggle(BitIndex),
    Set(BigInt),
    Invert,
    ShiftLeft,
    ShiftRight,
    RotateLeft,
    RotateRight,
    SetAll,
    ClearAll,
}

impl FromStr for BitOp {
    type Err = BitFieldError;

    /// Parse a command-line token such as `shl`, `toggle:3` or `set:-1`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_lowercase();
        let unknown = || BitFieldError::UnknownOperation(s.to_string());

        if let Some(arg) = token.strip_prefix("toggle:") {
            let index: usize = arg.parse().map_err(|_| unknown())?;
            return Ok(Self::Toggle(BitIndex::try_from(index)?));
        }
        if let Some(arg) = token.strip_prefix("set:") {
            return parse_signed(arg).map(Self::Set).ok_or_else(unknown);
        }

        match token.as_str() {
            "not" | "invert" => Ok(Self::Invert),
            "shl" | "shift-left" => Ok(Self::ShiftLeft),
            "shr" | "shift-right" => Ok(Self::ShiftRight),
            "rol" | "rotate-left" => Ok(Self::RotateLeft),
            "ror" | "rotate-right" => Ok(Self::RotateRight),
            "set-all" => Ok(Self::SetAll),
            "clear" | "clear-all" => Ok(Self::ClearAll),
            _ => Err(unknown()),
        }
    }
}

/// Parse an optionally signed integer, accepting `0x`, `0o` and `0b` prefixes
fn parse_signed(text: &str) -> Option<BigInt> {
    let text = text.trim();
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let lower = body.to_ascii_lowercase();
    let (radix, digits) = if let Some(d) = lower.strip_prefix("0x") {
        (16, d)
    } else if let Some(d) = lower.strip_prefix("0o") {
        (8, d)
    } else if let Some(d) = lower.strip_prefix("0b") {
        (2, d)
    } else {
        (10, lower.as_str())
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix)?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Derived renderings of a bit field, as shown next to the bits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitReport {
    pub bits: String,
    pub unsigned: u32,
    pub signed: i32,
    pub hex: String,
}

/// Exactly 32 bits. Every operation returns a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BitField32(u32);

impl BitField32 {
    /// All bits cleared
    pub fn zeroed() -> Self {
        Self(0)
    }

    /// All bits set
    pub fn ones() -> Self {
        Self(u32::MAX)
    }

    pub fn from_u32(word: u32) -> Self {
        Self(word)
    }

    /// Build from a most-significant-first sequence; any nonzero element is a 1
    pub fn from_bits(bits: &[u8; BIT_WIDTH]) -> Self {
        Self(bits.iter().fold(0u32, |acc, &b| (acc << 1) | u32::from(b != 0)))
    }

    /// Reduce an integer of any magnitude modulo 2^32 (two's complement for negatives)
    pub fn from_integer(n: &BigInt) -> Self {
        let (sign, digits) = n.to_u32_digits();
        let low = digits.first().copied().unwrap_or(0);
        match sign {
            Sign::Minus => Self(low.wrapping_neg()),
            Sign::NoSign | Sign::Plus => Self(low),
        }
    }

    /// Truncating conversion, identical to reducing modulo 2^32
    pub fn from_i64(n: i64) -> Self {
        Self(n as u32)
    }

    /// Set from user-typed integer text; empty or non-numeric text clears the field
    pub fn parse_integer(text: &str) -> Self {
        Self::try_parse_integer(text).unwrap_or_else(|| {
            debug!(input = text, "non-numeric integer input, clearing bits");
            Self::zeroed()
        })
    }

    /// Like [`Self::parse_integer`] but reports non-numeric text as `None`.
    /// Empty text is still the cleared field.
    pub fn try_parse_integer(text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            return Some(Self::zeroed());
        }
        parse_signed(text).map(|n| Self::from_integer(&n))
    }

    /// Bits, most significant first
    pub fn bits(self) -> [u8; BIT_WIDTH] {
        std::array::from_fn(|i| ((self.0 >> (BIT_WIDTH - 1 - i)) & 1) as u8)
    }

    pub fn bit(self, index: BitIndex) -> u8 {
        ((self.0 >> index.position()) & 1) as u8
    }

    #[must_use]
    pub fn toggle(self, index: BitIndex) -> Self {
        Self(self.0 ^ (1 << index.position()))
    }

    #[must_use]
    pub fn invert(self) -> Self {
        Self(!self.0)
    }

    /// Logical shift towards the most significant end; the new low bit is 0
    #[must_use]
    pub fn shift_left(self) -> Self {
        Self(self.0 << 1)
    }

    /// Logical shift towards the least significant end; the new high bit is 0
    #[must_use]
    pub fn shift_right(self) -> Self {
        Self(self.0 >> 1)
    }

    #[must_use]
    pub fn rotate_left(self) -> Self {
        Self(self.0.rotate_left(1))
    }

    #[must_use]
    pub fn rotate_right(self) -> Self {
        Self(self.0.rotate_right(1))
    }

    #[must_use]
    pub fn set_all(self) -> Self {
        Self::ones()
    }

    #[must_use]
    pub fn clear_all(self) -> Self {
        Self::zeroed()
    }

    /// Apply one operation and return the new state
    #[must_use]
    pub fn apply(self, op: &BitOp) -> Self {
        let next = match op {
            BitOp::Toggle(index) => self.toggle(*index),
            BitOp::Set(n) => Self::from_integer(n),
            BitOp::Invert => self.invert(),
            BitOp::ShiftLeft => self.shift_left(),
            BitOp::ShiftRight => self.shift_right(),
            BitOp::RotateLeft => self.rotate_left(),
            BitOp::RotateRight => self.rotate_right(),
            BitOp::SetAll => self.set_all(),
            BitOp::ClearAll => self.clear_all(),
        };
        trace!(?op, before = %self.hex(), after = %next.hex(), "applied bit op");
        next
    }

    /// Base-2 value of the 32 bits
    pub fn unsigned(self) -> u32 {
        self.0
    }

    /// Two's-complement value.
    ///
    /// Negative words are decoded by keeping every bit up to and including
    /// the least significant 1 and inverting every bit above it, which
    /// yields the magnitude. A magnitude of 2^31 has no positive i32.
    pub fn signed(self) -> i32 {
        let word = self.0;
        if word & SIGN_BIT == 0 {
            return word as i32;
        }

        // word != 0 here, so the boundary always exists
        let boundary = word.trailing_zeros();
        let keep = match 1u32.checked_shl(boundary + 1) {
            Some(bit) => bit - 1,
            None => u32::MAX,
        };
        let magnitude = (word & keep) | (!word & !keep);

        if magnitude == SIGN_BIT {
            i32::MIN
        } else {
            -(magnitude as i32)
        }
    }

    /// 8 uppercase hex digits, zero-padded
    pub fn hex(self) -> String {
        hex::encode_upper(self.0.to_be_bytes())
    }

    /// 32 binary digits, most significant first
    pub fn binary_string(self) -> String {
        format!("{:032b}", self.0)
    }

    /// Binary digits split into groups of `width` separated by spaces
    pub fn grouped(self, width: usize) -> String {
        let digits = self.binary_string();
        if width == 0 || width >= BIT_WIDTH {
            return digits;
        }

        digits
            .as_bytes()
            .chunks(width)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn report(self) -> BitReport {
        BitReport {
            bits: self.binary_string(),
            unsigned: self.unsigned(),
            signed: self.signed(),
            hex: self.hex(),
        }
    }
}

impl From<u32> for BitField32 {
    fn from(word: u32) -> Self {
        Self(word)
    }
}

impl fmt::Display for BitField32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.grouped(BYTE_BITS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(i: usize) -> BitIndex {
        BitIndex::new(i).unwrap()
    }

    #[test]
    fn test_zeroed_default() {
        let field = BitField32::default();
        assert_eq!(field, BitField32::zeroed());
        assert_eq!(field.bits(), [0u8; 32]);
        assert_eq!(field.unsigned(), 0);
        assert_eq!(field.signed(), 0);
        assert_eq!(field.hex(), "00000000");
    }

    #[test]
    fn test_all_ones() {
        let field = BitField32::zeroed().set_all();
        assert_eq!(field.bits(), [1u8; 32]);
        assert_eq!(field.unsigned(), 4294967295);
        assert_eq!(field.signed(), -1);
        assert_eq!(field.hex(), "FFFFFFFF");
        assert_eq!(field.clear_all(), BitField32::zeroed());
    }

    #[test]
    fn test_msb_only_is_min() {
        let field = BitField32::zeroed().toggle(idx(0));
        assert_eq!(field.unsigned(), 2147483648);
        assert_eq!(field.signed(), -2147483648);
        assert_eq!(field.hex(), "80000000");
    }

    #[test]
    fn test_signed_matches_weighted_sum() {
        let edges = [
            0u32, 1, 2, 0x7FFF_FFFF, 0x8000_0000, 0x8000_0001, 0xC000_0000,
            0xFFFF_FFFE, 0xFFFF_FFFF, 0xAAAA_AAAA, 0x5555_5555, 0xF000_0000,
        ];
        let sweep = (0..=u32::MAX).step_by(65_521);

        for word in edges.into_iter().chain(sweep) {
            let field = BitField32::from_u32(word);
            let weighted = -((word >> 31) as i64) * (1i64 << 31) + (word & 0x7FFF_FFFF) as i64;
            assert_eq!(field.signed() as i64, weighted, "word {word:#010x}");
        }
    }

    #[test]
    fn test_index_mapping() {
        let field = BitField32::zeroed().toggle(idx(31));
        assert_eq!(field.unsigned(), 1);
        assert_eq!(field.bit(idx(31)), 1);
        assert_eq!(field.bit(idx(0)), 0);

        let field = BitField32::from_u32(0b1011);
        let bits = field.bits();
        assert_eq!(&bits[28..], &[1, 0, 1, 1]);
        assert_eq!(BitField32::from_bits(&bits), field);

        assert_eq!(idx(0).position(), 31);
        assert_eq!(idx(31).position(), 0);
    }

    #[test]
    fn test_bit_index_bounds() {
        assert!(BitIndex::new(31).is_some());
        assert!(BitIndex::new(32).is_none());
        assert_eq!(BitIndex::try_from(40usize), Err(BitFieldError::IndexOutOfRange(40)));
    }

    #[test]
    fn test_toggle_twice_restores() {
        let field = BitField32::from_u32(0x1234_5678);
        for i in 0..32 {
            assert_eq!(field.toggle(idx(i)).toggle(idx(i)), field);
        }
    }

    #[test]
    fn test_set_from_integer_wraps() {
        assert_eq!(BitField32::from_i64(-1), BitField32::ones());
        assert_eq!(BitField32::from_i64(4294967295), BitField32::ones());
        assert_eq!(BitField32::from_i64(4294967296), BitField32::zeroed());
        assert_eq!(BitField32::from_i64(-2147483648).unsigned(), 0x8000_0000);

        let huge: BigInt = "-18446744073709551617".parse().unwrap(); // -(2^64 + 1)
        assert_eq!(BitField32::from_integer(&huge), BitField32::ones());
        let huge: BigInt = "18446744073709551658".parse().unwrap(); // 2^64 + 42
        assert_eq!(BitField32::from_integer(&huge).unsigned(), 42);
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(BitField32::parse_integer(" 42 ").unsigned(), 42);
        assert_eq!(BitField32::parse_integer("-1"), BitField32::ones());
        assert_eq!(BitField32::parse_integer("+7").unsigned(), 7);
        assert_eq!(BitField32::parse_integer("0x1F").unsigned(), 31);
        assert_eq!(BitField32::parse_integer("-0b10").signed(), -2);
        assert_eq!(BitField32::parse_integer("4294967296"), BitField32::zeroed());
        assert_eq!(BitField32::parse_integer(""), BitField32::zeroed());
        assert_eq!(BitField32::parse_integer("abc"), BitField32::zeroed());
        assert_eq!(BitField32::parse_integer("1.5"), BitField32::zeroed());
        assert_eq!(BitField32::parse_integer("0x"), BitField32::zeroed());

        assert_eq!(BitField32::try_parse_integer("  "), Some(BitField32::zeroed()));
        assert_eq!(BitField32::try_parse_integer("12abc"), None);
        assert_eq!(BitField32::try_parse_integer("-3").map(BitField32::signed), Some(-3));
    }

    #[test]
    fn test_shifts_are_logical() {
        let field = BitField32::ones();
        assert_eq!(field.shift_left().unsigned(), 0xFFFF_FFFE);
        assert_eq!(field.shift_right().unsigned(), 0x7FFF_FFFF);

        // Information shifted out is lost
        let msb = BitField32::from_u32(0x8000_0001);
        assert_eq!(msb.shift_left().shift_right().unsigned(), 0x0000_0001);
        assert_ne!(msb.shift_left().shift_right(), msb);
    }

    #[test]
    fn test_rotate_and_invert_round_trips() {
        for word in [0u32, 1, 0x8000_0000, 0xDEAD_BEEF, 0xFFFF_FFFF, 0x0F0F_00F1] {
            let field = BitField32::from_u32(word);
            assert_eq!(field.rotate_left().rotate_right(), field);
            assert_eq!(field.rotate_right().rotate_left(), field);
            assert_eq!(field.invert().invert(), field);
        }

        let field = BitField32::from_u32(0x8000_0000);
        assert_eq!(field.rotate_left().unsigned(), 1);
        assert_eq!(BitField32::from_u32(1).rotate_right(), field);
    }

    #[test]
    fn test_copy_semantics() {
        let before = BitField32::from_u32(5);
        let after = before.invert();
        assert_eq!(before.unsigned(), 5);
        assert_eq!(after.unsigned(), !5u32);
    }

    #[test]
    fn test_op_parsing() {
        assert_eq!("shl".parse::<BitOp>().unwrap(), BitOp::ShiftLeft);
        assert_eq!("Rotate-Right".parse::<BitOp>().unwrap(), BitOp::RotateRight);
        assert_eq!("toggle:3".parse::<BitOp>().unwrap(), BitOp::Toggle(idx(3)));
        assert_eq!("set:-1".parse::<BitOp>().unwrap(), BitOp::Set(BigInt::from(-1)));
        assert_eq!(
            "toggle:32".parse::<BitOp>(),
            Err(BitFieldError::IndexOutOfRange(32))
        );
        assert_eq!(
            "set:abc".parse::<BitOp>(),
            Err(BitFieldError::UnknownOperation("set:abc".to_string()))
        );
        assert!("xor".parse::<BitOp>().is_err());
    }

    #[test]
    fn test_apply_sequence() {
        let ops: Vec<BitOp> = ["set:1", "shl", "shl", "toggle:0", "not", "ror"]
            .iter()
            .map(|t| t.parse().unwrap())
            .collect();

        let field = ops.iter().fold(BitField32::zeroed(), |f, op| f.apply(op));
        // 1 -> 2 -> 4 -> 0x80000004 -> 0x7FFFFFFB -> ror
        assert_eq!(field.unsigned(), 0x7FFF_FFFBu32.rotate_right(1));
    }

    #[test]
    fn test_rendering() {
        let field = BitField32::from_u32(0xA5);
        assert_eq!(field.binary_string(), "00000000000000000000000010100101");
        assert_eq!(field.grouped(4), "0000 0000 0000 0000 0000 0000 1010 0101");
        assert_eq!(field.to_string(), "00000000 00000000 00000000 10100101");
        assert_eq!(field.grouped(0), field.binary_string());

        let report = field.report();
        assert_eq!(report.unsigned, 165);
        assert_eq!(report.signed, 165);
        assert_eq!(report.hex, "000000A5");
    }
}
