/*!
# Radix Core

Computational core shared by every Radix Lab front end. Two independent,
side-effect-free components live here:

- a base converter that turns digit strings in radix 2, 8, 10 or 16 into
  every other supported radix without ever leaving arbitrary precision, and
  explains the arithmetic step by step
- a 32-bit field with two's-complement interpretation and the usual
  bit-twiddling operations (toggle, NOT, logical shifts, rotates)

## Core Types

- [`Radix`] - One of the four supported numeric bases
- [`NumericValue`] - Arbitrary-precision non-negative integer
- [`ConversionResult`] - All four renderings of one value, or an error
- [`DerivationTrace`] - Step-by-step arithmetic behind a conversion
- [`BitField32`] - Fixed 32-bit vector, most significant bit first

## Modules

- [`convert`] - Validation, parsing and multi-base rendering
- [`explain`] - Derivation traces for a source/target radix pair
- [`bits`] - 32-bit field state and operations
- [`error`] - Common error types
*/

pub mod bits;
pub mod convert;
pub mod error;
pub mod explain;

// Re-export commonly used types
pub use bits::{BitField32, BitFieldError, BitIndex, BitOp};
pub use convert::{convert, validate, ConversionResult, ConvertError, NumericValue, Radix};
pub use error::{CoreError, Result};
pub use explain::{explain, explain_all, DerivationMethod, DerivationTrace, TraceStep};

/// Version information for the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bit field constants
pub mod word {
    /// Number of bits in the manipulated word
    pub const BIT_WIDTH: usize = 32;

    /// Bits per byte, the default display grouping
    pub const BYTE_BITS: usize = 8;
}
