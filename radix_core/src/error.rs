/*!
Common error types for the Radix Lab components.
*/

use thiserror::Error;

/// Common result type used throughout the core library
pub type Result<T> = std::result::Result<T, CoreError>;

/// Comprehensive error type for all core operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Digit string validation or parsing errors
    #[error("Conversion error: {0}")]
    Convert(#[from] crate::convert::ConvertError),

    /// Bit field errors (bad index, unknown operation)
    #[error("Bit field error: {0}")]
    BitField(#[from] crate::bits::BitFieldError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{ConvertError, Radix};

    #[test]
    fn test_from_convert_error() {
        let err: CoreError = ConvertError::InvalidCharacter { radix: Radix::Binary }.into();
        assert_eq!(
            err.to_string(),
            "Conversion error: Invalid character for Binary input."
        );
    }

    #[test]
    fn test_from_serde_error() {
        let err: CoreError = serde_json::from_str::<crate::Radix>("\"base7\"").unwrap_err().into();
        assert!(err.to_string().starts_with("Serialization error: "));
    }
}
