//! use certplan::error::PkiError;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PkiError>;

/// Represents errors that can occur while turning a certificate description
/// into signed artifacts.
///
/// None of these are retried by the library; they are returned to the caller
/// as-is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PkiError {
    /// Neither a common name nor any DNS names were requested.
    #[error("no domains specified on certificate")]
    NoDomainsSpecified,

    /// The requested key algorithm is not one of `rsa` or `ecdsa`.
    #[error("unsupported algorithm specified: {0}. should be either 'ecdsa' or 'rsa'")]
    UnsupportedKeyAlgorithm(String),

    /// The requested key size is below the minimum or outside the allowed set.
    #[error(
        "unsupported {algorithm} keysize specified: {size}{}",
        .minimum.map(|min| format!(". min keysize {min}")).unwrap_or_default()
    )]
    UnsupportedKeySize {
        algorithm: String,
        size: u32,
        minimum: Option<u32>,
    },

    /// The secure random source could not produce a serial number.
    #[error("failed to generate serial number: {0}")]
    RandomGenerationError(String),

    /// The signing primitive rejected the template or key pair.
    #[error("error creating x509 certificate: {0}")]
    SigningError(String),

    /// DER parsing or PEM encoding of otherwise valid bytes failed.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error during data decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// Error due to invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error while generating or importing a key.
    #[error("Key error: {0}")]
    KeyError(String),
}

impl From<der::Error> for PkiError {
    /// Converts a `der::Error` into a `PkiError`.
    fn from(err: der::Error) -> Self {
        PkiError::DecodingError(err.to_string())
    }
}

impl From<rsa::Error> for PkiError {
    fn from(err: rsa::Error) -> Self {
        PkiError::KeyError(err.to_string())
    }
}

impl From<pkcs8::Error> for PkiError {
    fn from(err: pkcs8::Error) -> Self {
        PkiError::KeyError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_size_messages() {
        let rsa = PkiError::UnsupportedKeySize {
            algorithm: "rsa".to_string(),
            size: 1024,
            minimum: Some(2048),
        };
        assert_eq!(
            rsa.to_string(),
            "unsupported rsa keysize specified: 1024. min keysize 2048"
        );

        let ecdsa = PkiError::UnsupportedKeySize {
            algorithm: "ecdsa".to_string(),
            size: 999,
            minimum: None,
        };
        assert_eq!(ecdsa.to_string(), "unsupported ecdsa keysize specified: 999");
    }
}
