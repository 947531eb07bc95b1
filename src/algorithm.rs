use std::fmt;

use const_oid::ObjectIdentifier;
use sha2::{Digest, Sha256, Sha384, Sha512};
use x509_cert::spki::AlgorithmIdentifierOwned;

use crate::description::KeyAlgorithm;
use crate::error::{PkiError, Result};

/// Smallest RSA modulus accepted, in bits.
pub const MIN_RSA_KEY_SIZE: u32 = 2048;

/// Public key algorithms a certificate can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicKeyAlgorithm {
    Rsa,
    Ecdsa,
}

impl PublicKeyAlgorithm {
    /// OID placed in a SubjectPublicKeyInfo for this algorithm.
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            PublicKeyAlgorithm::Rsa => const_oid::db::rfc5912::RSA_ENCRYPTION,
            PublicKeyAlgorithm::Ecdsa => const_oid::db::rfc5912::ID_EC_PUBLIC_KEY,
        }
    }

    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        match *oid {
            const_oid::db::rfc5912::RSA_ENCRYPTION => Some(PublicKeyAlgorithm::Rsa),
            const_oid::db::rfc5912::ID_EC_PUBLIC_KEY => Some(PublicKeyAlgorithm::Ecdsa),
            _ => None,
        }
    }
}

impl fmt::Display for PublicKeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicKeyAlgorithm::Rsa => f.write_str("RSA"),
            PublicKeyAlgorithm::Ecdsa => f.write_str("ECDSA"),
        }
    }
}

/// Represents the supported signature algorithms for certificates and CSRs.
///
/// This enum provides a mapping to the corresponding OIDs for each algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// SHA-256 with RSA encryption.
    Sha256WithRSA,
    /// SHA-384 with RSA encryption.
    Sha384WithRSA,
    /// SHA-512 with RSA encryption.
    Sha512WithRSA,
    /// SHA-256 with ECDSA.
    Sha256WithECDSA,
    /// SHA-384 with ECDSA.
    Sha384WithECDSA,
    /// SHA-512 with ECDSA.
    Sha512WithECDSA,
}

impl SignatureAlgorithm {
    pub fn oid(&self) -> ObjectIdentifier {
        use const_oid::db::rfc5912;
        match self {
            SignatureAlgorithm::Sha256WithRSA => rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::Sha384WithRSA => rfc5912::SHA_384_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::Sha512WithRSA => rfc5912::SHA_512_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::Sha256WithECDSA => rfc5912::ECDSA_WITH_SHA_256,
            SignatureAlgorithm::Sha384WithECDSA => rfc5912::ECDSA_WITH_SHA_384,
            SignatureAlgorithm::Sha512WithECDSA => rfc5912::ECDSA_WITH_SHA_512,
        }
    }

    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        [
            SignatureAlgorithm::Sha256WithRSA,
            SignatureAlgorithm::Sha384WithRSA,
            SignatureAlgorithm::Sha512WithRSA,
            SignatureAlgorithm::Sha256WithECDSA,
            SignatureAlgorithm::Sha384WithECDSA,
            SignatureAlgorithm::Sha512WithECDSA,
        ]
        .into_iter()
        .find(|alg| alg.oid() == *oid)
    }

    /// The key type able to produce this signature.
    pub fn public_key_algorithm(&self) -> PublicKeyAlgorithm {
        match self {
            SignatureAlgorithm::Sha256WithRSA
            | SignatureAlgorithm::Sha384WithRSA
            | SignatureAlgorithm::Sha512WithRSA => PublicKeyAlgorithm::Rsa,
            SignatureAlgorithm::Sha256WithECDSA
            | SignatureAlgorithm::Sha384WithECDSA
            | SignatureAlgorithm::Sha512WithECDSA => PublicKeyAlgorithm::Ecdsa,
        }
    }

    /// Hashes `message` with this algorithm's digest.
    pub fn digest(&self, message: &[u8]) -> Vec<u8> {
        match self {
            SignatureAlgorithm::Sha256WithRSA | SignatureAlgorithm::Sha256WithECDSA => {
                Sha256::digest(message).to_vec()
            }
            SignatureAlgorithm::Sha384WithRSA | SignatureAlgorithm::Sha384WithECDSA => {
                Sha384::digest(message).to_vec()
            }
            SignatureAlgorithm::Sha512WithRSA | SignatureAlgorithm::Sha512WithECDSA => {
                Sha512::digest(message).to_vec()
            }
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignatureAlgorithm::Sha256WithRSA => "SHA256-RSA",
            SignatureAlgorithm::Sha384WithRSA => "SHA384-RSA",
            SignatureAlgorithm::Sha512WithRSA => "SHA512-RSA",
            SignatureAlgorithm::Sha256WithECDSA => "ECDSA-SHA256",
            SignatureAlgorithm::Sha384WithECDSA => "ECDSA-SHA384",
            SignatureAlgorithm::Sha512WithECDSA => "ECDSA-SHA512",
        };
        f.write_str(name)
    }
}

impl From<SignatureAlgorithm> for AlgorithmIdentifierOwned {
    /// Converts a `SignatureAlgorithm` into an `AlgorithmIdentifierOwned`.
    ///
    /// RSA identifiers carry an explicit NULL parameter (RFC 4055); ECDSA
    /// identifiers carry none (RFC 5758).
    fn from(value: SignatureAlgorithm) -> Self {
        let parameters = match value.public_key_algorithm() {
            PublicKeyAlgorithm::Rsa => Some(der::AnyRef::NULL.into()),
            PublicKeyAlgorithm::Ecdsa => None,
        };
        AlgorithmIdentifierOwned {
            oid: value.oid(),
            parameters,
        }
    }
}

/// Public key and signature algorithm chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlgorithmPair {
    pub public_key_algorithm: PublicKeyAlgorithm,
    pub signature_algorithm: SignatureAlgorithm,
}

impl AlgorithmPair {
    const fn new(
        public_key_algorithm: PublicKeyAlgorithm,
        signature_algorithm: SignatureAlgorithm,
    ) -> Self {
        Self {
            public_key_algorithm,
            signature_algorithm,
        }
    }
}

/// Maps a requested key algorithm and size onto the algorithms used for
/// issuance.
///
/// RSA sizes pick the strongest digest whose threshold they reach (4096 →
/// SHA-512, 3072 → SHA-384, 2048 → SHA-256) and anything below 2048 bits is
/// rejected. ECDSA accepts only the P-256, P-384 and P-521 curve sizes. An
/// unspecified algorithm falls back to RSA with SHA-256.
pub fn select_algorithm(key_algorithm: &KeyAlgorithm, key_size: u32) -> Result<AlgorithmPair> {
    use PublicKeyAlgorithm::{Ecdsa, Rsa};

    let pair = match key_algorithm {
        KeyAlgorithm::Unspecified => AlgorithmPair::new(Rsa, SignatureAlgorithm::Sha256WithRSA),
        KeyAlgorithm::Rsa => match key_size {
            4096.. => AlgorithmPair::new(Rsa, SignatureAlgorithm::Sha512WithRSA),
            3072.. => AlgorithmPair::new(Rsa, SignatureAlgorithm::Sha384WithRSA),
            MIN_RSA_KEY_SIZE.. => AlgorithmPair::new(Rsa, SignatureAlgorithm::Sha256WithRSA),
            _ => {
                return Err(PkiError::UnsupportedKeySize {
                    algorithm: key_algorithm.to_string(),
                    size: key_size,
                    minimum: Some(MIN_RSA_KEY_SIZE),
                });
            }
        },
        KeyAlgorithm::Ecdsa => match key_size {
            521 => AlgorithmPair::new(Ecdsa, SignatureAlgorithm::Sha512WithECDSA),
            384 => AlgorithmPair::new(Ecdsa, SignatureAlgorithm::Sha384WithECDSA),
            256 => AlgorithmPair::new(Ecdsa, SignatureAlgorithm::Sha256WithECDSA),
            _ => {
                return Err(PkiError::UnsupportedKeySize {
                    algorithm: key_algorithm.to_string(),
                    size: key_size,
                    minimum: None,
                });
            }
        },
        KeyAlgorithm::Other(name) => {
            return Err(PkiError::UnsupportedKeyAlgorithm(name.clone()));
        }
    };

    tracing::trace!(
        requested = %key_algorithm,
        key_size,
        public_key_algorithm = %pair.public_key_algorithm,
        signature_algorithm = %pair.signature_algorithm,
        "selected algorithms"
    );
    Ok(pair)
}
