use const_oid::AssociatedOid;
use p256::ecdsa::signature::hazmat::PrehashSigner;
use pkcs8::{DecodePrivateKey, PrivateKeyInfo};
use rsa::signature::{SignatureEncoding, Signer as _};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256, Sha384, Sha512};
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::algorithm::{PublicKeyAlgorithm, SignatureAlgorithm, select_algorithm};
use crate::description::{CertificateDescription, KeyAlgorithm};
use crate::error::{PkiError, Result};

/// Supported key types for certificate operations.
#[derive(Clone, Debug)]
pub enum KeyPair {
    Rsa {
        private: Box<RsaPrivateKey>,
        public: RsaPublicKey,
    },
    EcdsaP256 {
        signing_key: p256::ecdsa::SigningKey,
        verifying_key: p256::ecdsa::VerifyingKey,
    },
    EcdsaP384 {
        signing_key: p384::ecdsa::SigningKey,
        verifying_key: p384::ecdsa::VerifyingKey,
    },
    /// P-521 keys are held as curve keys; signing goes through
    /// [`p521::ecdsa::SigningKey`], which has no pkcs8 or SPKI support.
    EcdsaP521 {
        secret_key: p521::SecretKey,
        public_key: p521::PublicKey,
    },
}

impl KeyPair {
    /// Generate an RSA key pair with the specified number of bits.
    pub fn generate_rsa(bits: usize) -> Result<Self> {
        let mut rng = rand_core::OsRng;
        let private = RsaPrivateKey::new(&mut rng, bits)?;
        let public = RsaPublicKey::from(&private);
        Ok(KeyPair::Rsa {
            private: Box::new(private),
            public,
        })
    }

    /// Generate an ECDSA P-256 key pair.
    pub fn generate_ecdsa_p256() -> Self {
        let signing_key = p256::ecdsa::SigningKey::random(&mut rand_core::OsRng);
        let verifying_key = *signing_key.verifying_key();
        KeyPair::EcdsaP256 {
            signing_key,
            verifying_key,
        }
    }

    /// Generate an ECDSA P-384 key pair.
    pub fn generate_ecdsa_p384() -> Self {
        let signing_key = p384::ecdsa::SigningKey::random(&mut rand_core::OsRng);
        let verifying_key = *signing_key.verifying_key();
        KeyPair::EcdsaP384 {
            signing_key,
            verifying_key,
        }
    }

    /// Generate an ECDSA P-521 key pair.
    pub fn generate_ecdsa_p521() -> Self {
        let secret_key = p521::SecretKey::random(&mut rand_core::OsRng);
        let public_key = secret_key.public_key();
        KeyPair::EcdsaP521 {
            secret_key,
            public_key,
        }
    }

    /// Generate a key pair matching the algorithm and size a description asks for.
    ///
    /// Combinations rejected by [`select_algorithm`] are rejected here too. An
    /// unspecified algorithm yields a 2048-bit RSA key.
    pub fn generate_for(desc: &CertificateDescription) -> Result<Self> {
        select_algorithm(&desc.key_algorithm, desc.key_size)?;
        match desc.key_algorithm {
            KeyAlgorithm::Rsa => Self::generate_rsa(desc.key_size as usize),
            KeyAlgorithm::Ecdsa => match desc.key_size {
                256 => Ok(Self::generate_ecdsa_p256()),
                384 => Ok(Self::generate_ecdsa_p384()),
                _ => Ok(Self::generate_ecdsa_p521()),
            },
            _ => Self::generate_rsa(crate::algorithm::MIN_RSA_KEY_SIZE as usize),
        }
    }

    /// Import a PKCS#8 DER private key (RSA, or ECDSA on P-256/P-384/P-521).
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let info = PrivateKeyInfo::try_from(der)?;
        match info.algorithm.oid {
            const_oid::db::rfc5912::RSA_ENCRYPTION => {
                let private = RsaPrivateKey::from_pkcs8_der(der)?;
                let public = RsaPublicKey::from(&private);
                Ok(KeyPair::Rsa {
                    private: Box::new(private),
                    public,
                })
            }
            const_oid::db::rfc5912::ID_EC_PUBLIC_KEY => {
                let curve = info
                    .algorithm
                    .parameters_oid()
                    .map_err(|e| PkiError::KeyError(e.to_string()))?;
                match curve {
                    const_oid::db::rfc5912::SECP_256_R_1 => {
                        let signing_key = p256::ecdsa::SigningKey::from_pkcs8_der(der)?;
                        let verifying_key = *signing_key.verifying_key();
                        Ok(KeyPair::EcdsaP256 {
                            signing_key,
                            verifying_key,
                        })
                    }
                    const_oid::db::rfc5912::SECP_384_R_1 => {
                        let signing_key = p384::ecdsa::SigningKey::from_pkcs8_der(der)?;
                        let verifying_key = *signing_key.verifying_key();
                        Ok(KeyPair::EcdsaP384 {
                            signing_key,
                            verifying_key,
                        })
                    }
                    const_oid::db::rfc5912::SECP_521_R_1 => {
                        let secret_key = p521::SecretKey::from_pkcs8_der(der)?;
                        let public_key = secret_key.public_key();
                        Ok(KeyPair::EcdsaP521 {
                            secret_key,
                            public_key,
                        })
                    }
                    other => Err(PkiError::KeyError(format!("unsupported curve {other}"))),
                }
            }
            other => Err(PkiError::KeyError(format!(
                "unsupported private key algorithm {other}"
            ))),
        }
    }

    /// Import a PEM `PRIVATE KEY` block.
    pub fn from_pkcs8_pem(pem_str: &str) -> Result<Self> {
        let block = pem::parse(pem_str).map_err(|e| PkiError::DecodingError(e.to_string()))?;
        if block.tag() != "PRIVATE KEY" {
            return Err(PkiError::InvalidInput(format!(
                "expected a PRIVATE KEY block, got {}",
                block.tag()
            )));
        }
        Self::from_pkcs8_der(block.contents())
    }

    pub fn public_key_algorithm(&self) -> PublicKeyAlgorithm {
        match self {
            KeyPair::Rsa { .. } => PublicKeyAlgorithm::Rsa,
            KeyPair::EcdsaP256 { .. } | KeyPair::EcdsaP384 { .. } | KeyPair::EcdsaP521 { .. } => {
                PublicKeyAlgorithm::Ecdsa
            }
        }
    }
}

/// Public half of a [`KeyPair`], as placed in a certificate or CSR.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    EcdsaP256(p256::ecdsa::VerifyingKey),
    EcdsaP384(p384::ecdsa::VerifyingKey),
    EcdsaP521(p521::PublicKey),
}

impl PublicKey {
    pub fn from_key_pair(key_pair: &KeyPair) -> Self {
        match key_pair {
            KeyPair::Rsa { public, .. } => PublicKey::Rsa(public.clone()),
            KeyPair::EcdsaP256 { verifying_key, .. } => PublicKey::EcdsaP256(*verifying_key),
            KeyPair::EcdsaP384 { verifying_key, .. } => PublicKey::EcdsaP384(*verifying_key),
            KeyPair::EcdsaP521 { public_key, .. } => PublicKey::EcdsaP521(*public_key),
        }
    }

    pub fn algorithm(&self) -> PublicKeyAlgorithm {
        match self {
            PublicKey::Rsa(_) => PublicKeyAlgorithm::Rsa,
            PublicKey::EcdsaP256(_) | PublicKey::EcdsaP384(_) | PublicKey::EcdsaP521(_) => {
                PublicKeyAlgorithm::Ecdsa
            }
        }
    }

    /// Encodes the key as a SubjectPublicKeyInfo.
    pub fn to_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        let spki = match self {
            PublicKey::Rsa(public) => SubjectPublicKeyInfoOwned::from_key(public.clone()),
            PublicKey::EcdsaP256(key) => SubjectPublicKeyInfoOwned::from_key(*key),
            PublicKey::EcdsaP384(key) => SubjectPublicKeyInfoOwned::from_key(*key),
            PublicKey::EcdsaP521(key) => SubjectPublicKeyInfoOwned::from_key(*key),
        };
        spki.map_err(|e| PkiError::EncodingError(format!("public key: {e}")))
    }
}

/// A private key able to sign certificates and CSRs.
///
/// [`KeyPair`] is the production implementation; tests substitute fakes.
pub trait Signer {
    /// Public key matching the signing key.
    fn public_key(&self) -> PublicKey;

    /// Algorithm used when a template does not name one.
    fn default_signature_algorithm(&self) -> SignatureAlgorithm;

    /// Signs `message`, returning the signature in its X.509 encoding.
    fn sign(&self, algorithm: SignatureAlgorithm, message: &[u8]) -> Result<Vec<u8>>;
}

impl Signer for KeyPair {
    fn public_key(&self) -> PublicKey {
        PublicKey::from_key_pair(self)
    }

    fn default_signature_algorithm(&self) -> SignatureAlgorithm {
        match self {
            KeyPair::Rsa { .. } => SignatureAlgorithm::Sha256WithRSA,
            KeyPair::EcdsaP256 { .. } => SignatureAlgorithm::Sha256WithECDSA,
            KeyPair::EcdsaP384 { .. } => SignatureAlgorithm::Sha384WithECDSA,
            KeyPair::EcdsaP521 { .. } => SignatureAlgorithm::Sha512WithECDSA,
        }
    }

    fn sign(&self, algorithm: SignatureAlgorithm, message: &[u8]) -> Result<Vec<u8>> {
        if algorithm.public_key_algorithm() != self.public_key_algorithm() {
            return Err(PkiError::SigningError(format!(
                "{algorithm} signatures cannot be produced by an {} key",
                self.public_key_algorithm()
            )));
        }

        // ECDSA signs the digest named by the algorithm; the signature is the
        // DER Ecdsa-Sig-Value X.509 expects.
        match self {
            KeyPair::Rsa { private, .. } => match algorithm {
                SignatureAlgorithm::Sha384WithRSA => rsa_sign::<Sha384>(private, message),
                SignatureAlgorithm::Sha512WithRSA => rsa_sign::<Sha512>(private, message),
                _ => rsa_sign::<Sha256>(private, message),
            },
            KeyPair::EcdsaP256 { signing_key, .. } => {
                let signature: p256::ecdsa::Signature = signing_key
                    .sign_prehash(&algorithm.digest(message))
                    .map_err(|e| PkiError::SigningError(e.to_string()))?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            KeyPair::EcdsaP384 { signing_key, .. } => {
                let signature: p384::ecdsa::Signature = signing_key
                    .sign_prehash(&algorithm.digest(message))
                    .map_err(|e| PkiError::SigningError(e.to_string()))?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            KeyPair::EcdsaP521 { secret_key, .. } => {
                let signing_key = p521::ecdsa::SigningKey::from_bytes(&secret_key.to_bytes())
                    .map_err(|e| PkiError::KeyError(e.to_string()))?;
                let signature: p521::ecdsa::Signature = signing_key
                    .sign_prehash(&algorithm.digest(message))
                    .map_err(|e| PkiError::SigningError(e.to_string()))?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
        }
    }
}

fn rsa_sign<D>(private: &RsaPrivateKey, message: &[u8]) -> Result<Vec<u8>>
where
    D: Digest + AssociatedOid,
{
    let signing_key = rsa::pkcs1v15::SigningKey::<D>::new(private.clone());
    let signature = signing_key
        .try_sign(message)
        .map_err(|e| PkiError::SigningError(e.to_string()))?;
    Ok(signature.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::signature::Verifier;
    use pkcs8::EncodePrivateKey;

    #[test]
    fn test_default_signature_algorithms() {
        assert_eq!(
            KeyPair::generate_ecdsa_p256().default_signature_algorithm(),
            SignatureAlgorithm::Sha256WithECDSA
        );
        assert_eq!(
            KeyPair::generate_ecdsa_p384().default_signature_algorithm(),
            SignatureAlgorithm::Sha384WithECDSA
        );
        assert_eq!(
            KeyPair::generate_ecdsa_p521().default_signature_algorithm(),
            SignatureAlgorithm::Sha512WithECDSA
        );
    }

    #[test]
    fn test_p256_signature_verifies() {
        let key = KeyPair::generate_ecdsa_p256();
        let message = b"to be signed";
        let der = key
            .sign(SignatureAlgorithm::Sha256WithECDSA, message)
            .unwrap();
        let signature = p256::ecdsa::Signature::from_der(&der).unwrap();
        let KeyPair::EcdsaP256 { verifying_key, .. } = &key else {
            unreachable!()
        };
        verifying_key.verify(message, &signature).unwrap();
    }

    #[test]
    fn test_p521_signs_with_sha512_only() {
        let key = KeyPair::generate_ecdsa_p521();
        let der = key
            .sign(SignatureAlgorithm::Sha512WithECDSA, b"to be signed")
            .unwrap();
        assert!(p521::ecdsa::Signature::from_der(&der).is_ok());

        // a SHA-256 prehash is shorter than half the P-521 field
        let err = key
            .sign(SignatureAlgorithm::Sha256WithECDSA, b"to be signed")
            .unwrap_err();
        assert!(matches!(err, PkiError::SigningError(_)));
    }

    #[test]
    fn test_p521_pkcs8_import() {
        let KeyPair::EcdsaP521 { secret_key, public_key } = KeyPair::generate_ecdsa_p521() else {
            unreachable!()
        };
        let der = secret_key.to_pkcs8_der().unwrap();
        let imported = KeyPair::from_pkcs8_der(der.as_bytes()).unwrap();
        assert_eq!(
            PublicKey::from_key_pair(&imported),
            PublicKey::EcdsaP521(public_key)
        );
        assert!(PublicKey::EcdsaP521(public_key).to_spki().is_ok());
    }

    #[test]
    fn test_rejects_mismatched_algorithm() {
        let key = KeyPair::generate_ecdsa_p256();
        let err = key
            .sign(SignatureAlgorithm::Sha256WithRSA, b"data")
            .unwrap_err();
        assert!(matches!(err, PkiError::SigningError(_)));
    }

    #[test]
    fn test_generate_for_rejects_unsupported() {
        let desc = CertificateDescription::builder()
            .common_name("a.com".to_string())
            .key_algorithm(KeyAlgorithm::Ecdsa)
            .key_size(999)
            .build();
        assert!(matches!(
            KeyPair::generate_for(&desc),
            Err(PkiError::UnsupportedKeySize { .. })
        ));
    }

    #[test]
    fn test_generate_for_ecdsa_curves() {
        for (size, expected) in [
            (256, SignatureAlgorithm::Sha256WithECDSA),
            (384, SignatureAlgorithm::Sha384WithECDSA),
            (521, SignatureAlgorithm::Sha512WithECDSA),
        ] {
            let desc = CertificateDescription::builder()
                .key_algorithm(KeyAlgorithm::Ecdsa)
                .key_size(size)
                .build();
            let key = KeyPair::generate_for(&desc).unwrap();
            assert_eq!(key.default_signature_algorithm(), expected);
        }
    }

    #[test]
    fn test_pkcs8_import() {
        let KeyPair::EcdsaP384 { signing_key, .. } = KeyPair::generate_ecdsa_p384() else {
            unreachable!()
        };
        let der = signing_key.to_pkcs8_der().unwrap();
        let imported = KeyPair::from_pkcs8_der(der.as_bytes()).unwrap();
        assert!(matches!(imported, KeyPair::EcdsaP384 { .. }));

        let pem = pem::encode(&pem::Pem::new("PRIVATE KEY", der.as_bytes()));
        let imported = KeyPair::from_pkcs8_pem(&pem).unwrap();
        assert_eq!(
            PublicKey::from_key_pair(&imported),
            PublicKey::EcdsaP384(*signing_key.verifying_key())
        );
    }

    #[test]
    fn test_pkcs8_pem_wrong_tag() {
        let pem = pem::encode(&pem::Pem::new("CERTIFICATE", vec![0u8; 4]));
        assert!(matches!(
            KeyPair::from_pkcs8_pem(&pem),
            Err(PkiError::InvalidInput(_))
        ));
    }
}
