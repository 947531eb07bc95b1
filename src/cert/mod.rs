pub mod extensions;
pub mod params;

use der::Decode;
use extensions::{BasicConstraints, KeyUsage, SubjectAltName, ToAndFromX509Extension};
use params::{DistinguishedName, ExtensionParam, Validity};
use x509_cert::certificate::CertificateInner;

use crate::algorithm::{PublicKeyAlgorithm, SignatureAlgorithm};
use crate::error::{PkiError, Result};
use crate::names::ResolvedSubject;
use crate::tbs_certificate::{decode_serial_number, from_x509_time};

/// PEM label for certificates.
pub const CERTIFICATE_PEM_TAG: &str = "CERTIFICATE";

/// Represents a parsed X.509 certificate together with the DER it was parsed from.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
    raw: Vec<u8>,
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Certificate {}

impl Certificate {
    /// Parses a DER-encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let inner = CertificateInner::from_der(der)?;
        Ok(Self {
            inner,
            raw: der.to_vec(),
        })
    }

    /// Parses the first `CERTIFICATE` block of a PEM document.
    pub fn from_pem(pem_str: &str) -> Result<Self> {
        parse_pem_bundle(pem_str)?
            .into_iter()
            .next()
            .ok_or_else(|| PkiError::DecodingError("no CERTIFICATE block found".to_string()))
    }

    /// The DER bytes the certificate was parsed from.
    pub fn as_der(&self) -> &[u8] {
        &self.raw
    }

    /// Encodes the DER the certificate was parsed from into PEM format.
    ///
    /// The bytes are not re-encoded, so a certificate with a valid but
    /// non-canonical encoding keeps a verifiable signature.
    pub fn to_pem(&self) -> Result<String> {
        Ok(encode_pem_block(CERTIFICATE_PEM_TAG, &self.raw))
    }

    pub fn serial_number(&self) -> Result<u128> {
        decode_serial_number(&self.inner.tbs_certificate.serial_number)
    }

    pub fn validity(&self) -> Validity {
        let validity = &self.inner.tbs_certificate.validity;
        Validity {
            not_before: from_x509_time(&validity.not_before),
            not_after: from_x509_time(&validity.not_after),
        }
    }

    pub fn subject_name(&self) -> DistinguishedName {
        DistinguishedName::from_x509_name(&self.inner.tbs_certificate.subject)
    }

    pub fn issuer_name(&self) -> DistinguishedName {
        DistinguishedName::from_x509_name(&self.inner.tbs_certificate.issuer)
    }

    /// Subject common name, organization and DNS names.
    pub fn subject(&self) -> Result<ResolvedSubject> {
        let dn = self.subject_name();
        let dns_names = self
            .extension::<SubjectAltName>()?
            .map(|san| san.names)
            .unwrap_or_default();
        Ok(ResolvedSubject {
            common_name: dn.common_name,
            dns_names,
            organization: dn.organization,
        })
    }

    pub fn is_ca(&self) -> Result<bool> {
        Ok(self
            .extension::<BasicConstraints>()?
            .is_some_and(|bc| bc.is_ca))
    }

    pub fn key_usage(&self) -> Result<Option<KeyUsage>> {
        self.extension::<KeyUsage>()
    }

    pub fn signature_algorithm(&self) -> Option<SignatureAlgorithm> {
        SignatureAlgorithm::from_oid(&self.inner.signature_algorithm.oid)
    }

    pub fn public_key_algorithm(&self) -> Option<PublicKeyAlgorithm> {
        PublicKeyAlgorithm::from_oid(
            &self
                .inner
                .tbs_certificate
                .subject_public_key_info
                .algorithm
                .oid,
        )
    }

    /// Decodes the first extension of type `E`, if present.
    pub fn extension<E: ToAndFromX509Extension>(&self) -> Result<Option<E>> {
        self.inner
            .tbs_certificate
            .extensions
            .iter()
            .flatten()
            .find(|ext| ext.extn_id == E::OID)
            .map(|ext| ExtensionParam::from_x509(ext).to_extension::<E>())
            .transpose()
    }
}

/// Encodes a single certificate's DER as a `CERTIFICATE` PEM block.
pub fn encode_certificate_pem(certificate: &Certificate) -> Result<String> {
    certificate.to_pem()
}

/// Wraps DER bytes in a PEM block with LF line endings.
pub(crate) fn encode_pem_block(tag: &str, der: &[u8]) -> String {
    let block = pem::Pem::new(tag, der.to_vec());
    pem::encode_config(
        &block,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}

/// Parses every `CERTIFICATE` block of a PEM document, in order.
pub fn parse_pem_bundle(pem_str: &str) -> Result<Vec<Certificate>> {
    pem::parse_many(pem_str)
        .map_err(|e| PkiError::DecodingError(e.to_string()))?
        .iter()
        .filter(|block| block.tag() == CERTIFICATE_PEM_TAG)
        .map(|block| Certificate::from_der(block.contents()))
        .collect()
}
