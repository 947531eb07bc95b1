//! PKCS#10 certificate signing requests.

use der::asn1::{BitString, SetOfVec};
use der::{Decode, Encode};
use x509_cert::attr::Attribute;
use x509_cert::request::{CertReq, CertReqInfo, ExtensionReq, Version};

use crate::cert::encode_pem_block;
use crate::cert::extensions::SubjectAltName;
use crate::cert::params::{DistinguishedName, ExtensionParam};
use crate::error::{PkiError, Result};
use crate::key::Signer;
use crate::template::CsrTemplate;

/// PEM label for certificate signing requests.
pub const CSR_PEM_TAG: &str = "CERTIFICATE REQUEST";

/// Signs `template` with `signer` and returns the DER-encoded request.
///
/// The request carries the signer's public key. DNS names travel in a
/// subject alternative name extension inside the `extensionRequest`
/// attribute.
pub fn encode_csr<S>(template: &CsrTemplate, signer: &S) -> Result<Vec<u8>>
where
    S: Signer + ?Sized,
{
    let public_key = signer.public_key();
    if public_key.algorithm() != template.public_key_algorithm {
        return Err(PkiError::SigningError(format!(
            "csr requires an {} key, got {}",
            template.public_key_algorithm,
            public_key.algorithm()
        )));
    }

    let info = CertReqInfo {
        version: Version::V1,
        subject: DistinguishedName::from(&template.subject).as_x509_name()?,
        public_key: public_key.to_spki()?,
        attributes: request_attributes(template)?,
    };
    let info_der = info
        .to_der()
        .map_err(|e| PkiError::EncodingError(format!("certificate request info: {e}")))?;

    let signature = signer.sign(template.signature_algorithm, &info_der)?;

    let request = CertReq {
        info,
        algorithm: template.signature_algorithm.into(),
        signature: BitString::from_bytes(&signature)
            .map_err(|e| PkiError::SigningError(e.to_string()))?,
    };

    tracing::debug!(
        common_name = %template.subject.common_name,
        signature_algorithm = %template.signature_algorithm,
        "encoded certificate request"
    );
    request
        .to_der()
        .map_err(|e| PkiError::EncodingError(format!("certificate request: {e}")))
}

fn request_attributes(template: &CsrTemplate) -> Result<SetOfVec<Attribute>> {
    let mut attributes = SetOfVec::new();
    if template.subject.dns_names.is_empty() {
        return Ok(attributes);
    }

    let san = ExtensionParam::from_extension(
        SubjectAltName {
            names: template.subject.dns_names.clone(),
        },
        false,
    )?;
    let attribute = Attribute::try_from(ExtensionReq(vec![san.to_x509()?]))
        .map_err(|e| PkiError::EncodingError(format!("extension request: {e}")))?;
    attributes
        .insert(attribute)
        .map_err(|e| PkiError::EncodingError(format!("extension request: {e}")))?;
    Ok(attributes)
}

/// Wraps a DER-encoded request in a `CERTIFICATE REQUEST` PEM block.
///
/// The request must parse; its bytes are emitted unchanged.
pub fn csr_to_pem(der: &[u8]) -> Result<String> {
    CertReq::from_der(der)?;
    Ok(encode_pem_block(CSR_PEM_TAG, der))
}
