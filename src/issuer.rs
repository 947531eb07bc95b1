use der::Encode;
use x509_cert::certificate::CertificateInner;

use crate::cert::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, SubjectAltName, SubjectKeyIdentifier,
    key_identifier,
};
use crate::cert::params::{DistinguishedName, ExtensionParam};
use crate::cert::{Certificate, encode_certificate_pem};
use crate::error::{PkiError, Result};
use crate::key::{PublicKey, Signer};
use crate::tbs_certificate::TbsCertificate;
use crate::template::CertificateTemplate;

/// Who signs a certificate template.
#[derive(Debug, Clone, Copy)]
pub enum Issuer<'a> {
    /// The template is signed with its own key; the issuer name is its subject.
    SelfSigned,
    /// The template is signed by the holder of this certificate's key.
    Certificate(&'a Certificate),
}

impl Issuer<'_> {
    pub fn is_self_signed(&self) -> bool {
        matches!(self, Issuer::SelfSigned)
    }
}

/// A signed certificate and its PEM encoding.
///
/// `pem` holds the leaf block, followed by the issuer's block unless the
/// certificate is self-signed.
#[derive(Debug, Clone)]
pub struct SignedCertificate {
    pub pem: String,
    pub certificate: Certificate,
}

/// Signs `template` for the subject key `public_key` with `signer`.
///
/// The signature algorithm is the template's if set, else the signer's
/// default. The subject key must use the template's public key algorithm.
pub fn sign_certificate<S>(
    template: &CertificateTemplate,
    issuer: Issuer<'_>,
    public_key: &PublicKey,
    signer: &S,
) -> Result<SignedCertificate>
where
    S: Signer + ?Sized,
{
    if public_key.algorithm() != template.public_key_algorithm {
        return Err(PkiError::SigningError(format!(
            "template requires an {} public key, got {}",
            template.public_key_algorithm,
            public_key.algorithm()
        )));
    }

    let signature_algorithm = template
        .signature_algorithm
        .unwrap_or_else(|| signer.default_signature_algorithm());
    let signer_algorithm = signer.public_key().algorithm();
    if signature_algorithm.public_key_algorithm() != signer_algorithm {
        return Err(PkiError::SigningError(format!(
            "{signature_algorithm} signatures cannot be produced by an {signer_algorithm} key"
        )));
    }

    let subject_public_key_info = public_key.to_spki()?;
    let subject = DistinguishedName::from(&template.subject).as_x509_name()?;
    let (issuer_name, authority_key_id) = match issuer {
        Issuer::SelfSigned => (
            subject.clone(),
            key_identifier(&signer.public_key().to_spki()?),
        ),
        Issuer::Certificate(cert) => {
            check_issuer_key(cert, &signer.public_key())?;
            (
                cert.inner.tbs_certificate.subject.clone(),
                issuer_key_identifier(cert)?,
            )
        }
    };

    let tbs_cert = TbsCertificate {
        serial_number: template.serial_number,
        signature_algorithm,
        issuer: issuer_name,
        validity: template.validity,
        subject,
        extensions: certificate_extensions(template, &subject_public_key_info, authority_key_id)?,
        subject_public_key_info,
    };
    let tbs_cert_inner = tbs_cert.to_tbs_certificate_inner()?;
    let tbs_der = tbs_cert_inner
        .to_der()
        .map_err(|e| PkiError::EncodingError(format!("tbs certificate: {e}")))?;

    let signature = signer.sign(signature_algorithm, &tbs_der)?;

    let cert_inner = CertificateInner {
        tbs_certificate: tbs_cert_inner,
        signature_algorithm: signature_algorithm.into(),
        signature: der::asn1::BitString::from_bytes(&signature)
            .map_err(|e| PkiError::SigningError(e.to_string()))?,
    };
    let der_bytes = cert_inner
        .to_der()
        .map_err(|e| PkiError::EncodingError(format!("certificate: {e}")))?;

    let certificate = Certificate::from_der(&der_bytes).map_err(|e| {
        PkiError::EncodingError(format!("error decoding DER certificate bytes: {e}"))
    })?;

    let mut pem = encode_certificate_pem(&certificate)
        .map_err(|e| PkiError::EncodingError(format!("certificate PEM: {e}")))?;
    // don't bundle the CA for self-signed certificates
    if let Issuer::Certificate(issuer_cert) = issuer {
        let issuer_pem = encode_certificate_pem(issuer_cert)
            .map_err(|e| PkiError::EncodingError(format!("issuer certificate PEM: {e}")))?;
        pem.push_str(&issuer_pem);
    }

    tracing::debug!(
        common_name = %template.subject.common_name,
        serial_number = %format_args!("{:x}", template.serial_number),
        signature_algorithm = %signature_algorithm,
        self_signed = issuer.is_self_signed(),
        pem_blocks = if issuer.is_self_signed() { 1 } else { 2 },
        "signed certificate"
    );
    Ok(SignedCertificate { pem, certificate })
}

/// The signer must hold the key of the certificate it signs as.
fn check_issuer_key(cert: &Certificate, signer_key: &PublicKey) -> Result<()> {
    let issuer_spki = &cert.inner.tbs_certificate.subject_public_key_info;
    let signer_spki = signer_key.to_spki()?;
    if issuer_spki.algorithm.oid != signer_spki.algorithm.oid
        || issuer_spki.subject_public_key.raw_bytes() != signer_spki.subject_public_key.raw_bytes()
    {
        return Err(PkiError::SigningError(format!(
            "signer key does not match the public key of issuer {}",
            cert.inner.tbs_certificate.subject
        )));
    }
    Ok(())
}

fn issuer_key_identifier(cert: &Certificate) -> Result<Vec<u8>> {
    match cert.extension::<SubjectKeyIdentifier>()? {
        Some(ski) => Ok(ski.0),
        None => Ok(key_identifier(
            &cert.inner.tbs_certificate.subject_public_key_info,
        )),
    }
}

fn certificate_extensions(
    template: &CertificateTemplate,
    subject_public_key_info: &x509_cert::spki::SubjectPublicKeyInfoOwned,
    authority_key_id: Vec<u8>,
) -> Result<Vec<ExtensionParam>> {
    let basic_constraints = BasicConstraints {
        is_ca: template.is_ca,
        max_path_length: None,
    };

    let mut extensions = vec![
        ExtensionParam::from_extension(template.key_usage, true)?,
        ExtensionParam::from_extension(basic_constraints, true)?,
        ExtensionParam::from_extension(
            SubjectKeyIdentifier(key_identifier(subject_public_key_info)),
            false,
        )?,
        ExtensionParam::from_extension(
            AuthorityKeyIdentifier {
                key_identifier: authority_key_id,
            },
            false,
        )?,
    ];

    if !template.subject.dns_names.is_empty() {
        let san = SubjectAltName {
            names: template.subject.dns_names.clone(),
        };
        extensions.push(ExtensionParam::from_extension(san, false)?);
    }

    Ok(extensions)
}

