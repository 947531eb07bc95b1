use der::DateTime;
use der::asn1::{GeneralizedTime, Uint, UtcTime};
use time::OffsetDateTime;
use x509_cert::Version;
use x509_cert::certificate::TbsCertificateInner;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::algorithm::SignatureAlgorithm;
use crate::cert::params::{ExtensionParam, Validity};
use crate::error::{PkiError, Result};

/// Represents the "To Be Signed" (TBS) portion of an X.509 certificate.
/// This struct contains all the fields required to generate a valid X.509 certificate.
///
/// # Fields
/// * `serial_number` - The unique identifier for the certificate.
/// * `signature_algorithm` - The algorithm used to sign the certificate.
/// * `issuer` - The distinguished name of the certificate issuer.
/// * `validity` - The certificate's validity period.
/// * `subject` - The distinguished name of the certificate subject.
/// * `subject_public_key_info` - The public key of the certificate subject.
/// * `extensions` - X.509 extensions for the certificate.
pub struct TbsCertificate {
    pub serial_number: u128,
    pub signature_algorithm: SignatureAlgorithm,
    pub issuer: Name,
    pub validity: Validity,
    pub subject: Name,
    pub subject_public_key_info: SubjectPublicKeyInfoOwned,
    pub extensions: Vec<ExtensionParam>,
}

impl TbsCertificate {
    /// Converts the `TbsCertificate` into a `TbsCertificateInner` for DER encoding.
    pub fn to_tbs_certificate_inner(&self) -> Result<TbsCertificateInner> {
        let extensions = self
            .extensions
            .iter()
            .map(ExtensionParam::to_x509)
            .collect::<Result<Vec<_>>>()?;

        let validity = x509_cert::time::Validity {
            not_before: to_x509_time(self.validity.not_before)?,
            not_after: to_x509_time(self.validity.not_after)?,
        };

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number: encode_serial_number(self.serial_number)?,
            signature: self.signature_algorithm.into(),
            issuer: self.issuer.clone(),
            validity,
            subject: self.subject.clone(),
            subject_public_key_info: self.subject_public_key_info.clone(),
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: (!extensions.is_empty()).then_some(extensions),
        })
    }
}

/// Encodes a serial number as a minimal, positive DER INTEGER.
pub fn encode_serial_number(serial: u128) -> Result<SerialNumber> {
    SerialNumber::new(&serial.to_be_bytes())
        .map_err(|e| PkiError::EncodingError(format!("serial number {serial}: {e}")))
}

/// Decodes a serial number produced by [`encode_serial_number`].
///
/// Serials wider than 128 bits, which other issuers may use, are rejected.
pub fn decode_serial_number(serial: &SerialNumber) -> Result<u128> {
    let value = Uint::new(serial.as_bytes())?;
    let bytes = value.as_bytes();
    if bytes.len() > 16 {
        return Err(PkiError::DecodingError(format!(
            "serial number is {} bytes, wider than 128 bits",
            bytes.len()
        )));
    }
    let mut buf = [0u8; 16];
    buf[16 - bytes.len()..].copy_from_slice(bytes);
    Ok(u128::from_be_bytes(buf))
}

/// UTCTime through 2049, GeneralizedTime afterwards (RFC 5280 section 4.1.2.5).
pub fn to_x509_time(t: OffsetDateTime) -> Result<x509_cert::time::Time> {
    let dt = DateTime::from_system_time(t.into())
        .map_err(|e| PkiError::EncodingError(format!("time {t}: {e}")))?;
    if dt.year() < 2050 {
        let utc = UtcTime::from_date_time(dt)
            .map_err(|e| PkiError::EncodingError(format!("time {t}: {e}")))?;
        Ok(x509_cert::time::Time::UtcTime(utc))
    } else {
        Ok(x509_cert::time::Time::GeneralTime(
            GeneralizedTime::from_date_time(dt),
        ))
    }
}

pub fn from_x509_time(t: &x509_cert::time::Time) -> OffsetDateTime {
    OffsetDateTime::from(t.to_system_time())
}
