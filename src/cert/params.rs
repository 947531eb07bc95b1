use bon::Builder;
use const_oid::ObjectIdentifier;
use der::asn1::{SetOfVec, Utf8StringRef};
use der::{Tag, Tagged};
use time::Duration;
use time::OffsetDateTime;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{Name, RdnSequence, RelativeDistinguishedName};

use super::extensions::ToAndFromX509Extension;
use crate::error::{PkiError, Result};
use crate::names::ResolvedSubject;

/// Common Name attribute type.
pub const CN_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
/// Organization attribute type.
pub const O_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");

/// Distinguished name of a certificate subject or issuer.
///
/// Only the attributes this crate issues are modelled. All organizations
/// share one multi-valued `O` RDN, followed by a single `CN` RDN when the
/// common name is non-empty. A SET OF is sorted by its DER encoding, so
/// organizations read back from a name come in that order, not the
/// requested one.
///
/// # Fields
/// * `common_name` - The common name (CN).
/// * `organization` - The organizations (O).
#[derive(Clone, Debug, Builder, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    #[builder(default)]
    pub common_name: String,
    #[builder(default)]
    pub organization: Vec<String>,
}

impl DistinguishedName {
    /// Converts the distinguished name to an X.509-compatible format.
    pub fn as_x509_name(&self) -> Result<Name> {
        let mut rdns = Vec::with_capacity(2);
        if !self.organization.is_empty() {
            rdns.push(attribute_rdn(O_OID, &self.organization)?);
        }
        if !self.common_name.is_empty() {
            rdns.push(attribute_rdn(CN_OID, std::slice::from_ref(&self.common_name))?);
        }
        Ok(RdnSequence(rdns))
    }

    /// Creates a `DistinguishedName` from an X.509 name.
    ///
    /// Attributes other than CN and O, and values that are not text strings,
    /// are ignored.
    pub fn from_x509_name(x509dn: &Name) -> Self {
        let mut dn = DistinguishedName::default();
        for rdn in x509dn.0.iter() {
            for attr in rdn.0.iter() {
                let Some(value) = attribute_text(&attr.value) else {
                    continue;
                };
                match attr.oid {
                    CN_OID => dn.common_name = value,
                    O_OID => dn.organization.push(value),
                    _ => {}
                }
            }
        }
        dn
    }
}

impl From<&ResolvedSubject> for DistinguishedName {
    fn from(subject: &ResolvedSubject) -> Self {
        Self {
            common_name: subject.common_name.clone(),
            organization: subject.organization.clone(),
        }
    }
}

fn attribute_rdn(oid: ObjectIdentifier, values: &[String]) -> Result<RelativeDistinguishedName> {
    let mut set = SetOfVec::new();
    for value in values {
        let value = Utf8StringRef::new(value)
            .map_err(|e| PkiError::InvalidInput(format!("subject attribute {oid}: {e}")))?;
        let attr = AttributeTypeAndValue {
            oid,
            value: der::Any::from(value),
        };
        // a SET OF holds each value once
        if set.iter().any(|existing| *existing == attr) {
            continue;
        }
        set.insert(attr)
            .map_err(|e| PkiError::EncodingError(format!("subject attribute {oid}: {e}")))?;
    }
    Ok(RelativeDistinguishedName(set))
}

fn attribute_text(value: &der::Any) -> Option<String> {
    match value.tag() {
        Tag::Utf8String | Tag::PrintableString | Tag::Ia5String => {
            String::from_utf8(value.value().to_vec()).ok()
        }
        _ => None,
    }
}

/// Last year a GeneralizedTime can hold.
pub const MAX_X509_YEAR: i32 = 9999;

/// Certificate validity period.
///
/// This struct represents the `notBefore` and `notAfter` fields in a certificate.
///
/// # Fields
/// * `not_before` - The start of the validity period.
/// * `not_after` - The end of the validity period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity period starting at `now` for `duration`.
    ///
    /// Both ends are truncated to whole seconds, the precision X.509 times
    /// are encoded with, so a parsed certificate reports exactly these values.
    /// An end past the year 9999 cannot be encoded and is rejected.
    pub fn starting_at(now: OffsetDateTime, duration: Duration) -> Result<Self> {
        let not_before = truncate_to_seconds(now);
        let not_after = not_before
            .checked_add(duration)
            .filter(|t| t.year() <= MAX_X509_YEAR)
            .ok_or_else(|| {
                PkiError::InvalidInput(format!(
                    "validity of {duration} from {not_before} ends after the year {MAX_X509_YEAR}"
                ))
            })?;
        Ok(Self {
            not_before,
            not_after,
        })
    }
}

fn truncate_to_seconds(t: OffsetDateTime) -> OffsetDateTime {
    t - Duration::nanoseconds(i64::from(t.nanosecond()))
}

/// Represents an X.509 extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Creates an `ExtensionParam` from a specific extension.
    pub fn from_extension<E: ToAndFromX509Extension>(extension: E, critical: bool) -> Result<Self> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E> {
        E::from_x509_extension_value(&self.value)
    }

    pub fn from_x509(ext: &x509_cert::ext::Extension) -> Self {
        Self {
            oid: ext.extn_id,
            critical: ext.critical,
            value: ext.extn_value.as_bytes().to_vec(),
        }
    }

    pub fn to_x509(&self) -> Result<x509_cert::ext::Extension> {
        Ok(x509_cert::ext::Extension {
            extn_id: self.oid,
            critical: self.critical,
            extn_value: der::asn1::OctetString::new(self.value.clone())
                .map_err(|e| PkiError::EncodingError(format!("extension {}: {e}", self.oid)))?,
        })
    }
}
