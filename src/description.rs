use std::fmt;

use bon::Builder;
use time::OffsetDateTime;

/// Key algorithm requested by a certificate description.
///
/// Resource objects carry the algorithm as a free-form string, so anything
/// that is not recognised is kept in [`KeyAlgorithm::Other`] and rejected by
/// the algorithm selector with the offending name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// No algorithm requested; RSA is used.
    #[default]
    Unspecified,
    Rsa,
    Ecdsa,
    Other(String),
}

impl KeyAlgorithm {
    /// Parses the algorithm name used on certificate resources.
    ///
    /// `""` maps to [`KeyAlgorithm::Unspecified`]; matching is exact, as on
    /// the resource.
    pub fn from_name(name: &str) -> Self {
        match name {
            "" => KeyAlgorithm::Unspecified,
            "rsa" => KeyAlgorithm::Rsa,
            "ecdsa" => KeyAlgorithm::Ecdsa,
            other => KeyAlgorithm::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            KeyAlgorithm::Unspecified => "",
            KeyAlgorithm::Rsa => "rsa",
            KeyAlgorithm::Ecdsa => "ecdsa",
            KeyAlgorithm::Other(name) => name,
        }
    }
}

impl From<&str> for KeyAlgorithm {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative description of the certificate a caller wants issued.
///
/// # Fields
/// * `common_name` - Requested subject common name, may be empty.
/// * `dns_names` - Requested subject alternative DNS names.
/// * `organization` - Requested subject organizations.
/// * `key_algorithm` - Requested key algorithm.
/// * `key_size` - Requested key size in bits (RSA) or curve size (ECDSA).
/// * `is_ca` - Whether the certificate may sign other certificates.
#[derive(Clone, Debug, Default, Builder, PartialEq, Eq)]
pub struct CertificateDescription {
    #[builder(default)]
    pub common_name: String,
    #[builder(default)]
    pub dns_names: Vec<String>,
    #[builder(default)]
    pub organization: Vec<String>,
    #[builder(default)]
    pub key_algorithm: KeyAlgorithm,
    #[builder(default)]
    pub key_size: u32,
    #[builder(default)]
    pub is_ca: bool,
}

/// Caller-owned status that accompanies a [`CertificateDescription`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CertificateStatus {
    /// Expiry of the most recently built certificate template.
    pub not_after: Option<OffsetDateTime>,
}

impl CertificateStatus {
    /// Records the expiry returned by the template builder.
    pub fn record_not_after(&mut self, not_after: OffsetDateTime) {
        self.not_after = Some(not_after);
    }
}
