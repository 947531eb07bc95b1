//! Subject name resolution.
//!
//! Decides which requested names end up as the subject Common Name and which
//! as subjectAltName DNS entries, and which Organization is placed on the
//! subject.

use crate::config::IssuanceConfig;
use crate::description::CertificateDescription;
use crate::error::{PkiError, Result};

/// Subject values derived from a [`CertificateDescription`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSubject {
    pub common_name: String,
    pub dns_names: Vec<String>,
    pub organization: Vec<String>,
}

impl ResolvedSubject {
    /// Resolves every subject field of `desc`.
    ///
    /// Fails with [`PkiError::NoDomainsSpecified`] when both the common name
    /// and the DNS names come out empty.
    pub fn resolve(desc: &CertificateDescription, config: &IssuanceConfig) -> Result<Self> {
        let common_name = resolve_common_name(desc);
        let dns_names = resolve_dns_names(desc);

        if common_name.is_empty() && dns_names.is_empty() {
            return Err(PkiError::NoDomainsSpecified);
        }

        let subject = Self {
            common_name,
            dns_names,
            organization: resolve_organization(desc, config),
        };
        tracing::trace!(
            common_name = %subject.common_name,
            dns_names = ?subject.dns_names,
            organization = ?subject.organization,
            "resolved certificate subject"
        );
        Ok(subject)
    }
}

/// Returns the common name to use: the explicit one, else the first DNS name.
pub fn resolve_common_name(desc: &CertificateDescription) -> String {
    if !desc.common_name.is_empty() {
        return desc.common_name.clone();
    }
    desc.dns_names.first().cloned().unwrap_or_default()
}

/// Returns the DNS names to place in the subjectAltName extension.
///
/// The common name is prepended and duplicates removed only when both a
/// common name and DNS names are present; DNS names given without a common
/// name pass through untouched.
pub fn resolve_dns_names(desc: &CertificateDescription) -> Vec<String> {
    if desc.dns_names.is_empty() {
        if desc.common_name.is_empty() {
            return Vec::new();
        }
        return vec![desc.common_name.clone()];
    }
    if !desc.common_name.is_empty() {
        return remove_duplicates(
            std::iter::once(&desc.common_name).chain(desc.dns_names.iter()),
        );
    }
    desc.dns_names.clone()
}

/// Returns the requested organizations, or the configured default.
pub fn resolve_organization(desc: &CertificateDescription, config: &IssuanceConfig) -> Vec<String> {
    if desc.organization.is_empty() {
        return vec![config.default_organization.clone()];
    }
    desc.organization.clone()
}

// first occurrence wins; inputs are a handful of names
fn remove_duplicates<'a>(names: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for name in names {
        if !found.contains(name) {
            found.push(name.clone());
        }
    }
    found
}
