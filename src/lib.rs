//! # CertPlan - Certificate Request and Issuance Planning
//!
//! CertPlan turns a declarative certificate description into the X.509
//! artifacts needed to obtain or issue it, built entirely with rustcrypto
//! libraries. Starting from a requested common name, DNS names,
//! organizations, key algorithm and key size, it resolves the subject,
//! selects a signature algorithm, and produces:
//!
//! - a PKCS#10 certificate signing request template and its DER encoding
//! - a certificate template with a random serial and validity window
//! - a signed certificate, PEM encoded and bundled with its issuer
//!
//! ## Supported Key Types
//!
//! - **RSA**: 2048 bits and up, signed with SHA-256, SHA-384 or SHA-512
//!   depending on size
//! - **ECDSA**: P-256, P-384 and P-521
//!
//! ## Quick Start
//!
//! ### Requesting a Certificate
//!
//! ```rust,no_run
//! use certplan::{
//!     config::IssuanceConfig,
//!     csr::{csr_to_pem, encode_csr},
//!     description::{CertificateDescription, KeyAlgorithm},
//!     key::KeyPair,
//!     template::build_csr_template,
//! };
//!
//! # fn main() -> Result<(), certplan::error::PkiError> {
//! let desc = CertificateDescription::builder()
//!     .common_name("my-app".to_string())
//!     .dns_names(vec!["my-app.example.com".to_string()])
//!     .key_algorithm(KeyAlgorithm::Ecdsa)
//!     .key_size(256)
//!     .build();
//!
//! let template = build_csr_template(&desc, &IssuanceConfig::default())?;
//! let key = KeyPair::generate_for(&desc)?;
//! let csr = encode_csr(&template, &key)?;
//! println!("{}", csr_to_pem(&csr)?);
//! # Ok(())
//! # }
//! ```
//!
//! ### Issuing from a CA
//!
//! ```rust,no_run
//! use certplan::{
//!     config::IssuanceConfig,
//!     description::{CertificateDescription, CertificateStatus},
//!     issuer::{Issuer, sign_certificate},
//!     key::{KeyPair, PublicKey},
//!     template::build_certificate_template,
//! };
//!
//! # fn main() -> Result<(), certplan::error::PkiError> {
//! let config = IssuanceConfig::default();
//!
//! // Self-signed CA
//! let ca_desc = CertificateDescription::builder()
//!     .common_name("Example Root CA".to_string())
//!     .is_ca(true)
//!     .build();
//! let ca_key = KeyPair::generate_for(&ca_desc)?;
//! let (ca_template, _) = build_certificate_template(&ca_desc, &config)?;
//! let ca = sign_certificate(
//!     &ca_template,
//!     Issuer::SelfSigned,
//!     &PublicKey::from_key_pair(&ca_key),
//!     &ca_key,
//! )?;
//!
//! // Leaf signed by the CA
//! let desc = CertificateDescription::builder()
//!     .dns_names(vec!["www.example.com".to_string()])
//!     .build();
//! let key = KeyPair::generate_for(&desc)?;
//! let (template, not_after) = build_certificate_template(&desc, &config)?;
//! let signed = sign_certificate(
//!     &template,
//!     Issuer::Certificate(&ca.certificate),
//!     &PublicKey::from_key_pair(&key),
//!     &ca_key,
//! )?;
//!
//! let mut status = CertificateStatus::default();
//! status.record_not_after(not_after);
//!
//! // Leaf followed by the CA certificate
//! println!("{}", signed.pem);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`description`]: The requested certificate and its status
//! - [`names`]: Common name, DNS name and organization resolution
//! - [`algorithm`]: Key and signature algorithm selection
//! - [`template`]: CSR and certificate templates
//! - [`csr`]: PKCS#10 encoding
//! - [`issuer`]: Certificate signing and PEM bundling
//! - [`cert`]: Parsed certificates, extensions and names
//! - [`key`]: Key pairs, public keys and the signer seam
//! - [`tbs_certificate`]: The to-be-signed certificate body
//! - [`config`]: Issuance defaults
//! - [`error`]: Error types

pub mod algorithm;
pub mod cert;
pub mod config;
pub mod csr;
pub mod description;
pub mod error;
pub mod issuer;
pub mod key;
pub mod names;
pub mod tbs_certificate;
pub mod template;

pub use algorithm::{PublicKeyAlgorithm, SignatureAlgorithm, select_algorithm};
pub use cert::{Certificate, encode_certificate_pem, parse_pem_bundle};
pub use config::IssuanceConfig;
pub use csr::{csr_to_pem, encode_csr};
pub use description::{CertificateDescription, CertificateStatus, KeyAlgorithm};
pub use error::{PkiError, Result};
pub use issuer::{Issuer, SignedCertificate, sign_certificate};
pub use key::{KeyPair, PublicKey, Signer};
pub use names::{ResolvedSubject, resolve_common_name, resolve_dns_names, resolve_organization};
pub use template::{
    CertificateTemplate, CsrTemplate, build_certificate_template, build_csr_template,
};
