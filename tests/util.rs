#![allow(dead_code)]

use certplan::config::IssuanceConfig;
use certplan::description::{CertificateDescription, KeyAlgorithm};
use certplan::issuer::{Issuer, SignedCertificate, sign_certificate};
use certplan::key::{KeyPair, PublicKey};
use certplan::template::build_certificate_template;

pub struct CertificateAuthority {
    pub signed: SignedCertificate,
    pub key: KeyPair,
}

pub fn ca_description() -> CertificateDescription {
    CertificateDescription::builder()
        .common_name("myca.local".to_string())
        .organization(vec!["My CA".to_string()])
        .key_algorithm(KeyAlgorithm::Ecdsa)
        .key_size(256)
        .is_ca(true)
        .build()
}

pub fn server_description() -> CertificateDescription {
    CertificateDescription::builder()
        .dns_names(vec![
            "server.myca.local".to_string(),
            "www.myca.local".to_string(),
        ])
        .key_algorithm(KeyAlgorithm::Ecdsa)
        .key_size(256)
        .build()
}

/// Self-signed P-256 CA issued through the regular template pipeline.
pub fn generate_ca_cert() -> CertificateAuthority {
    let desc = ca_description();
    let key = KeyPair::generate_for(&desc).unwrap();
    let (template, _) = build_certificate_template(&desc, &IssuanceConfig::default()).unwrap();
    let signed = sign_certificate(
        &template,
        Issuer::SelfSigned,
        &PublicKey::from_key_pair(&key),
        &key,
    )
    .unwrap();
    CertificateAuthority { signed, key }
}

/// Issues a leaf for `desc` from `ca`, returning it with the leaf key.
pub fn issue(ca: &CertificateAuthority, desc: &CertificateDescription) -> (SignedCertificate, KeyPair) {
    let key = KeyPair::generate_for(desc).unwrap();
    let (template, _) = build_certificate_template(desc, &IssuanceConfig::default()).unwrap();
    let signed = sign_certificate(
        &template,
        Issuer::Certificate(&ca.signed.certificate),
        &PublicKey::from_key_pair(&key),
        &ca.key,
    )
    .unwrap();
    (signed, key)
}
