//! Unsigned CSR and certificate templates built from a description.

use rand::TryCryptoRng;
use rand::rngs::OsRng;
use time::OffsetDateTime;

use crate::algorithm::{PublicKeyAlgorithm, SignatureAlgorithm, select_algorithm};
use crate::cert::extensions::KeyUsage;
use crate::cert::params::Validity;
use crate::config::IssuanceConfig;
use crate::description::CertificateDescription;
use crate::error::{PkiError, Result};
use crate::names::ResolvedSubject;

/// Unsigned certificate signing request.
///
/// Pass it to [`crate::csr::encode_csr`] together with the requesting key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsrTemplate {
    pub subject: ResolvedSubject,
    pub public_key_algorithm: PublicKeyAlgorithm,
    pub signature_algorithm: SignatureAlgorithm,
}

/// Unsigned certificate, equivalent to the request produced by
/// [`build_csr_template`] for the same description.
///
/// # Fields
/// * `subject` - Resolved subject names and organization.
/// * `serial_number` - Fresh random serial.
/// * `validity` - `not_before` is the build time, `not_after` adds the configured validity.
/// * `key_usage` - Digital signature and key encipherment, plus cert signing for CAs.
/// * `is_ca` - Carried into the basic constraints extension.
/// * `public_key_algorithm` - Algorithm the subject key must use.
/// * `signature_algorithm` - `None` lets the signer pick its own algorithm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertificateTemplate {
    pub subject: ResolvedSubject,
    pub serial_number: u128,
    pub validity: Validity,
    pub key_usage: KeyUsage,
    pub is_ca: bool,
    pub public_key_algorithm: PublicKeyAlgorithm,
    pub signature_algorithm: Option<SignatureAlgorithm>,
}

/// Builds the CSR template for `desc`.
///
/// Fails with [`PkiError::NoDomainsSpecified`] when no names were requested,
/// or with the algorithm selector's error for an unsupported key.
pub fn build_csr_template(desc: &CertificateDescription, config: &IssuanceConfig) -> Result<CsrTemplate> {
    let subject = ResolvedSubject::resolve(desc, config)?;
    let algorithms = select_algorithm(&desc.key_algorithm, desc.key_size)?;

    tracing::debug!(
        common_name = %subject.common_name,
        signature_algorithm = %algorithms.signature_algorithm,
        "built csr template"
    );
    Ok(CsrTemplate {
        subject,
        public_key_algorithm: algorithms.public_key_algorithm,
        signature_algorithm: algorithms.signature_algorithm,
    })
}

/// Builds the certificate template for `desc` using the OS random source.
///
/// Returns the template together with its `not_after`, which the caller
/// records on the description's status.
pub fn build_certificate_template(
    desc: &CertificateDescription,
    config: &IssuanceConfig,
) -> Result<(CertificateTemplate, OffsetDateTime)> {
    build_certificate_template_with_rng(desc, config, &mut OsRng)
}

/// Same as [`build_certificate_template`] with an injected random source.
pub fn build_certificate_template_with_rng<R>(
    desc: &CertificateDescription,
    config: &IssuanceConfig,
    rng: &mut R,
) -> Result<(CertificateTemplate, OffsetDateTime)>
where
    R: TryCryptoRng + ?Sized,
{
    config.validate()?;
    let subject = ResolvedSubject::resolve(desc, config)?;
    let serial_number = random_serial_number(rng, config.serial_number_bits)?;
    let algorithms = select_algorithm(&desc.key_algorithm, desc.key_size)?;

    let validity = Validity::starting_at(OffsetDateTime::now_utc(), config.default_validity)?;
    let template = CertificateTemplate {
        subject,
        serial_number,
        validity,
        key_usage: KeyUsage::for_certificate(desc.is_ca),
        is_ca: desc.is_ca,
        public_key_algorithm: algorithms.public_key_algorithm,
        signature_algorithm: None,
    };

    tracing::debug!(
        common_name = %template.subject.common_name,
        serial_number = %format_args!("{:x}", template.serial_number),
        not_after = %validity.not_after,
        is_ca = template.is_ca,
        "built certificate template"
    );
    Ok((template, validity.not_after))
}

/// Draws a serial number uniformly from `[0, 2^bits)`.
pub fn random_serial_number<R>(rng: &mut R, bits: u32) -> Result<u128>
where
    R: TryCryptoRng + ?Sized,
{
    if bits == 0 || bits > u128::BITS {
        return Err(PkiError::InvalidInput(format!(
            "serial number width must be between 1 and {} bits, got {bits}",
            u128::BITS
        )));
    }
    let mut bytes = [0u8; 16];
    rng.try_fill_bytes(&mut bytes)
        .map_err(|e| PkiError::RandomGenerationError(e.to_string()))?;
    Ok(u128::from_be_bytes(bytes) >> (u128::BITS - bits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::extensions::KeyUsages;
    use crate::description::KeyAlgorithm;
    use rand::rngs::StdRng;
    use rand::{SeedableRng, TryRngCore};
    use std::fmt;
    use time::Duration;

    #[derive(Debug)]
    struct Exhausted;

    impl fmt::Display for Exhausted {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("entropy source exhausted")
        }
    }

    struct ExhaustedRng;

    impl TryRngCore for ExhaustedRng {
        type Error = Exhausted;

        fn try_next_u32(&mut self) -> std::result::Result<u32, Self::Error> {
            Err(Exhausted)
        }

        fn try_next_u64(&mut self) -> std::result::Result<u64, Self::Error> {
            Err(Exhausted)
        }

        fn try_fill_bytes(&mut self, _dst: &mut [u8]) -> std::result::Result<(), Self::Error> {
            Err(Exhausted)
        }
    }

    impl TryCryptoRng for ExhaustedRng {}

    fn description() -> CertificateDescription {
        CertificateDescription::builder()
            .dns_names(vec!["a.com".to_string(), "b.com".to_string()])
            .key_algorithm(KeyAlgorithm::Ecdsa)
            .key_size(384)
            .build()
    }

    #[test]
    fn test_csr_template() {
        let template = build_csr_template(&description(), &IssuanceConfig::default()).unwrap();
        assert_eq!(template.subject.common_name, "a.com");
        assert_eq!(template.subject.dns_names, vec!["a.com", "b.com"]);
        assert_eq!(template.subject.organization, vec!["cert-manager"]);
        assert_eq!(template.public_key_algorithm, PublicKeyAlgorithm::Ecdsa);
        assert_eq!(
            template.signature_algorithm,
            SignatureAlgorithm::Sha384WithECDSA
        );
    }

    #[test]
    fn test_no_domains_specified() {
        let desc = CertificateDescription::default();
        let config = IssuanceConfig::default();
        assert_eq!(
            build_csr_template(&desc, &config).unwrap_err(),
            PkiError::NoDomainsSpecified
        );
        assert_eq!(
            build_certificate_template(&desc, &config).unwrap_err(),
            PkiError::NoDomainsSpecified
        );
    }

    #[test]
    fn test_algorithm_errors_propagate() {
        let mut desc = description();
        desc.key_size = 999;
        assert!(matches!(
            build_csr_template(&desc, &IssuanceConfig::default()),
            Err(PkiError::UnsupportedKeySize { size: 999, .. })
        ));
        desc.key_algorithm = KeyAlgorithm::from_name("dsa");
        assert!(matches!(
            build_certificate_template(&desc, &IssuanceConfig::default()),
            Err(PkiError::UnsupportedKeyAlgorithm(_))
        ));
    }

    #[test]
    fn test_certificate_template() {
        let mut desc = description();
        desc.is_ca = true;
        let config = IssuanceConfig::builder()
            .default_validity(Duration::days(30))
            .build();
        let (template, not_after) = build_certificate_template(&desc, &config).unwrap();

        assert_eq!(not_after, template.validity.not_after);
        assert_eq!(
            template.validity.not_after - template.validity.not_before,
            Duration::days(30)
        );
        assert!(template.validity.not_before <= OffsetDateTime::now_utc());
        assert!(template.is_ca);
        assert!(template.key_usage.0.contains(KeyUsages::KeyCertSign));
        assert_eq!(template.public_key_algorithm, PublicKeyAlgorithm::Ecdsa);
        assert_eq!(template.signature_algorithm, None);
    }

    #[test]
    fn test_oversized_validity_is_an_error() {
        let config = IssuanceConfig::builder()
            .default_validity(Duration::days(4_000_000))
            .build();
        assert!(matches!(
            build_certificate_template(&description(), &config),
            Err(PkiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_serial_numbers_differ() {
        let config = IssuanceConfig::default();
        let (first, _) = build_certificate_template(&description(), &config).unwrap();
        let (second, _) = build_certificate_template(&description(), &config).unwrap();
        assert_ne!(first.serial_number, second.serial_number);
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(
            random_serial_number(&mut a, 128).unwrap(),
            random_serial_number(&mut b, 128).unwrap()
        );
    }

    #[test]
    fn test_serial_number_width() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..64 {
            assert!(random_serial_number(&mut rng, 20).unwrap() < 1 << 20);
        }
        assert!(random_serial_number(&mut rng, 0).is_err());
        assert!(random_serial_number(&mut rng, 129).is_err());
    }

    #[test]
    fn test_random_failure() {
        let err = build_certificate_template_with_rng(
            &description(),
            &IssuanceConfig::default(),
            &mut ExhaustedRng,
        )
        .unwrap_err();
        assert_eq!(
            err,
            PkiError::RandomGenerationError("entropy source exhausted".to_string())
        );
    }
}
