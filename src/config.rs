use bon::Builder;
use time::{Duration, OffsetDateTime};

use crate::cert::params::Validity;
use crate::error::{PkiError, Result};

/// Organization placed on the subject when a description does not name one.
pub const DEFAULT_ORGANIZATION: &str = "cert-manager";

/// Default certificate lifetime, one year.
pub const DEFAULT_VALIDITY_DAYS: i64 = 365;

/// Serial numbers are drawn uniformly from `[0, 2^SERIAL_NUMBER_BITS)`.
pub const SERIAL_NUMBER_BITS: u32 = 128;

/// Fixed issuance settings passed into the template builder.
///
/// # Fields
/// * `default_organization` - Subject organization used when none is requested.
/// * `default_validity` - Distance between `not_before` and `not_after`.
/// * `serial_number_bits` - Width of generated serial numbers, `1..=128`.
#[derive(Clone, Debug, Builder)]
pub struct IssuanceConfig {
    #[builder(default = DEFAULT_ORGANIZATION.to_string())]
    pub default_organization: String,
    #[builder(default = Duration::days(DEFAULT_VALIDITY_DAYS))]
    pub default_validity: Duration,
    #[builder(default = SERIAL_NUMBER_BITS)]
    pub serial_number_bits: u32,
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl IssuanceConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.serial_number_bits == 0 || self.serial_number_bits > SERIAL_NUMBER_BITS {
            return Err(PkiError::InvalidInput(format!(
                "serial number width must be between 1 and {SERIAL_NUMBER_BITS} bits, got {}",
                self.serial_number_bits
            )));
        }
        if self.default_validity <= Duration::ZERO {
            return Err(PkiError::InvalidInput(format!(
                "default validity must be positive, got {}",
                self.default_validity
            )));
        }
        // certificates built now must end within the encodable range
        Validity::starting_at(OffsetDateTime::now_utc(), self.default_validity)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IssuanceConfig::default();
        assert_eq!(config.default_organization, "cert-manager");
        assert_eq!(config.default_validity, Duration::days(365));
        assert_eq!(config.serial_number_bits, 128);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_serial_width() {
        for bits in [0, 129] {
            let config = IssuanceConfig::builder().serial_number_bits(bits).build();
            assert!(matches!(
                config.validate(),
                Err(PkiError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_rejects_non_positive_validity() {
        let config = IssuanceConfig::builder()
            .default_validity(Duration::ZERO)
            .build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_validity_past_year_9999() {
        let config = IssuanceConfig::builder()
            .default_validity(Duration::days(4_000_000))
            .build();
        assert!(matches!(
            config.validate(),
            Err(PkiError::InvalidInput(_))
        ));
    }
}
