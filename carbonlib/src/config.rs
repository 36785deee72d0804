use serde::{Deserialize, Serialize};

use crate::marketplace::PrecedencePolicy;
use crate::units::ConversionPolicy;

/// Engine configuration.
///
/// Loaded once at process start (from defaults or a TOML document) and
/// passed by reference into the calculators together with the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How undefined unit conversions are handled
    #[serde(default)]
    pub conversion_policy: ConversionPolicy,

    /// Ordered precedence of emission-reduction sources
    #[serde(default)]
    pub precedence: PrecedencePolicy,

    /// Discount rate used when a scenario does not supply one, percent
    #[serde(default = "default_discount_rate")]
    pub default_discount_rate_percent: f64,

    /// Carbon price used when a scenario does not supply one, per tonne
    #[serde(default = "default_carbon_price")]
    pub default_carbon_price: f64,
}

fn default_discount_rate() -> f64 {
    5.0
}

fn default_carbon_price() -> f64 {
    25.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            conversion_policy: ConversionPolicy::default(),
            precedence: PrecedencePolicy::default(),
            default_discount_rate_percent: default_discount_rate(),
            default_carbon_price: default_carbon_price(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from a TOML document; missing fields take
    /// their defaults
    pub fn from_toml_str(document: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::ReductionSource;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.conversion_policy, ConversionPolicy::Lenient);
        assert_eq!(config.default_discount_rate_percent, 5.0);
        assert_eq!(config.default_carbon_price, 25.0);
        assert_eq!(
            config.precedence.order,
            vec![
                ReductionSource::MarketplaceVariant,
                ReductionSource::ManualAdditive
            ]
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            conversion_policy = "strict"
            default_discount_rate_percent = 7.5
            "#,
        )
        .unwrap();
        assert_eq!(config.conversion_policy, ConversionPolicy::Strict);
        assert_eq!(config.default_discount_rate_percent, 7.5);
        assert_eq!(config.default_carbon_price, 25.0);
    }

    #[test]
    fn test_precedence_from_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            [precedence]
            order = ["manual_additive", "marketplace_variant"]
            "#,
        )
        .unwrap();
        assert_eq!(
            config.precedence.order,
            vec![
                ReductionSource::ManualAdditive,
                ReductionSource::MarketplaceVariant
            ]
        );
    }
}
