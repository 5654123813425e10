use crate::error::{Result, StrategyError};
use serde::{Deserialize, Serialize};
use trading::Lots;

/// Which fields make two strategies "the same strategy".
///
/// The default only looks at security and threshold, so two strategies with the
/// same trigger but different sizes collide. Pick `SecurityThresholdAndLots`
/// when strategies are deduplicated in a set and size matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Equivalence {
    #[default]
    SecurityAndThreshold,
    SecurityThresholdAndLots,
}

/// Parameters of a single price trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Security to watch. Matched case-insensitively.
    security: String,
    /// Buy fires when the observed price is strictly below this value.
    threshold: f64,
    /// Quantity submitted on trigger.
    lots: Lots,
    #[serde(default)]
    equivalence: Equivalence,
}

impl StrategyConfig {
    pub fn new(security: impl Into<String>, threshold: f64, lots: Lots) -> Self {
        Self {
            security: security.into(),
            threshold,
            lots,
            equivalence: Equivalence::default(),
        }
    }

    pub fn with_equivalence(mut self, equivalence: Equivalence) -> Self {
        self.equivalence = equivalence;
        self
    }

    pub fn security(&self) -> &str {
        &self.security
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn lots(&self) -> Lots {
        self.lots
    }

    pub fn equivalence(&self) -> Equivalence {
        self.equivalence
    }

    /// Checks the values `TradingStrategy::new` would otherwise accept blindly.
    pub fn validate(&self) -> Result<()> {
        if self.security.trim().is_empty() {
            return Err(StrategyError::InvalidConfiguration(
                "security must not be empty".to_string(),
            ));
        }
        if !self.threshold.is_finite() {
            return Err(StrategyError::InvalidConfiguration(format!(
                "threshold for {} must be finite, got {}",
                self.security, self.threshold
            )));
        }
        if self.lots <= 0 {
            return Err(StrategyError::InvalidConfiguration(format!(
                "lots for {} must be positive, got {}",
                self.security, self.lots
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_sane_config() {
        assert!(StrategyConfig::new("IBM", 100.0, 5000).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases = [
            StrategyConfig::new("  ", 100.0, 1),
            StrategyConfig::new("IBM", f64::NAN, 1),
            StrategyConfig::new("IBM", f64::INFINITY, 1),
            StrategyConfig::new("IBM", 100.0, 0),
            StrategyConfig::new("IBM", 100.0, -5),
        ];
        for config in cases {
            assert!(
                matches!(
                    config.validate(),
                    Err(StrategyError::InvalidConfiguration(_))
                ),
                "expected rejection for {:?}",
                config
            );
        }
    }

    #[test]
    fn test_equivalence_defaults_when_missing() {
        let config: StrategyConfig =
            serde_json::from_str(r#"{"security":"IBM","threshold":100.0,"lots":5000}"#).unwrap();
        assert_eq!(config.equivalence(), Equivalence::SecurityAndThreshold);

        let config: StrategyConfig = serde_json::from_str(
            r#"{"security":"IBM","threshold":100.0,"lots":5000,"equivalence":"security_threshold_and_lots"}"#,
        )
        .unwrap();
        assert_eq!(config.equivalence(), Equivalence::SecurityThresholdAndLots);
    }
}
