use serde::{Deserialize, Serialize};

use crate::{CountingSystem, Error, GameRules};

/// Betting limits and staking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BettingConfig {
    pub min_bet: f64,
    pub max_bet: f64,
    pub bankroll: f64,
    /// Fraction of the full Kelly stake, 0.5 is half-Kelly.
    pub kelly_fraction: f64,
}

impl Default for BettingConfig {
    fn default() -> Self {
        Self {
            min_bet: 10.0,
            max_bet: 500.0,
            bankroll: 1000.0,
            kelly_fraction: 0.5,
        }
    }
}

impl BettingConfig {
    pub fn validate(&self) -> Result<(), Error> {
        validate_betting(self.min_bet, self.max_bet, self.bankroll, self.kelly_fraction)
    }
}

pub(crate) fn validate_betting(
    min_bet: f64,
    max_bet: f64,
    bankroll: f64,
    kelly_fraction: f64,
) -> Result<(), Error> {
    if min_bet.is_nan() || min_bet <= 0.0 {
        return Err(Error::Configuration(format!(
            "min_bet must be positive, got {min_bet}"
        )));
    }
    if max_bet.is_nan() || max_bet < min_bet {
        return Err(Error::Configuration(format!(
            "max_bet {max_bet} is below min_bet {min_bet}"
        )));
    }
    if bankroll.is_nan() || bankroll < 0.0 {
        return Err(Error::Configuration(format!(
            "bankroll cannot be negative, got {bankroll}"
        )));
    }
    if !(0.0..=1.0).contains(&kelly_fraction) {
        return Err(Error::Configuration(format!(
            "kelly_fraction must be within [0, 1], got {kelly_fraction}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountingConfig {
    pub enabled: bool,
    pub system: CountingSystem,
    /// Flag decisions with `leave_table` once the true count drops to the threshold.
    pub wong_out: bool,
    pub wong_out_threshold: f64,
    /// Reset the count automatically once this share of the shoe (percent) was seen.
    pub penetration_reset: Option<f64>,
}

impl Default for CountingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            system: CountingSystem::HiLo,
            wong_out: false,
            wong_out_threshold: -1.0,
            penetration_reset: None,
        }
    }
}

impl CountingConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(percent) = self.penetration_reset {
            if !(percent > 0.0 && percent <= 100.0) {
                return Err(Error::Configuration(format!(
                    "penetration_reset must be within (0, 100], got {percent}"
                )));
            }
        }
        Ok(())
    }
}

/// Immutable configuration snapshot for one advisor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    pub rules: GameRules,
    pub betting: BettingConfig,
    pub counting: CountingConfig,
}

impl AdvisorConfig {
    pub fn validate(&self) -> Result<(), Error> {
        self.rules.validate()?;
        self.betting.validate()?;
        self.counting.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AdvisorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_betting_limits_rejected() {
        let bad = [
            BettingConfig { min_bet: 0.0, ..BettingConfig::default() },
            BettingConfig { min_bet: -5.0, ..BettingConfig::default() },
            BettingConfig { max_bet: 5.0, ..BettingConfig::default() },
            BettingConfig { bankroll: -1.0, ..BettingConfig::default() },
            BettingConfig { kelly_fraction: 1.5, ..BettingConfig::default() },
            BettingConfig { min_bet: f64::NAN, ..BettingConfig::default() },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(Error::Configuration(_))),
                "{config:?}"
            );
        }
    }

    #[test]
    fn test_max_equal_to_min_is_allowed() {
        let config = BettingConfig {
            min_bet: 25.0,
            max_bet: 25.0,
            ..BettingConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_penetration_reset_bounds() {
        let mut counting = CountingConfig::default();
        counting.penetration_reset = Some(75.0);
        assert!(counting.validate().is_ok());
        counting.penetration_reset = Some(0.0);
        assert!(counting.validate().is_err());
        counting.penetration_reset = Some(120.0);
        assert!(counting.validate().is_err());
    }

    #[test]
    fn test_config_serializes() {
        let config = AdvisorConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: AdvisorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
