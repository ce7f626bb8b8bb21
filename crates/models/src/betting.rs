use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use crate::error::{Result, SharpError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub bankroll: Decimal,
    pub unit_size: Decimal,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            bankroll: dec!(1000),
            unit_size: dec!(10),
        }
    }
}

impl UserSettings {
    pub fn new(bankroll: Decimal, unit_size: Decimal) -> Result<Self> {
        if bankroll <= Decimal::ZERO {
            return Err(SharpError::InvalidSettings(format!(
                "bankroll must be positive, got {}",
                bankroll
            )));
        }
        if unit_size <= Decimal::ZERO {
            return Err(SharpError::InvalidSettings(format!(
                "unit size must be positive, got {}",
                unit_size
            )));
        }
        Ok(Self { bankroll, unit_size })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankrollSummary {
    pub total_bets: usize,
    /// Percentage of completed picks that won.
    pub win_rate: f64,
    pub net_units: Decimal,
    pub profit_loss: Decimal,
    pub starting_bankroll: Decimal,
    pub current_bankroll: Decimal,
}

impl BankrollSummary {
    pub fn new(total_bets: usize, win_rate: f64, net_units: Decimal, settings: &UserSettings) -> Self {
        let profit_loss = net_units * settings.unit_size;
        Self {
            total_bets,
            win_rate,
            net_units,
            profit_loss,
            starting_bankroll: settings.bankroll,
            current_bankroll: settings.bankroll + profit_loss,
        }
    }
}

/// Stake size, in units, for a final confidence.
pub fn recommended_units(confidence: f64) -> Decimal {
    if confidence >= 85.0 {
        dec!(3)
    } else if confidence >= 80.0 {
        dec!(2.5)
    } else if confidence >= 75.0 {
        dec!(2)
    } else if confidence >= 70.0 {
        dec!(1.5)
    } else {
        dec!(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommended_units_steps() {
        assert_eq!(recommended_units(95.0), dec!(3));
        assert_eq!(recommended_units(85.0), dec!(3));
        assert_eq!(recommended_units(84.9), dec!(2.5));
        assert_eq!(recommended_units(80.0), dec!(2.5));
        assert_eq!(recommended_units(75.0), dec!(2));
        assert_eq!(recommended_units(70.0), dec!(1.5));
        assert_eq!(recommended_units(69.99), dec!(1));
        assert_eq!(recommended_units(55.0), dec!(1));
    }

    #[test]
    fn test_settings_validation() {
        assert!(UserSettings::new(dec!(500), dec!(5)).is_ok());
        assert!(UserSettings::new(dec!(0), dec!(5)).is_err());
        assert!(UserSettings::new(dec!(500), dec!(-1)).is_err());
    }

    #[test]
    fn test_bankroll_summary() {
        let settings = UserSettings::default();
        let summary = BankrollSummary::new(4, 75.0, dec!(1.73), &settings);

        assert_eq!(summary.profit_loss, dec!(17.30));
        assert_eq!(summary.current_bankroll, dec!(1017.30));
        assert_eq!(summary.starting_bankroll, dec!(1000));
    }
}
