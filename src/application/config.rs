use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{CommissionRate, Pesos};

use super::AppError;

pub const APP_NAME: &str = "Seguro tu Plata";
pub const DEFAULT_SEED_BALANCE: Pesos = 500_000;
pub const DEFAULT_RECENT_COUNT: usize = 3;

/// Settings fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConfig {
    pub app_name: String,
    /// Balance the wallet opens with, recorded as the first deposit
    pub seed_balance: Pesos,
    pub commission: CommissionRate,
    /// How many movements the dashboard lists
    pub recent_count: usize,
    /// Timestamp of the opening deposit
    pub opening_date: DateTime<Utc>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            seed_balance: DEFAULT_SEED_BALANCE,
            commission: CommissionRate::default(),
            recent_count: DEFAULT_RECENT_COUNT,
            opening_date: default_opening_date(),
        }
    }
}

impl WalletConfig {
    pub fn with_seed_balance(mut self, seed_balance: Pesos) -> Self {
        self.seed_balance = seed_balance;
        self
    }

    pub fn with_commission(mut self, commission: CommissionRate) -> Self {
        self.commission = commission;
        self
    }

    pub fn with_recent_count(mut self, recent_count: usize) -> Self {
        self.recent_count = recent_count;
        self
    }

    pub fn with_opening_date(mut self, opening_date: DateTime<Utc>) -> Self {
        self.opening_date = opening_date;
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.seed_balance < 0 {
            return Err(AppError::InvalidConfig(format!(
                "seed balance cannot be negative ({})",
                self.seed_balance
            )));
        }
        if self.recent_count == 0 {
            return Err(AppError::InvalidConfig(
                "recent movement count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_opening_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_wallet_seed() {
        let config = WalletConfig::default();

        assert_eq!(config.app_name, "Seguro tu Plata");
        assert_eq!(config.seed_balance, 500000);
        assert_eq!(config.commission.basis_points(), 1000);
        assert_eq!(config.recent_count, 3);
        assert_eq!(config.opening_date.date_naive().to_string(), "2024-01-01");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let negative = WalletConfig::default().with_seed_balance(-1);
        assert!(matches!(negative.validate(), Err(AppError::InvalidConfig(_))));

        let no_recent = WalletConfig::default().with_recent_count(0);
        assert!(matches!(no_recent.validate(), Err(AppError::InvalidConfig(_))));
    }
}
