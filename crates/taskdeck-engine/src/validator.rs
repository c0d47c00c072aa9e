//! Pluggable account validation capability

use crate::error::ExecutorError;
use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;
use taskdeck_types::{Account, AccountStatus};

/// Outcome of checking one account against the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCheck {
    pub status: AccountStatus,

    /// Handle reported by the platform, if any
    pub username: Option<String>,
}

/// Checks whether an account's token is usable.
///
/// `ExecutorError::Task` leaves the account untouched. `ExecutorError::Fatal`
/// ends the validation pass.
#[async_trait]
pub trait AccountValidator: Send + Sync {
    async fn validate(&self, account: &Account) -> Result<AccountCheck, ExecutorError>;
}

const FAILED_STATUSES: [AccountStatus; 3] = [
    AccountStatus::Locked,
    AccountStatus::Suspended,
    AccountStatus::WrongToken,
];

/// Validator that assigns random statuses and handles
#[derive(Debug, Clone)]
pub struct SimulatedValidator {
    ok_rate: f64,
}

impl Default for SimulatedValidator {
    fn default() -> Self {
        Self { ok_rate: 0.7 }
    }
}

impl SimulatedValidator {
    pub fn new(ok_rate: f64) -> Self {
        Self {
            ok_rate: ok_rate.clamp(0.0, 1.0),
        }
    }
}

#[async_trait]
impl AccountValidator for SimulatedValidator {
    async fn validate(&self, account: &Account) -> Result<AccountCheck, ExecutorError> {
        let mut rng = rand::thread_rng();

        let status = if rng.gen::<f64>() < self.ok_rate {
            AccountStatus::Ok
        } else {
            *FAILED_STATUSES
                .choose(&mut rng)
                .unwrap_or(&AccountStatus::Locked)
        };

        let username = account.username.clone().or_else(|| {
            let suffix: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(8)
                .map(|c| char::from(c).to_ascii_lowercase())
                .collect();
            Some(format!("user_{}", suffix))
        });

        Ok(AccountCheck { status, username })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rates_bound_statuses() {
        let account = Account::from_token("tok-1");

        let check = SimulatedValidator::new(1.0).validate(&account).await.unwrap();
        assert_eq!(check.status, AccountStatus::Ok);

        for _ in 0..20 {
            let check = SimulatedValidator::new(0.0).validate(&account).await.unwrap();
            assert!(FAILED_STATUSES.contains(&check.status));
        }
    }

    #[tokio::test]
    async fn test_username_is_kept_or_generated() {
        let validator = SimulatedValidator::default();

        let mut named = Account::from_token("tok-1");
        named.username = Some("alice".to_string());
        let check = validator.validate(&named).await.unwrap();
        assert_eq!(check.username.as_deref(), Some("alice"));

        let check = validator.validate(&Account::from_token("tok-2")).await.unwrap();
        let username = check.username.unwrap();
        assert!(username.starts_with("user_"));
        assert_eq!(username.len(), "user_".len() + 8);
    }
}
