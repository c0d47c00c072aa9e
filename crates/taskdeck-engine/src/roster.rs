//! In-memory account roster

use crate::validator::AccountCheck;
use std::collections::{HashMap, HashSet};
use taskdeck_types::{Account, AccountStatus};
use tokio::sync::RwLock;

/// Ordered roster of accounts. Runs read it; imports replace it.
#[derive(Debug, Default)]
pub struct AccountRoster {
    accounts: RwLock<Vec<Account>>,
}

impl AccountRoster {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts: RwLock::new(dedup_by_token(accounts)),
        }
    }

    pub async fn list(&self) -> Vec<Account> {
        self.accounts.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }

    /// Replace the roster; later duplicates of a token are dropped.
    /// Returns the number of accounts kept.
    pub async fn replace(&self, accounts: Vec<Account>) -> usize {
        let accounts = dedup_by_token(accounts);
        let count = accounts.len();
        *self.accounts.write().await = accounts;
        count
    }

    /// Resolve tokens to roster records, in the given order.
    ///
    /// Tokens missing from the roster become bare accounts with unknown
    /// status.
    pub async fn resolve(&self, tokens: &[String]) -> Vec<Account> {
        let accounts = self.accounts.read().await;
        tokens
            .iter()
            .map(|token| {
                accounts
                    .iter()
                    .find(|a| &a.auth_token == token)
                    .cloned()
                    .unwrap_or_else(|| Account::from_token(token.clone()))
            })
            .collect()
    }

    /// Apply validation outcomes by token and return the updated roster.
    ///
    /// Tokens no longer in the roster are ignored. An existing username is
    /// kept.
    pub async fn update_statuses(&self, checks: Vec<(String, AccountCheck)>) -> Vec<Account> {
        let checks: HashMap<String, AccountCheck> = checks.into_iter().collect();
        let mut accounts = self.accounts.write().await;
        for account in accounts.iter_mut() {
            if let Some(check) = checks.get(&account.auth_token) {
                account.status = check.status;
                if account.username.is_none() {
                    account.username = check.username.clone();
                }
            }
        }
        accounts.clone()
    }

    pub async fn count_by_status(&self, status: AccountStatus) -> usize {
        self.accounts
            .read()
            .await
            .iter()
            .filter(|a| a.status == status)
            .count()
    }
}

fn dedup_by_token(accounts: Vec<Account>) -> Vec<Account> {
    let mut seen = HashSet::new();
    accounts
        .into_iter()
        .filter(|a| seen.insert(a.auth_token.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_falls_back_to_bare_account() {
        let roster = AccountRoster::new(vec![
            Account::from_token("a").with_status(AccountStatus::Ok),
        ]);

        let resolved = roster.resolve(&["b".to_string(), "a".to_string()]).await;
        assert_eq!(resolved[0], Account::from_token("b"));
        assert_eq!(resolved[1].status, AccountStatus::Ok);
    }

    #[tokio::test]
    async fn test_update_statuses_by_token() {
        let mut named = Account::from_token("b");
        named.username = Some("bob".to_string());
        let roster = AccountRoster::new(vec![Account::from_token("a"), named]);

        let check = |status, username: &str| AccountCheck {
            status,
            username: Some(username.to_string()),
        };
        let updated = roster
            .update_statuses(vec![
                ("a".to_string(), check(AccountStatus::Ok, "user_a")),
                ("b".to_string(), check(AccountStatus::Suspended, "user_b")),
                ("gone".to_string(), check(AccountStatus::Ok, "user_c")),
            ])
            .await;

        assert_eq!(updated.len(), 2);
        assert_eq!(updated[0].status, AccountStatus::Ok);
        assert_eq!(updated[0].username.as_deref(), Some("user_a"));
        assert_eq!(updated[1].status, AccountStatus::Suspended);
        assert_eq!(updated[1].username.as_deref(), Some("bob"));
        assert_eq!(roster.count_by_status(AccountStatus::Ok).await, 1);
    }

    #[tokio::test]
    async fn test_replace_drops_duplicate_tokens() {
        let roster = AccountRoster::default();
        let kept = roster
            .replace(vec![
                Account::from_token("a").with_status(AccountStatus::Locked),
                Account::from_token("b"),
                Account::from_token("a"),
            ])
            .await;

        assert_eq!(kept, 2);
        assert_eq!(roster.count_by_status(AccountStatus::Locked).await, 1);
        assert!(!roster.is_empty().await);
    }
}
