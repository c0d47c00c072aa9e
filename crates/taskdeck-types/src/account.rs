//! Account roster records

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single roster account.
///
/// Identity is the auth token; two records with the same token describe the
/// same account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Session token, unique within a roster
    pub auth_token: String,

    /// Optional proxy URL used for this account's traffic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    /// Optional platform username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Last known validation status
    #[serde(default)]
    pub status: AccountStatus,
}

impl Account {
    /// Create an account from a bare token with unknown status
    pub fn from_token(auth_token: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            proxy: None,
            username: None,
            status: AccountStatus::Unknown,
        }
    }

    /// Builder-style status setter
    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder-style username setter
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Whether the account can take part in mutual subscription
    pub fn is_eligible(&self) -> bool {
        self.status == AccountStatus::Ok
    }

    /// Human-facing label: the username when known, else a token prefix
    pub fn label(&self) -> String {
        match &self.username {
            Some(name) if !name.is_empty() => format!("@{}", name),
            _ => {
                let prefix: String = self.auth_token.chars().take(8).collect();
                format!("{}…", prefix)
            }
        }
    }
}

/// Validation status of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Ok,
    Locked,
    Suspended,
    WrongToken,
    #[default]
    Unknown,
}

impl AccountStatus {
    /// Parse a status cell, mapping anything unrecognized to `Unknown`
    pub fn parse_lossy(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ok" => Self::Ok,
            "locked" => Self::Locked,
            "suspended" => Self::Suspended,
            "wrong_token" | "wrong token" => Self::WrongToken,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Locked => "locked",
            Self::Suspended => "suspended",
            Self::WrongToken => "wrong_token",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
