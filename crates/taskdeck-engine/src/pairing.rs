//! Pairing assignment for mutual subscription
//!
//! Every eligible account gets `min(requested, eligible - 1)` distinct other
//! accounts to follow, drawn uniformly at random. An account never targets
//! itself and never targets the same account twice. The assignment is not
//! necessarily symmetric.

use crate::error::{RunError, RunResult};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use taskdeck_types::Account;

/// One source account and the accounts it will follow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub source: Account,
    pub targets: Vec<Account>,
}

/// Follow sets for one run, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingAssignment {
    pairings: Vec<Pairing>,
}

impl PairingAssignment {
    pub fn pairings(&self) -> &[Pairing] {
        &self.pairings
    }

    pub fn into_pairings(self) -> Vec<Pairing> {
        self.pairings
    }

    pub fn len(&self) -> usize {
        self.pairings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairings.is_empty()
    }

    /// Targets assigned to the account with `auth_token`
    pub fn targets_of(&self, auth_token: &str) -> Option<&[Account]> {
        self.pairings
            .iter()
            .find(|p| p.source.auth_token == auth_token)
            .map(|p| p.targets.as_slice())
    }
}

/// Compute follow sets over `eligible`, keeping its order.
///
/// Repeated tokens count once.
pub fn assign_pairs<R: Rng + ?Sized>(
    eligible: &[Account],
    requested: i64,
    rng: &mut R,
) -> RunResult<PairingAssignment> {
    let mut seen = HashSet::new();
    let unique: Vec<&Account> = eligible
        .iter()
        .filter(|account| seen.insert(account.auth_token.as_str()))
        .collect();

    if unique.len() < 2 {
        return Err(RunError::InsufficientAccounts(unique.len()));
    }
    if requested < 1 {
        return Err(RunError::InvalidParameter(format!(
            "followers_per_account must be at least 1, got {}",
            requested
        )));
    }

    let per_account = usize::try_from(requested)
        .unwrap_or(usize::MAX)
        .min(unique.len() - 1);

    let pairings = unique
        .iter()
        .enumerate()
        .map(|(source_idx, source)| {
            let others: Vec<&Account> = unique
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != source_idx)
                .map(|(_, account)| *account)
                .collect();

            let targets = others
                .choose_multiple(rng, per_account)
                .map(|account| (*account).clone())
                .collect();

            Pairing {
                source: (*source).clone(),
                targets,
            }
        })
        .collect();

    Ok(PairingAssignment { pairings })
}
