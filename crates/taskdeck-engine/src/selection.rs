//! Builds the account sequence a caller submits, from run configuration

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use taskdeck_types::{Account, Settings};

/// Apply exact-index or range selection, then optional shuffling.
///
/// Indices are 1-based. `exact_accounts_to_use` wins over `accounts_range`;
/// indices past the end of the roster are ignored.
pub fn select_accounts<R: Rng + ?Sized>(
    roster: &[Account],
    settings: &Settings,
    rng: &mut R,
) -> Vec<Account> {
    let mut selected: Vec<Account> = if !settings.exact_accounts_to_use.is_empty() {
        let mut seen = HashSet::new();
        settings
            .exact_accounts_to_use
            .iter()
            .filter(|idx| seen.insert(**idx))
            .filter_map(|idx| idx.checked_sub(1).and_then(|i| roster.get(i)))
            .cloned()
            .collect()
    } else if settings.accounts_range.is_all() {
        roster.to_vec()
    } else {
        let start = settings.accounts_range.start.max(1) - 1;
        let end = settings.accounts_range.end.min(roster.len());
        if start >= end {
            Vec::new()
        } else {
            roster[start..end].to_vec()
        }
    };

    if settings.shuffle_accounts {
        selected.shuffle(rng);
    }

    selected
}
