//! Roster import from `.xlsx` workbooks
//!
//! The first sheet is read. Its header row names the columns `AUTH_TOKEN`,
//! `PROXY`, `USERNAME` and `STATUS`, in any order; only `AUTH_TOKEN` is
//! required. Rows without a token are skipped.

use crate::error::RosterImportError;
use calamine::{Data, Range, Reader, Xlsx};
use std::io::Cursor;
use std::path::Path;
use taskdeck_types::{Account, AccountStatus};

const AUTH_TOKEN: &str = "AUTH_TOKEN";
const PROXY: &str = "PROXY";
const USERNAME: &str = "USERNAME";
const STATUS: &str = "STATUS";

/// Parse a roster from an uploaded workbook
pub fn read_roster_bytes(bytes: &[u8]) -> Result<Vec<Account>, RosterImportError> {
    let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e: calamine::XlsxError| RosterImportError::Workbook(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(RosterImportError::NoSheets)?
        .map_err(|e| RosterImportError::Workbook(e.to_string()))?;

    parse_range(&range)
}

/// Parse a roster from a spreadsheet on disk
pub fn read_roster_file(path: &Path) -> Result<Vec<Account>, RosterImportError> {
    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| RosterImportError::Workbook(format!("{}: {}", path.display(), e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(RosterImportError::NoSheets)?
        .map_err(|e| RosterImportError::Workbook(e.to_string()))?;

    parse_range(&range)
}

fn parse_range(range: &Range<Data>) -> Result<Vec<Account>, RosterImportError> {
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or(RosterImportError::MissingColumn(AUTH_TOKEN))?;

    let column = |name: &str| {
        header
            .iter()
            .position(|cell| cell.to_string().trim().eq_ignore_ascii_case(name))
    };

    let token_col = column(AUTH_TOKEN).ok_or(RosterImportError::MissingColumn(AUTH_TOKEN))?;
    let proxy_col = column(PROXY);
    let username_col = column(USERNAME);
    let status_col = column(STATUS);

    let accounts = rows
        .filter_map(|row| {
            let auth_token = cell_text(row, Some(token_col))?;
            Some(Account {
                auth_token,
                proxy: cell_text(row, proxy_col),
                username: cell_text(row, username_col),
                status: cell_text(row, status_col)
                    .map(|s| AccountStatus::parse_lossy(&s))
                    .unwrap_or_default(),
            })
        })
        .collect();

    Ok(accounts)
}

fn cell_text(row: &[Data], col: Option<usize>) -> Option<String> {
    let text = row.get(col?)?.to_string();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
