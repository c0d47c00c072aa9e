//! Task log export as an `.xlsx` workbook

use crate::error::ExportError;
use rust_xlsxwriter::{Format, Workbook};
use taskdeck_types::TaskLogEntry;

/// MIME type of the exported workbook
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const SHEET_NAME: &str = "Task Logs";

const COLUMNS: [&str; 5] = ["task", "account", "status", "timestamp", "elapsed_ms"];

// Excel's row limit, less the header row
const MAX_ROWS: usize = 1_048_575;

/// Serialize the log, one row per entry in log order
pub fn export_task_log(entries: &[TaskLogEntry]) -> Result<Vec<u8>, ExportError> {
    if entries.len() > MAX_ROWS {
        return Err(ExportError::TooManyRows(entries.len()));
    }

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, title) in COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
    }

    for (i, entry) in entries.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, entry.task.as_str())?;
        sheet.write_number(row, 1, entry.account_index as f64)?;
        sheet.write_string(row, 2, entry.status.as_str())?;
        sheet.write_string(row, 3, entry.timestamp.to_rfc3339())?;
        sheet.write_number(row, 4, entry.elapsed_ms as f64)?;
    }

    Ok(workbook.save_to_buffer()?)
}
