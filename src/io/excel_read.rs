use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};

use crate::error::{Result, SyncError};

/// A worksheet reduced to a header row plus uniformly stringified data rows.
/// Rows are padded to the header width and fully blank rows are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Reads the first worksheet of a report workbook, discarding
/// `header_offset` leading rows before the header row.
pub fn read_report(path: &Path, header_offset: usize) -> Result<RawSheet> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SyncError::InvalidWorkbook("workbook has no sheets".to_string()))?;
    let range = read_required_sheet(&mut workbook, &name)?;
    Ok(range_to_sheet(&range, header_offset))
}

/// Reads a named worksheet, failing with the list of sheets that are present
/// when the expected one is missing. Used to re-read the consolidated
/// workbook right before pushing it to the shared spreadsheet.
pub fn read_table(path: &Path, sheet_name: &str) -> Result<RawSheet> {
    if !path.exists() {
        return Err(SyncError::MissingInput(path.to_path_buf()));
    }
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = read_required_sheet(&mut workbook, sheet_name)?;
    Ok(range_to_sheet(&range, 0))
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<calamine::Range<DataType>> {
    match workbook.worksheet_range(name) {
        Some(range_result) => range_result.map_err(SyncError::from),
        None => Err(SyncError::MissingSheet {
            name: name.to_string(),
            available: workbook.sheet_names().to_vec(),
        }),
    }
}

fn range_to_sheet(range: &calamine::Range<DataType>, header_offset: usize) -> RawSheet {
    let mut rows_iter = range.rows().skip(header_offset);
    let headers: Vec<String> = match rows_iter.next() {
        Some(first_row) => first_row
            .iter()
            .map(|cell| cell_to_string(Some(cell)))
            .collect(),
        None => {
            return RawSheet {
                headers: Vec::new(),
                rows: Vec::new(),
            };
        }
    };

    let width = headers.len();
    let rows = rows_iter
        .map(|row| {
            let mut cells: Vec<String> = row
                .iter()
                .take(width)
                .map(|cell| cell_to_string(Some(cell)))
                .collect();
            cells.resize(width, String::new());
            cells
        })
        .filter(|cells| cells.iter().any(|cell| !cell.trim().is_empty()))
        .collect();

    RawSheet { headers, rows }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(cell @ DataType::DateTime(_)) => cell
            .as_datetime()
            .map(|datetime| datetime.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
