//! Append-position resolution for the shared spreadsheet.

/// Finds the first row safe for appending, given the destination tab's
/// column A from row 1 (empty string for blank cells).
///
/// The destination keeps deliberate two-row gaps between logical sections,
/// so the scan looks for the first populated cell followed by two blank
/// cells and returns the first blank row of that gap (1-based). Without
/// such a triple, including when fewer than three cells were read, the
/// append goes directly after the last read row.
pub fn resolve_append_row(column_a: &[String]) -> u32 {
    for i in 0..column_a.len().saturating_sub(2) {
        if !column_a[i].is_empty() && column_a[i + 1].is_empty() && column_a[i + 2].is_empty() {
            return (i + 2) as u32;
        }
    }
    column_a.len() as u32 + 1
}
