//! Validation and cleaning of raw report rows into the canonical
//! per-platform shape.
//!
//! Shopee reports are validated against the configured schema, filtered by
//! status and payment timestamp, and sorted chronologically; the sort is what
//! gives the incremental filter its "last record" semantics. Shein reports
//! are merged as-is, only tagged with the account.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::config::ShopeeSchema;
use crate::error::SkipReason;
use crate::io::excel_read::RawSheet;
use crate::model::OrderRow;

/// Timestamp renderings accepted in the payment column. The Excel reader
/// renders native datetime cells in the first format; the others cover
/// reports where the column arrived as text.
const PAID_AT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// A normalized Shopee report: validated, filtered, chronologically sorted
/// rows under the account-tagged column list.
#[derive(Debug, Clone, PartialEq)]
pub struct ShopeeReport {
    pub columns: Vec<String>,
    pub rows: Vec<OrderRow>,
}

/// A Shein report tagged with its account, otherwise untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Normalizes one raw Shopee report for one account.
///
/// Returns `SkipReason::MissingColumns` when any required header is absent;
/// the file then contributes nothing and the account's watermark is left
/// untouched. Row-level problems (excluded status, blank or sentinel payment
/// cell, unparseable timestamp) drop the row and are only counted.
pub fn normalize_shopee(
    sheet: &RawSheet,
    account: &str,
    account_column: &str,
    schema: &ShopeeSchema,
) -> Result<ShopeeReport, SkipReason> {
    let column_at = |name: &str| sheet.headers.iter().position(|header| header == name);
    let found = [
        column_at(&schema.order_id_column),
        column_at(&schema.status_column),
        column_at(&schema.paid_at_column),
    ];
    let [Some(id_at), Some(status_at), Some(paid_at_at)] = found else {
        let missing = schema
            .required_columns()
            .iter()
            .zip(found)
            .filter(|(_, at)| at.is_none())
            .map(|(name, _)| name.to_string())
            .collect();
        return Err(SkipReason::MissingColumns {
            missing,
            available: sheet.headers.clone(),
        });
    };

    let tag_account = !sheet.headers.iter().any(|header| header == account_column);
    let mut columns = sheet.headers.clone();
    if tag_account {
        columns.insert(0, account_column.to_string());
    }

    let mut excluded = 0usize;
    let mut unpaid = 0usize;
    let mut unparseable = 0usize;
    let mut rows = Vec::new();
    for raw in &sheet.rows {
        let status = raw[status_at].trim().to_lowercase();
        if schema.is_excluded(&status) {
            excluded += 1;
            continue;
        }
        let paid_cell = raw[paid_at_at].trim();
        if paid_cell.is_empty() || paid_cell == "-" {
            unpaid += 1;
            continue;
        }
        let Some(paid_at) = parse_paid_at(paid_cell) else {
            unparseable += 1;
            continue;
        };

        let mut cells = raw.clone();
        cells[status_at] = status;
        if tag_account {
            cells.insert(0, account.to_string());
        }
        rows.push(OrderRow {
            order_id: raw[id_at].clone(),
            paid_at,
            cells,
        });
    }

    rows.sort_by(|lhs, rhs| lhs.paid_at.cmp(&rhs.paid_at));

    debug!(
        account,
        excluded,
        unpaid,
        unparseable,
        kept = rows.len(),
        "normalized Shopee report"
    );
    Ok(ShopeeReport { columns, rows })
}

/// Tags every row of a Shein report with its account as the first column.
/// Shein feeds carry no status or date policy and always re-merge in full.
pub fn normalize_shein(sheet: &RawSheet, account: &str, account_column: &str) -> TaggedTable {
    let mut columns = Vec::with_capacity(sheet.headers.len() + 1);
    columns.push(account_column.to_string());
    columns.extend(sheet.headers.iter().cloned());

    let rows = sheet
        .rows
        .iter()
        .map(|raw| {
            let mut cells = Vec::with_capacity(raw.len() + 1);
            cells.push(account.to_string());
            cells.extend(raw.iter().cloned());
            cells
        })
        .collect();

    TaggedTable { columns, rows }
}

fn parse_paid_at(raw: &str) -> Option<NaiveDateTime> {
    PAID_AT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ShopeeSchema {
        ShopeeSchema::default()
    }

    fn sheet(headers: &[&str], rows: &[&[&str]]) -> RawSheet {
        RawSheet {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    fn order_sheet(rows: &[&[&str]]) -> RawSheet {
        sheet(
            &[
                "ID do pedido",
                "Status do pedido",
                "Hora do pagamento do pedido",
            ],
            rows,
        )
    }

    #[test]
    fn excluded_statuses_match_case_and_whitespace_insensitively() {
        let sheet = order_sheet(&[
            &["A1", "Cancelado", "2024-01-01 10:00:00"],
            &["A2", " cancelado ", "2024-01-01 11:00:00"],
            &["A3", "CANCELADO", "2024-01-01 12:00:00"],
            &["A4", "Concluído", "2024-01-01 13:00:00"],
        ]);
        let report = normalize_shopee(&sheet, "loja1", "Conta", &schema()).expect("normalized");
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].order_id, "A4");
    }

    #[test]
    fn status_cell_is_normalized_in_the_output() {
        let sheet = order_sheet(&[&["A1", "  Concluído ", "2024-01-01 10:00:00"]]);
        let report = normalize_shopee(&sheet, "loja1", "Conta", &schema()).expect("normalized");
        // Account first, then the original columns.
        assert_eq!(report.rows[0].cells[2], "concluído");
    }

    #[test]
    fn blank_and_sentinel_payment_cells_drop_the_row() {
        let sheet = order_sheet(&[
            &["A1", "concluído", ""],
            &["A2", "concluído", "-"],
            &["A3", "concluído", "2024-01-01 10:00:00"],
        ]);
        let report = normalize_shopee(&sheet, "loja1", "Conta", &schema()).expect("normalized");
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].order_id, "A3");
    }

    #[test]
    fn unparseable_timestamps_drop_the_row() {
        let sheet = order_sheet(&[
            &["A1", "concluído", "sometime in january"],
            &["A2", "concluído", "05/01/2024 09:30"],
        ]);
        let report = normalize_shopee(&sheet, "loja1", "Conta", &schema()).expect("normalized");
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].order_id, "A2");
    }

    #[test]
    fn rows_are_sorted_by_payment_time() {
        let sheet = order_sheet(&[
            &["A2", "concluído", "2024-01-02 10:00:00"],
            &["A1", "concluído", "2024-01-01 10:00:00"],
            &["A3", "concluído", "2024-01-03 10:00:00"],
        ]);
        let report = normalize_shopee(&sheet, "loja1", "Conta", &schema()).expect("normalized");
        let ids: Vec<_> = report.rows.iter().map(|row| row.order_id.as_str()).collect();
        assert_eq!(ids, ["A1", "A2", "A3"]);
    }

    #[test]
    fn missing_required_column_skips_the_file() {
        let sheet = sheet(
            &["ID do pedido", "Hora do pagamento do pedido"],
            &[&["A1", "2024-01-01 10:00:00"]],
        );
        let error = normalize_shopee(&sheet, "loja1", "Conta", &schema()).unwrap_err();
        assert_eq!(
            error,
            SkipReason::MissingColumns {
                missing: vec!["Status do pedido".to_string()],
                available: vec![
                    "ID do pedido".to_string(),
                    "Hora do pagamento do pedido".to_string(),
                ],
            }
        );
    }

    #[test]
    fn account_is_tagged_as_first_column() {
        let sheet = order_sheet(&[&["A1", "concluído", "2024-01-01 10:00:00"]]);
        let report = normalize_shopee(&sheet, "loja1", "Conta", &schema()).expect("normalized");
        assert_eq!(report.columns[0], "Conta");
        assert_eq!(report.rows[0].cells[0], "loja1");
    }

    #[test]
    fn shein_rows_are_tagged_and_otherwise_untouched() {
        let sheet = sheet(
            &["Pedido", "Valor"],
            &[&["S1", "10.50"], &["S2", "22.00"]],
        );
        let table = normalize_shein(&sheet, "loja2", "Conta");
        assert_eq!(table.columns, ["Conta", "Pedido", "Valor"]);
        assert_eq!(table.rows[0], ["loja2", "S1", "10.50"]);
        assert_eq!(table.rows[1], ["loja2", "S2", "22.00"]);
    }
}
