use std::path::PathBuf;

use crate::model::Platform;

/// Column headers and status policy of the raw Shopee order export.
///
/// Defaults match the pt-BR export; every header is configurable because
/// Shopee localises them per seller region.
#[derive(Debug, Clone)]
pub struct ShopeeSchema {
    /// Header of the platform-assigned order identifier column.
    pub order_id_column: String,
    /// Header of the order status column.
    pub status_column: String,
    /// Header of the payment timestamp column.
    pub paid_at_column: String,
    /// Statuses (lowercase) whose rows are dropped during normalization.
    pub excluded_statuses: Vec<String>,
}

impl Default for ShopeeSchema {
    fn default() -> Self {
        Self {
            order_id_column: "ID do pedido".to_string(),
            status_column: "Status do pedido".to_string(),
            paid_at_column: "Hora do pagamento do pedido".to_string(),
            excluded_statuses: vec!["não pago".to_string(), "cancelado".to_string()],
        }
    }
}

impl ShopeeSchema {
    /// Headers that must be present for a report to be processed at all.
    pub fn required_columns(&self) -> [&str; 3] {
        [
            &self.order_id_column,
            &self.status_column,
            &self.paid_at_column,
        ]
    }

    /// Whether a raw status cell falls in the exclusion set. Matching is
    /// case- and surrounding-whitespace-insensitive.
    pub fn is_excluded(&self, status: &str) -> bool {
        let normalized = status.trim().to_lowercase();
        self.excluded_statuses
            .iter()
            .any(|excluded| excluded == &normalized)
    }
}

/// Everything one run needs, built from CLI arguments and passed by
/// reference into each component. There is no other shared state.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory scanned for per-account report files.
    pub reports_dir: PathBuf,
    /// Directory receiving the consolidated workbooks.
    pub output_dir: PathBuf,
    /// JSON file tracking the last processed order id per account.
    pub watermark_path: PathBuf,
    /// Service-account key granting spreadsheet read/write access.
    pub credentials_path: PathBuf,
    /// Identifier of the destination Google Sheets document.
    pub spreadsheet_id: String,
    /// Worksheet name used inside the consolidated workbooks.
    pub worksheet_name: String,
    /// Header of the account column prepended to every row.
    pub account_column: String,
    /// Shape of the raw Shopee export.
    pub shopee: ShopeeSchema,
}

impl AppConfig {
    /// Path of the consolidated workbook for one platform.
    pub fn output_path(&self, platform: Platform) -> PathBuf {
        self.output_dir.join(platform.output_file_name())
    }
}
