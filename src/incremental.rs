//! Watermark-based incremental filtering of Shopee rows.

use tracing::debug;

use crate::model::OrderRow;

/// Result of trimming one account's rows against its watermark.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    /// Rows strictly newer than the watermark, still time-ordered.
    pub rows: Vec<OrderRow>,
    /// Order id the watermark advances to, `None` when no row survived (the
    /// stored watermark must then be left unchanged).
    pub advanced: Option<String>,
}

/// Keeps the rows strictly newer than the account's watermark.
///
/// `rows` must be sorted ascending by payment time. The cutoff is the
/// maximum payment time among rows carrying the watermark id, so a report
/// that lists the same order twice cannot hide rows behind the earlier
/// occurrence. A watermark id absent from the report applies no filtering at
/// all: an order that was removed or archived from the source report must
/// not block ingestion forever.
pub fn newer_than_watermark(mut rows: Vec<OrderRow>, last_order_id: Option<&str>) -> FilterOutcome {
    if let Some(order_id) = last_order_id {
        let cutoff = rows
            .iter()
            .filter(|row| row.order_id == order_id)
            .map(|row| row.paid_at)
            .max();
        match cutoff {
            Some(cutoff) => rows.retain(|row| row.paid_at > cutoff),
            None => debug!(order_id, "watermark order not in report; keeping all rows"),
        }
    }

    let advanced = rows.last().map(|row| row.order_id.clone());
    FilterOutcome { rows, advanced }
}
