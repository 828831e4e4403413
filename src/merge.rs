//! Accumulation of per-file rows into one consolidated table per platform.

use crate::model::ConsolidatedTable;

/// Folds report rows into a single table, computing the union of the
/// contributing column lists. Columns keep their first-seen order, so the
/// account column folded first stays first. Cells absent from a
/// contributing file are filled with empty strings in both directions.
#[derive(Debug, Clone, Default)]
pub struct TableAccumulator {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Folds one file's rows in. `rows` must be aligned to `columns`.
    pub fn fold(&mut self, columns: &[String], rows: impl IntoIterator<Item = Vec<String>>) {
        let mut positions = Vec::with_capacity(columns.len());
        for column in columns {
            let at = match self.columns.iter().position(|existing| existing == column) {
                Some(at) => at,
                None => {
                    self.columns.push(column.clone());
                    for row in &mut self.rows {
                        row.push(String::new());
                    }
                    self.columns.len() - 1
                }
            };
            positions.push(at);
        }

        for row in rows {
            let mut projected = vec![String::new(); self.columns.len()];
            for (cell, &at) in row.into_iter().zip(&positions) {
                projected[at] = cell;
            }
            self.rows.push(projected);
        }
    }

    pub fn into_table(self) -> ConsolidatedTable {
        ConsolidatedTable {
            columns: self.columns,
            rows: self.rows,
        }
    }
}
