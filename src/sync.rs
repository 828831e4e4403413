//! Single-shot orchestration of one consolidation-and-append run.
//!
//! `run_once` is the whole pipeline: discover report files, normalize and
//! watermark-filter them, fold them into one table per platform, persist the
//! tables and the watermarks, then append each freshly written table to its
//! tab in the shared spreadsheet. File-level and platform-level failures are
//! reported and contained; only environment-level failures (unreadable
//! reports directory, watermark write) abort the run.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, instrument, warn};

use crate::config::AppConfig;
use crate::error::{Result, SyncError};
use crate::incremental::newer_than_watermark;
use crate::io::sheets::SheetValues;
use crate::io::{excel_read, excel_write};
use crate::merge::TableAccumulator;
use crate::model::{Platform, parse_report_name};
use crate::normalize::{normalize_shein, normalize_shopee};
use crate::position::resolve_append_row;
use crate::watermark::WatermarkStore;

/// Excel lock-file prefix; such entries are another process's scratch state.
const TEMP_FILE_MARKER: &str = "~$";
/// Our own consolidated outputs carry this marker and must never be
/// re-ingested as reports.
const OUTPUT_FILE_MARKER: &str = "consolidated";

/// Runs one full discovery → normalize → filter → merge → persist → append
/// pass.
#[instrument(level = "info", skip_all, fields(reports = %config.reports_dir.display()))]
pub fn run_once(config: &AppConfig, sheets: &dyn SheetValues) -> Result<()> {
    let store = WatermarkStore::new(&config.watermark_path);
    let mut watermarks = store.load()?;

    let (shopee, shein) = consolidate(config, &mut watermarks)?;

    let shopee_written = persist_platform(config, Platform::Shopee, shopee)?;
    let shein_written = persist_platform(config, Platform::Shein, shein)?;
    if shopee_written {
        store.save(&watermarks)?;
    }

    for (platform, written) in [
        (Platform::Shopee, shopee_written),
        (Platform::Shein, shein_written),
    ] {
        if !written {
            continue;
        }
        if let Err(failure) = push_table(config, sheets, platform) {
            match failure {
                SyncError::MissingInput(path) => warn!(
                    path = %path.display(),
                    "consolidated file missing at append time; skipping platform"
                ),
                failure => error!(%platform, %failure, "append to shared spreadsheet failed"),
            }
        }
    }

    Ok(())
}

/// Processes every discovered report into the two platform accumulators,
/// advancing `watermarks` in memory as Shopee files are filtered.
#[instrument(level = "info", skip_all)]
pub fn consolidate(
    config: &AppConfig,
    watermarks: &mut BTreeMap<String, String>,
) -> Result<(TableAccumulator, TableAccumulator)> {
    let reports = discover_reports(&config.reports_dir)?;
    if reports.is_empty() {
        warn!(dir = %config.reports_dir.display(), "no report files found");
    }

    let mut shopee = TableAccumulator::new();
    let mut shein = TableAccumulator::new();
    for path in reports {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        let name = match parse_report_name(&file_name) {
            Ok(name) => name,
            Err(reason) => {
                warn!(file = %file_name, %reason, "skipping report");
                continue;
            }
        };

        let outcome = match name.platform {
            Platform::Shopee => {
                ingest_shopee(config, &path, &name.account, watermarks, &mut shopee)
            }
            Platform::Shein => ingest_shein(config, &path, &name.account, &mut shein),
        };
        if let Err(failure) = outcome {
            error!(file = %file_name, %failure, "failed to ingest report; continuing");
        }
    }

    Ok((shopee, shein))
}

/// Lists the `.xlsx` report candidates in the reports directory, leaving out
/// Excel lock files and our own consolidated outputs. Sorted for a
/// deterministic processing order.
pub fn discover_reports(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut reports = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if path.extension().and_then(|ext| ext.to_str()) != Some("xlsx") {
            continue;
        }
        if name.starts_with(TEMP_FILE_MARKER) || name.contains(OUTPUT_FILE_MARKER) {
            continue;
        }
        reports.push(path);
    }
    reports.sort();
    Ok(reports)
}

fn ingest_shopee(
    config: &AppConfig,
    path: &Path,
    account: &str,
    watermarks: &mut BTreeMap<String, String>,
    accumulator: &mut TableAccumulator,
) -> Result<()> {
    let sheet = excel_read::read_report(path, Platform::Shopee.header_offset())?;
    info!(
        account,
        rows = sheet.rows.len(),
        file = %path.display(),
        "processing Shopee report"
    );

    let report = match normalize_shopee(&sheet, account, &config.account_column, &config.shopee) {
        Ok(report) => report,
        Err(reason) => {
            warn!(account, %reason, "skipping report");
            return Ok(());
        }
    };

    let outcome = newer_than_watermark(report.rows, watermarks.get(account).map(String::as_str));
    info!(account, new_rows = outcome.rows.len(), "rows newer than watermark");
    if let Some(order_id) = outcome.advanced {
        info!(account, order_id, "watermark advanced");
        watermarks.insert(account.to_string(), order_id);
    }
    if !outcome.rows.is_empty() {
        accumulator.fold(
            &report.columns,
            outcome.rows.into_iter().map(|row| row.cells),
        );
    }
    Ok(())
}

fn ingest_shein(
    config: &AppConfig,
    path: &Path,
    account: &str,
    accumulator: &mut TableAccumulator,
) -> Result<()> {
    let sheet = excel_read::read_report(path, Platform::Shein.header_offset())?;
    let table = normalize_shein(&sheet, account, &config.account_column);
    info!(
        account,
        rows = table.rows.len(),
        file = %path.display(),
        "merging Shein report"
    );
    if !table.rows.is_empty() {
        accumulator.fold(&table.columns, table.rows);
    }
    Ok(())
}

/// Writes one platform's accumulated table to its consolidated workbook.
/// Returns whether anything was written; an empty accumulator leaves the
/// previous file untouched.
fn persist_platform(
    config: &AppConfig,
    platform: Platform,
    accumulator: TableAccumulator,
) -> Result<bool> {
    if accumulator.is_empty() {
        info!(%platform, "no rows to write this run");
        return Ok(false);
    }
    let table = accumulator.into_table();
    let path = config.output_path(platform);
    excel_write::write_table(&path, &config.worksheet_name, &table)?;
    info!(
        %platform,
        rows = table.rows.len(),
        path = %path.display(),
        "wrote consolidated workbook"
    );
    Ok(true)
}

/// Re-reads one platform's consolidated workbook and appends its data rows
/// to the matching tab, starting at the resolved append position. The append
/// is a single transport call, so column A and the data columns land
/// together or not at all.
#[instrument(level = "info", skip(config, sheets), fields(tab = platform.tab_name()))]
fn push_table(config: &AppConfig, sheets: &dyn SheetValues, platform: Platform) -> Result<()> {
    let path = config.output_path(platform);
    let sheet = excel_read::read_table(&path, &config.worksheet_name)?;
    if sheet.rows.is_empty() {
        info!("consolidated workbook has no data rows; nothing to append");
        return Ok(());
    }

    let column_a = sheets.column_a(platform.tab_name())?;
    let start_row = resolve_append_row(&column_a);
    sheets.append(platform.tab_name(), start_row, &sheet.rows)?;
    info!(
        start_row,
        rows = sheet.rows.len(),
        "appended rows to shared spreadsheet"
    );
    Ok(())
}
