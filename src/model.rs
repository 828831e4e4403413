use std::fmt;

use chrono::NaiveDateTime;

use crate::error::SkipReason;

/// The two e-commerce sources the tool understands. Each has its own raw
/// report shape and its own tab in the shared spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Shopee,
    Shein,
}

impl Platform {
    /// Parses the platform tag taken from a report file name. Tags are
    /// matched case-insensitively.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "shp" => Some(Platform::Shopee),
            "shein" => Some(Platform::Shein),
            _ => None,
        }
    }

    /// Name of the destination tab in the shared spreadsheet.
    pub fn tab_name(self) -> &'static str {
        match self {
            Platform::Shopee => "SHOPEE",
            Platform::Shein => "SHEIN",
        }
    }

    /// File name of the consolidated workbook written each run.
    pub fn output_file_name(self) -> &'static str {
        match self {
            Platform::Shopee => "consolidated_shopee.xlsx",
            Platform::Shein => "consolidated_shein.xlsx",
        }
    }

    /// Number of leading rows to discard before the header row. Shein
    /// exports carry one extra banner row above the header.
    pub fn header_offset(self) -> usize {
        match self {
            Platform::Shopee => 0,
            Platform::Shein => 1,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Shopee => write!(f, "shopee"),
            Platform::Shein => write!(f, "shein"),
        }
    }
}

/// Account and platform carried by a report file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportName {
    pub account: String,
    pub platform: Platform,
}

/// Splits a report file name into its account and platform parts. The first
/// whitespace-delimited token is the account (used verbatim, case-sensitive)
/// and the second is the platform tag.
pub fn parse_report_name(file_name: &str) -> Result<ReportName, SkipReason> {
    let mut tokens = file_name.split_whitespace();
    let (Some(account), Some(tag)) = (tokens.next(), tokens.next()) else {
        return Err(SkipReason::BadFileName);
    };
    let platform =
        Platform::from_tag(tag).ok_or_else(|| SkipReason::UnknownPlatform(tag.to_string()))?;
    Ok(ReportName {
        account: account.to_string(),
        platform,
    })
}

/// One validated Shopee sales row. `cells` is aligned to its report's column
/// list, with the account tag already in place.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
    pub order_id: String,
    pub paid_at: NaiveDateTime,
    pub cells: Vec<String>,
}

/// One platform's consolidated table, the column union of every contributing
/// report with the account column first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConsolidatedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
