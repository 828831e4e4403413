use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::error::Result;

/// Persisted mapping of account name to the last processed order id.
///
/// The store is loaded once at run start, mutated in memory while reports
/// are processed, and saved at most once at run end. It is never rolled
/// back mid-run.
#[derive(Debug, Clone)]
pub struct WatermarkStore {
    path: PathBuf,
}

impl WatermarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the persisted watermarks. An absent file is a first run and
    /// yields an empty map; a present but unreadable file is an error.
    pub fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Persists the watermarks. The content is written to a sibling file and
    /// renamed into place, so a crash mid-write never leaves the previous
    /// state partially overwritten.
    pub fn save(&self, watermarks: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(watermarks)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}
