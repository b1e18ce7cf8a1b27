// JSON file persistence for the play log, the session, and the team roster.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use waves_core::PlayRecord;

/// Read a JSON document, or `None` when the file does not exist yet.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let value = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(value))
}

/// Write a JSON document, creating parent directories. The file is written
/// to a sibling temp file first and renamed into place.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let text = serde_json::to_string_pretty(value).context("failed to serialize JSON")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, text).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

/// The play history stored as a flat JSON array of records.
pub struct LogStore {
    path: PathBuf,
}

impl LogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// All stored records in commit order. A missing file is an empty log.
    pub fn load(&self) -> Result<Vec<PlayRecord>> {
        let records: Vec<PlayRecord> = read_json(&self.path)?.unwrap_or_default();
        debug!(count = records.len(), path = %self.path.display(), "loaded play log");
        Ok(records)
    }

    pub fn save(&self, records: &[PlayRecord]) -> Result<()> {
        write_json(&self.path, records)?;
        debug!(count = records.len(), path = %self.path.display(), "saved play log");
        Ok(())
    }

    /// Write a copy of the history to `dest`.
    pub fn export_to(&self, records: &[PlayRecord], dest: &Path) -> Result<()> {
        write_json(dest, records)?;
        info!(count = records.len(), dest = %dest.display(), "exported play log");
        Ok(())
    }

    /// Read a previously exported history. The file must hold a JSON array of
    /// records; anything else is rejected before the current log is touched.
    ///
    /// State ids are rebuilt from each record's game state, so logs keyed in
    /// another format (the Japanese scorer's `序盤_同点_...` ids) aggregate
    /// with plays logged here.
    pub fn read_import(src: &Path) -> Result<Vec<PlayRecord>> {
        let text =
            fs::read_to_string(src).with_context(|| format!("failed to read {}", src.display()))?;
        let value: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("{} is not valid JSON", src.display()))?;
        if !value.is_array() {
            bail!("{} does not contain a list of play records", src.display());
        }
        let mut records: Vec<PlayRecord> = serde_json::from_value(value)
            .with_context(|| format!("{} contains malformed play records", src.display()))?;
        for record in &mut records {
            let fingerprint = record.game_state.fingerprint();
            if record.state_id != fingerprint {
                debug!(from = %record.state_id, to = %fingerprint, "re-keyed imported record");
                record.state_id = fingerprint;
            }
        }
        Ok(records)
    }

    /// Replace the stored history with the contents of `src`.
    pub fn import_from(&self, src: &Path) -> Result<Vec<PlayRecord>> {
        let records = Self::read_import(src)?;
        self.save(&records)?;
        info!(count = records.len(), src = %src.display(), "imported play log");
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
