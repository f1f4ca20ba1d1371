//! File persistence for option snapshots.
//!
//! Stands in for the host's options table: a snapshot is written as JSON or
//! TOML depending on the file extension, and a missing file reads back as the
//! type's fallback value. TOML has no null, so `null`s are left out of TOML
//! snapshots and read back as absent.

use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{OptionsError, Result};

/// On-disk format of a persisted snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    /// Pick the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        match ext {
            "json" => Ok(FileFormat::Json),
            "toml" | "tml" => Ok(FileFormat::Toml),
            ext => Err(OptionsError::UnsupportedFormat(ext.to_string())),
        }
    }

    /// Parse `content` in this format.
    pub fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T> {
        let v = match self {
            FileFormat::Json => serde_json::from_str(content)?,
            FileFormat::Toml => toml::from_str(content)?,
        };
        Ok(v)
    }

    /// Render `value` in this format.
    pub fn render<T: Serialize>(self, value: &T) -> Result<String> {
        let s = match self {
            FileFormat::Json => serde_json::to_string_pretty(value)?,
            FileFormat::Toml => {
                let mut tree = serde_json::to_value(value)?;
                let dropped = strip_nulls(&mut tree);
                if dropped > 0 {
                    warn!("{dropped} null value(s) can not be written to TOML, left out");
                }
                toml::to_string_pretty(&tree)?
            }
        };
        Ok(s)
    }
}

/// Removes every `null` from `value`, returning how many were removed.
fn strip_nulls(value: &mut Value) -> usize {
    match value {
        Value::Object(map) => {
            let before = map.len();
            map.retain(|_, v| !v.is_null());
            let removed = before - map.len();
            removed + map.values_mut().map(strip_nulls).sum::<usize>()
        }
        Value::Array(items) => {
            let before = items.len();
            items.retain(|v| !v.is_null());
            let removed = before - items.len();
            removed + items.iter_mut().map(strip_nulls).sum::<usize>()
        }
        _ => 0,
    }
}

/// Load a snapshot, falling back to `T::default()` when the file is missing
/// or blank.
pub fn load<T: DeserializeOwned + Default>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)?;

    if !path.exists() {
        debug!("{} not found, using fallback options", path.display());
        return Ok(T::default());
    }

    let content = fs::read_to_string(path).map_err(|e| OptionsError::io(path, e))?;
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    format.parse(&content)
}

/// Write a snapshot, copying any existing file to a timestamped backup first.
///
/// Returns the backup path when one was made.
pub fn save<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<Option<PathBuf>> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)?;
    let s = format.render(value)?;

    let mut backup = None;
    if path.exists() {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let backup_path = path.with_extension(format!("bk-{secs}.{ext}"));
        fs::copy(path, &backup_path).map_err(|e| OptionsError::io(&backup_path, e))?;
        debug!("backed up {} to {}", path.display(), backup_path.display());
        backup = Some(backup_path);
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| OptionsError::io(parent, e))?;
    }
    fs::write(path, s).map_err(|e| OptionsError::io(path, e))?;
    info!("options saved to {}", path.display());
    Ok(backup)
}
