//! Patch files - JSON snapshots of a ValueStore
//!
//! The file is an object keyed by channel, each holding an object keyed by
//! control, both as decimal strings: `{"3": {"10": 90}}`.

use super::store::ValueStore;
use crate::beatstep::{is_reserved, Channel, Control, MAX_CHANNEL, MAX_VALUE};
use crate::error::PatchError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Serialized form of a patch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchFile {
    pub channels: BTreeMap<Channel, BTreeMap<Control, u8>>,
}

impl PatchFile {
    pub fn from_store(store: &ValueStore) -> Self {
        Self {
            channels: store.channels().clone(),
        }
    }

    /// Validate and convert into a store
    ///
    /// The whole file is rejected if any entry is out of range or uses a
    /// reserved control, so a bad file never half-replaces the store.
    pub fn into_store(self) -> Result<ValueStore, String> {
        for (&channel, controls) in &self.channels {
            if channel > MAX_CHANNEL {
                return Err(format!("channel {} out of range", channel));
            }
            for (&control, &value) in controls {
                if control > MAX_VALUE {
                    return Err(format!("control {} out of range", control));
                }
                if is_reserved(control) {
                    return Err(format!("control {} is reserved", control));
                }
                if value > MAX_VALUE {
                    return Err(format!(
                        "value {} for channel {} control {} out of range",
                        value, channel, control
                    ));
                }
            }
        }
        Ok(ValueStore::from_channels(self.channels))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Read and validate a patch file
pub fn load_patch(path: impl AsRef<Path>) -> Result<ValueStore, PatchError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(PatchError::Missing(path.to_path_buf()));
    }

    let json = std::fs::read_to_string(path).map_err(|source| PatchError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let file: PatchFile = serde_json::from_str(&json).map_err(|e| PatchError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let store = file.into_store().map_err(|reason| PatchError::Corrupt {
        path: path.to_path_buf(),
        reason,
    })?;

    debug!("Patch loaded from {} ({} values)", path.display(), store.len());
    Ok(store)
}

/// Write `store` to a new timestamped file in `dir`
pub fn save_patch(dir: impl AsRef<Path>, store: &ValueStore) -> Result<PathBuf, PatchError> {
    save_patch_at(dir.as_ref(), store, Local::now())
}

pub(crate) fn save_patch_at(
    dir: &Path,
    store: &ValueStore,
    now: DateTime<Local>,
) -> Result<PathBuf, PatchError> {
    let json = PatchFile::from_store(store).to_json()?;
    let stem = format!("patch-{}", now.format("%Y%m%d%H%M"));

    let mut attempt = 1u32;
    loop {
        let name = if attempt == 1 {
            format!("{}.json", stem)
        } else {
            format!("{}-{}.json", stem, attempt)
        };
        let path = dir.join(name);

        // create_new keeps any earlier save with the same name intact
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(json.as_bytes())
                    .and_then(|_| file.sync_all())
                    .map_err(|source| PatchError::Save {
                        path: path.clone(),
                        source,
                    })?;
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < 1000 => {
                attempt += 1;
            }
            Err(source) => return Err(PatchError::Save { path, source }),
        }
    }
}
