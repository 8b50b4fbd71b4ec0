//! Local persistence for the strategy rename map.
//!
//! The backend is the source of truth for renames; this store keeps a
//! normalized local copy so alias resolution still works when the backend
//! is unreachable. The file lives under a versioned name so a future
//! format change can migrate by switching filenames.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::client::BacktestApi;
use crate::error::Result;

/// From→to mapping of strategy renames. Keys are unique; the value chain
/// forms a forest that may contain cycles when the backend data is bad.
pub type RenameMap = BTreeMap<String, String>;

pub const RENAME_MAP_FILE: &str = "strategy_rename_map_v1.json";

/// Trim every key and value; drop entries that are empty after trimming
/// or that map an id to itself.
pub fn normalize(raw: impl IntoIterator<Item = (String, String)>) -> RenameMap {
    let mut map = RenameMap::new();
    for (from, to) in raw {
        let from = from.trim();
        let to = to.trim();
        if from.is_empty() || to.is_empty() || from == to {
            continue;
        }
        map.insert(from.to_string(), to.to_string());
    }
    map
}

/// Disk-backed store for the rename map.
///
/// Constructed once by the caller and passed into the orchestrator as an
/// explicit dependency, so independent instances (and tests) never share
/// state through a singleton.
pub struct RenameMapStore {
    path: PathBuf,
}

impl RenameMapStore {
    /// Create a store rooted at `state_dir`. The directory is created
    /// lazily on the first save.
    pub fn new(state_dir: &Path) -> Self {
        RenameMapStore {
            path: state_dir.join(RENAME_MAP_FILE),
        }
    }

    /// Location of the persisted map file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted map. An absent, unreadable, or corrupt file
    /// reads as an empty map; this never fails.
    pub fn load(&self) -> RenameMap {
        let Ok(raw) = std::fs::read_to_string(&self.path) else {
            return RenameMap::new();
        };
        match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
            Ok(parsed) => normalize(parsed),
            Err(error) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %error,
                    "rename map file corrupt; treating as empty"
                );
                RenameMap::new()
            }
        }
    }

    /// Normalize and atomically persist `map`, returning what was written.
    pub fn save(&self, map: &RenameMap) -> Result<RenameMap> {
        let normalized = normalize(map.clone());
        let data = serde_json::to_vec_pretty(&normalized)?;
        atomic_write(&self.path, &data)?;
        Ok(normalized)
    }

    /// Best-effort refresh from the backend.
    ///
    /// On success the fetched map is normalized, persisted, and returned.
    /// On any failure (network, decode, persist) the previously stored map
    /// is returned and the file is left untouched.
    pub async fn sync(&self, client: &impl BacktestApi) -> RenameMap {
        let remote = match client.fetch_rename_map().await {
            Ok(remote) => remote,
            Err(error) => {
                tracing::warn!(error = %error, "rename map sync failed; using local copy");
                return self.load();
            }
        };
        match self.save(&remote) {
            Ok(normalized) => normalized,
            Err(error) => {
                tracing::warn!(error = %error, "rename map persist failed; using local copy");
                self.load()
            }
        }
    }
}

/// Atomically write `data` to `path` using a tempfile in the same
/// directory, so a crash mid-write never leaves a truncated map behind.
fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
