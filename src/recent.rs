use std::path::{Path, PathBuf};

use crate::foundation::error::{MergeError, MergeResult};

const DEFAULT_FILE_NAME: &str = "layermerge_recent.json";

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_loaded_file_path: Option<PathBuf>,
}

/// Remembers the last settings file that was opened.
#[derive(Clone, Debug)]
pub struct RecentStore {
    path: PathBuf,
    record: RecentRecord,
}

impl RecentStore {
    /// Next to the running executable, or in the current directory when that
    /// cannot be determined.
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.join(DEFAULT_FILE_NAME)))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_NAME))
    }

    /// Read the store at `path`. A missing or unreadable store starts empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let record = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), %err, "ignoring malformed recent store");
                RecentRecord::default()
            }),
            Err(_) => RecentRecord::default(),
        };
        Self { path, record }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The remembered settings path, if it still exists.
    pub fn last_opened(&self) -> Option<&Path> {
        self.record
            .last_loaded_file_path
            .as_deref()
            .filter(|p| p.is_file())
    }

    /// Record `settings_path` and write the store.
    pub fn remember(&mut self, settings_path: &Path) -> MergeResult<()> {
        let absolute =
            std::path::absolute(settings_path).map_err(|e| MergeError::io(settings_path, e))?;
        self.record.last_loaded_file_path = Some(absolute);

        let text = serde_json::to_string_pretty(&self.record)
            .map_err(|e| anyhow::anyhow!("serialize recent-file store: {e}"))?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| MergeError::io(parent, e))?;
        }
        std::fs::write(&self.path, text).map_err(|e| MergeError::io(&self.path, e))
    }
}

#[cfg(test)]
#[path = "../tests/unit/recent.rs"]
mod tests;
