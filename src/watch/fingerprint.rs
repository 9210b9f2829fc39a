use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::UNIX_EPOCH,
};

use crate::{
    assets::resolve::{ResolveContext, read_listing, resolve},
    settings::model::MergeSettings,
};

/// Modification stamps of the files a merge depends on.
///
/// Stamps are nanoseconds since the Unix epoch; a file that cannot be
/// stat'ed gets `0`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fingerprint {
    stamps: BTreeMap<PathBuf, u128>,
}

impl Fingerprint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, stamp: u128) {
        self.stamps.insert(path.into(), stamp);
    }

    /// Record the current stamp of `path`.
    pub fn record(&mut self, path: &Path) {
        self.insert(path, modified_stamp(path));
    }

    pub fn get(&self, path: &Path) -> Option<u128> {
        self.stamps.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// True when `self` differs from `previous`: a path is new, has a
    /// different stamp, or is gone.
    pub fn is_stale_since(&self, previous: &Fingerprint) -> bool {
        self.stamps.len() != previous.stamps.len()
            || self
                .stamps
                .iter()
                .any(|(path, stamp)| previous.stamps.get(path) != Some(stamp))
    }
}

impl FromIterator<(PathBuf, u128)> for Fingerprint {
    fn from_iter<I: IntoIterator<Item = (PathBuf, u128)>>(iter: I) -> Self {
        Self {
            stamps: iter.into_iter().collect(),
        }
    }
}

/// Last-modified time of `path` in nanoseconds, or `0` when unavailable.
pub fn modified_stamp(path: &Path) -> u128 {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_nanos())
}

/// Polls the settings file and every layer file for changes.
///
/// Layer patterns are resolved again on each poll, so a new `<VER>` file or a
/// switch to another extension shows up as a changed key set.
#[derive(Clone, Debug)]
pub struct ChangeTracker {
    settings_path: Option<PathBuf>,
    dir: PathBuf,
    id: Option<String>,
    patterns: Vec<String>,
}

impl ChangeTracker {
    pub fn new(
        settings_path: Option<PathBuf>,
        dir: impl Into<PathBuf>,
        settings: &MergeSettings,
    ) -> Self {
        Self {
            settings_path,
            dir: dir.into(),
            id: settings.id.clone(),
            patterns: settings
                .source_images
                .iter()
                .map(|s| s.file_name.clone())
                .collect(),
        }
    }

    /// Stamps of the settings file and of every layer file that resolves now.
    #[tracing::instrument(level = "trace", skip(self), fields(dir = %self.dir.display()))]
    pub fn current_fingerprint(&self) -> Fingerprint {
        let mut fp = Fingerprint::new();
        if let Some(path) = &self.settings_path {
            fp.record(path);
        }

        let listing = match read_listing(&self.dir) {
            Ok(listing) => listing,
            Err(err) => {
                tracing::warn!(%err, "cannot list working directory");
                return fp;
            }
        };
        let ctx = ResolveContext::new(self.id.as_deref(), &listing);
        for name in self.patterns.iter().filter_map(|p| resolve(p, &ctx)) {
            fp.record(&self.dir.join(name));
        }
        fp
    }

    /// Whether anything changed since `previous` was taken.
    pub fn is_stale(&self, previous: &Fingerprint) -> bool {
        self.current_fingerprint().is_stale_since(previous)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/watch/fingerprint.rs"]
mod tests;
