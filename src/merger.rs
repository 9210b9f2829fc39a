use std::path::{Path, PathBuf};

use crate::{
    assets::load::{ResolvedLayer, attach_masks, load_layer},
    assets::resolve::{ResolveContext, read_listing, resolve},
    foundation::error::MergeResult,
    render::canvas::MergedCanvas,
    render::composite::{CompositeThreading, composite},
    render::encode::save_canvas,
    render::postprocess::grayscale,
    settings::layer::{compile_layers, compile_replacements},
    settings::model::MergeSettings,
    watch::fingerprint::{ChangeTracker, Fingerprint},
    watch::rate_limit::RateLimiter,
};

/// Result of one successful merge.
#[derive(Clone, Debug)]
pub struct MergeOutput {
    pub canvas: MergedCanvas,
    /// Where the canvas is meant to be written.
    pub output_path: PathBuf,
    /// Files that were drawn, in settings order.
    pub resolved_files: Vec<PathBuf>,
    /// Settings indices of layers that were skipped.
    pub unavailable: Vec<usize>,
}

/// Merge `settings` against the files in `working_dir`, single-threaded.
pub fn refresh(settings: &MergeSettings, working_dir: &Path) -> MergeResult<MergeOutput> {
    refresh_with(settings, working_dir, &CompositeThreading::default())
}

/// Resolve, load, mask and composite every layer, then run the grayscale
/// pass if the settings ask for it.
///
/// Layers that cannot be drawn are dropped with a warning; the merge only
/// fails when none is left.
#[tracing::instrument(
    skip(settings, threading),
    fields(layers = settings.source_images.len(), dir = %working_dir.display())
)]
pub fn refresh_with(
    settings: &MergeSettings,
    working_dir: &Path,
    threading: &CompositeThreading,
) -> MergeResult<MergeOutput> {
    settings.validate()?;
    let listing = read_listing(working_dir)?;
    let ctx = ResolveContext::new(settings.id.as_deref(), &listing);

    let mut layers: Vec<ResolvedLayer> = compile_layers(settings)
        .into_iter()
        .enumerate()
        .map(|(index, compiled)| match compiled {
            Ok(spec) => {
                let name = resolve(&spec.pattern, &ctx);
                load_layer(&spec, name.as_deref(), working_dir)
            }
            Err(err) => {
                tracing::warn!(layer = index, %err, "layer settings rejected");
                ResolvedLayer::unavailable(index, None)
            }
        })
        .collect();
    attach_masks(&mut layers, threading.parallel);

    let replacements = compile_replacements(&settings.color_replacement);
    let mut canvas = composite(&layers, &replacements, threading)?;
    if settings.auto_gray_scaling {
        grayscale(&mut canvas, threading.parallel);
    }

    let (drawn, skipped): (Vec<_>, Vec<_>) = layers.iter().partition(|l| l.is_available());
    tracing::debug!(
        drawn = drawn.len(),
        skipped = skipped.len(),
        width = canvas.width,
        height = canvas.height,
        "merge complete"
    );

    Ok(MergeOutput {
        canvas,
        output_path: working_dir.join(settings.output_file_name()),
        resolved_files: drawn.iter().filter_map(|l| l.path.clone()).collect(),
        unavailable: skipped.iter().map(|l| l.index).collect(),
    })
}

/// What [`MergeSession::save`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    /// The rate limiter refused; nothing was written.
    Throttled,
    /// No merge has succeeded yet.
    NothingToSave,
}

/// A settings file plus the last good merge made from it.
///
/// Everything that touches the merged canvas takes `&mut self`, so a refresh
/// and a save can never overlap on one session.
#[derive(Debug)]
pub struct MergeSession {
    settings_path: PathBuf,
    working_dir: PathBuf,
    threading: CompositeThreading,
    force_gray: bool,
    output_override: Option<PathBuf>,
    settings: Option<MergeSettings>,
    output: Option<MergeOutput>,
    fingerprint: Option<Fingerprint>,
    tracker: Option<ChangeTracker>,
}

impl MergeSession {
    /// A session for `settings_path`. Layers resolve against the settings
    /// file's directory. Nothing is read until [`MergeSession::refresh`].
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        let settings_path = settings_path.into();
        let working_dir = match settings_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self {
            settings_path,
            working_dir,
            threading: CompositeThreading::default(),
            force_gray: false,
            output_override: None,
            settings: None,
            output: None,
            fingerprint: None,
            tracker: None,
        }
    }

    pub fn with_threading(mut self, threading: CompositeThreading) -> Self {
        self.threading = threading;
        self
    }

    /// Desaturate even when the settings do not ask for it.
    pub fn with_gray(mut self, force_gray: bool) -> Self {
        self.force_gray = force_gray;
        self
    }

    /// Write to `path` instead of the settings' `outputFileName`.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_override = Some(path.into());
        self
    }

    /// Settings of the last successful refresh.
    pub fn settings(&self) -> Option<&MergeSettings> {
        self.settings.as_ref()
    }

    pub fn output(&self) -> Option<&MergeOutput> {
        self.output.as_ref()
    }

    pub fn canvas(&self) -> Option<&MergedCanvas> {
        self.output.as_ref().map(|o| &o.canvas)
    }

    /// Fingerprint taken by the last successful refresh.
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        self.fingerprint.as_ref()
    }

    /// Where [`MergeSession::save`] writes.
    pub fn output_path(&self) -> Option<PathBuf> {
        self.output_override
            .clone()
            .or_else(|| self.output.as_ref().map(|o| o.output_path.clone()))
    }

    /// Re-read the settings and merge again.
    ///
    /// On failure the previous canvas and fingerprint stay in place.
    #[tracing::instrument(skip(self), fields(settings = %self.settings_path.display()))]
    pub fn refresh(&mut self) -> MergeResult<&MergeOutput> {
        let mut settings = MergeSettings::from_path(&self.settings_path)?;
        if self.force_gray {
            settings.auto_gray_scaling = true;
        }

        // Stamp before reading layers so an edit made mid-merge still shows as stale.
        let tracker = ChangeTracker::new(
            Some(self.settings_path.clone()),
            &self.working_dir,
            &settings,
        );
        let fingerprint = tracker.current_fingerprint();
        let output = refresh_with(&settings, &self.working_dir, &self.threading)?;

        self.settings = Some(settings);
        self.tracker = Some(tracker);
        self.fingerprint = Some(fingerprint);
        Ok(&*self.output.insert(output))
    }

    /// Stamps of the inputs as they are on disk now.
    ///
    /// Before the first successful refresh only the settings file is covered.
    pub fn current_fingerprint(&self) -> Fingerprint {
        match &self.tracker {
            Some(tracker) => tracker.current_fingerprint(),
            None => ChangeTracker::new(
                Some(self.settings_path.clone()),
                &self.working_dir,
                &MergeSettings::default(),
            )
            .current_fingerprint(),
        }
    }

    /// Whether the inputs changed since the last successful refresh. A
    /// session that never merged is always stale.
    pub fn is_stale(&self) -> bool {
        match &self.fingerprint {
            Some(previous) => self.current_fingerprint().is_stale_since(previous),
            None => true,
        }
    }

    /// Write the current canvas if `limiter` allows it.
    pub fn save(&mut self, limiter: &RateLimiter) -> MergeResult<SaveOutcome> {
        let (Some(output), Some(path)) = (self.output.as_ref(), self.output_path()) else {
            return Ok(SaveOutcome::NothingToSave);
        };
        if !limiter.try_acquire() {
            tracing::debug!(path = %path.display(), "save throttled");
            return Ok(SaveOutcome::Throttled);
        }
        save_canvas(&output.canvas, &path)?;
        Ok(SaveOutcome::Saved(path))
    }
}

#[cfg(test)]
#[path = "../tests/unit/merger.rs"]
mod tests;
