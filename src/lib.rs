//! Layermerge composites an ordered stack of raster images into one output
//! image from a declarative JSON settings file.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: each layer's `fileName` pattern (`<ID>`, `.<EXT>`, `<VER>`)
//!    is matched against the working directory.
//! 2. **Load**: resolved files are decoded to straight RGBA8; region masks are
//!    built from marker colors.
//! 3. **Composite**: layers are painted back to front onto an opaque white
//!    canvas through the per-pixel chain mask, skip, shadow, replace, blend.
//! 4. **Post-process** (optional): a grayscale pass.
//! 5. **Encode**: the canvas is written as PNG, BMP, GIF or JPEG depending on
//!    the output extension.
//!
//! [`MergeSession`] wraps the pipeline for a settings file on disk, keeps the
//! last good result, and reports staleness through a [`Fingerprint`] of every
//! input file.
//!
//! Pure white is the "nothing here" value for every layer above the backdrop.
#![forbid(unsafe_code)]

mod assets;
mod foundation;
mod merger;
mod recent;
mod render;
mod settings;
mod watch;

pub use assets::decode::{RasterImage, decode_file, decode_image};
pub use assets::load::{ResolvedLayer, attach_masks, load_layer};
pub use assets::mask::{MaskGrid, build_mask};
pub use assets::resolve::{
    ResolveContext, SUPPORTED_EXTENSIONS, read_listing, resolve, resolve_extension,
    resolve_version, substitute_id,
};
pub use foundation::error::{MergeError, MergeResult};
pub use foundation::pixel::{GRAY_LADDER, Rgba8, contains_rgb};
pub use merger::{MergeOutput, MergeSession, SaveOutcome, refresh, refresh_with};
pub use recent::RecentStore;
pub use render::canvas::MergedCanvas;
pub use render::composite::{CompositeThreading, composite, shade_pixel};
pub use render::encode::{OutputFormat, save_canvas};
pub use render::postprocess::grayscale;
pub use settings::layer::{
    AlphaPolicy, ColorReplacementRule, LayerSpec, MaskRule, Offset, ShadowPolicy,
    apply_replacements, compile_layers, compile_replacements,
};
pub use settings::model::{
    AlphaSettings, ColorReplacementSettings, MergeSettings, RegionMaskSettings,
    SourceImageSettings,
};
pub use watch::fingerprint::{ChangeTracker, Fingerprint, modified_stamp};
pub use watch::rate_limit::{DEFAULT_MIN_SAVE_INTERVAL, RateLimiter};
