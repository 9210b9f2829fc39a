use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::{
    assets::decode::{RasterImage, decode_file},
    assets::mask::{MaskGrid, build_mask},
    settings::layer::{AlphaPolicy, LayerSpec, MaskRule, Offset, ShadowPolicy},
};

/// A layer after resolution and decoding.
///
/// Unavailable layers (unresolved pattern, missing file, decode failure)
/// keep their slot in the stack with no pixels and are skipped when
/// compositing.
#[derive(Clone, Debug)]
pub struct ResolvedLayer {
    /// Position in the settings list (0 = visually on top).
    pub index: usize,
    /// Resolved file path, if the pattern resolved.
    pub path: Option<PathBuf>,
    pub image: Option<RasterImage>,
    pub mask: Option<MaskGrid>,
    pub offset: Offset,
    pub alpha: Option<AlphaPolicy>,
    pub shadow: ShadowPolicy,
    pub mask_rules: Vec<MaskRule>,
}

impl ResolvedLayer {
    /// A placeholder for a layer that cannot be drawn.
    pub fn unavailable(index: usize, path: Option<PathBuf>) -> Self {
        Self {
            index,
            path,
            image: None,
            mask: None,
            offset: Offset::default(),
            alpha: None,
            shadow: ShadowPolicy::default(),
            mask_rules: Vec::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.image.is_some()
    }

    pub fn width(&self) -> u32 {
        self.image.as_ref().map_or(0, |i| i.width)
    }

    pub fn height(&self) -> u32 {
        self.image.as_ref().map_or(0, |i| i.height)
    }

    pub fn is_masked(&self, x: u32, y: u32) -> bool {
        self.mask.as_ref().is_some_and(|m| m.get(x, y))
    }

    /// Build the region mask from `mask_rules`, if the layer declares any.
    pub fn attach_mask(&mut self) {
        if self.mask_rules.is_empty() {
            return;
        }
        if let Some(image) = &self.image {
            self.mask = Some(build_mask(image, &self.mask_rules));
        }
    }
}

/// Decode `file_name` (relative to `dir`) for `spec`.
///
/// Never fails: an unresolved name, a file that is not on disk, or a decode
/// error all produce an unavailable layer and a warning. The region mask is
/// not built here; see [`attach_masks`].
pub fn load_layer(spec: &LayerSpec, file_name: Option<&str>, dir: &Path) -> ResolvedLayer {
    let Some(file_name) = file_name else {
        tracing::warn!(layer = spec.index, pattern = %spec.pattern, "layer pattern did not resolve");
        return ResolvedLayer::unavailable(spec.index, None);
    };

    let path = dir.join(file_name);
    if !path.is_file() {
        tracing::warn!(layer = spec.index, path = %path.display(), "layer file not found");
        return ResolvedLayer::unavailable(spec.index, Some(path));
    }

    let image = match decode_file(&path) {
        Ok(image) => image,
        Err(err) => {
            tracing::warn!(layer = spec.index, %err, "layer failed to decode");
            return ResolvedLayer::unavailable(spec.index, Some(path));
        }
    };
    tracing::debug!(
        layer = spec.index,
        path = %path.display(),
        width = image.width,
        height = image.height,
        "layer decoded"
    );

    ResolvedLayer {
        index: spec.index,
        path: Some(path),
        image: Some(image),
        mask: None,
        offset: spec.offset,
        alpha: spec.alpha.clone(),
        shadow: spec.shadow,
        mask_rules: spec.mask_rules.clone(),
    }
}

/// Build every layer's region mask. Masks only read their own layer, so
/// layers are processed in parallel when `parallel` is set.
pub fn attach_masks(layers: &mut [ResolvedLayer], parallel: bool) {
    if parallel {
        layers.par_iter_mut().for_each(ResolvedLayer::attach_mask);
    } else {
        layers.iter_mut().for_each(ResolvedLayer::attach_mask);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/load.rs"]
mod tests;
