use crate::{
    foundation::error::MergeResult,
    foundation::pixel::{Rgba8, contains_rgb},
    settings::model::{ColorReplacementSettings, MergeSettings, SourceImageSettings},
};

/// Canvas offset of a layer, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

/// How a layer blends into what is already on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct AlphaPolicy {
    /// Weight of the layer's color.
    pub value: f32,
    /// Colors drawn as-is.
    pub ignore_list: Vec<Rgba8>,
    /// Masked pixels are drawn as-is.
    pub exclude_mask: bool,
}

impl AlphaPolicy {
    /// Whether `px` is exempt from blending by color.
    pub fn ignores(&self, px: Rgba8) -> bool {
        contains_rgb(&self.ignore_list, px)
    }
}

/// Which pixels of a layer darken the canvas instead of painting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShadowPolicy {
    /// Every non-white pixel is a shadow.
    pub whole_layer: bool,
    /// Pixels of this color are shadows.
    pub trigger: Option<Rgba8>,
}

impl ShadowPolicy {
    pub fn applies_to(&self, px: Rgba8) -> bool {
        (self.whole_layer && !px.is_white()) || self.trigger.is_some_and(|t| t.same_rgb(px))
    }

    pub fn is_none(&self) -> bool {
        !self.whole_layer && self.trigger.is_none()
    }
}

/// Marker color plus the radius of blank canvas it protects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaskRule {
    pub target: Rgba8,
    pub margin: u32,
}

/// A global color substitution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorReplacementRule {
    pub from: Rgba8,
    pub to: Rgba8,
}

/// A layer's pattern and effect policy with all colors decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerSpec {
    /// Position in the settings list (0 = visually on top).
    pub index: usize,
    /// Unresolved file name pattern.
    pub pattern: String,
    pub offset: Offset,
    pub alpha: Option<AlphaPolicy>,
    pub shadow: ShadowPolicy,
    /// Empty when the layer declares no region mask.
    pub mask_rules: Vec<MaskRule>,
}

impl LayerSpec {
    /// Decode the colors of `settings.sourceImages[index]`.
    pub fn compile(index: usize, src: &SourceImageSettings) -> MergeResult<Self> {
        let field = |name: &str| format!("sourceImages[{index}].{name}");

        let alpha = match &src.alpha {
            Some(a) => {
                let mut ignore_list = Vec::with_capacity(a.ignore_list.len());
                for (i, c) in a.ignore_list.iter().enumerate() {
                    ignore_list.push(
                        Rgba8::from_hex(c)
                            .map_err(|e| e.in_field(field(&format!("alpha.ignoreList[{i}]"))))?,
                    );
                }
                Some(AlphaPolicy {
                    value: a.value,
                    ignore_list,
                    exclude_mask: a.exclude_mask,
                })
            }
            None => None,
        };

        let trigger = src
            .shadow_color
            .as_deref()
            .map(|c| Rgba8::from_hex(c).map_err(|e| e.in_field(field("shadowColor"))))
            .transpose()?;

        let mut mask_rules = Vec::new();
        for (i, rule) in src.region_mask.iter().flatten().enumerate() {
            let target = Rgba8::from_hex(&rule.target_color)
                .map_err(|e| e.in_field(field(&format!("regionMask[{i}].targetColor"))))?;
            mask_rules.push(MaskRule {
                target,
                margin: rule.margin,
            });
        }

        let [x, y] = src.position.unwrap_or([0, 0]);
        Ok(Self {
            index,
            pattern: src.file_name.clone(),
            offset: Offset { x, y },
            alpha,
            shadow: ShadowPolicy {
                whole_layer: src.is_shadow,
                trigger,
            },
            mask_rules,
        })
    }
}

/// Decode the global replacement list.
///
/// A rule whose colors fail to decode is dropped with a warning; the rest keep
/// their order.
pub fn compile_replacements(rules: &[ColorReplacementSettings]) -> Vec<ColorReplacementRule> {
    let mut out = Vec::with_capacity(rules.len());
    for (i, rule) in rules.iter().enumerate() {
        let decoded = Rgba8::from_hex(&rule.from)
            .map_err(|e| e.in_field(format!("colorReplacement[{i}].from")))
            .and_then(|from| {
                Rgba8::from_hex(&rule.to)
                    .map(|to| ColorReplacementRule { from, to })
                    .map_err(|e| e.in_field(format!("colorReplacement[{i}].to")))
            });
        match decoded {
            Ok(r) => out.push(r),
            Err(err) => tracing::warn!(rule = i, %err, "skipping color replacement rule"),
        }
    }
    out
}

/// Recolor `px` with the global rules.
///
/// Rules run in list order and each one sees the output of the rules before
/// it, so `[red -> green, green -> blue]` turns red into blue.
pub fn apply_replacements(rules: &[ColorReplacementRule], px: Rgba8) -> Rgba8 {
    rules
        .iter()
        .fold(px, |px, rule| if px.same_rgb(rule.from) { rule.to } else { px })
}

/// Compile every layer; failures stay paired with their index so the caller
/// can drop just that layer.
pub fn compile_layers(settings: &MergeSettings) -> Vec<MergeResult<LayerSpec>> {
    settings
        .source_images
        .iter()
        .enumerate()
        .map(|(i, src)| LayerSpec::compile(i, src))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/settings/layer.rs"]
mod tests;
