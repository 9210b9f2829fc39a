use std::path::Path;

use crate::foundation::error::{MergeError, MergeResult};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Settings file describing one merge: the layer stack, global recoloring and
/// output options.
///
/// Layers are listed top to bottom: the first entry ends up visually on top.
pub struct MergeSettings {
    /// Value substituted for `<ID>` tokens. Defaults to the settings file stem
    /// when loaded with [`MergeSettings::from_path`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Output file name relative to the working directory; may contain `<ID>`.
    pub output_file_name: String,
    /// Layer stack, top to bottom.
    pub source_images: Vec<SourceImageSettings>,
    /// Global color substitutions applied to every layer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub color_replacement: Vec<ColorReplacementSettings>,
    /// Save once and quit instead of watching.
    #[serde(default)]
    pub auto_save_and_exit: bool,
    /// Desaturate the merged image.
    #[serde(default)]
    pub auto_gray_scaling: bool,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// One layer of the stack.
pub struct SourceImageSettings {
    /// File name pattern; may contain `<ID>`, `.<EXT>` and `<VER>`.
    pub file_name: String,
    /// Offset `[x, y]` of the layer on the canvas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[i32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<AlphaSettings>,
    /// Every non-white pixel darkens what lies beneath.
    #[serde(default)]
    pub is_shadow: bool,
    /// Pixels of exactly this color darken what lies beneath.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_mask: Option<Vec<RegionMaskSettings>>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlphaSettings {
    /// Blend weight of the layer, `0..=1`.
    pub value: f32,
    /// Colors drawn without blending.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore_list: Vec<String>,
    /// Masked pixels are drawn without blending.
    #[serde(default)]
    pub exclude_mask: bool,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionMaskSettings {
    /// Marker color.
    pub target_color: String,
    /// Half-width of the square window around each marker pixel.
    pub margin: u32,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorReplacementSettings {
    pub from: String,
    pub to: String,
}

impl MergeSettings {
    /// Parse settings from JSON text. Does not fill in a default `id`.
    pub fn from_json_str(s: &str) -> MergeResult<Self> {
        let settings: Self = serde_json::from_str(s)
            .map_err(|e| MergeError::config_invalid(format!("settings json: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a `.json` file.
    ///
    /// A missing `id` is filled in with the file stem.
    pub fn from_path(path: impl AsRef<Path>) -> MergeResult<Self> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if !is_json {
            return Err(MergeError::config_invalid(format!(
                "settings file '{}' must have a .json extension",
                path.display()
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| MergeError::io(path, e))?;
        let mut settings = Self::from_json_str(&text)?;
        if settings.id.is_none() {
            settings.id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_owned);
        }
        Ok(settings)
    }

    /// Structural checks serde cannot express.
    pub fn validate(&self) -> MergeResult<()> {
        if self.output_file_name.trim().is_empty() {
            return Err(MergeError::config_invalid("outputFileName must be non-empty"));
        }
        if self.source_images.is_empty() {
            return Err(MergeError::config_invalid(
                "sourceImages must contain at least one layer",
            ));
        }
        for (i, layer) in self.source_images.iter().enumerate() {
            if layer.file_name.trim().is_empty() {
                return Err(MergeError::config_invalid(format!(
                    "sourceImages[{i}].fileName must be non-empty"
                )));
            }
            if let Some(alpha) = &layer.alpha
                && !alpha.value.is_finite()
            {
                return Err(MergeError::config_invalid(format!(
                    "sourceImages[{i}].alpha.value must be finite"
                )));
            }
        }
        Ok(())
    }

    /// Output file name with `<ID>` substituted.
    pub fn output_file_name(&self) -> String {
        crate::assets::resolve::substitute_id(&self.output_file_name, self.id.as_deref())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/settings/model.rs"]
mod tests;
