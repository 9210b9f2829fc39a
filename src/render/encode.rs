use std::path::Path;

use crate::{
    foundation::error::{MergeError, MergeResult},
    render::canvas::MergedCanvas,
};

/// Output container, picked from the file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Bmp,
    Gif,
    Jpeg,
}

impl OutputFormat {
    /// Unknown or missing extensions fall back to PNG.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("bmp") => Self::Bmp,
            Some("gif") => Self::Gif,
            Some("jpg" | "jpeg") => Self::Jpeg,
            _ => Self::Png,
        }
    }

    fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Bmp => image::ImageFormat::Bmp,
            Self::Gif => image::ImageFormat::Gif,
            Self::Jpeg => image::ImageFormat::Jpeg,
        }
    }

    /// JPEG has no alpha channel.
    pub fn keeps_alpha(self) -> bool {
        !matches!(self, Self::Jpeg)
    }
}

/// Write `canvas` to `path`, replacing any existing file.
pub fn save_canvas(canvas: &MergedCanvas, path: &Path) -> MergeResult<OutputFormat> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| MergeError::io(parent, e))?;
    }
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(MergeError::io(path, e)),
    }

    let format = OutputFormat::from_path(path);
    let result = if format.keeps_alpha() {
        image::save_buffer_with_format(
            path,
            &canvas.data,
            canvas.width,
            canvas.height,
            image::ColorType::Rgba8,
            format.image_format(),
        )
    } else {
        let rgb: Vec<u8> = canvas
            .data
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        image::save_buffer_with_format(
            path,
            &rgb,
            canvas.width,
            canvas.height,
            image::ColorType::Rgb8,
            format.image_format(),
        )
    };
    result.map_err(|e| MergeError::codec(path, e))?;

    tracing::info!(
        path = %path.display(),
        ?format,
        width = canvas.width,
        height = canvas.height,
        "saved merged image"
    );
    Ok(format)
}

#[cfg(test)]
#[path = "../../tests/unit/render/encode.rs"]
mod tests;
