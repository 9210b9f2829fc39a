use std::path::Path;

use anyhow::Context;

use crate::{
    foundation::error::{MergeError, MergeResult},
    foundation::pixel::Rgba8,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Decoded raster in straight (non-premultiplied) RGBA8.
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// Row-major, tightly packed, `width * height * 4` bytes.
    pub rgba8: Vec<u8>,
}

impl RasterImage {
    /// Wrap `rgba8`, checking it holds exactly `width * height` pixels.
    pub fn new(width: u32, height: u32, rgba8: Vec<u8>) -> MergeResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| anyhow::anyhow!("raster size overflow"))?;
        if rgba8.len() != expected {
            return Err(anyhow::anyhow!(
                "raster {width}x{height} expects {expected} bytes, got {}",
                rgba8.len()
            )
            .into());
        }
        Ok(Self {
            width,
            height,
            rgba8,
        })
    }

    /// A `width` x `height` raster filled with `px`.
    pub fn filled(width: u32, height: u32, px: Rgba8) -> Self {
        let count = width as usize * height as usize;
        Self {
            width,
            height,
            rgba8: px.to_array().repeat(count),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        let at = (y as usize * self.width as usize + x as usize) * 4;
        Rgba8::from_slice(&self.rgba8[at..at + 4])
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * 4;
        let start = y as usize * stride;
        &self.rgba8[start..start + stride]
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Decode an in-memory image of any format the codec recognizes.
pub fn decode_image(bytes: &[u8]) -> MergeResult<RasterImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    RasterImage::new(width, height, rgba.into_raw())
}

/// Read and decode `path`. Codec failures carry the path.
pub fn decode_file(path: &Path) -> MergeResult<RasterImage> {
    let bytes = std::fs::read(path).map_err(|e| MergeError::io(path, e))?;
    let dyn_img = image::load_from_memory(&bytes).map_err(|e| MergeError::codec(path, e))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    RasterImage::new(width, height, rgba.into_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
