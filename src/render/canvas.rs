use crate::{assets::decode::RasterImage, foundation::pixel::Rgba8};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The merged output: straight RGBA8, row-major, tightly packed.
pub struct MergedCanvas {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl MergedCanvas {
    /// An opaque white canvas.
    pub fn white(width: u32, height: u32) -> Self {
        Self::from(RasterImage::filled(width, height, Rgba8::WHITE))
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        let at = (y as usize * self.width as usize + x as usize) * 4;
        Rgba8::from_slice(&self.data[at..at + 4])
    }

    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<RasterImage> for MergedCanvas {
    fn from(img: RasterImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            data: img.rgba8,
        }
    }
}
