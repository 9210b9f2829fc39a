use crate::{assets::decode::RasterImage, settings::layer::MaskRule};

/// Per-pixel "masked" flags for one layer, same size as the layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskGrid {
    pub width: u32,
    pub height: u32,
    bits: Vec<bool>,
}

impl MaskGrid {
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.bits[y as usize * self.width as usize + x as usize]
    }

    fn set(&mut self, x: u32, y: u32) {
        self.bits[y as usize * self.width as usize + x as usize] = true;
    }

    /// Number of masked pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

/// Dilate blank canvas around marker pixels.
///
/// For every non-white pixel whose color is a rule's target, each white pixel
/// within `margin` pixels (Chebyshev distance, clipped to the image) is
/// flagged. Marker pixels themselves and other colored pixels stay unflagged.
pub fn build_mask(image: &RasterImage, rules: &[MaskRule]) -> MaskGrid {
    let mut mask = MaskGrid::empty(image.width, image.height);
    if rules.is_empty() || image.is_empty() {
        return mask;
    }

    for y in 0..image.height {
        for x in 0..image.width {
            let px = image.pixel(x, y);
            if px.is_white() {
                continue;
            }
            for rule in rules.iter().filter(|r| r.target.same_rgb(px)) {
                flag_white_window(image, &mut mask, x, y, rule.margin);
            }
        }
    }
    mask
}

fn flag_white_window(image: &RasterImage, mask: &mut MaskGrid, cx: u32, cy: u32, margin: u32) {
    let x0 = cx.saturating_sub(margin);
    let y0 = cy.saturating_sub(margin);
    let x1 = cx.saturating_add(margin).min(image.width - 1);
    let y1 = cy.saturating_add(margin).min(image.height - 1);
    for y in y0..=y1 {
        for x in x0..=x1 {
            if image.pixel(x, y).is_white() {
                mask.set(x, y);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/mask.rs"]
mod tests;
