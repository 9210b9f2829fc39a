use rayon::prelude::*;

use crate::{foundation::pixel::Rgba8, render::canvas::MergedCanvas};

/// Desaturate every pixel of `canvas` in place. Alpha is kept.
pub fn grayscale(canvas: &mut MergedCanvas, parallel: bool) {
    let gray = |px: &mut [u8]| {
        let out = Rgba8::from_slice(px).desaturate();
        px.copy_from_slice(&out.to_array());
    };
    if parallel {
        canvas.data.par_chunks_exact_mut(4).for_each(gray);
    } else {
        canvas.data.chunks_exact_mut(4).for_each(gray);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/postprocess.rs"]
mod tests;
