use rayon::prelude::*;

use crate::{
    assets::load::ResolvedLayer,
    foundation::error::{MergeError, MergeResult},
    foundation::pixel::Rgba8,
    render::canvas::MergedCanvas,
    settings::layer::{ColorReplacementRule, apply_replacements},
};

/// Row-level parallelism inside a single layer. Layers themselves are always
/// drawn one after another.
#[derive(Clone, Debug, Default)]
pub struct CompositeThreading {
    pub parallel: bool,
    /// Worker count; `None` lets rayon decide.
    pub threads: Option<usize>,
}

/// Merge `layers` (listed top to bottom) onto an opaque white canvas sized to
/// the largest available layer.
///
/// The stack is painted back to front: the last listed layer is the backdrop
/// and the first listed one ends up on top. Unavailable layers are skipped and
/// do not count towards a layer's paint order.
pub fn composite(
    layers: &[ResolvedLayer],
    replacements: &[ColorReplacementRule],
    threading: &CompositeThreading,
) -> MergeResult<MergedCanvas> {
    let available: Vec<&ResolvedLayer> = layers.iter().filter(|l| l.is_available()).collect();
    if available.is_empty() {
        return Err(MergeError::NoSourceImagesResolved {
            declared: layers.len(),
        });
    }

    let width = available.iter().map(|l| l.width()).max().unwrap_or(0);
    let height = available.iter().map(|l| l.height()).max().unwrap_or(0);
    let mut canvas = MergedCanvas::white(width, height);
    if canvas.is_empty() {
        return Ok(canvas);
    }

    let pool = if threading.parallel {
        Some(build_thread_pool(threading.threads)?)
    } else {
        None
    };

    for (paint_order, layer) in available.into_iter().rev().enumerate() {
        tracing::debug!(layer = layer.index, paint_order, "compositing layer");
        match &pool {
            Some(pool) => pool.install(|| {
                draw_layer_parallel(&mut canvas, layer, paint_order, replacements)
            }),
            None => draw_layer(&mut canvas, layer, paint_order, replacements),
        }
    }
    Ok(canvas)
}

fn draw_layer(
    canvas: &mut MergedCanvas,
    layer: &ResolvedLayer,
    paint_order: usize,
    replacements: &[ColorReplacementRule],
) {
    let stride = canvas.stride();
    let width = canvas.width;
    for (py, row) in canvas.data.chunks_exact_mut(stride).enumerate() {
        draw_row(row, py, width, layer, paint_order, replacements);
    }
}

fn draw_layer_parallel(
    canvas: &mut MergedCanvas,
    layer: &ResolvedLayer,
    paint_order: usize,
    replacements: &[ColorReplacementRule],
) {
    let stride = canvas.stride();
    let width = canvas.width;
    canvas
        .data
        .par_chunks_exact_mut(stride)
        .enumerate()
        .for_each(|(py, row)| draw_row(row, py, width, layer, paint_order, replacements));
}

/// Paint the part of `layer` that lands on canvas row `py`.
fn draw_row(
    row: &mut [u8],
    py: usize,
    canvas_width: u32,
    layer: &ResolvedLayer,
    paint_order: usize,
    replacements: &[ColorReplacementRule],
) {
    let Some(image) = &layer.image else {
        return;
    };
    let yi = py as i64 - i64::from(layer.offset.y);
    if yi < 0 || yi >= i64::from(image.height) {
        return;
    }
    let yi = yi as u32;

    for xi in 0..image.width {
        let px = i64::from(xi) + i64::from(layer.offset.x);
        if px < 0 || px >= i64::from(canvas_width) {
            continue;
        }
        let at = px as usize * 4;
        let under = Rgba8::from_slice(&row[at..at + 4]);
        let src = image.pixel(xi, yi);
        let masked = layer.is_masked(xi, yi);
        if let Some(out) = shade_pixel(src, masked, under, layer, paint_order, replacements) {
            row[at..at + 4].copy_from_slice(&out.to_array());
        }
    }
}

/// The per-pixel effect chain: mask, skip, shadow, replace, blend.
///
/// `under` is what the canvas already holds at the destination. Returns `None`
/// when the destination must stay untouched.
pub fn shade_pixel(
    src: Rgba8,
    masked: bool,
    under: Rgba8,
    layer: &ResolvedLayer,
    paint_order: usize,
    replacements: &[ColorReplacementRule],
) -> Option<Rgba8> {
    let mut px = if masked { Rgba8::WHITE } else { src };

    // White is "nothing here" for every layer above the backdrop.
    if px.is_white() && paint_order > 0 && !masked {
        return None;
    }

    if layer.shadow.applies_to(px) {
        px = under.darken();
    }

    px = apply_replacements(replacements, px);

    if let Some(policy) = &layer.alpha {
        let exempt = (masked && policy.exclude_mask) || policy.ignores(px);
        if paint_order > 0 && !exempt {
            px = px.blend(under, policy.value);
        }
    }

    Some(px)
}

fn build_thread_pool(threads: Option<usize>) -> MergeResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(MergeError::config_invalid(
            "composite threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build rayon thread pool: {e}").into())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
