use crate::{
    consts::PALETTE_COUNT,
    dither::quantize,
    error::Result,
    palette::{palette_by_index, PALETTES},
    score::perceptual_error,
};
use image::RgbImage;
use log::{debug, info};

pub use crate::dither::{DitherMode, Quantized};

/// The outcome of quantizing an image against one palette.
#[derive(Debug, Clone)]
pub struct Selection {
    pub palette_index: u8,
    pub quantized: Quantized,
    /// Perceptual error of `quantized` against the input. `None` if the palette was forced and
    /// never scored.
    pub score: Option<f64>,
}

fn evaluate(image: &RgbImage, palette_index: usize, mode: DitherMode) -> (f64, Quantized) {
    let quantized = quantize(image, &PALETTES[palette_index], mode);
    let score = perceptual_error(image, &quantized.image);
    debug!("palette {palette_index}: score {score:.6}");

    (score, quantized)
}

/// Quantizes `image` against every palette and keeps the one with the lowest perceptual error.
///
/// On equal scores the lower palette id wins. Candidates may be evaluated concurrently, but are
/// always compared in palette order.
pub fn select_palette(image: &RgbImage, mode: DitherMode) -> Selection {
    #[cfg(feature = "parallel")]
    let candidates: Vec<_> = {
        use rayon::prelude::*;

        (0..PALETTE_COUNT)
            .into_par_iter()
            .map(|index| evaluate(image, index, mode))
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let candidates: Vec<_> = (0..PALETTE_COUNT)
        .map(|index| evaluate(image, index, mode))
        .collect();

    let mut best: Option<(usize, f64, Quantized)> = None;
    for (index, (score, quantized)) in candidates.into_iter().enumerate() {
        match &best {
            Some((_, best_score, _)) if !(score < *best_score) => {}
            _ => best = Some((index, score, quantized)),
        }
    }

    // PALETTE_COUNT is non-zero, so a candidate always exists
    let (palette_index, score, quantized) = best.unwrap_or_else(|| unreachable!());
    info!("selected palette {palette_index} (score {score:.6})");

    Selection {
        palette_index: palette_index as u8,
        quantized,
        score: Some(score),
    }
}

/// Quantizes `image` against a caller-chosen palette, bypassing selection.
pub fn quantize_with(image: &RgbImage, palette_index: i32, mode: DitherMode) -> Result<Selection> {
    let palette = palette_by_index(palette_index)?;

    Ok(Selection {
        palette_index: palette_index as u8,
        quantized: quantize(image, palette, mode),
        score: None,
    })
}
