//! Perceptual fidelity scoring used to rank candidate palettes.

use image::{
    imageops::{self, FilterType},
    RgbImage,
};
use std::borrow::Cow;

const SSIM_WEIGHT: f64 = 0.7;
const COLOR_WEIGHT: f64 = 0.3;

const WINDOW: usize = 7;
const K1: f64 = 0.01;
const K2: f64 = 0.03;
const DATA_RANGE: f64 = 255.0;

/// Scores how far `candidate` is from `original`. Lower is better, `0.0` means identical.
///
/// `0.7 * (1 - ssim) + 0.3 * mean_absolute_difference / 255`
///
/// A candidate of different dimensions is resampled to the size of `original` first.
pub fn perceptual_error(original: &RgbImage, candidate: &RgbImage) -> f64 {
    let candidate = if candidate.dimensions() == original.dimensions() {
        Cow::Borrowed(candidate)
    } else {
        let (width, height) = original.dimensions();
        Cow::Owned(imageops::resize(
            candidate,
            width,
            height,
            FilterType::Lanczos3,
        ))
    };

    let ssim = structural_similarity(original, &candidate);
    let color_error = mean_absolute_difference(original, &candidate) / DATA_RANGE;

    (1.0 - ssim) * SSIM_WEIGHT + color_error * COLOR_WEIGHT
}

/// Mean absolute difference over every channel of every pixel, in `0.0..=255.0`.
///
/// Both images must have the same dimensions.
pub fn mean_absolute_difference(a: &RgbImage, b: &RgbImage) -> f64 {
    let samples = a.as_raw().len();
    if samples == 0 {
        return 0.0;
    }

    let total: u64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&x, &y)| u64::from(x.abs_diff(y)))
        .sum();

    total as f64 / samples as f64
}

/// Mean structural similarity of two equally sized images, averaged over the RGB channels.
///
/// Local statistics come from a 7x7 uniform window with mirrored borders and sample covariance.
/// The similarity map is averaged without the outer 3 pixels, which only see mirrored data.
/// Images smaller than the window use the largest odd window that fits.
pub fn structural_similarity(a: &RgbImage, b: &RgbImage) -> f64 {
    let (width, height) = a.dimensions();
    let (width, height) = (width as usize, height as usize);
    if width == 0 || height == 0 {
        return 1.0;
    }

    let window = {
        let fit = WINDOW.min(width).min(height);
        if fit % 2 == 0 {
            fit - 1
        } else {
            fit
        }
    };

    let total: f64 = (0..3)
        .map(|channel| {
            let x = channel_plane(a, channel);
            let y = channel_plane(b, channel);
            channel_ssim(&x, &y, width, height, window)
        })
        .sum();

    total / 3.0
}

fn channel_plane(image: &RgbImage, channel: usize) -> Vec<f64> {
    image.pixels().map(|p| f64::from(p.0[channel])).collect()
}

fn channel_ssim(x: &[f64], y: &[f64], width: usize, height: usize, window: usize) -> f64 {
    let np = (window * window) as f64;
    let cov_norm = if np > 1.0 { np / (np - 1.0) } else { 1.0 };

    let product = |a: &[f64], b: &[f64]| a.iter().zip(b).map(|(a, b)| a * b).collect::<Vec<_>>();

    let ux = uniform_filter(x, width, height, window);
    let uy = uniform_filter(y, width, height, window);
    let uxx = uniform_filter(&product(x, x), width, height, window);
    let uyy = uniform_filter(&product(y, y), width, height, window);
    let uxy = uniform_filter(&product(x, y), width, height, window);

    let c1 = (K1 * DATA_RANGE).powi(2);
    let c2 = (K2 * DATA_RANGE).powi(2);

    let pad = (window - 1) / 2;
    let mut sum = 0.0;
    let mut count = 0usize;

    for row in pad..height - pad {
        for col in pad..width - pad {
            let i = row * width + col;
            let vx = cov_norm * (uxx[i] - ux[i] * ux[i]);
            let vy = cov_norm * (uyy[i] - uy[i] * uy[i]);
            let vxy = cov_norm * (uxy[i] - ux[i] * uy[i]);

            let a1 = 2.0 * ux[i] * uy[i] + c1;
            let a2 = 2.0 * vxy + c2;
            let b1 = ux[i] * ux[i] + uy[i] * uy[i] + c1;
            let b2 = vx + vy + c2;

            sum += (a1 * a2) / (b1 * b2);
            count += 1;
        }
    }

    sum / count as f64
}

/// Mirrors an out-of-range index back into `0..len` (`d c b a | a b c d | d c b a`).
#[inline]
fn reflect(i: isize, len: usize) -> usize {
    let len = len as isize;
    let mut i = i;
    loop {
        if i < 0 {
            i = -i - 1;
        } else if i >= len {
            i = 2 * len - i - 1;
        } else {
            return i as usize;
        }
    }
}

/// Separable box filter of size `window`, rows first, then columns.
fn uniform_filter(data: &[f64], width: usize, height: usize, window: usize) -> Vec<f64> {
    let radius = (window / 2) as isize;
    let norm = window as f64;

    let mut rows = vec![0.0; data.len()];
    for y in 0..height {
        let line = &data[y * width..(y + 1) * width];
        for x in 0..width {
            let sum: f64 = (-radius..=radius)
                .map(|d| line[reflect(x as isize + d, width)])
                .sum();
            rows[y * width + x] = sum / norm;
        }
    }

    let mut out = vec![0.0; data.len()];
    for x in 0..width {
        for y in 0..height {
            let sum: f64 = (-radius..=radius)
                .map(|d| rows[reflect(y as isize + d, height) * width + x])
                .sum();
            out[y * width + x] = sum / norm;
        }
    }

    out
}
