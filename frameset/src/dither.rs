use crate::{
    palette::{nearest, Palette},
    utils::truncate_rgb,
};
use image::{Rgb, RgbImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DitherMode {
    /// Floyd-Steinberg error diffusion.
    #[default]
    FloydSteinberg,
    /// Every pixel is replaced by its nearest palette color independently.
    None,
}

/// An image reduced to the colors of a single palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantized {
    /// The image with every pixel replaced by a palette color.
    pub image: RgbImage,
    /// Row-major palette positions of the pixels in `image`.
    pub indices: Vec<u8>,
}

impl Quantized {
    fn from_indices(width: u32, height: u32, indices: Vec<u8>, palette: &Palette) -> Self {
        let image = RgbImage::from_fn(width, height, |x, y| {
            Rgb(palette[usize::from(indices[(y * width + x) as usize])])
        });

        Self { image, indices }
    }
}

pub fn quantize(image: &RgbImage, palette: &Palette, mode: DitherMode) -> Quantized {
    match mode {
        DitherMode::FloydSteinberg => floyd_steinberg(image, palette),
        DitherMode::None => map_nearest(image, palette),
    }
}

/// Quantizes `image` with Floyd-Steinberg error diffusion.
///
/// Pixels are visited row-major. Each pixel is matched against its current, already corrected
/// value, and the remaining error is pushed to the unvisited neighbors:
///
/// ```plain
///          *    7/16
///   3/16  5/16  1/16
/// ```
///
/// Neighbors are clamped to `0..=255` after every accumulation; neighbors outside the image are
/// skipped. The visiting order is a strict dependency, this loop must stay sequential.
pub fn floyd_steinberg(image: &RgbImage, palette: &Palette) -> Quantized {
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);

    let mut work: Vec<[f32; 3]> = image.pixels().map(|p| p.0.map(f32::from)).collect();
    let mut indices = Vec::with_capacity(w * h);

    for y in 0..h {
        for x in 0..w {
            let old = work[y * w + x];
            let index = nearest(truncate_rgb(old), palette);
            let new = palette[usize::from(index)].map(f32::from);

            work[y * w + x] = new;
            indices.push(index);

            let error = [old[0] - new[0], old[1] - new[1], old[2] - new[2]];
            let mut diffuse = |x: usize, y: usize, weight: f32| {
                let pixel = &mut work[y * w + x];
                for (channel, e) in pixel.iter_mut().zip(error) {
                    *channel = (*channel + e * weight / 16.0).clamp(0.0, 255.0);
                }
            };

            if x + 1 < w {
                diffuse(x + 1, y, 7.0);
            }
            if y + 1 < h {
                if x > 0 {
                    diffuse(x - 1, y + 1, 3.0);
                }
                diffuse(x, y + 1, 5.0);
                if x + 1 < w {
                    diffuse(x + 1, y + 1, 1.0);
                }
            }
        }
    }

    Quantized::from_indices(width, height, indices, palette)
}

/// Replaces every pixel with its nearest palette color, without error diffusion.
pub fn map_nearest(image: &RgbImage, palette: &Palette) -> Quantized {
    let (width, height) = image.dimensions();
    let indices = image.pixels().map(|p| nearest(p.0, palette)).collect();

    Quantized::from_indices(width, height, indices, palette)
}
