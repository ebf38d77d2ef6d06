use image::{
    imageops::{self, FilterType},
    RgbImage,
};

/// Scales `image` so its shorter side equals `size`, then crops the longer axis around the center
/// to a `size`x`size` square.
///
/// The longer side is scaled with truncation, so a 64x48 input becomes 42x32 before the crop
/// drops 5 columns on the left and 5 on the right.
pub fn normalize(image: &RgbImage, size: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    let (scaled_width, scaled_height) = scaled_dimensions(width, height, size);

    let scaled = if (scaled_width, scaled_height) == (width, height) {
        image.clone()
    } else {
        imageops::resize(image, scaled_width, scaled_height, FilterType::Lanczos3)
    };

    let left = (scaled_width - size) / 2;
    let top = (scaled_height - size) / 2;

    imageops::crop_imm(&scaled, left, top, size, size).to_image()
}

/// Dimensions after scaling the shorter side of a `width`x`height` image to `size`.
pub fn scaled_dimensions(width: u32, height: u32, size: u32) -> (u32, u32) {
    let short = u64::from(width.min(height).max(1));
    let scale = |side: u32| ((u64::from(side) * u64::from(size)) / short).max(u64::from(size)) as u32;

    (scale(width), scale(height))
}
