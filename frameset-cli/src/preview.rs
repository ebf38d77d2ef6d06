use image::{
    codecs::gif::{GifEncoder, Repeat},
    Delay, DynamicImage, Frame, ImageResult, RgbImage,
};
use std::{fs::File, io::BufWriter, path::Path};

/// Display time of each preview frame.
const FRAME_DELAY_MS: u32 = 100;

/// Writes `frames` as a GIF that loops forever. A single frame gives a still image.
pub fn write_gif<'a>(path: &Path, frames: impl IntoIterator<Item = &'a RgbImage>) -> ImageResult<()> {
    let mut encoder = GifEncoder::new(BufWriter::new(File::create(path)?));
    encoder.set_repeat(Repeat::Infinite)?;

    for image in frames {
        let rgba = DynamicImage::ImageRgb8(image.clone()).into_rgba8();
        encoder.encode_frame(Frame::from_parts(
            rgba,
            0,
            0,
            Delay::from_numer_denom_ms(FRAME_DELAY_MS, 1),
        ))?;
    }

    Ok(())
}
