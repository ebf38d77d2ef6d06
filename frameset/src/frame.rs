use crate::{
    consts::{FRAME_LEN, PALETTE_COUNT, PALETTE_LEN, PIXEL_COUNT, TARGET_SIZE},
    dither::Quantized,
    error::{EmptyFramesetSnafu, MalformedFrameDataSnafu, Result},
    palette::{nearest, Palette},
};
use image::RgbImage;
use snafu::ensure;

/// Row-major palette positions of a `TARGET_SIZE`x`TARGET_SIZE` frame, each in `0..15`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorIndexGrid(Vec<u8>);

impl ColorIndexGrid {
    /// Returns `None` unless `indices` holds exactly one valid palette position per pixel.
    pub fn new(indices: Vec<u8>) -> Option<Self> {
        let valid = indices.len() == PIXEL_COUNT
            && indices.iter().all(|&i| usize::from(i) < PALETTE_LEN);

        valid.then_some(Self(indices))
    }

    /// Derives the grid from an image whose pixels are all colors of `palette`.
    ///
    /// Every pixel is an exact palette color, so the lookup degenerates to an exact match and
    /// reproduces the positions the quantizer picked.
    pub fn from_image(image: &RgbImage, palette: &Palette) -> Option<Self> {
        if image.dimensions() != (TARGET_SIZE, TARGET_SIZE) {
            return None;
        }

        Self::new(image.pixels().map(|p| nearest(p.0, palette)).collect())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.0.chunks_exact(TARGET_SIZE as usize)
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= TARGET_SIZE || y >= TARGET_SIZE {
            return None;
        }
        self.0.get((y * TARGET_SIZE + x) as usize).copied()
    }
}

/// One time-step of an animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub palette_index: u8,
    pub pixels: ColorIndexGrid,
}

impl Frame {
    /// Builds a frame from a quantizer result, reusing the palette positions it already chose.
    ///
    /// Returns `None` if the quantized image isn't `TARGET_SIZE`x`TARGET_SIZE` or the palette id
    /// is out of range.
    pub fn from_quantized(palette_index: u8, quantized: &Quantized) -> Option<Self> {
        if usize::from(palette_index) >= PALETTE_COUNT
            || quantized.image.dimensions() != (TARGET_SIZE, TARGET_SIZE)
        {
            return None;
        }

        Some(Self {
            palette_index,
            pixels: ColorIndexGrid::new(quantized.indices.clone())?,
        })
    }

    /// Appends the flattened frame: the palette id, then one byte per pixel.
    pub fn write_bytes(&self, w: &mut Vec<u8>) {
        w.push(self.palette_index);
        w.extend_from_slice(self.pixels.as_slice());
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(FRAME_LEN);
        self.write_bytes(&mut v);
        v
    }

    fn from_chunk(chunk: &[u8]) -> Option<Self> {
        let (&palette_index, pixels) = chunk.split_first()?;
        if usize::from(palette_index) >= PALETTE_COUNT {
            return None;
        }

        Some(Self {
            palette_index,
            pixels: ColorIndexGrid::new(pixels.to_vec())?,
        })
    }
}

/// Frames in playback order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frameset {
    frames: Vec<Frame>,
}

impl Frameset {
    pub fn new(frames: Vec<Frame>) -> Result<Self> {
        ensure!(!frames.is_empty(), EmptyFramesetSnafu);
        Ok(Self { frames })
    }

    pub fn single(frame: Frame) -> Self {
        Self {
            frames: vec![frame],
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Concatenation of all flattened frames, `len() * FRAME_LEN` bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(self.frames.len() * FRAME_LEN);
        for frame in &self.frames {
            frame.write_bytes(&mut v);
        }
        v
    }

    /// Parses frame data produced by [`Frameset::to_bytes`].
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let malformed = MalformedFrameDataSnafu { len: data.len() };
        ensure!(!data.is_empty() && data.len() % FRAME_LEN == 0, malformed);

        let frames = data
            .chunks_exact(FRAME_LEN)
            .map(Frame::from_chunk)
            .collect::<Option<Vec<_>>>();

        match frames {
            Some(frames) => Ok(Self { frames }),
            None => malformed.fail(),
        }
    }
}
