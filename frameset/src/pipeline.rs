//! Drives normalization, palette selection and frame encoding over still images and video frames.
//!
//! Decoding is left to a [`FrameSource`]; this module plans what to ask it for, checks what comes
//! back, and processes the frames in order.

use crate::{
    consts::TARGET_SIZE,
    error::{
        EmptyImageSnafu, FrameCountMismatchSnafu, InvalidFrameWindowSnafu, MalformedFrameDataSnafu,
        NoFramesSnafu, Result,
    },
    frame::{Frame, Frameset},
    palette::palette_by_index,
    resize::normalize,
    select::{quantize_with, select_palette, DitherMode},
};
use image::RgbImage;
use log::{info, warn};
use snafu::{ensure, OptionExt};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProcessOptions {
    pub dither: DitherMode,
    /// Palette id to use for every frame instead of auto-selecting one per frame.
    pub forced_palette: Option<i32>,
}

/// A fully processed input image.
#[derive(Debug, Clone)]
pub struct ProcessedFrame {
    pub frame: Frame,
    /// The quantized 32x32 image, for previews.
    pub quantized: RgbImage,
    /// Perceptual error of the selected palette; `None` for forced palettes.
    pub score: Option<f64>,
}

/// Normalizes, quantizes and encodes a single image. Images without pixels are rejected.
pub fn process_image(image: &RgbImage, options: &ProcessOptions) -> Result<ProcessedFrame> {
    let (width, height) = image.dimensions();
    ensure!(width > 0 && height > 0, EmptyImageSnafu { width, height });

    let normalized = normalize(image, TARGET_SIZE);

    let selection = match options.forced_palette {
        Some(index) => quantize_with(&normalized, index, options.dither)?,
        None => select_palette(&normalized, options.dither),
    };

    let frame = Frame::from_quantized(selection.palette_index, &selection.quantized).context(
        MalformedFrameDataSnafu {
            len: selection.quantized.indices.len(),
        },
    )?;

    Ok(ProcessedFrame {
        frame,
        quantized: selection.quantized.image,
        score: selection.score,
    })
}

/// Processes `images` independently, returning results in input order.
///
/// Fails with the first error in input order, even when frames are processed concurrently. No
/// partial result is returned.
pub fn process_frames(
    images: &[RgbImage],
    options: &ProcessOptions,
) -> Result<Vec<ProcessedFrame>> {
    if let Some(index) = options.forced_palette {
        palette_by_index(index)?;
    }

    #[cfg(feature = "parallel")]
    let processed: Vec<_> = {
        use rayon::prelude::*;

        images
            .par_iter()
            .map(|image| process_image(image, options))
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let processed: Vec<_> = images
        .iter()
        .map(|image| process_image(image, options))
        .collect();

    // first error in input order
    processed.into_iter().collect()
}

/// Collects processed frames into a frameset, in order.
pub fn to_frameset(processed: &[ProcessedFrame]) -> Result<Frameset> {
    Frameset::new(processed.iter().map(|p| p.frame.clone()).collect())
}

/// Which frames of a video to extract. Frame numbers refer to the source video and are 0-based.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameRequest {
    /// Target frame rate; the video's own rate if `None`.
    pub fps: Option<f64>,
    pub max_frames: Option<u32>,
    pub start_frame: Option<u32>,
    /// Exclusive. Takes precedence over `max_frames`.
    pub stop_frame: Option<u32>,
}

/// Extraction parameters for a [`FrameSource`], derived from a [`FrameRequest`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExtractionPlan {
    /// Seek to this position before extracting, used when the native frame rate is known.
    pub seek_seconds: Option<f64>,
    /// Skip source frames before this index, used when the native frame rate is unknown.
    pub select_from: Option<u32>,
    /// Resample to this frame rate.
    pub fps: Option<f64>,
    /// Extract exactly this many frames. Also the count the result is checked against.
    pub frame_limit: Option<u32>,
}

impl FrameRequest {
    /// Plans the extraction given the source's native frame rate, if known.
    ///
    /// Fails if a stop frame is given and the window up to it selects no frames. A `max_frames`
    /// of zero means no limit.
    pub fn plan(&self, native_fps: Option<f64>) -> Result<ExtractionPlan> {
        let native_fps = native_fps.filter(|&fps| fps > 0.0);
        let fps = self.fps.filter(|&fps| fps > 0.0);

        // number of output frames covering `source_frames` frames of the source
        let window = |source_frames: u32| match (fps, native_fps) {
            (Some(fps), Some(native)) => (f64::from(source_frames) / native * fps) as u32,
            _ => source_frames,
        };

        let frame_limit = match (self.start_frame, self.stop_frame) {
            (start, Some(stop)) => {
                if start.is_some() && self.max_frames.is_some() {
                    warn!("both a maximum frame count and a stop frame were given, using the stop frame");
                }
                let start = start.unwrap_or(0);
                let count = window(stop.saturating_sub(start));
                ensure!(count > 0, InvalidFrameWindowSnafu { start, stop });
                Some(count)
            }
            (_, None) => self.max_frames.filter(|&count| count > 0),
        };

        let (seek_seconds, select_from) = match (self.start_frame, native_fps) {
            (Some(start), Some(native)) => (Some(f64::from(start) / native), None),
            (Some(start), None) => (None, Some(start)),
            (None, _) => (None, None),
        };

        Ok(ExtractionPlan {
            seek_seconds,
            select_from,
            fps,
            frame_limit,
        })
    }
}

/// Supplies decoded video frames in presentation order.
pub trait FrameSource {
    /// The native frame rate of the video, if it can be determined.
    fn native_fps(&mut self) -> Option<f64>;

    fn extract(&mut self, plan: &ExtractionPlan) -> Result<Vec<RgbImage>>;
}

/// Extracts the requested frames from `source` and processes all of them.
///
/// Fails if the requested window is empty, if no frames come back, or if the plan fixed a frame
/// count and a different number of frames came back.
pub fn process_video<S: FrameSource + ?Sized>(
    source: &mut S,
    request: &FrameRequest,
    options: &ProcessOptions,
) -> Result<Vec<ProcessedFrame>> {
    if let Some(index) = options.forced_palette {
        palette_by_index(index)?;
    }

    let plan = request.plan(source.native_fps())?;
    let frames = source.extract(&plan)?;

    ensure!(!frames.is_empty(), NoFramesSnafu);
    if let Some(expected) = plan.frame_limit {
        ensure!(
            frames.len() == expected as usize,
            FrameCountMismatchSnafu {
                expected: expected as usize,
                actual: frames.len()
            }
        );
    }

    info!("processing {} frames", frames.len());
    process_frames(&frames, options)
}
