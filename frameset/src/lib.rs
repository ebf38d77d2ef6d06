//! Encoder for fixed-palette pixel animations ("framesets") shown on a 32x32 embedded display.
//!
//! An input image (or every frame of a video) is scaled and center-cropped to a 32x32 square,
//! quantized against one of sixteen fixed fifteen-color palettes, and stored as one palette index
//! per pixel. The resulting frames are rendered into a block of C++ source that gets patched into
//! the device firmware.
//!
//! # Pipeline
//!
//! 1. [`resize::normalize`] scales the shorter side to [`consts::TARGET_SIZE`] with a Lanczos
//!    filter and crops the longer axis symmetrically.
//! 2. [`select::select_palette`] quantizes the image against every palette in
//!    [`palette::PALETTES`] (Floyd-Steinberg dithered or plain nearest-color) and keeps the
//!    palette with the lowest [`score::perceptual_error`]. A palette can also be forced with
//!    [`select::quantize_with`].
//! 3. [`frame::Frame`] pairs the chosen palette id with the per-pixel palette indices.
//! 4. [`serialize::render_block`] renders a [`frame::Frameset`] into the generated source block.
//! 5. [`inject`] replaces the previously generated block in the target file, or inserts a new one.
//!
//! # Frame data
//!
//! Each frame is flattened into [`consts::FRAME_LEN`] bytes:
//!
//! ```plain
//! .- frame ------------------------------------------------.
//! | Byte[0]    | Byte[1] .. Byte[1024]                     |
//! |------------+-------------------------------------------|
//! | palette id | pixel palette indices, row-major          |
//! `--------------------------------------------------------`
//! ```
//!
//! - palette id: `0..16`, index into [`palette::PALETTES`]
//! - pixel: `0..15`, index into the colors of that palette
//!
//! Frames are concatenated in playback order. A still image is a frameset with a single frame;
//! there is no separate single-frame format.
//!
//! # Features
//!
//! - `parallel` (default): evaluates candidate palettes and video frames concurrently with rayon.
//!   Results are identical to the sequential path.

pub mod dither;
pub mod error;
pub mod frame;
pub mod inject;
pub mod palette;
pub mod pipeline;
pub mod resize;
pub mod score;
pub mod select;
pub mod serialize;
pub mod utils;

pub use dither::{DitherMode, Quantized};
pub use error::{Error, Result};
pub use frame::{ColorIndexGrid, Frame, Frameset};
pub use palette::{Color, Palette, PALETTES};
pub use pipeline::{ExtractionPlan, FrameRequest, FrameSource, ProcessOptions, ProcessedFrame};
pub use serialize::{BlockInfo, SourceKind};

pub mod consts {
    /// Edge length of the square display, in pixels.
    pub const TARGET_SIZE: u32 = 32;

    /// Number of pixels in one frame.
    pub const PIXEL_COUNT: usize = (TARGET_SIZE * TARGET_SIZE) as usize;

    /// Number of palettes in the fixed palette table.
    pub const PALETTE_COUNT: usize = 16;

    /// Number of colors in each palette.
    pub const PALETTE_LEN: usize = 15;

    /// Size of one flattened frame: the palette id followed by one index byte per pixel.
    pub const FRAME_LEN: usize = 1 + PIXEL_COUNT;
}
